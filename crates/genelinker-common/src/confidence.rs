//! Confidence helpers.
//!
//! Confidence values in GeneLinker are presentation values: they are
//! synthesized for live answers and fixed for canned answers. They are
//! always kept in [0.0, 1.0].

use sha2::{Digest, Sha256};
use std::ops::Range;

/// Band used for live research answers.
pub const ANSWER_BAND: Range<f64> = 0.85..0.95;

/// Band used for live gene summaries.
pub const GENE_BAND: Range<f64> = 0.88..0.96;

/// Band every canned (fallback) confidence lies in.
pub const FALLBACK_BAND: Range<f64> = 0.70..0.90;

/// Clamp to [0.0, 1.0]; NaN maps to 0.0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Deterministically map `seed` into `band`.
///
/// The first eight bytes of SHA-256(seed) are read as a fraction in [0, 1)
/// and scaled into the band, so identical answers always report the same
/// confidence.
pub fn synthesize(seed: &str, band: Range<f64>) -> f64 {
    let digest = Sha256::digest(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let fraction = (u64::from_be_bytes(bytes) >> 11) as f64 / (1u64 << 53) as f64;
    clamp_unit(band.start + fraction * (band.end - band.start))
}

/// Format as a whole percentage, e.g. `0.874` → `"87%"`.
pub fn as_percent(value: f64) -> String {
    format!("{:.0}%", clamp_unit(value) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
    }

    #[test]
    fn test_synthesize_in_band() {
        for seed in ["", "TP53", "a much longer answer about DNA repair pathways"] {
            let c = synthesize(seed, ANSWER_BAND);
            assert!(ANSWER_BAND.contains(&c), "{c} outside band");
        }
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        assert_eq!(synthesize("BRCA1", GENE_BAND), synthesize("BRCA1", GENE_BAND));
    }

    #[test]
    fn test_as_percent() {
        assert_eq!(as_percent(0.874), "87%");
    }
}
