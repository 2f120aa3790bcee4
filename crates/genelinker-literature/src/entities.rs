//! Dictionary-based biomedical entity extraction for uploaded papers.
//!
//! Gene symbols match case-sensitively on word boundaries; disease, drug
//! and pathway terms match case-insensitively.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Gene,
    Disease,
    Drug,
    Pathway,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [EntityKind::Gene, EntityKind::Disease, EntityKind::Drug, EntityKind::Pathway];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Gene    => "gene",
            EntityKind::Disease => "disease",
            EntityKind::Drug    => "drug",
            EntityKind::Pathway => "pathway",
        }
    }

    fn base_confidence(self) -> f64 {
        match self {
            EntityKind::Gene    => 0.90,
            EntityKind::Disease => 0.88,
            EntityKind::Drug    => 0.85,
            EntityKind::Pathway => 0.82,
        }
    }

    fn lexicon(self) -> &'static [&'static str] {
        match self {
            EntityKind::Gene => &[
                "TP53", "BRCA1", "BRCA2", "MYC", "KRAS", "NRAS", "HRAS", "EGFR", "ERBB2", "PIK3CA", "PTEN",
                "ALK", "BRAF", "AKT1", "MTOR", "CDKN2A", "RB1", "ATM", "CHEK2", "MLH1", "MSH2", "APC",
                "MDM2", "VEGFA", "JAK2", "STAT3", "IDH1", "NOTCH1", "CTNNB1", "ESR1",
            ],
            EntityKind::Disease => &[
                "breast cancer", "ovarian cancer", "lung cancer", "colorectal cancer", "pancreatic cancer",
                "prostate cancer", "melanoma", "leukemia", "lymphoma", "glioblastoma", "carcinoma",
                "Alzheimer's disease", "Parkinson's disease", "diabetes", "cystic fibrosis",
            ],
            EntityKind::Drug => &[
                "cisplatin", "doxorubicin", "paclitaxel", "tamoxifen", "trastuzumab", "imatinib",
                "olaparib", "sotorasib", "osimertinib", "pembrolizumab", "nivolumab", "gefitinib",
                "erlotinib", "metformin", "rapamycin",
            ],
            EntityKind::Pathway => &[
                "DNA repair", "homologous recombination", "PI3K/AKT", "MAPK", "Wnt", "Notch", "Hedgehog",
                "JAK/STAT", "NF-kB", "mTOR signaling", "apoptosis", "cell cycle", "p53 pathway",
                "ubiquitin-proteasome",
            ],
        }
    }

    fn matcher(self) -> Option<&'static Regex> {
        static MATCHERS: OnceLock<BTreeMap<EntityKind, Regex>> = OnceLock::new();
        MATCHERS
            .get_or_init(|| {
                EntityKind::ALL
                    .iter()
                    .filter_map(|kind| build_matcher(*kind).map(|re| (*kind, re)))
                    .collect()
            })
            .get(&self)
    }
}

fn build_matcher(kind: EntityKind) -> Option<Regex> {
    let mut terms: Vec<&str> = kind.lexicon().to_vec();
    // Longest first so "breast cancer" wins over a shorter overlapping term.
    terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let pattern = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    let flags = if kind == EntityKind::Gene { "" } else { "(?i)" };
    Regex::new(&format!(r"{flags}\b({pattern})\b")).ok()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedEntity {
    pub kind: EntityKind,
    /// Canonical lexicon spelling.
    pub name: String,
    pub mentions: usize,
    pub confidence: f64,
}

/// Find lexicon entities in `text`, one entry per distinct name, ordered
/// by kind then by mention count.
pub fn extract_entities(text: &str) -> Vec<ExtractedEntity> {
    let mut out = Vec::new();
    for kind in EntityKind::ALL {
        let Some(re) = kind.matcher() else { continue };
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for m in re.find_iter(text) {
            let canonical = canonical_name(kind, m.as_str());
            *counts.entry(canonical).or_default() += 1;
        }
        let mut found: Vec<ExtractedEntity> = counts
            .into_iter()
            .map(|(name, mentions)| ExtractedEntity {
                kind,
                confidence: (kind.base_confidence() + 0.02 * (mentions as f64 - 1.0)).min(0.99),
                name,
                mentions,
            })
            .collect();
        found.sort_by(|a, b| b.mentions.cmp(&a.mentions).then_with(|| a.name.cmp(&b.name)));
        out.extend(found);
    }
    out
}

fn canonical_name(kind: EntityKind, matched: &str) -> String {
    kind.lexicon()
        .iter()
        .find(|term| term.eq_ignore_ascii_case(matched))
        .map(|term| term.to_string())
        .unwrap_or_else(|| matched.to_string())
}
