use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::GeneLinkerError;

/// Request timeout applied when the caller does not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// An HTTP client capped to approved domains, with a hard request timeout.
///
/// Every outbound call in GeneLinker goes through this type. A request that
/// exceeds the timeout fails with a reqwest timeout error, which the clients
/// turn into a fallback result.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
    timeout: Duration,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist of literature and AI domains.
    pub fn new() -> Result<Self, GeneLinkerError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, GeneLinkerError> {
        let domains = [
            "api.openai.com",          // OpenAI chat completions
            "api.groq.com",            // Groq (OpenAI-compatible)
            "openrouter.ai",           // OpenRouter (OpenAI-compatible)
            "api.core.ac.uk",          // CORE literature search
            "core.ac.uk",              // CORE full-text downloads
            "ncbi.nlm.nih.gov",        // PubMed / PMC
            "europepmc.org",           // Europe PMC
            "arxiv.org",               // arXiv PDFs
            "biorxiv.org",             // bioRxiv PDFs
            "localhost",               // local OpenAI-compatible servers
            "127.0.0.1",               // Localhost alt
        ];
        let allowlist = domains.iter().map(|d| d.to_string()).collect();

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("GeneLinker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeneLinkerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_ascii_lowercase());
    }

    /// Allows the host of a configured endpoint URL. Invalid URLs are ignored.
    pub fn allow_endpoint(&mut self, endpoint: &str) {
        if let Some(host) = Url::parse(endpoint).ok().and_then(|u| u.host_str().map(String::from)) {
            self.allow_domain(&host);
        }
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Check exact match or if it's a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<(), GeneLinkerError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(GeneLinkerError::SecurityError(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )))
        }
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for GET requests.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, GeneLinkerError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely for POST requests.
    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, GeneLinkerError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist() {
        let c = SandboxClient::new().unwrap();
        assert!(c.is_allowed("https://api.openai.com/v1/chat/completions"));
        assert!(c.is_allowed("https://pubmed.ncbi.nlm.nih.gov/12345"));
        assert!(!c.is_allowed("https://evil.example.com/x.pdf"));
        assert!(!c.is_allowed("not a url"));
    }

    #[test]
    fn test_allow_endpoint_adds_host() {
        let mut c = SandboxClient::new().unwrap();
        assert!(!c.is_allowed("https://llm.internal.lab/v1/chat/completions"));
        c.allow_endpoint("https://llm.internal.lab/v1");
        assert!(c.is_allowed("https://llm.internal.lab/v1/chat/completions"));
    }

    #[test]
    fn test_blocked_request_is_security_error() {
        let c = SandboxClient::new().unwrap();
        let err = c.get("https://blocked.example.org/").unwrap_err();
        assert!(matches!(err, GeneLinkerError::SecurityError(_)));
    }

    #[test]
    fn test_timeout_is_kept() {
        let c = SandboxClient::with_timeout(Duration::from_secs(3)).unwrap();
        assert_eq!(c.timeout(), Duration::from_secs(3));
    }
}
