use reqwest::{Client, ClientBuilder, Method};
use std::time::Duration;
use url::Url;
use crate::config::ApiConfig;
use crate::error::EditaisError;

/// An HTTP client capped to the host of the configured API.
/// Requests to any other host are refused before they leave the process.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    base_url: String,
    host: String,
}

impl SandboxClient {
    /// Creates a client allowed to reach the API's own host and its subdomains.
    pub fn new(api: &ApiConfig) -> Result<Self, EditaisError> {
        let base = Url::parse(&api.base_url)
            .map_err(|e| EditaisError::Config(format!("invalid API base URL {}: {}", api.base_url, e)))?;
        let host = base
            .host_str()
            .ok_or_else(|| EditaisError::Config(format!("API base URL has no host: {}", api.base_url)))?;
        let host = host.to_string();

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| EditaisError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            host,
        })
    }

    /// Absolute URL for an API path such as `/editais`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// True if `url` points at the API host or one of its subdomains.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        match parsed.host_str() {
            Some(host) => host == self.host || host.ends_with(&format!(".{}", self.host)),
            None => false,
        }
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, EditaisError> {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, EditaisError> {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> Result<reqwest::RequestBuilder, EditaisError> {
        self.request(Method::PUT, url)
    }

    /// Exposes the inner `reqwest::Client` builder pattern safely.
    pub fn request(&self, method: Method, url: &str) -> Result<reqwest::RequestBuilder, EditaisError> {
        if !self.is_allowed(url) {
            return Err(EditaisError::Security(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.request(method, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SandboxClient {
        SandboxClient::new(&ApiConfig {
            base_url: "https://api.editais.example/".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let c = client();
        assert_eq!(c.endpoint("/editais"), "https://api.editais.example/editais");
        assert_eq!(c.endpoint("chat"), "https://api.editais.example/chat");
    }

    #[test]
    fn test_only_api_host_is_allowed() {
        let c = client();
        assert!(c.is_allowed("https://api.editais.example/editais"));
        assert!(c.is_allowed("https://files.api.editais.example/a.pdf"));
        assert!(!c.is_allowed("https://evil.example/editais"));
        assert!(!c.is_allowed("https://notapi.editais.example.evil/"));
        assert!(!c.is_allowed("not a url"));
        assert!(c.get("https://evil.example/").is_err());
    }
}
