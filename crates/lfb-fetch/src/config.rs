use lfb_core::CoreError;

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Root of the CI web status, e.g. `http://buildbot.example.org:8010`.
    pub base_url: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8010".to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(CoreError::InvalidConfig("base_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::InvalidConfig(format!(
                "base_url must be http(s): {url}"
            )));
        }
        Ok(())
    }

    /// Base URL without trailing slashes.
    pub fn root(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}
