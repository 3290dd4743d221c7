use std::time::Duration;

pub const DEFAULT_REFRESH_PATH: &str = "/api/refreshToken";
pub const DEFAULT_EXPIRY_MARGIN_SECONDS: u64 = 5 * 60;
pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 5 * 60;

/// Client configuration. `base_url` is the only required field; everything
/// else defaults to the renewal endpoint and cadence of the hosting API.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub refresh_path: String,
    /// A token within this margin of its expiry counts as near expiry.
    pub expiry_margin: Duration,
    /// Cadence of the proactive refresh check.
    pub check_interval: Duration,
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            expiry_margin: Duration::from_secs(DEFAULT_EXPIRY_MARGIN_SECONDS),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECONDS),
        }
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub(crate) fn refresh_url(&self) -> String {
        format!("{}{}", self.base_url, self.refresh_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash_from_base_url() {
        let config = Config::new("https://api.example.com/");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(
            config.refresh_url(),
            "https://api.example.com/api/refreshToken"
        );
    }
}
