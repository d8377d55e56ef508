use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "robilytics";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_RESULTS: u32 = 2000;

#[derive(Clone, Debug)]
pub struct JiraConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl JiraConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Base URL with exactly one trailing slash, e.g. `https://host/rest/api/2/`.
    pub fn api_root(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::JiraConfig;

    #[test]
    fn api_root_normalises_trailing_slashes() {
        let bare = JiraConfig::new("https://jira.local/rest/api/2", "u", "p");
        let slashed = JiraConfig::new("https://jira.local/rest/api/2///", "u", "p");
        assert_eq!(bare.api_root(), "https://jira.local/rest/api/2/");
        assert_eq!(slashed.api_root(), "https://jira.local/rest/api/2/");
    }
}
