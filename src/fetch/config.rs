//! Configuration for the HTTP fetcher.

use std::time::Duration;

/// Configuration for [`HttpFetcher`](super::HttpFetcher).
///
/// No timeout is applied unless one is set explicitly.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upper bound on a whole request, or `None` to wait indefinitely.
    pub timeout: Option<Duration>,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: Self::default_user_agent(),
        }
    }
}

impl FetchConfig {
    fn default_user_agent() -> String {
        format!("jsonflow/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the effective user agent, using the default if empty.
    pub fn effective_user_agent(&self) -> String {
        if self.user_agent.is_empty() {
            Self::default_user_agent()
        } else {
            self.user_agent.clone()
        }
    }
}
