//! Base URLs of the resource protocol

use mailup_core::ResourceEndpoint;
use mailup_domain::constants::DEFAULT_SERVICES_URL;

/// Base URLs of the REST services and of the token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEndpoints {
    pub console: String,
    pub mail_statistics: String,
    pub token: String,
}

impl ResourceEndpoints {
    /// Standard layout below `services_url` (the public platform host by
    /// default).
    pub fn under(services_url: Option<&str>) -> Self {
        let base = services_url.unwrap_or(DEFAULT_SERVICES_URL).trim_end_matches('/');
        Self {
            console: format!("{base}/API/v1.1/Rest/ConsoleService.svc"),
            mail_statistics: format!("{base}/API/v1.1/Rest/MailStatisticsService.svc"),
            token: format!("{base}/Authorization/OAuth/Token"),
        }
    }

    pub fn base(&self, endpoint: ResourceEndpoint) -> &str {
        match endpoint {
            ResourceEndpoint::Console => &self.console,
            ResourceEndpoint::MailStatistics => &self.mail_statistics,
        }
    }

    /// Absolute URL of `path` on `endpoint`.
    pub fn url(&self, endpoint: ResourceEndpoint, path: &str) -> String {
        format!("{}/{}", self.base(endpoint), path.trim_start_matches('/'))
    }
}

impl Default for ResourceEndpoints {
    fn default() -> Self {
        Self::under(None)
    }
}
