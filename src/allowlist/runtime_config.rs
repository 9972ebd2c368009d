//! Allow-list backed by Google Cloud Runtime Configurator variables.
//!
//! Each allow-listed sender is one variable named
//! `projects/<project>/configs/<config>/variables/whitelist/<label>` whose text
//! value is the sender's user ID.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use crate::types::SenderId;

use super::{Allowlist, AllowlistError, AllowlistSource};

/// Base URL of the Runtime Configurator API.
pub const DEFAULT_API_BASE: &str = "https://runtimeconfig.googleapis.com";

/// Config name used when none is given.
pub const DEFAULT_CONFIG_NAME: &str = "prod";

/// Variables requested per listing page.
pub const LIST_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListVariablesResponse {
    #[serde(default)]
    variables: Vec<Variable>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Variable {
    name: String,
    #[serde(default)]
    text: String,
}

/// Fetches the allow-list from a Runtime Configurator config.
#[derive(Clone)]
pub struct RuntimeConfigAllowlist {
    http: reqwest::Client,
    api_base: String,
    project: String,
    config: String,
}

impl RuntimeConfigAllowlist {
    /// Creates a client for `projects/<project>/configs/<config>`.
    pub fn new(
        api_base: impl Into<String>,
        project: impl Into<String>,
        config: impl Into<String>,
        access_token: &str,
    ) -> Result<Self, AllowlistError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", access_token.trim()))
            .map_err(|_| AllowlistError::InvalidConfig("access token is not a valid header".into()))?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            project: project.into(),
            config: config.into(),
        })
    }

    /// Creates a client against the public API.
    pub fn with_default_base(
        project: impl Into<String>,
        config: impl Into<String>,
        access_token: &str,
    ) -> Result<Self, AllowlistError> {
        Self::new(DEFAULT_API_BASE, project, config, access_token)
    }

    fn parent(&self) -> String {
        format!("projects/{}/configs/{}", self.project, self.config)
    }

    /// The variable name prefix that marks allow-list entries.
    pub fn prefix(&self) -> String {
        format!("{}/variables/whitelist/", self.parent())
    }

    async fn list_page(
        &self,
        page_token: Option<&str>,
    ) -> Result<ListVariablesResponse, AllowlistError> {
        let filter = self.prefix();
        let page_size = LIST_PAGE_SIZE.to_string();
        // An empty page token requests the first page.
        let response = self
            .http
            .get(format!("{}/v1beta1/{}/variables", self.api_base, self.parent()))
            .query(&[
                ("filter", filter.as_str()),
                ("pageSize", page_size.as_str()),
                ("returnValues", "true"),
                ("pageToken", page_token.unwrap_or_default()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AllowlistError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

impl AllowlistSource for RuntimeConfigAllowlist {
    async fn fetch(&self) -> Result<Allowlist, AllowlistError> {
        let prefix = self.prefix();
        let mut list = Allowlist::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(page_token.as_deref()).await?;
            debug!(variables = page.variables.len(), "Fetched allow-list page");

            for var in page.variables {
                if let Some(label) = var.name.strip_prefix(&prefix) {
                    list.insert(SenderId(var.text), label);
                }
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(list)
    }
}

impl std::fmt::Debug for RuntimeConfigAllowlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfigAllowlist")
            .field("api_base", &self.api_base)
            .field("project", &self.project)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const LIST_PATH: &str = "/v1beta1/projects/proj/configs/prod/variables";
    const PREFIX: &str = "projects/proj/configs/prod/variables/whitelist/";

    fn source(server: &MockServer) -> RuntimeConfigAllowlist {
        RuntimeConfigAllowlist::new(server.base_url(), "proj", "prod", "token").unwrap()
    }

    #[test]
    fn prefix_is_scoped_to_project_and_config() {
        let src = RuntimeConfigAllowlist::with_default_base("p", "staging", "t").unwrap();
        assert_eq!(src.prefix(), "projects/p/configs/staging/variables/whitelist/");
    }

    #[tokio::test]
    async fn fetch_strips_prefix_and_skips_foreign_variables() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(LIST_PATH)
                .query_param("filter", PREFIX)
                .query_param("pageSize", "1000")
                .query_param("returnValues", "true");
            then.status(200).json_body(json!({
                "variables": [
                    {"name": format!("{PREFIX}alice"), "text": "111"},
                    {"name": format!("{PREFIX}bob"), "text": "222"},
                    {"name": "projects/proj/configs/prod/variables/other/x", "text": "333"}
                ]
            }));
        });

        let list = source(&server).fetch().await.unwrap();

        mock.assert();
        assert_eq!(list.len(), 2);
        assert_eq!(list.label(&SenderId::new("111")), Some("alice"));
        assert_eq!(list.label(&SenderId::new("222")), Some("bob"));
        assert!(!list.contains(&SenderId::new("333")));
    }

    #[tokio::test]
    async fn fetch_follows_page_tokens() {
        let server = MockServer::start();
        let second = server.mock(|when, then| {
            when.method(GET).path(LIST_PATH).query_param("pageToken", "p2");
            then.status(200).json_body(json!({
                "variables": [{"name": format!("{PREFIX}carol"), "text": "333"}]
            }));
        });
        let first = server.mock(|when, then| {
            when.method(GET).path(LIST_PATH).query_param("pageToken", "");
            then.status(200).json_body(json!({
                "variables": [{"name": format!("{PREFIX}alice"), "text": "111"}],
                "nextPageToken": "p2"
            }));
        });

        let list = source(&server).fetch().await.unwrap();

        first.assert();
        second.assert();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&SenderId::new("111")));
        assert!(list.contains(&SenderId::new("333")));
    }

    #[tokio::test]
    async fn later_page_error_discards_earlier_pages() {
        let server = MockServer::start();
        let second = server.mock(|when, then| {
            when.method(GET).path(LIST_PATH).query_param("pageToken", "p2");
            then.status(503).body("backend unavailable");
        });
        let first = server.mock(|when, then| {
            when.method(GET).path(LIST_PATH).query_param("pageToken", "");
            then.status(200).json_body(json!({
                "variables": [{"name": format!("{PREFIX}alice"), "text": "111"}],
                "nextPageToken": "p2"
            }));
        });

        let result = source(&server).fetch().await;

        first.assert();
        second.assert();
        assert!(matches!(
            result,
            Err(AllowlistError::Status { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn service_error_fails_whole_fetch() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LIST_PATH);
            then.status(503).body("backend unavailable");
        });

        let err = source(&server).fetch().await.unwrap_err();

        assert!(matches!(err, AllowlistError::Status { status: 503, .. }));
    }
}
