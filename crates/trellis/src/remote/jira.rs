//! HTTP client for a Jira-compatible tracker.
//!
//! Request construction, response decoding, and the two mechanical fallback
//! behaviors live here:
//!
//! - **API-version fallback**: the REST prefix is probed once (`/rest/api/3`,
//!   then `/rest/api/2` on 404) and the working version is remembered for the
//!   life of the client.
//! - **Authentication fallback**: a Bearer personal-access-token is tried
//!   first; on 401 the client retries once with Basic credentials, when
//!   configured, and remembers the scheme that worked.
//!
//! The client performs no other retries and owns no timeout policy beyond
//! reqwest's defaults.

use crate::config::{AuthConfig, TrackerConfig};
use crate::domain::{IssueKey, StructureElement};
use crate::error::{Error, Result};
use crate::remote::records::{RawIssue, RawStructurePage, SearchPage};
use crate::remote::{FieldSelector, IssueSource, StructureSource};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use std::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

/// REST API version of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiVersion {
    /// `/rest/api/3` (cloud-style).
    V3,
    /// `/rest/api/2` (server-style).
    V2,
}

impl ApiVersion {
    fn segment(self) -> &'static str {
        match self {
            ApiVersion::V3 => "3",
            ApiVersion::V2 => "2",
        }
    }
}

/// Authentication scheme currently in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthScheme {
    Bearer,
    Basic,
    Anonymous,
}

/// Client for a Jira-compatible tracker.
pub struct JiraClient {
    http: reqwest::Client,
    base: Url,
    auth: AuthConfig,
    api_version: RwLock<Option<ApiVersion>>,
    scheme: RwLock<AuthScheme>,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Create a client from resolved configuration.
    pub fn new(config: &TrackerConfig) -> Self {
        let mut base = config.base_url.clone();
        // Url::join drops the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let scheme = if config.auth.token.is_some() {
            AuthScheme::Bearer
        } else if config.auth.has_basic() {
            AuthScheme::Basic
        } else {
            AuthScheme::Anonymous
        };

        Self {
            http: reqwest::Client::new(),
            base,
            auth: config.auth.clone(),
            api_version: RwLock::new(None),
            scheme: RwLock::new(scheme),
        }
    }

    fn current_scheme(&self) -> AuthScheme {
        *self.scheme.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder, scheme: AuthScheme) -> reqwest::RequestBuilder {
        match scheme {
            AuthScheme::Bearer => match &self.auth.token {
                Some(token) => req.bearer_auth(token),
                None => req,
            },
            AuthScheme::Basic => match (&self.auth.username, &self.auth.password) {
                (Some(user), Some(pass)) => req.basic_auth(user, Some(pass)),
                _ => req,
            },
            AuthScheme::Anonymous => req,
        }
    }

    /// Send a GET request, falling back from Bearer to Basic once on 401.
    ///
    /// Returns the response whatever its status; status handling is the
    /// caller's concern (404 means different things per endpoint).
    async fn send(&self, url: Url) -> Result<reqwest::Response> {
        let scheme = self.current_scheme();
        let req = self.http.get(url.clone()).header(ACCEPT, "application/json");
        let resp = self.apply_auth(req, scheme).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED
            && scheme == AuthScheme::Bearer
            && self.auth.has_basic()
        {
            warn!("Bearer token rejected, retrying with basic credentials");
            let req = self.http.get(url).header(ACCEPT, "application/json");
            let retry = self.apply_auth(req, AuthScheme::Basic).send().await?;
            if retry.status() != StatusCode::UNAUTHORIZED {
                *self
                    .scheme
                    .write()
                    .unwrap_or_else(std::sync::PoisonError::into_inner) = AuthScheme::Basic;
                debug!("Basic credentials accepted, remembering scheme");
            }
            return Ok(retry);
        }

        Ok(resp)
    }

    /// Map a non-success status to a typed error.
    fn check_success(resp: reqwest::Response, endpoint: &str) -> Result<reqwest::Response> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth(
                "tracker rejected every configured credential".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
        Ok(resp)
    }

    /// The negotiated REST API version, probing once on first use.
    async fn api_version(&self) -> Result<ApiVersion> {
        if let Some(version) = *self
            .api_version
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
        {
            return Ok(version);
        }

        let probe = self.base.join("rest/api/3/serverInfo")?;
        let resp = self.send(probe).await?;
        let version = if resp.status() == StatusCode::NOT_FOUND {
            ApiVersion::V2
        } else {
            ApiVersion::V3
        };
        debug!(version = version.segment(), "Negotiated tracker API version");

        *self
            .api_version
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(version);
        Ok(version)
    }

    fn issue_url(&self, version: ApiVersion, key: &IssueKey, fields: &FieldSelector) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("rest/api/{}/issue/{}", version.segment(), key))?;
        url.query_pairs_mut()
            .append_pair("fields", &fields.as_param());
        Ok(url)
    }

    fn search_url(
        &self,
        version: ApiVersion,
        query: &str,
        fields: &FieldSelector,
        max_results: u32,
    ) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("rest/api/{}/search", version.segment()))?;
        url.query_pairs_mut()
            .append_pair("jql", query)
            .append_pair("fields", &fields.as_param())
            .append_pair("maxResults", &max_results.to_string());
        Ok(url)
    }

    fn structure_url(&self, structure_id: u64, max_results: u32) -> Result<Url> {
        let mut url = self.base.join(&format!(
            "rest/structure/2.0/structure/{structure_id}/elements"
        ))?;
        url.query_pairs_mut()
            .append_pair("limit", &max_results.to_string());
        Ok(url)
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn get_issue(
        &self,
        key: &IssueKey,
        fields: &FieldSelector,
    ) -> Result<Option<RawIssue>> {
        let version = self.api_version().await?;
        let url = self.issue_url(version, key, fields)?;
        debug!(key = %key, "Fetching issue");

        let resp = self.send(url).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check_success(resp, &format!("issue/{key}"))?;
        Ok(Some(resp.json::<RawIssue>().await?))
    }

    async fn search_issues(
        &self,
        query: &str,
        fields: &FieldSelector,
        max_results: u32,
    ) -> Result<SearchPage> {
        let version = self.api_version().await?;
        let url = self.search_url(version, query, fields, max_results)?;
        debug!(query, max_results, "Searching issues");

        let resp = Self::check_success(self.send(url).await?, "search")?;
        Ok(resp.json::<SearchPage>().await?)
    }
}

#[async_trait]
impl StructureSource for JiraClient {
    async fn get_structure(
        &self,
        structure_id: u64,
        max_results: u32,
    ) -> Result<Vec<StructureElement>> {
        let url = self.structure_url(structure_id, max_results)?;
        debug!(structure_id, "Fetching structure elements");

        let resp = Self::check_success(self.send(url).await?, "structure/elements")?;
        let page = resp.json::<RawStructurePage>().await?;
        Ok(page
            .elements
            .into_iter()
            .map(super::records::RawStructureElement::into_element)
            .collect())
    }
}
