use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::settings::Secret;

/// Failure talking to the hosting API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The API answered with an unexpected status.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("invalid access token header value")]
    InvalidToken,
}

/// Namespace that owns the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    User(String),
    Org(String),
}

impl Owner {
    pub fn name(&self) -> &str {
        match self {
            Owner::User(n) | Owner::Org(n) => n,
        }
    }

    /// `owner/repo`
    pub fn full_name(&self, repo: &str) -> String {
        format!("{}/{}", self.name(), repo)
    }

    fn create_path(&self) -> String {
        match self {
            Owner::User(_) => "/user/repos".to_string(),
            Owner::Org(org) => format!("/orgs/{}/repos", org),
        }
    }
}

#[derive(Serialize)]
struct CreateRepo<'a> {
    name: &'a str,
    private: bool,
    auto_init: bool,
}

#[derive(Serialize)]
struct RepoSettings<'a> {
    default_branch: &'a str,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: Option<String>,
}

/// Blocking client for the handful of GitHub REST calls publishing needs.
pub struct GitHubApi {
    client: Client,
    base: String,
}

impl GitHubApi {
    /// Build a client against `api_url` authenticating with `token`.
    pub fn new(api_url: &str, token: &Secret) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("pwagh"));
        let mut auth = HeaderValue::from_str(&format!("token {}", token.expose()))
            .map_err(|_| ApiError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// `GET /repos/{full}`: 200 → `true`, 404 → `false`.
    pub fn repo_exists(&self, full_name: &str) -> Result<bool, ApiError> {
        let resp = self
            .client
            .get(format!("{}/repos/{}", self.base, full_name))
            .send()?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(status_error(resp)),
        }
    }

    /// Create `name` under `owner` without auto-initialization; expects 201.
    pub fn create_repo(&self, owner: &Owner, name: &str, private: bool) -> Result<(), ApiError> {
        let body = CreateRepo {
            name,
            private,
            auto_init: false,
        };
        let resp = self
            .client
            .post(format!("{}{}", self.base, owner.create_path()))
            .json(&body)
            .send()?;
        if resp.status() == StatusCode::CREATED {
            Ok(())
        } else {
            Err(status_error(resp))
        }
    }

    /// `PATCH /repos/{full}` with `{default_branch}`; expects 200.
    pub fn set_default_branch(&self, full_name: &str, branch: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .patch(format!("{}/repos/{}", self.base, full_name))
            .json(&RepoSettings {
                default_branch: branch,
            })
            .send()?;
        if resp.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(status_error(resp))
        }
    }
}

/// Turn an unexpected response into an error carrying the API's `message`,
/// or the status reason when the body has none.
fn status_error(resp: Response) -> ApiError {
    let status = resp.status();
    let message = resp
        .json::<ApiMessage>()
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}
