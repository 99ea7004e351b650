use crate::dashboard::types::{Post, User};
use crate::APP_USER_AGENT;
use anyhow::{anyhow, Result};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

/// Thin client over the two read endpoints the dashboard consumes:
/// `GET /users` and `GET /posts?userId=<id>`. Any transport, status, or parse
/// failure collapses into a single generic error; callers do not distinguish
/// between them.
#[derive(Clone, Debug)]
pub struct Gateway {
    client: Client,
    base_url: String,
}

impl Gateway {
    /// Build a gateway for the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(anyhow!("Error parsing URL: unsupported scheme {scheme}")),
        }

        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetch the full user list, `GET <base>/users`
    #[instrument(skip(self))]
    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        let url = self.endpoint_url("/users");

        debug!("fetching users from {url}");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("{} - {}", url, response.status()));
        }

        Ok(response.json().await?)
    }

    /// Fetch the posts for one user, `GET <base>/posts?userId=<id>`. The
    /// server filters; the result is not re-filtered locally.
    #[instrument(skip(self))]
    pub async fn fetch_posts_by_user(&self, user_id: u64) -> Result<Vec<Post>> {
        let url = self.endpoint_url(&format!("/posts?userId={user_id}"));

        debug!("fetching posts from {url}");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("{} - {}", url, response.status()));
        }

        Ok(response.json().await?)
    }
}
