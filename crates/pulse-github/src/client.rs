use octocrab::service::middleware::retry::RetryConfig;
use pulse_core::{Item, PulseError};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::repo::RepoRef;

/// Result of walking the paginated issue listing.
///
/// # Examples
///
/// ```
/// use pulse_github::FetchOutcome;
///
/// let outcome = FetchOutcome {
///     items: vec![],
///     pages_requested: 1,
///     halted_by: Some(403),
/// };
/// assert!(outcome.is_total_failure());
/// assert!(!outcome.is_partial());
/// ```
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Every item collected before pagination stopped, in API order.
    pub items: Vec<Item>,
    /// Number of page requests issued, including the terminating one.
    pub pages_requested: u32,
    /// HTTP status of the page that stopped pagination, if it was not a 200.
    pub halted_by: Option<u16>,
}

impl FetchOutcome {
    /// Pagination failed after some items were already collected.
    pub fn is_partial(&self) -> bool {
        self.halted_by.is_some() && !self.items.is_empty()
    }

    /// Pagination failed before any item was collected.
    pub fn is_total_failure(&self) -> bool {
        self.halted_by.is_some() && self.items.is_empty()
    }
}

#[derive(Deserialize)]
struct CommentBody {
    #[serde(default)]
    body: Option<String>,
}

/// GitHub REST client for listing issues, reading comments and posting replies.
///
/// Reads go through `reqwest` so every page status can be inspected;
/// replies are posted through `octocrab` with its retry layer disabled, so
/// a failed post is never re-sent.
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
    api_url: String,
}

impl GitHubClient {
    /// Create a client for the API rooted at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::GitHub`] if either HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn demo() -> pulse_core::Result<()> {
    /// use pulse_github::GitHubClient;
    ///
    /// let client = GitHubClient::new("ghp_xxxx", "https://api.github.com")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(token: &str, api_url: &str) -> Result<Self, PulseError> {
        let api_url = api_url.trim_end_matches('/').to_string();

        let octocrab = octocrab::Octocrab::builder()
            .add_retry_config(RetryConfig::None)
            .personal_token(token.to_string())
            .base_uri(api_url.as_str())
            .map_err(|e| PulseError::GitHub(format!("invalid API URL '{api_url}': {e}")))?
            .build()
            .map_err(|e| PulseError::GitHub(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent("issuepulse")
            .build()
            .map_err(|e| PulseError::GitHub(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            octocrab,
            http,
            token: token.to_string(),
            api_url,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, PulseError> {
        self.http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| PulseError::GitHub(format!("request to {url} failed: {e}")))
    }

    /// Fetch every issue and pull request in `repo`, all states.
    ///
    /// Requests pages 1, 2, … until a page is empty or a page comes back
    /// with a status other than 200. Items gathered before a failing page
    /// are kept; the failing status is recorded in
    /// [`FetchOutcome::halted_by`].
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::GitHub`] on transport failures or an
    /// undecodable page.
    pub async fn fetch_issues(&self, repo: &RepoRef) -> Result<FetchOutcome, PulseError> {
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let url = format!("{}/repos/{repo}/issues?page={page}&state=all", self.api_url);
            let response = self.get(&url).await?;

            let status = response.status();
            if status != StatusCode::OK {
                debug!(%repo, page, status = status.as_u16(), "issue listing halted");
                return Ok(FetchOutcome {
                    items,
                    pages_requested: page,
                    halted_by: Some(status.as_u16()),
                });
            }

            let page_items: Vec<Item> = response
                .json()
                .await
                .map_err(|e| PulseError::GitHub(format!("failed to decode issue page {page}: {e}")))?;
            debug!(%repo, page, count = page_items.len(), "fetched issue page");

            if page_items.is_empty() {
                return Ok(FetchOutcome {
                    items,
                    pages_requested: page,
                    halted_by: None,
                });
            }

            items.extend(page_items);
            page += 1;
        }
    }

    /// Fetch a single issue or pull request by number.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::GitHub`] on transport errors or any non-200 status.
    pub async fn fetch_issue(&self, repo: &RepoRef, number: u64) -> Result<Item, PulseError> {
        let url = format!("{}/repos/{repo}/issues/{number}", self.api_url);
        let response = self.get(&url).await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::GitHub(format!(
                "failed to fetch {repo}#{number}: GitHub API error {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PulseError::GitHub(format!("failed to decode {repo}#{number}: {e}")))
    }

    /// Fetch the comment bodies for one item.
    ///
    /// Never fails: a non-200 status, transport error or undecodable body
    /// yields an empty list.
    pub async fn fetch_comments(&self, repo: &RepoRef, number: u64) -> Vec<String> {
        let url = format!("{}/repos/{repo}/issues/{number}/comments", self.api_url);
        let response = match self.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%repo, number, error = %e, "comments unavailable");
                return Vec::new();
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%repo, number, status = status.as_u16(), "comments unavailable");
            return Vec::new();
        }

        match response.json::<Vec<CommentBody>>().await {
            Ok(comments) => comments
                .into_iter()
                .map(|c| c.body.unwrap_or_default())
                .collect(),
            Err(e) => {
                warn!(%repo, number, error = %e, "comments undecodable");
                Vec::new()
            }
        }
    }

    /// Attach comment bodies to each item, one request per item, in order.
    pub async fn attach_comments(&self, repo: &RepoRef, items: &mut [Item]) {
        for item in items.iter_mut() {
            item.comments = self.fetch_comments(repo, item.number).await;
        }
    }

    /// Post `body` as a new comment on an issue or pull request.
    ///
    /// The body is truncated to `max_chars` characters.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::GitHub`] if the API rejects the comment.
    pub async fn post_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
        max_chars: usize,
    ) -> Result<(), PulseError> {
        let route = format!("/repos/{repo}/issues/{number}/comments");
        let payload = serde_json::json!({ "body": truncate_chars(body, max_chars) });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| PulseError::GitHub(format!("failed to post comment on #{number}: {e}")))?;

        debug!(%repo, number, "posted reply");
        Ok(())
    }
}

/// Truncate to at most `max_chars` Unicode scalar values.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
