use pulse_core::{AnalyzedItem, Item, PulseError, ReplyStatus, SentimentTally};
use pulse_github::{FetchOutcome, GitHubClient, RepoRef};
use pulse_sentiment::{item_text, score_item, PolarityScorer, VaderScorer};
use tracing::{debug, info, warn};

use crate::reviewer::Reviewer;

/// Which pass the command line asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Fetch and score everything, then chart. No reviews.
    PlotOnly,
    /// Fetch, score and review one item by number. No chart.
    Single(u64),
    /// Fetch everything with comments, score and review each item, then chart.
    Full,
}

impl RunMode {
    /// Build the mode from the `--plot` and `--review` flags.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulse_review::pipeline::RunMode;
    ///
    /// assert_eq!(RunMode::from_flags(true, None), RunMode::PlotOnly);
    /// assert_eq!(RunMode::from_flags(false, Some(42)), RunMode::Single(42));
    /// assert_eq!(RunMode::from_flags(false, None), RunMode::Full);
    /// ```
    pub fn from_flags(plot: bool, review: Option<u64>) -> Self {
        match (plot, review) {
            (_, Some(number)) => RunMode::Single(number),
            (true, None) => RunMode::PlotOnly,
            (false, None) => RunMode::Full,
        }
    }

    /// Whether this mode calls the LLM and therefore needs its key.
    pub fn needs_reviewer(self) -> bool {
        !matches!(self, RunMode::PlotOnly)
    }
}

/// Aggregate result of a multi-item run.
#[derive(Debug, Clone, Default)]
pub struct Overview {
    /// Label counts over every analysed item.
    pub tally: SentimentTally,
    /// Number of items the listing returned.
    pub items_fetched: usize,
    /// Page requests issued against the listing.
    pub pages_requested: u32,
    /// Status that cut pagination short, if any.
    pub halted_by: Option<u16>,
}

impl Overview {
    /// Listing stopped on an error after some items were collected.
    pub fn is_partial(&self) -> bool {
        self.halted_by.is_some() && self.items_fetched > 0
    }
}

/// Sequential fetch → score → review pipeline.
///
/// Each request is awaited before the next one is issued.
pub struct IssuePipeline<S = VaderScorer> {
    github: GitHubClient,
    scorer: S,
    reviewer: Option<Reviewer>,
    reply_limit: Option<usize>,
}

impl IssuePipeline<VaderScorer> {
    /// Create a pipeline using the default VADER scorer.
    pub fn new(github: GitHubClient) -> Self {
        Self::with_scorer(github, VaderScorer)
    }
}

impl<S: PolarityScorer> IssuePipeline<S> {
    /// Create a pipeline with a custom polarity scorer.
    pub fn with_scorer(github: GitHubClient, scorer: S) -> Self {
        Self {
            github,
            scorer,
            reviewer: None,
            reply_limit: None,
        }
    }

    /// Enable AI reviews.
    pub fn with_reviewer(mut self, reviewer: Reviewer) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// Post each review back as a comment, truncated to `max_chars`.
    pub fn post_replies(mut self, max_chars: usize) -> Self {
        self.reply_limit = Some(max_chars);
        self
    }

    fn reviewer(&self) -> Result<&Reviewer, PulseError> {
        self.reviewer
            .as_ref()
            .ok_or_else(|| PulseError::Config("this mode needs an LLM reviewer".into()))
    }

    /// Fetch every item of `repo`, optionally with comment bodies.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the listing.
    pub async fn fetch(&self, repo: &RepoRef, with_comments: bool) -> Result<FetchOutcome, PulseError> {
        let mut outcome = self.github.fetch_issues(repo).await?;
        match outcome.halted_by {
            Some(status) => {
                debug!(%repo, status, kept = outcome.items.len(), "issue listing truncated");
            }
            None => info!(%repo, items = outcome.items.len(), "fetched issue listing"),
        }
        if with_comments {
            self.github.attach_comments(repo, &mut outcome.items).await;
        }
        Ok(outcome)
    }

    /// Score one item and, when `review` is set, request its AI review and
    /// post it back if replies are enabled.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Llm`] if the review request fails.
    pub async fn analyze(
        &self,
        repo: &RepoRef,
        item: Item,
        review: bool,
    ) -> Result<AnalyzedItem, PulseError> {
        let (polarity, sentiment) = score_item(&self.scorer, &item);
        debug!(number = item.number, polarity, %sentiment, "scored item");

        let mut analyzed = AnalyzedItem {
            item,
            polarity,
            sentiment,
            review: None,
            reply: ReplyStatus::NotRequested,
        };
        if !review {
            return Ok(analyzed);
        }

        let text = item_text(&analyzed.item.title, analyzed.item.body.as_deref());
        let reply = self.reviewer()?.review(&text).await?;

        if let Some(max_chars) = self.reply_limit {
            analyzed.reply = match self
                .github
                .post_comment(repo, analyzed.item.number, &reply, max_chars)
                .await
            {
                Ok(()) => ReplyStatus::Posted,
                Err(e) => {
                    warn!(number = analyzed.item.number, error = %e, "reply not posted");
                    ReplyStatus::Failed(e.to_string())
                }
            };
        }
        analyzed.review = Some(reply);
        Ok(analyzed)
    }

    /// Chart-only pass: fetch and score every item, no comments, no reviews.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the listing.
    pub async fn sentiment_overview(&self, repo: &RepoRef) -> Result<Overview, PulseError> {
        let outcome = self.fetch(repo, false).await?;
        let tally = outcome
            .items
            .iter()
            .map(|item| score_item(&self.scorer, item).1)
            .collect();
        Ok(Overview {
            tally,
            items_fetched: outcome.items.len(),
            pages_requested: outcome.pages_requested,
            halted_by: outcome.halted_by,
        })
    }

    /// Single-item pass: one item fetch, one comments fetch, one review.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::GitHub`] if the item cannot be fetched and
    /// [`PulseError::Llm`] if the review fails.
    pub async fn review_one(&self, repo: &RepoRef, number: u64) -> Result<AnalyzedItem, PulseError> {
        self.reviewer()?;
        let mut item = self.github.fetch_issue(repo, number).await?;
        item.comments = self.github.fetch_comments(repo, number).await;
        self.analyze(repo, item, true).await
    }

    /// Full pass: fetch everything with comments, then score and review
    /// each item in order, handing each result to `on_item` as
    /// `(index, total, item)` before moving on.
    ///
    /// # Errors
    ///
    /// The first review failure halts the run and is returned.
    pub async fn review_all<F>(&self, repo: &RepoRef, mut on_item: F) -> Result<Overview, PulseError>
    where
        F: FnMut(usize, usize, &AnalyzedItem),
    {
        self.reviewer()?;
        let outcome = self.fetch(repo, true).await?;
        let total = outcome.items.len();
        let mut tally = SentimentTally::default();

        for (index, item) in outcome.items.into_iter().enumerate() {
            let analyzed = self.analyze(repo, item, true).await?;
            tally.record(analyzed.sentiment);
            on_item(index, total, &analyzed);
        }

        Ok(Overview {
            tally,
            items_fetched: total,
            pages_requested: outcome.pages_requested,
            halted_by: outcome.halted_by,
        })
    }
}
