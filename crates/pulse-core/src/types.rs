use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A GitHub issue or pull request as returned by the `issues` endpoints.
///
/// The listing endpoint returns both kinds; a pull request is recognised by
/// the presence of the `pull_request` key, whatever its value.
///
/// # Examples
///
/// ```
/// use pulse_core::{Item, ItemKind};
///
/// let item: Item = serde_json::from_str(r#"{
///     "number": 7,
///     "title": "Crash on start",
///     "body": null,
///     "user": { "login": "octocat" },
///     "created_at": "2024-01-02T03:04:05Z",
///     "html_url": "https://github.com/o/r/issues/7"
/// }"#).unwrap();
/// assert_eq!(item.kind(), ItemKind::Issue);
/// assert_eq!(item.body_text(), "");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    /// Issue or PR number within the repository.
    pub number: u64,
    /// Title line.
    pub title: String,
    /// Markdown body; GitHub sends `null` for empty bodies.
    #[serde(default)]
    pub body: Option<String>,
    /// Author account, absent for deleted users.
    #[serde(default)]
    pub user: Option<User>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Browser URL.
    pub html_url: String,
    /// Raw `pull_request` value. `Some` whenever the key was present.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub pull_request: Option<serde_json::Value>,
    /// Comment bodies, attached after the item is fetched.
    #[serde(skip_deserializing, default)]
    pub comments: Vec<String>,
}

/// Maps a present key to `Some` even when its value is `null`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl Item {
    /// Whether this item is an issue or a pull request.
    pub fn kind(&self) -> ItemKind {
        if self.pull_request.is_some() {
            ItemKind::PullRequest
        } else {
            ItemKind::Issue
        }
    }

    /// Body text with `null` treated as empty.
    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }

    /// Author login, `"ghost"` for deleted accounts.
    pub fn author(&self) -> &str {
        self.user.as_ref().map_or("ghost", |u| u.login.as_str())
    }
}

/// A GitHub account reference.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Account login name.
    pub login: String,
}

/// Type tag distinguishing issues from pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A plain issue.
    Issue,
    /// A pull request.
    PullRequest,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Issue => write!(f, "Issue"),
            ItemKind::PullRequest => write!(f, "PR"),
        }
    }
}

/// Sentiment label derived from a polarity score.
///
/// # Examples
///
/// ```
/// use pulse_core::Sentiment;
///
/// assert_eq!(Sentiment::from_polarity(0.5), Sentiment::Happy);
/// assert_eq!(Sentiment::from_polarity(0.1), Sentiment::Neutral);
/// assert_eq!(Sentiment::from_polarity(-0.3), Sentiment::Sad);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    /// Polarity above the positive threshold.
    Happy,
    /// Polarity below the negative threshold.
    Sad,
    /// Everything in between, boundaries included.
    Neutral,
}

impl Sentiment {
    /// Labels in chart order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Happy, Sentiment::Sad, Sentiment::Neutral];

    /// Polarity must exceed this to count as happy.
    pub const HAPPY_THRESHOLD: f64 = 0.1;

    /// Polarity must fall below this to count as sad.
    pub const SAD_THRESHOLD: f64 = -0.1;

    /// Bucket a polarity score. Both thresholds are exclusive; NaN is neutral.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > Self::HAPPY_THRESHOLD {
            Sentiment::Happy
        } else if polarity < Self::SAD_THRESHOLD {
            Sentiment::Sad
        } else {
            Sentiment::Neutral
        }
    }

    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Happy => "happy",
            Sentiment::Sad => "sad",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-label counts across a run.
///
/// # Examples
///
/// ```
/// use pulse_core::{Sentiment, SentimentTally};
///
/// let tally: SentimentTally = [Sentiment::Happy, Sentiment::Happy, Sentiment::Sad]
///     .into_iter()
///     .collect();
/// assert_eq!(tally.count(Sentiment::Happy), 2);
/// assert_eq!(tally.total(), 3);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentTally {
    /// Items labelled happy.
    pub happy: usize,
    /// Items labelled sad.
    pub sad: usize,
    /// Items labelled neutral.
    pub neutral: usize,
}

impl SentimentTally {
    /// Count one more item with the given label.
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Happy => self.happy += 1,
            Sentiment::Sad => self.sad += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    /// Number of items with the given label.
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Happy => self.happy,
            Sentiment::Sad => self.sad,
            Sentiment::Neutral => self.neutral,
        }
    }

    /// Total number of items recorded.
    pub fn total(&self) -> usize {
        self.happy + self.sad + self.neutral
    }
}

impl FromIterator<Sentiment> for SentimentTally {
    fn from_iter<I: IntoIterator<Item = Sentiment>>(iter: I) -> Self {
        let mut tally = Self::default();
        for sentiment in iter {
            tally.record(sentiment);
        }
        tally
    }
}

/// Outcome of posting a generated review back to GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyStatus {
    /// Posting was not requested.
    NotRequested,
    /// The reply comment was created.
    Posted,
    /// The API rejected the reply; the message explains why.
    Failed(String),
}

/// An item after scoring and, in review modes, AI review.
#[derive(Debug, Clone)]
pub struct AnalyzedItem {
    /// The fetched item, with comments when they were requested.
    pub item: Item,
    /// Raw polarity score in `[-1, 1]`.
    pub polarity: f64,
    /// Bucketed label.
    pub sentiment: Sentiment,
    /// Model reply, when a review was requested.
    pub review: Option<String>,
    /// Whether the review was posted back.
    pub reply: ReplyStatus,
}
