//! Text polarity scoring for issue and pull request text.
//!
//! [`VaderScorer`] takes the compound score of the VADER analyzer. Any other
//! estimator can be plugged in through [`PolarityScorer`]; only the
//! bucketing in [`Sentiment::from_polarity`](pulse_core::Sentiment::from_polarity)
//! is fixed.

use pulse_core::{Item, Sentiment};
use vader_sentiment::SentimentIntensityAnalyzer;

/// Produces a polarity estimate in `[-1, 1]` for free text.
pub trait PolarityScorer {
    /// Polarity of `text`; `0.0` when nothing sentiment-bearing is found.
    fn polarity(&self, text: &str) -> f64;

    /// Polarity together with its bucketed label.
    fn classify(&self, text: &str) -> (f64, Sentiment) {
        let polarity = self.polarity(text);
        (polarity, Sentiment::from_polarity(polarity))
    }
}

/// VADER compound polarity. The analyzer handles negation, intensifiers,
/// capitalization, punctuation emphasis and emoticons.
///
/// # Examples
///
/// ```
/// use pulse_core::Sentiment;
/// use pulse_sentiment::{PolarityScorer, VaderScorer};
///
/// let scorer = VaderScorer;
/// assert_eq!(scorer.classify("Great work!").1, Sentiment::Happy);
/// assert_eq!(scorer.classify("This is not good").1, Sentiment::Sad);
/// assert_eq!(scorer.polarity("Bump version to 1.2.0"), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct VaderScorer;

impl PolarityScorer for VaderScorer {
    fn polarity(&self, text: &str) -> f64 {
        // The analyzer only borrows its built-in lexicons.
        let analyzer = SentimentIntensityAnalyzer::new();
        let compound = analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0);
        compound.clamp(-1.0, 1.0)
    }
}

/// Text scored for an item: the title, a space, then the body
/// (empty when absent).
///
/// # Examples
///
/// ```
/// assert_eq!(pulse_sentiment::item_text("Title", None), "Title ");
/// assert_eq!(pulse_sentiment::item_text("Title", Some("Body")), "Title Body");
/// ```
pub fn item_text(title: &str, body: Option<&str>) -> String {
    format!("{title} {}", body.unwrap_or(""))
}

/// Score an item's title and body.
pub fn score_item<S: PolarityScorer + ?Sized>(scorer: &S, item: &Item) -> (f64, Sentiment) {
    scorer.classify(&item_text(&item.title, item.body.as_deref()))
}
