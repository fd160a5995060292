use std::fmt::Write;

use console::{measure_text_width, pad_str, Alignment};
use pulse_core::{AnalyzedItem, ReplyStatus};

use crate::theme::Theme;

/// Line printed after every comment body.
pub const COMMENT_DELIMITER: &str = "----------------------------------------";

/// Render the per-item detail block: a field/value table, the AI review,
/// then each comment followed by [`COMMENT_DELIMITER`].
///
/// # Examples
///
/// ```
/// use pulse_core::{AnalyzedItem, Item, ReplyStatus, Sentiment};
/// use pulse_report::{render_detail, Theme};
///
/// let item: Item = serde_json::from_value(serde_json::json!({
///     "number": 1,
///     "title": "Great work!",
///     "user": { "login": "octocat" },
///     "created_at": "2024-01-01T00:00:00Z",
///     "html_url": "https://github.com/o/r/issues/1"
/// })).unwrap();
/// let analyzed = AnalyzedItem {
///     item,
///     polarity: 0.8,
///     sentiment: Sentiment::Happy,
///     review: Some("Nice.".into()),
///     reply: ReplyStatus::NotRequested,
/// };
/// let text = render_detail(&analyzed, Theme::new(false));
/// assert!(text.contains("| Sentiment  | happy"));
/// ```
pub fn render_detail(analyzed: &AnalyzedItem, theme: Theme) -> String {
    let item = &analyzed.item;
    let created = item.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let rows = [
        ("Type", theme.kind().apply_to(item.kind()).to_string()),
        ("Title", theme.title().apply_to(&item.title).to_string()),
        (
            "Sentiment",
            theme
                .sentiment(analyzed.sentiment)
                .apply_to(analyzed.sentiment)
                .to_string(),
        ),
        ("User", item.author().to_string()),
        ("Created At", created),
        ("URL", item.html_url.clone()),
    ];

    let mut out = String::new();
    write_table(&mut out, ("Field", "Value"), &rows);

    if let Some(review) = &analyzed.review {
        let _ = writeln!(out, "\n{}", theme.heading().apply_to("AI Review:"));
        let _ = writeln!(out, "{}", review.trim_end());
    }

    let _ = writeln!(out, "\n{}", theme.heading().apply_to("Comments:"));
    if item.comments.is_empty() {
        let _ = writeln!(out, "(no comments)");
    }
    for comment in &item.comments {
        let _ = writeln!(out, "{}", comment.trim_end());
        let _ = writeln!(out, "{COMMENT_DELIMITER}");
    }

    match &analyzed.reply {
        ReplyStatus::NotRequested => {}
        ReplyStatus::Posted => {
            let msg = format!("Reply posted to #{}.", item.number);
            let _ = writeln!(out, "\n{}", theme.success().apply_to(msg));
        }
        ReplyStatus::Failed(reason) => {
            let msg = format!("Failed to post reply to #{}: {reason}", item.number);
            let _ = writeln!(out, "\n{}", theme.failure().apply_to(msg));
        }
    }

    out
}

fn write_table(out: &mut String, header: (&str, &str), rows: &[(&str, String)]) {
    let key_width = rows
        .iter()
        .map(|(k, _)| measure_text_width(k))
        .chain(std::iter::once(measure_text_width(header.0)))
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, v)| measure_text_width(v))
        .chain(std::iter::once(measure_text_width(header.1)))
        .max()
        .unwrap_or(0);

    let border = format!("+-{}-+-{}-+", "-".repeat(key_width), "-".repeat(value_width));
    let line = |out: &mut String, key: &str, value: &str| {
        let _ = writeln!(
            out,
            "| {} | {} |",
            pad_str(key, key_width, Alignment::Left, None),
            pad_str(value, value_width, Alignment::Left, None)
        );
    };

    let _ = writeln!(out, "{border}");
    line(out, header.0, header.1);
    let _ = writeln!(out, "{border}");
    for (key, value) in rows {
        line(out, key, value);
    }
    let _ = writeln!(out, "{border}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::{Item, Sentiment};

    fn analyzed(comments: Vec<&str>, reply: ReplyStatus) -> AnalyzedItem {
        let mut item: Item = serde_json::from_value(serde_json::json!({
            "number": 12,
            "title": "Crash on start",
            "body": "It crashes",
            "user": { "login": "octocat" },
            "created_at": "2024-02-03T04:05:06Z",
            "html_url": "https://github.com/o/r/pull/12",
            "pull_request": { "url": "x" }
        }))
        .unwrap();
        item.comments = comments.into_iter().map(String::from).collect();
        AnalyzedItem {
            item,
            polarity: -0.5,
            sentiment: Sentiment::Sad,
            review: Some("Please add a backtrace.\n".into()),
            reply,
        }
    }

    #[test]
    fn table_lists_every_field() {
        let text = render_detail(&analyzed(vec![], ReplyStatus::NotRequested), Theme::new(false));
        assert!(text.contains("| Type       | PR"));
        assert!(text.contains("| Title      | Crash on start"));
        assert!(text.contains("| Sentiment  | sad"));
        assert!(text.contains("| User       | octocat"));
        assert!(text.contains("| Created At | 2024-02-03 04:05:06 UTC"));
        assert!(text.contains("| URL        | https://github.com/o/r/pull/12"));
    }

    #[test]
    fn table_rows_share_one_width() {
        let text = render_detail(&analyzed(vec![], ReplyStatus::NotRequested), Theme::new(true));
        let widths: Vec<usize> = text
            .lines()
            .take_while(|l| !l.is_empty())
            .map(measure_text_width)
            .collect();
        assert_eq!(widths.len(), 10);
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn review_precedes_delimited_comments() {
        let text = render_detail(
            &analyzed(vec!["first", "second"], ReplyStatus::NotRequested),
            Theme::new(false),
        );
        let review = text.find("AI Review:\nPlease add a backtrace.").unwrap();
        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        assert!(review < first && first < second);
        assert_eq!(text.matches(COMMENT_DELIMITER).count(), 2);
    }

    #[test]
    fn empty_comment_list_is_noted() {
        let text = render_detail(&analyzed(vec![], ReplyStatus::NotRequested), Theme::new(false));
        assert!(text.contains("(no comments)"));
        assert!(!text.contains(COMMENT_DELIMITER));
    }

    #[test]
    fn reply_status_is_reported() {
        let posted = render_detail(&analyzed(vec![], ReplyStatus::Posted), Theme::new(false));
        assert!(posted.contains("Reply posted to #12."));

        let failed = render_detail(
            &analyzed(vec![], ReplyStatus::Failed("403".into())),
            Theme::new(false),
        );
        assert!(failed.contains("Failed to post reply to #12: 403"));
    }
}
