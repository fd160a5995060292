use console::Style;
use pulse_core::Sentiment;

/// Color switch shared by every renderer.
///
/// All styles are forced on or off so output does not depend on where it
/// is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Theme {
    /// Theme with colors on or off.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Whether ANSI styling is emitted.
    pub fn color(self) -> bool {
        self.color
    }

    fn base(self) -> Style {
        Style::new().force_styling(self.color)
    }

    /// Item type tag.
    pub fn kind(self) -> Style {
        self.base().cyan()
    }

    /// Item title.
    pub fn title(self) -> Style {
        self.base().yellow()
    }

    /// Section headings and labels.
    pub fn heading(self) -> Style {
        self.base().bold()
    }

    /// Success notices.
    pub fn success(self) -> Style {
        self.base().green()
    }

    /// Failure notices.
    pub fn failure(self) -> Style {
        self.base().red()
    }

    /// Sentiment color: green, red, blue.
    pub fn sentiment(self, sentiment: Sentiment) -> Style {
        match sentiment {
            Sentiment::Happy => self.base().green(),
            Sentiment::Sad => self.base().red(),
            Sentiment::Neutral => self.base().blue(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_theme_emits_plain_text() {
        let theme = Theme::new(false);
        let text = theme.sentiment(Sentiment::Happy).apply_to("happy").to_string();
        assert_eq!(text, "happy");
    }

    #[test]
    fn enabled_theme_emits_escape_codes() {
        let theme = Theme::new(true);
        let text = theme.sentiment(Sentiment::Sad).apply_to("sad").to_string();
        assert!(text.contains("\u{1b}["));
        assert_eq!(console::strip_ansi_codes(&text), "sad");
    }
}
