use std::fmt::Write;

use console::{measure_text_width, pad_str, Alignment, Term};
use pulse_core::{PulseError, Sentiment, SentimentTally};

use crate::theme::Theme;

/// One wedge of the pie, in degrees counter-clockwise from the positive x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    /// Label this wedge counts.
    pub sentiment: Sentiment,
    /// Items with this label.
    pub count: usize,
    /// Share of all items, `0.0..=1.0`.
    pub fraction: f64,
    /// Angle where the wedge begins.
    pub start_deg: f64,
    /// Angular size of the wedge.
    pub sweep_deg: f64,
}

impl Slice {
    /// Percentage label, one decimal place.
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }

    fn contains(&self, angle_deg: f64) -> bool {
        if self.sweep_deg <= 0.0 {
            return false;
        }
        let offset = (angle_deg - self.start_deg).rem_euclid(360.0);
        offset < self.sweep_deg
    }
}

#[derive(Clone, Copy)]
enum Cell {
    Blank,
    Wedge(usize),
    Text(char),
}

/// Sentiment pie chart rendered as a terminal raster.
///
/// Always three wedges in the order happy, sad, neutral, laid out
/// counter-clockwise from [`PieChart::START_ANGLE`].
///
/// # Examples
///
/// ```
/// use pulse_core::SentimentTally;
/// use pulse_report::PieChart;
///
/// let chart = PieChart::new(SentimentTally { happy: 1, sad: 1, neutral: 2 });
/// assert_eq!(chart.slices().len(), 3);
/// assert_eq!(chart.slices()[2].percent_label(), "50.0%");
/// ```
#[derive(Debug, Clone)]
pub struct PieChart {
    slices: [Slice; 3],
    total: usize,
}

impl PieChart {
    /// Chart heading.
    pub const TITLE: &'static str = "Sentiment Analysis of GitHub Issues and PRs";

    /// Angle of the first wedge's leading edge.
    pub const START_ANGLE: f64 = 140.0;

    /// Default radius in terminal rows.
    pub const DEFAULT_RADIUS: usize = 10;

    /// Lay out the wedges for a tally.
    pub fn new(tally: SentimentTally) -> Self {
        let total = tally.total();
        let mut start = Self::START_ANGLE;
        let slices = Sentiment::ALL.map(|sentiment| {
            let count = tally.count(sentiment);
            let fraction = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            };
            let slice = Slice {
                sentiment,
                count,
                fraction,
                start_deg: start,
                sweep_deg: fraction * 360.0,
            };
            start = (start + slice.sweep_deg).rem_euclid(360.0);
            slice
        });
        Self { slices, total }
    }

    /// The three wedges.
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    fn wedge_at(&self, angle_deg: f64) -> Option<usize> {
        self.slices.iter().position(|s| s.contains(angle_deg))
    }

    fn glyph(index: usize, theme: Theme) -> char {
        if theme.color() {
            '█'
        } else {
            ['+', '-', '.'][index]
        }
    }

    /// Render title, disc and legend. Terminal cells are about twice as
    /// tall as wide, so each row spans two columns per unit of radius to
    /// keep the disc round.
    pub fn render(&self, radius: usize, theme: Theme) -> String {
        let radius = radius.max(2);
        let width = 4 * radius + 1;
        let mut out = String::new();

        let title = theme.heading().apply_to(Self::TITLE).to_string();
        let title_width = width.max(measure_text_width(Self::TITLE));
        let _ = writeln!(out, "{}", pad_str(&title, title_width, Alignment::Center, None).trim_end());
        let _ = writeln!(out);

        if self.total == 0 {
            let _ = writeln!(out, "No issues or pull requests to chart.");
            return out;
        }

        for row in self.raster(radius) {
            let mut line = String::new();
            for cell in row {
                match cell {
                    Cell::Blank => line.push(' '),
                    Cell::Wedge(i) => {
                        let glyph = Self::glyph(i, theme).to_string();
                        let styled = theme.sentiment(self.slices[i].sentiment).apply_to(glyph);
                        let _ = write!(line, "{styled}");
                    }
                    Cell::Text(c) => {
                        let _ = write!(line, "{}", theme.heading().apply_to(c));
                    }
                }
            }
            let _ = writeln!(out, "{}", line.trim_end());
        }

        let _ = writeln!(out);
        for (i, slice) in self.slices.iter().enumerate() {
            let swatch = theme
                .sentiment(slice.sentiment)
                .apply_to(format!("{0}{0}", Self::glyph(i, theme)));
            let _ = writeln!(
                out,
                "  {swatch} {:<8} {:>6}  {:>6}",
                slice.sentiment.as_str(),
                slice.count,
                slice.percent_label()
            );
        }
        out
    }

    fn raster(&self, radius: usize) -> Vec<Vec<Cell>> {
        let r = radius as f64;
        let center_col = 2 * radius;
        let limit = (r + 0.5) * (r + 0.5);

        let mut grid: Vec<Vec<Cell>> = (0..=2 * radius)
            .map(|row| {
                let dy = r - row as f64;
                (0..=4 * radius)
                    .map(|col| {
                        let dx = (col as f64 - center_col as f64) / 2.0;
                        if dx * dx + dy * dy > limit {
                            return Cell::Blank;
                        }
                        let angle = dy.atan2(dx).to_degrees().rem_euclid(360.0);
                        self.wedge_at(angle).map_or(Cell::Blank, Cell::Wedge)
                    })
                    .collect()
            })
            .collect();

        for slice in self.slices.iter().filter(|s| s.count > 0) {
            let mid = (slice.start_deg + slice.sweep_deg / 2.0).to_radians();
            let label = slice.percent_label();
            let row = (r - 0.6 * r * mid.sin()).round() as usize;
            let center = center_col as f64 + 2.0 * 0.6 * r * mid.cos();
            let first = (center - label.len() as f64 / 2.0).round().max(0.0) as usize;
            for (offset, c) in label.chars().enumerate() {
                if let Some(cell) = grid.get_mut(row).and_then(|cells| cells.get_mut(first + offset)) {
                    *cell = Cell::Text(c);
                }
            }
        }
        grid
    }
}

/// Print the chart and, on an interactive terminal, wait for a key press
/// before returning.
///
/// # Errors
///
/// Returns [`PulseError::Io`] if the terminal cannot be written or read.
pub fn show_chart(chart: &PieChart, theme: Theme) -> Result<(), PulseError> {
    let term = Term::stdout();
    term.write_str(&chart.render(PieChart::DEFAULT_RADIUS, theme))?;
    if term.is_term() {
        term.write_line("")?;
        term.write_line("Press any key to close the chart.")?;
        term.read_key()?;
    }
    Ok(())
}
