//! Console presentation: per-item detail tables and the sentiment pie chart.

mod chart;
mod detail;
mod theme;

pub use chart::{show_chart, PieChart, Slice};
pub use detail::{render_detail, COMMENT_DELIMITER};
pub use theme::Theme;
