//! Terminal rendering for lexcheck using ratatui.
//!
//! [`draw_inline`] paints the live viewport for a [`Session`](lexcheck_engine::Session),
//! [`ReportOutput`] moves the finished report into scrollback, and
//! [`plain_report`] produces the same content as unstyled text.

mod inline;
mod report;
mod theme;

pub use inline::{INLINE_VIEWPORT_HEIGHT, ReportOutput, draw_inline, wrapped_line_count};
pub use report::{
    EMPTY_REPORT_TEXT, RiskGauge, displayed_risk, plain_report, report_lines, risk_label,
};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use lexcheck_types::UiOptions;

/// What to render and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub ui: UiOptions,
    /// Include the retrieved related-context passage.
    pub show_context: bool,
}
