//! Inline TUI mode: a small live viewport below the shell prompt.
//!
//! While the request runs the viewport shows the banner, a spinner and the
//! risk gauge. Once the report arrives it is inserted above the viewport so it
//! stays in the terminal's scrollback after exit.

use ratatui::prelude::{Backend, Terminal};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Widget, Wrap},
};

use lexcheck_engine::session::{BannerKind, Phase, Session};

use crate::RenderOptions;
use crate::report::{EMPTY_REPORT_TEXT, RiskGauge, report_lines};
use crate::theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

/// Banner, status and gauge rows.
pub const INLINE_VIEWPORT_HEIGHT: u16 = 3;

/// Writes the finished report into scrollback exactly once.
#[derive(Debug, Default)]
pub struct ReportOutput {
    flushed: bool,
}

impl ReportOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    pub fn flush<B>(
        &mut self,
        terminal: &mut Terminal<B>,
        session: &Session,
        options: &RenderOptions,
    ) -> Result<(), B::Error>
    where
        B: Backend,
    {
        if self.flushed {
            return Ok(());
        }
        let Some(report) = session.report() else {
            return Ok(());
        };
        self.flushed = true;

        let mut lines = report_lines(report, options);
        if lines.is_empty() {
            lines.push(Line::styled(
                EMPTY_REPORT_TEXT,
                styles::muted(&palette(options.ui)),
            ));
        }
        lines.push(Line::from(""));

        let width = terminal.size()?.width.max(1);
        let height = wrapped_line_count(&lines, width);
        tracing::debug!(rows = height, "Writing report to scrollback");

        terminal.insert_before(height, |buf| {
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .render(buf.area, buf);
        })?;
        Ok(())
    }
}

pub fn draw_inline(frame: &mut Frame, session: &Session, options: &RenderOptions) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let top_padding = area.height.saturating_sub(INLINE_VIEWPORT_HEIGHT);
    let content_area = Rect {
        x: area.x,
        y: area.y.saturating_add(top_padding),
        width: area.width,
        height: area.height.saturating_sub(top_padding),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(content_area);

    let palette = palette(options.ui);
    let glyphs = glyphs(options.ui);

    if let Some(line) = banner_line(session, &palette, &glyphs) {
        frame.render_widget(Paragraph::new(line), chunks[0]);
    }
    frame.render_widget(
        Paragraph::new(status_line(session, options, &palette, &glyphs)),
        chunks[1],
    );
    frame.render_widget(RiskGauge::new(session.report(), options), chunks[2]);
}

fn banner_line(session: &Session, palette: &Palette, glyphs: &Glyphs) -> Option<Line<'static>> {
    let banner = session.banner()?;
    let (icon, color) = match banner.kind {
        BannerKind::Info => (glyphs.info, palette.info),
        BannerKind::Success => (glyphs.success, palette.green),
        BannerKind::Error => (glyphs.error, palette.red),
    };
    let style = Style::default().fg(color);
    Some(Line::from(vec![
        Span::styled(format!("{icon} "), style.add_modifier(Modifier::BOLD)),
        Span::styled(banner.text.clone(), style),
    ]))
}

fn status_line(
    session: &Session,
    options: &RenderOptions,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Line<'static> {
    match session.phase() {
        Phase::Idle => Line::styled("Ready", styles::muted(palette)),
        Phase::Analyzing {
            attempt,
            max_attempts,
            ..
        } => {
            let mut spans = vec![
                Span::styled(
                    format!("{} ", spinner_frame(session.tick_count(), options.ui)),
                    Style::default().fg(palette.accent),
                ),
                Span::styled("Analyzing...", styles::label(palette)),
            ];
            if *attempt > 1 {
                spans.push(Span::styled(
                    format!(" (attempt {attempt}/{max_attempts})"),
                    styles::muted(palette),
                ));
            }
            Line::from(spans)
        }
        Phase::Done(_) => Line::from(vec![
            Span::styled(format!("{} ", glyphs.success), Style::default().fg(palette.green)),
            Span::styled("Report ready", styles::label(palette)),
        ]),
        Phase::Failed { .. } => Line::from(vec![
            Span::styled(format!("{} ", glyphs.error), Style::default().fg(palette.red)),
            Span::styled("No report", styles::label(palette)),
        ]),
    }
}

/// Rows `lines` occupy once word-wrapped at `width` columns, measured by the
/// same wrapping `Paragraph` uses when rendering.
#[must_use]
pub fn wrapped_line_count(lines: &[Line], width: u16) -> u16 {
    if lines.is_empty() {
        return 0;
    }

    let rows = Paragraph::new(lines.to_vec())
        .wrap(Wrap { trim: false })
        .line_count(width.max(1));
    u16::try_from(rows).unwrap_or(u16::MAX)
}
