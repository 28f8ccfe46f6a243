//! Report sections and the risk gauge.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use lexcheck_types::{
    AnalysisReport, ComplianceScore, RiskAssessment, format_percent, sanitize_terminal_text,
};

use crate::RenderOptions;
use crate::theme::{Glyphs, Palette, glyphs, palette, styles};

const INDENT: &str = "  ";

/// Shown in place of the report when the server returned no known sections.
pub const EMPTY_REPORT_TEXT: &str = "The analysis returned no details.";

fn clean(text: &str) -> String {
    sanitize_terminal_text(text).into_owned()
}

fn non_empty(items: Option<&[String]>) -> Option<&[String]> {
    items.filter(|items| items.iter().any(|item| !item.trim().is_empty()))
}

fn section_gap(lines: &mut Vec<Line<'static>>) {
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
}

fn push_text_block(lines: &mut Vec<Line<'static>>, text: &str, indent: &str, style: Style) {
    for row in clean(text).lines() {
        lines.push(Line::from(vec![
            Span::raw(indent.to_string()),
            Span::styled(row.to_string(), style),
        ]));
    }
}

fn push_bullets(
    lines: &mut Vec<Line<'static>>,
    items: &[String],
    indent: &str,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    for item in items.iter().filter(|item| !item.trim().is_empty()) {
        lines.push(Line::from(vec![
            Span::raw(indent.to_string()),
            Span::styled(format!("{} ", glyphs.bullet), styles::muted(palette)),
            Span::styled(clean(item), styles::body(palette)),
        ]));
    }
}

fn keyword_line(keywords: &[String], palette: &Palette, glyphs: &Glyphs) -> Line<'static> {
    let mut spans = vec![Span::raw(INDENT)];
    for (i, keyword) in keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .enumerate()
    {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("{}{}{}", glyphs.tag_open, clean(keyword.trim()), glyphs.tag_close),
            styles::keyword_tag(palette),
        ));
    }
    Line::from(spans)
}

fn report_lines_with(
    report: &AnalysisReport,
    options: &RenderOptions,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let header = styles::section_header(palette);
    let label = styles::label(palette);
    let body = styles::body(palette);

    if let Some(keywords) = non_empty(report.keywords()) {
        lines.push(Line::styled("Keywords", header));
        lines.push(keyword_line(keywords, palette, glyphs));
    }

    if let Some(summary) = non_empty(report.summary()) {
        section_gap(&mut lines);
        lines.push(Line::styled("Summary", header));
        for sentence in summary.iter().filter(|s| !s.trim().is_empty()) {
            push_text_block(&mut lines, sentence, INDENT, body);
        }
    }

    if let Some(legal) = &report.legal_analysis {
        let mut legal_lines = Vec::new();
        let compliance = legal.compliance.as_ref();

        if let Some(laws) = non_empty(compliance.and_then(|c| c.applicable_laws.as_deref())) {
            legal_lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled("Applicable laws", label),
            ]));
            push_bullets(&mut legal_lines, laws, "    ", palette, glyphs);
        }

        if let Some(raw) = compliance.and_then(|c| c.compliance_score) {
            let score = ComplianceScore::from_raw(raw);
            let band = RiskAssessment {
                compliance: score,
                scored: true,
            }
            .band();
            let level = compliance
                .and_then(|c| c.risk_level.as_deref())
                .filter(|l| !l.trim().is_empty())
                .map_or_else(|| "unknown".to_string(), clean);
            legal_lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled("Compliance score: ", label),
                Span::styled(
                    format_percent(score.percent()),
                    Style::default().fg(palette.band_color(band)),
                ),
            ]));
            legal_lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled("Risk level: ", label),
                Span::styled(level, body),
            ]));
        }

        if let Some(raw) = legal.privacy_score {
            legal_lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled("Privacy score: ", label),
                Span::styled(format_percent(ComplianceScore::from_raw(raw).percent()), body),
            ]));
        }

        if let Some(flags) = &legal.risk_assessment
            && flags.is_high_risk == Some(true)
        {
            let text = match flags.threshold {
                Some(threshold) => format!(
                    "{} Flagged as high risk (threshold {})",
                    glyphs.error,
                    format_percent(ComplianceScore::from_raw(threshold).percent())
                ),
                None => format!("{} Flagged as high risk", glyphs.error),
            };
            legal_lines.push(Line::from(vec![
                Span::raw(INDENT),
                Span::styled(text, Style::default().fg(palette.red)),
            ]));
        }

        if !legal_lines.is_empty() {
            section_gap(&mut lines);
            lines.push(Line::styled("Legal analysis", header));
            lines.extend(legal_lines);
        }
    }

    if let Some(recommendations) = report.recommendations() {
        let general = recommendations
            .general_assessment
            .as_deref()
            .filter(|g| !g.trim().is_empty());
        let specific = non_empty(recommendations.specific_recommendations.as_deref());
        if general.is_some() || specific.is_some() {
            section_gap(&mut lines);
            lines.push(Line::styled("Recommendations", header));
            if let Some(general) = general {
                push_text_block(&mut lines, general, INDENT, body);
            }
            if let Some(specific) = specific {
                push_bullets(&mut lines, specific, INDENT, palette, glyphs);
            }
        }
    }

    if options.show_context
        && let Some(context) = report.related_context().filter(|c| !c.trim().is_empty())
    {
        section_gap(&mut lines);
        lines.push(Line::styled("Related context", header));
        push_text_block(&mut lines, context, INDENT, styles::muted(palette));
    }

    lines
}

/// Styled report sections. Sections without data are left out.
#[must_use]
pub fn report_lines(report: &AnalysisReport, options: &RenderOptions) -> Vec<Line<'static>> {
    report_lines_with(report, options, &palette(options.ui), &glyphs(options.ui))
}

/// The displayed risk, or `None` when the report carries no legal analysis.
#[must_use]
pub fn displayed_risk(report: Option<&AnalysisReport>) -> Option<RiskAssessment> {
    report
        .filter(|r| r.legal_analysis.is_some())
        .map(RiskAssessment::from_report)
}

#[must_use]
pub fn risk_label(risk: Option<&RiskAssessment>) -> String {
    match risk {
        Some(risk) => format!("Risk score: {}", format_percent(risk.risk_percent())),
        None => "Risk score: -".to_string(),
    }
}

/// One-row gauge: label followed by a bar filled to the risk ratio.
#[derive(Debug, Clone, Copy)]
pub struct RiskGauge {
    risk: Option<RiskAssessment>,
    palette: Palette,
    glyphs: Glyphs,
}

impl RiskGauge {
    #[must_use]
    pub fn new(report: Option<&AnalysisReport>, options: &RenderOptions) -> Self {
        Self {
            risk: displayed_risk(report),
            palette: palette(options.ui),
            glyphs: glyphs(options.ui),
        }
    }

    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.risk.map_or(0.0, |r| r.risk_ratio())
    }

    #[must_use]
    pub fn label(&self) -> String {
        risk_label(self.risk.as_ref())
    }
}

fn filled_cells(width: u16, ratio: f64) -> u16 {
    (f64::from(width) * ratio.clamp(0.0, 1.0)).round() as u16
}

impl Widget for RiskGauge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let label = self.label();
        let label_style = styles::label(&self.palette);
        buf.set_stringn(area.x, area.y, &label, usize::from(area.width), label_style);

        let label_width = u16::try_from(label.width()).unwrap_or(u16::MAX);
        let bar_x = area.x.saturating_add(label_width).saturating_add(1);
        if bar_x >= area.right() {
            return;
        }
        let bar_width = area.right() - bar_x;
        let filled = filled_cells(bar_width, self.ratio());
        let fill_style = Style::default().fg(
            self.risk
                .map_or(self.palette.text_muted, |r| self.palette.band_color(r.band())),
        );
        let empty_style = styles::muted(&self.palette);

        for offset in 0..bar_width {
            let (symbol, style) = if offset < filled {
                (self.glyphs.gauge_filled, fill_style)
            } else {
                (self.glyphs.gauge_empty, empty_style)
            };
            if let Some(cell) = buf.cell_mut((bar_x + offset, area.y)) {
                cell.set_symbol(symbol).set_style(style);
            }
        }
    }
}

/// The report as plain text for pipes and non-terminal output.
#[must_use]
pub fn plain_report(report: &AnalysisReport, options: &RenderOptions) -> String {
    let mut glyph_set = glyphs(options.ui);
    glyph_set.tag_open = "[";
    glyph_set.tag_close = "]";
    let lines = report_lines_with(report, options, &palette(options.ui), &glyph_set);

    let mut out = String::new();
    if let Some(risk) = displayed_risk(Some(report)) {
        out.push_str(&risk_label(Some(&risk)));
        out.push_str(&format!(" ({} risk)\n\n", risk.band().label()));
    }
    if lines.is_empty() {
        out.push_str(EMPTY_REPORT_TEXT);
        out.push('\n');
    }
    for line in &lines {
        for span in &line.spans {
            out.push_str(&span.content);
        }
        out.push('\n');
    }
    out
}
