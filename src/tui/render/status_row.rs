use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::grid::value::format_number;
use crate::tui::app::App;
use crate::util::unicode::display_width;

const NAVIGATE_HINTS: &str = "Enter edit  Space toggle  ^N new  ^D delete  ^Q quit";
const EDIT_HINTS: &str = "Enter save  Esc cancel";
const DROPDOWN_HINTS: &str = "\u{2191}\u{2193} choose  Enter pick  Esc close";

/// Render the status row (bottom of screen): a notice or key hints on the
/// left, totals on the right
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = Vec::new();
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            format!(" {notice}"),
            Style::default().fg(app.theme.red).bg(bg),
        ));
    } else if app.config.ui.show_key_hints {
        let state = app.engine.state();
        let hints = if state.active_dropdown.is_some() {
            DROPDOWN_HINTS
        } else if state.is_editing {
            EDIT_HINTS
        } else {
            NAVIGATE_HINTS
        };
        spans.push(Span::styled(
            format!(" {hints}"),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let (income, expenses) = app.ledger.totals();
    let balance = income - expenses;
    let totals = vec![
        Span::styled("in ", Style::default().fg(app.theme.dim).bg(bg)),
        Span::styled(format_number(income), Style::default().fg(app.theme.green).bg(bg)),
        Span::styled("  out ", Style::default().fg(app.theme.dim).bg(bg)),
        Span::styled(format_number(expenses), Style::default().fg(app.theme.red).bg(bg)),
        Span::styled("  = ", Style::default().fg(app.theme.dim).bg(bg)),
        Span::styled(
            format_number(balance),
            Style::default()
                .fg(if balance < 0.0 {
                    app.theme.red
                } else {
                    app.theme.text_bright
                })
                .bg(bg),
        ),
        Span::styled(" ", Style::default().bg(bg)),
    ];

    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let totals_width: usize = totals.iter().map(|s| display_width(&s.content)).sum();
    if content_width + totals_width < width {
        let padding = width - content_width - totals_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.extend(totals);
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
