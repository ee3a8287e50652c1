use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::grid::dropdown::{MAX_VISIBLE_OPTIONS, visible_window};
use crate::grid::layout::place_overlay;
use crate::tui::app::{App, OverlayGeom};
use crate::util::unicode::{display_width, fit_to_width};

/// Render the open dropdown's option list floating against its cell
pub fn render_dropdown(frame: &mut Frame, app: &mut App, viewport: Rect) {
    app.overlay = None;
    let Some(active) = app.engine.state().active_dropdown else {
        app.hover = None;
        return;
    };
    let Some(control) = app.engine.active_dropdown() else {
        return;
    };
    // Trigger scrolled out of view: nothing to anchor to
    let Some(trigger) = app.layout.as_ref().and_then(|l| l.slot_rect(active)) else {
        return;
    };

    let bg = app.theme.background;
    let options = control.options();
    let highlighted = app.engine.state().highlighted_option;

    // Room for the border, the marker column and the label
    let widest = options
        .iter()
        .map(|o| display_width(&o.label))
        .max()
        .unwrap_or(0)
        .max(display_width(EMPTY_LIST));
    let popup_w = ((widest + 5) as u16).max(trigger.width);
    let rows = options.len().clamp(1, MAX_VISIBLE_OPTIONS) as u16;
    let popup_area = place_overlay(trigger, viewport, popup_w, rows + 2);
    let inner_rows = popup_area.height.saturating_sub(2) as usize;
    let label_w = (popup_area.width as usize).saturating_sub(5);

    let window = visible_window(highlighted, options.len(), inner_rows);
    let mut lines: Vec<Line> = Vec::with_capacity(window.len().max(1));
    if options.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("   {}", EMPTY_LIST),
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }
    for index in window.clone() {
        let option = &options[index];
        let is_highlighted = highlighted == Some(index);
        let is_hovered = app.hover == Some(index);

        let mut style = if is_highlighted {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else if is_hovered {
            Style::default().fg(app.theme.text_bright).bg(app.theme.hover_bg)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        if option.disabled {
            style = style.fg(app.theme.dim).add_modifier(Modifier::CROSSED_OUT);
        }

        let prefix = if is_highlighted { " \u{25B8} " } else { "   " };
        let swatch_style = match option.color_hint.as_deref().and_then(|h| app.theme.hint_color(h)) {
            Some(color) if !option.disabled => style.fg(color),
            _ => style,
        };
        let label = fit_to_width(&option.label, label_w, false);
        lines.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(label, swatch_style),
        ]));
    }

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines).block(block).style(Style::default().bg(bg));
    frame.render_widget(paragraph, popup_area);

    app.overlay = Some(OverlayGeom {
        rect: popup_area,
        first: window.start,
        shown: window.len(),
    });
}

const EMPTY_LIST: &str = "(no options)";
