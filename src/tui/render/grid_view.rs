use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::grid::layout::{GridLayout, scroll_to_show};
use crate::grid::{CellPaint, CellView};
use crate::tui::app::App;
use crate::util::unicode::{display_col_to_byte_offset, display_width, fit_to_width};

/// Where the terminal caret goes, plus the editor's horizontal scroll
struct Caret {
    x: u16,
    y: u16,
    scroll: usize,
}

/// Render the header and the visible rows, and record the frame's geometry
pub fn render_grid(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let rows = app.engine.dims().rows;
    let body = area.height.saturating_sub(1) as usize;

    if let Some(focus) = app.engine.state().focused_cell {
        app.scroll = scroll_to_show(app.scroll, focus.row, body);
    }
    app.scroll = app.scroll.min(rows.saturating_sub(body));

    let layout = GridLayout::compute(area, app.engine.columns(), rows, app.scroll);

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    lines.push(header_line(app, &layout));

    let mut caret = None;
    for row in layout.visible_rows() {
        lines.push(row_line(app, &layout, row, &mut caret));
    }
    if rows == 0 {
        lines.push(Line::from(Span::styled(
            " No movements yet. Ctrl+N adds one.",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
    }

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);

    match caret {
        Some(c) => {
            app.caret = Some((c.x, c.y));
            app.editor_scroll = c.scroll;
        }
        None => {
            app.caret = None;
            app.editor_scroll = 0;
        }
    }
    app.layout = Some(layout);
}

fn header_line(app: &App, layout: &GridLayout) -> Line<'static> {
    let bg = app.theme.background;
    let style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    let mut x = layout.area.x;
    for (geom, spec) in layout.columns.iter().zip(app.engine.columns()) {
        if geom.x > x {
            spans.push(Span::styled(" ".repeat((geom.x - x) as usize), Style::default().bg(bg)));
        }
        spans.push(Span::styled(
            fit_to_width(&spec.title, geom.width as usize, spec.right_aligned()),
            style,
        ));
        x = geom.x + geom.width;
    }
    Line::from(spans)
}

fn row_line(
    app: &App,
    layout: &GridLayout,
    row: usize,
    caret: &mut Option<Caret>,
) -> Line<'static> {
    let bg = app.theme.background;
    let y = layout.area.y + 1 + (row - layout.scroll) as u16;
    let paints = app.engine.paint_row(row);

    let mut spans = Vec::new();
    let mut x = layout.area.x;
    for ((paint, geom), spec) in paints
        .iter()
        .zip(&layout.columns)
        .zip(app.engine.columns())
    {
        if geom.x > x {
            spans.push(Span::styled(" ".repeat((geom.x - x) as usize), Style::default().bg(bg)));
        }
        match &paint.view {
            CellView::Composite(parts) => {
                for (i, (part, &(sx, sw))) in parts.iter().zip(&geom.slots).enumerate() {
                    if i > 0 {
                        let sep_bg = if paint.focused {
                            app.theme.selection_bg
                        } else {
                            bg
                        };
                        spans.push(Span::styled("/", Style::default().fg(app.theme.dim).bg(sep_bg)));
                    }
                    spans.extend(cell_spans(app, part, sx, y, sw, false, caret));
                }
            }
            _ => spans.extend(cell_spans(
                app,
                paint,
                geom.x,
                y,
                geom.width,
                spec.right_aligned(),
                caret,
            )),
        }
        x = geom.x + geom.width;
    }
    Line::from(spans)
}

/// Spans for one cell (or composite slot) exactly `width` cells wide
fn cell_spans(
    app: &App,
    paint: &CellPaint,
    x: u16,
    y: u16,
    width: u16,
    right_align: bool,
    caret: &mut Option<Caret>,
) -> Vec<Span<'static>> {
    let theme = &app.theme;
    let w = width as usize;
    let base = if paint.focused {
        Style::default()
            .fg(theme.text_bright)
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text).bg(theme.background)
    };

    match &paint.view {
        CellView::Display { text } => {
            vec![Span::styled(fit_to_width(text, w, right_align), base)]
        }
        CellView::Editor {
            text,
            cursor_col,
            all_selected,
        } => {
            let scroll = editor_scroll(*cursor_col, w);
            let visible = &text[display_col_to_byte_offset(text, scroll)..];
            *caret = Some(Caret {
                x: x + (cursor_col - scroll) as u16,
                y,
                scroll,
            });
            let editor = Style::default().fg(theme.text_bright).bg(theme.editor_bg);
            if *all_selected {
                let selected = fit_to_width(visible, display_width(visible).min(w), false);
                let rest = w.saturating_sub(display_width(&selected));
                vec![
                    Span::styled(
                        selected,
                        Style::default().fg(theme.background).bg(theme.highlight),
                    ),
                    Span::styled(" ".repeat(rest), editor),
                ]
            } else {
                vec![Span::styled(fit_to_width(visible, w, false), editor)]
            }
        }
        CellView::Dropdown {
            label,
            open,
            color_hint,
        } => {
            let mut style = base;
            if let Some(color) = color_hint.as_deref().and_then(|h| theme.hint_color(h)) {
                style = style.fg(color);
            }
            if w < 2 {
                return vec![Span::styled(fit_to_width(label, w, false), style)];
            }
            let arrow = if *open { "\u{25B4}" } else { "\u{25BE}" };
            let arrow_style = if *open {
                base.fg(theme.highlight)
            } else {
                base.fg(theme.dim)
            };
            vec![
                Span::styled(fit_to_width(label, w - 1, false), style),
                Span::styled(arrow, arrow_style),
            ]
        }
        CellView::Toggle { on, label } => {
            let fg = if *on { theme.green } else { theme.dim };
            vec![Span::styled(centered(label, w), base.fg(fg))]
        }
        CellView::Button { label } => {
            vec![Span::styled(centered(label, w), base.fg(theme.red))]
        }
        CellView::Composite(_) => vec![Span::styled(" ".repeat(w), base)],
    }
}

/// Display columns hidden on the left so the caret stays inside the cell
fn editor_scroll(cursor_col: usize, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    cursor_col.saturating_sub(width - 1)
}

fn centered(label: &str, width: usize) -> String {
    let label_w = display_width(label);
    if label_w >= width {
        return fit_to_width(label, width, false);
    }
    let left = (width - label_w) / 2;
    fit_to_width(&format!("{}{}", " ".repeat(left), label), width, false)
}
