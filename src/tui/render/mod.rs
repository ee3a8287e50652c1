pub mod dropdown_overlay;
pub mod grid_view;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::App;

/// Main render function: grid, then the floating option list, then the
/// status row. The terminal caret goes to the inline editor, if one is open.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: grid | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // header + rows
            Constraint::Length(1), // status row
        ])
        .split(area);

    grid_view::render_grid(frame, app, chunks[0]);

    // Option list (rendered on top of the grid)
    dropdown_overlay::render_dropdown(frame, app, chunks[0]);

    status_row::render_status_row(frame, app, chunks[1]);

    if let Some((x, y)) = app.caret {
        frame.set_cursor_position((x, y));
    }
}
