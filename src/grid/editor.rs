use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use super::GridError;
use super::coord::CellCoord;
use super::registry::{CellKind, CellRegistry};
use super::state::{EditMode, InteractionState};
use super::value::CellValue;
use crate::util::unicode;

/// Single-line inline editor attached to one cell
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    coord: CellCoord,
    kind: CellKind,
    original: String,
    buffer: String,
    /// Byte offset of the caret, always on a grapheme boundary
    cursor: usize,
    /// Whole buffer selected: the next insertion replaces it
    select_all: bool,
    mode: EditMode,
}

impl EditSession {
    /// Open an editor on `text`. Overwrite selects everything; Append leaves
    /// the caret after the last character.
    pub fn open(coord: CellCoord, kind: CellKind, original: String, text: String, mode: EditMode) -> Self {
        let mut session = EditSession {
            coord,
            kind,
            original,
            cursor: text.len(),
            buffer: text,
            select_all: false,
            mode,
        };
        session.set_mode(mode);
        session
    }

    pub fn coord(&self) -> CellCoord {
        self.coord
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_all_selected(&self) -> bool {
        self.select_all && !self.buffer.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer != self.original
    }

    /// Terminal cells between the start of the buffer and the caret
    pub fn cursor_width(&self) -> usize {
        unicode::display_width(&self.buffer[..self.cursor])
    }

    /// Re-apply the caret rule for a (possibly new) entry mode
    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        self.cursor = self.buffer.len();
        self.select_all = mode == EditMode::Overwrite;
    }

    fn take_selection(&mut self) -> bool {
        if self.select_all {
            self.select_all = false;
            self.buffer.clear();
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.take_selection();
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert pasted text; line breaks become spaces
    pub fn insert_str(&mut self, text: &str) {
        let clean = text.replace('\n', " ").replace('\r', "");
        self.take_selection();
        self.buffer.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    pub fn backspace(&mut self) {
        if self.take_selection() {
            return;
        }
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.buffer.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.take_selection() {
            return;
        }
        if let Some(next) = unicode::next_grapheme_boundary(&self.buffer, self.cursor) {
            self.buffer.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if self.select_all {
            self.select_all = false;
            self.cursor = 0;
            return;
        }
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if self.select_all {
            self.select_all = false;
            self.cursor = self.buffer.len();
            return;
        }
        if let Some(next) = unicode::next_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn word_left(&mut self) {
        self.select_all = false;
        self.cursor = unicode::word_boundary_left(&self.buffer, self.cursor);
    }

    pub fn word_right(&mut self) {
        self.select_all = false;
        self.cursor = unicode::word_boundary_right(&self.buffer, self.cursor);
    }

    /// Place the caret at a display column (mouse click inside the editor)
    pub fn set_cursor_col(&mut self, col: usize) {
        self.select_all = false;
        self.cursor = unicode::display_col_to_byte_offset(&self.buffer, col);
    }

    pub fn home(&mut self) {
        self.select_all = false;
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.select_all = false;
        self.cursor = self.buffer.len();
    }

    pub fn kill_to_start(&mut self) {
        if self.take_selection() {
            return;
        }
        self.buffer.drain(..self.cursor);
        self.cursor = 0;
    }

    /// Apply an editing key. Returns false for keys the editor does not use.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match (key.modifiers, key.code) {
            (m, KeyCode::Char('a')) if m.contains(KeyModifiers::CONTROL) => self.home(),
            (m, KeyCode::Char('e')) if m.contains(KeyModifiers::CONTROL) => self.end(),
            (m, KeyCode::Char('u')) if m.contains(KeyModifiers::CONTROL) => self.kill_to_start(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => self.insert_char(c),
            (m, KeyCode::Left) if m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.word_left()
            }
            (m, KeyCode::Right) if m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.word_right()
            }
            (_, KeyCode::Backspace) => self.backspace(),
            (_, KeyCode::Delete) => self.delete(),
            (_, KeyCode::Left) => self.move_left(),
            (_, KeyCode::Right) => self.move_right(),
            (_, KeyCode::Home) => self.home(),
            (_, KeyCode::End) => self.end(),
            // Single line: vertical arrows stay inside the field and do nothing
            (_, KeyCode::Up | KeyCode::Down) => {}
            _ => return false,
        }
        true
    }

    /// The value to commit, parsed according to the cell kind
    pub fn value(&self) -> Result<CellValue, GridError> {
        match self.kind {
            CellKind::Number => parse_number(&self.buffer).map(CellValue::Number),
            _ => Ok(CellValue::Text(self.buffer.clone())),
        }
    }
}

/// Parse a user-typed number. Accepts a decimal comma when no dot is present,
/// spaces and underscores as digit separators; empty means zero.
pub fn parse_number(input: &str) -> Result<f64, GridError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let mut cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '_'))
        .collect();
    if !cleaned.contains('.') {
        cleaned = cleaned.replace(',', ".");
    } else {
        cleaned = cleaned.replace(',', "");
    }
    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(GridError::InvalidNumber(trimmed.to_string())),
    }
}

/// Holds the inline editor and keeps it in step with the store
#[derive(Debug, Default)]
pub struct Editor {
    session: Option<EditSession>,
}

impl Editor {
    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    pub fn take(&mut self) -> Option<EditSession> {
        self.session.take()
    }

    /// Put back a session taken for a commit that was refused
    pub fn restore(&mut self, session: EditSession) {
        self.session = Some(session);
    }

    /// Bring the editor in line with the state after a transition. Runs once
    /// the new state is in place and never dispatches. Returns the session it
    /// had to detach (focus moved away or editing stopped) so the caller can
    /// decide what to do with the typed value.
    pub fn reconcile(
        &mut self,
        state: &InteractionState,
        registry: &CellRegistry,
        seed: Option<String>,
    ) -> Option<EditSession> {
        let target = match (state.is_editing, state.focused_cell) {
            (true, Some(cell)) => cell,
            _ => return self.session.take(),
        };

        if let Some(session) = &mut self.session
            && session.coord == target
        {
            if session.mode != state.edit_mode {
                session.set_mode(state.edit_mode);
            }
            return None;
        }

        let displaced = self.session.take();
        match registry.resolve(target) {
            Some(control) if control.kind().is_editable() => {
                let original = control.text();
                let text = seed.unwrap_or_else(|| original.clone());
                debug!(cell = %target, mode = ?state.edit_mode, "editor mounted");
                self.session = Some(EditSession::open(
                    target,
                    control.kind(),
                    original,
                    text,
                    state.edit_mode,
                ));
            }
            _ => debug!(cell = %target, "no editable control to mount an editor on"),
        }
        displaced
    }
}
