//! Per-cell edit sessions.
//!
//! ```text
//! Viewing --begin--> Editing --commit--> Committing --> Viewing
//!                        \----cancel--> Cancelling --> Viewing
//! ```
//!
//! Exit rules depend on the [`EditType`]. An `Input` session commits its typed value on any
//! outside interaction. `Select` and `Date` sessions own a popup (option list / day picker): an
//! outside interaction while the popup is shown only closes the popup, and the *next* outside
//! interaction ends the session. This keeps the act of picking an option from closing the cell.

use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::row::Row;
use crate::transition::Phase;
use crate::transition::Transition;
use chrono::Days;
use chrono::NaiveDate;
use std::fmt;
use std::time::Duration;

/// Accepted format for `Date` cells.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditType {
    Input,
    Select,
    Date,
    #[default]
    None,
}

impl EditType {
    fn has_popup(self) -> bool {
        matches!(self, EditType::Select | EditType::Date)
    }

    fn is_textual(self) -> bool {
        matches!(self, EditType::Input | EditType::Date)
    }
}

/// Address of a cell by row key and column key; stable across sorting and filtering.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub index: u64,
    pub key: String,
}

impl CellKey {
    pub fn new(index: u64, key: impl Into<String>) -> Self {
        Self {
            index,
            key: key.into(),
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.key)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditPhase {
    Viewing,
    Editing,
    Committing,
    Cancelling,
}

#[derive(Clone, Debug)]
pub struct EditSession {
    pub cell: CellKey,
    pub edit_type: EditType,
    pub temp_value: String,
    committed_value: String,
    cursor: usize,
    options: Vec<String>,
    highlighted: usize,
    popup: Transition,
    focused: bool,
}

impl EditSession {
    pub fn committed_value(&self) -> &str {
        &self.committed_value
    }

    /// Caret position in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn popup(&self) -> &Transition {
        &self.popup
    }

    pub fn is_popup_open(&self) -> bool {
        self.popup.is_shown()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_dirty(&self) -> bool {
        self.temp_value != self.committed_value
    }

    fn insert_str(&mut self, s: &str) {
        let at = byte_offset(&self.temp_value, self.cursor);
        self.temp_value.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = byte_offset(&self.temp_value, self.cursor - 1);
        self.temp_value.remove(at);
        self.cursor -= 1;
    }

    fn delete(&mut self) {
        if self.cursor >= self.temp_value.chars().count() {
            return;
        }
        let at = byte_offset(&self.temp_value, self.cursor);
        self.temp_value.remove(at);
    }

    fn move_cursor(&mut self, delta: i64) {
        let len = self.temp_value.chars().count() as i64;
        self.cursor = (self.cursor as i64 + delta).clamp(0, len) as usize;
    }

    fn revert(&mut self) {
        self.temp_value = self.committed_value.clone();
        self.cursor = self.temp_value.chars().count();
        if let Some(i) = self.options.iter().position(|o| *o == self.temp_value) {
            self.highlighted = i;
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self.edit_type {
            EditType::Date => NaiveDate::parse_from_str(self.temp_value.trim(), DATE_FORMAT)
                .map(|_| ())
                .map_err(|e| format!("`{}` is not a date ({DATE_FORMAT}): {e}", self.temp_value)),
            EditType::Select if !self.options.is_empty() => {
                if self.options.contains(&self.temp_value) {
                    Ok(())
                } else {
                    Err(format!("`{}` is not one of the options", self.temp_value))
                }
            }
            _ => Ok(()),
        }
    }

    fn step_date(&mut self, days: i64) -> bool {
        let Ok(date) = NaiveDate::parse_from_str(self.temp_value.trim(), DATE_FORMAT) else {
            return false;
        };
        let next = if days >= 0 {
            date.checked_add_days(Days::new(days as u64))
        } else {
            date.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        match next {
            Some(d) => {
                self.temp_value = d.format(DATE_FORMAT).to_string();
                self.cursor = self.temp_value.chars().count();
                true
            }
            None => false,
        }
    }
}

fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// No session, or the machine did not care about the input.
    Ignored,
    Redraw,
    /// An outside interaction only closed the session's popup.
    Swallowed,
    Commit { cell: CellKey, value: String },
    Cancel { cell: CellKey },
    /// Validation failed; the temp value was reverted and the session stays open.
    Rejected { cell: CellKey, message: String },
}

/// What a custom edit renderer's key handler asks the session to do.
#[derive(Clone, Debug, PartialEq)]
pub enum EditCommand {
    SetCellValue(String),
    ExitEditMode,
    /// Replace the whole row. Written by the controller; the session stays open.
    UpdateRow(Row),
}

/// A recovered edit failure, reported to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditNotice {
    pub cell: CellKey,
    pub message: String,
}

/// Caller-supplied channel for edit failures (a toast, a status line...).
pub trait Notifier {
    fn notify(&self, notice: &EditNotice);
}

impl<F: Fn(&EditNotice)> Notifier for F {
    fn notify(&self, notice: &EditNotice) {
        self(notice)
    }
}

/// Default notifier: logs the failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &EditNotice) {
        tracing::warn!(cell = %notice.cell, "edit rejected: {}", notice.message);
    }
}

#[derive(Clone, Debug, Default)]
pub struct EditMachine {
    enabled: bool,
    phase: Option<EditPhase>,
    session: Option<EditSession>,
    focus_pending: bool,
}

impl EditMachine {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling edit mode cancels an open session.
    pub fn set_enabled(&mut self, enabled: bool) -> EditOutcome {
        self.enabled = enabled;
        if !enabled && self.session.is_some() {
            return self.cancel();
        }
        EditOutcome::Ignored
    }

    pub fn phase(&self) -> EditPhase {
        self.phase.unwrap_or(EditPhase::Viewing)
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn is_editing_cell(&self, cell: &CellKey) -> bool {
        self.session.as_ref().is_some_and(|s| &s.cell == cell)
    }

    /// Opens a session on `cell`. Returns `false` when edit mode is off or the column is not
    /// editable. An already open session on another cell must be closed by the caller first.
    pub fn begin(
        &mut self,
        cell: CellKey,
        edit_type: EditType,
        current: String,
        options: Vec<String>,
    ) -> bool {
        if !self.enabled || edit_type == EditType::None || self.session.is_some() {
            return false;
        }
        let highlighted = options.iter().position(|o| *o == current).unwrap_or(0);
        let mut popup = Transition::default();
        if edit_type.has_popup() {
            popup.show();
        }
        tracing::debug!(cell = %cell, ?edit_type, "edit session opened");
        self.session = Some(EditSession {
            cell,
            edit_type,
            cursor: current.chars().count(),
            temp_value: current.clone(),
            committed_value: current,
            options,
            highlighted,
            popup,
            focused: false,
        });
        self.phase = Some(EditPhase::Editing);
        self.focus_pending = true;
        true
    }

    /// Focus moves into the editor one frame after the session opens, once it has been drawn.
    pub fn take_focus_request(&mut self) -> bool {
        if !std::mem::take(&mut self.focus_pending) {
            return false;
        }
        match self.session.as_mut() {
            Some(s) => {
                s.focused = true;
                true
            }
            None => false,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        if let Some(s) = self.session.as_mut() {
            s.popup.advance(dt);
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> EditOutcome {
        let Some(s) = self.session.as_mut() else {
            return EditOutcome::Ignored;
        };
        let popup_open = s.is_popup_open();
        let edit_type = s.edit_type;

        match &key.code {
            KeyCode::Esc if popup_open => {
                s.popup.hide();
                EditOutcome::Redraw
            }
            KeyCode::Esc => self.cancel(),
            KeyCode::Enter | KeyCode::Tab => match edit_type {
                EditType::Select if popup_open => {
                    let i = s.highlighted;
                    self.choose(i)
                }
                EditType::Date if popup_open => {
                    s.popup.hide();
                    EditOutcome::Redraw
                }
                _ => self.commit(),
            },
            KeyCode::Up | KeyCode::Down if edit_type.has_popup() => {
                let step: i64 = if key.code == KeyCode::Up { -1 } else { 1 };
                if !popup_open {
                    s.popup.show();
                } else if edit_type == EditType::Select {
                    let last = s.options.len().saturating_sub(1) as i64;
                    s.highlighted = (s.highlighted as i64 + step).clamp(0, last) as usize;
                } else {
                    s.step_date(step);
                }
                EditOutcome::Redraw
            }
            KeyCode::Char(c) if !key.modifiers.ctrl && !key.modifiers.alt => {
                if edit_type.is_textual() {
                    s.insert_str(c.encode_utf8(&mut [0u8; 4]));
                } else if let Some(i) = s
                    .options
                    .iter()
                    .position(|o| o.to_lowercase().starts_with(c.to_lowercase().next().unwrap_or(*c)))
                {
                    s.highlighted = i;
                    s.popup.show();
                }
                EditOutcome::Redraw
            }
            KeyCode::Backspace if edit_type.is_textual() => {
                s.backspace();
                EditOutcome::Redraw
            }
            KeyCode::Delete if edit_type.is_textual() => {
                s.delete();
                EditOutcome::Redraw
            }
            KeyCode::Left if edit_type.is_textual() => {
                s.move_cursor(-1);
                EditOutcome::Redraw
            }
            KeyCode::Right if edit_type.is_textual() => {
                s.move_cursor(1);
                EditOutcome::Redraw
            }
            KeyCode::Home if edit_type.is_textual() => {
                s.cursor = 0;
                EditOutcome::Redraw
            }
            KeyCode::End if edit_type.is_textual() => {
                s.cursor = s.temp_value.chars().count();
                EditOutcome::Redraw
            }
            _ => EditOutcome::Ignored,
        }
    }

    pub fn paste(&mut self, text: &str) -> EditOutcome {
        match self.session.as_mut() {
            Some(s) if s.edit_type.is_textual() => {
                let line = text.lines().next().unwrap_or("");
                s.insert_str(line);
                EditOutcome::Redraw
            }
            _ => EditOutcome::Ignored,
        }
    }

    pub fn apply(&mut self, command: EditCommand) -> EditOutcome {
        match command {
            EditCommand::SetCellValue(value) => match self.session.as_mut() {
                Some(s) => {
                    s.cursor = value.chars().count();
                    s.temp_value = value;
                    EditOutcome::Redraw
                }
                None => EditOutcome::Ignored,
            },
            EditCommand::ExitEditMode => self.commit(),
            EditCommand::UpdateRow(_) => EditOutcome::Ignored,
        }
    }

    /// The edited cell changed underneath the session. An untouched session follows the new
    /// value; a dirty one keeps what the user typed.
    pub fn rebase(&mut self, value: String) {
        let Some(s) = self.session.as_mut() else {
            return;
        };
        if !s.is_dirty() {
            s.temp_value = value.clone();
            s.cursor = s.temp_value.chars().count();
        }
        s.committed_value = value;
    }

    /// A click or focus change outside the edited cell.
    pub fn outside_interaction(&mut self) -> EditOutcome {
        let Some(s) = self.session.as_mut() else {
            return EditOutcome::Ignored;
        };
        if s.edit_type.has_popup() && s.is_popup_open() {
            s.popup.hide();
            tracing::trace!(cell = %s.cell, "outside interaction closed popup");
            return EditOutcome::Swallowed;
        }
        self.commit()
    }

    /// Toggles the popup of a `Select`/`Date` session (a click on the edited cell itself).
    pub fn toggle_popup(&mut self) -> EditOutcome {
        match self.session.as_mut() {
            Some(s) if s.edit_type.has_popup() => {
                if s.is_popup_open() {
                    s.popup.hide();
                } else {
                    s.popup.show();
                }
                EditOutcome::Redraw
            }
            _ => EditOutcome::Ignored,
        }
    }

    /// Picks option `i` of a `Select` session. The popup closes; the session stays open.
    pub fn choose(&mut self, i: usize) -> EditOutcome {
        match self.session.as_mut() {
            Some(s) if s.edit_type == EditType::Select => {
                let Some(option) = s.options.get(i) else {
                    return EditOutcome::Ignored;
                };
                s.temp_value = option.clone();
                s.cursor = s.temp_value.chars().count();
                s.highlighted = i;
                s.popup.hide();
                EditOutcome::Redraw
            }
            _ => EditOutcome::Ignored,
        }
    }

    pub fn commit(&mut self) -> EditOutcome {
        let Some(s) = self.session.as_mut() else {
            return EditOutcome::Ignored;
        };
        // Untouched values skip validation, so a blank cell can always be closed.
        let checked = if s.is_dirty() { s.validate() } else { Ok(()) };
        if let Err(message) = checked {
            s.revert();
            tracing::debug!(cell = %s.cell, %message, "edit value rejected");
            return EditOutcome::Rejected {
                cell: s.cell.clone(),
                message,
            };
        }
        self.phase = Some(EditPhase::Committing);
        let Some(s) = self.close() else {
            return EditOutcome::Ignored;
        };
        let value = match s.edit_type {
            EditType::Date => s.temp_value.trim().to_string(),
            _ => s.temp_value,
        };
        tracing::debug!(cell = %s.cell, "edit committed");
        EditOutcome::Commit {
            cell: s.cell,
            value,
        }
    }

    /// Ends the session discarding the temp value.
    pub fn cancel(&mut self) -> EditOutcome {
        if self.session.is_none() {
            return EditOutcome::Ignored;
        }
        self.phase = Some(EditPhase::Cancelling);
        let Some(s) = self.close() else {
            return EditOutcome::Ignored;
        };
        tracing::debug!(cell = %s.cell, "edit cancelled");
        EditOutcome::Cancel { cell: s.cell }
    }

    fn close(&mut self) -> Option<EditSession> {
        let mut s = self.session.take()?;
        s.popup.hide();
        s.popup.finish();
        debug_assert_eq!(s.popup.phase(), Phase::Hidden);
        self.focus_pending = false;
        self.phase = Some(EditPhase::Viewing);
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::key_char;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code)
    }

    fn cell() -> CellKey {
        CellKey::new(1, "name")
    }

    fn machine_with(edit_type: EditType, current: &str, options: &[&str]) -> EditMachine {
        let mut m = EditMachine::new(true);
        assert!(m.begin(
            cell(),
            edit_type,
            current.to_string(),
            options.iter().map(|s| s.to_string()).collect(),
        ));
        m
    }

    #[test]
    fn disabled_machine_never_opens() {
        let mut m = EditMachine::new(false);
        assert!(!m.begin(cell(), EditType::Input, "x".into(), vec![]));
        let mut m = EditMachine::new(true);
        assert!(!m.begin(cell(), EditType::None, "x".into(), vec![]));
        assert_eq!(m.phase(), EditPhase::Viewing);
    }

    #[test]
    fn focus_is_requested_once_after_begin() {
        let mut m = machine_with(EditType::Input, "Amy", &[]);
        assert!(!m.session().unwrap().is_focused());
        assert!(m.take_focus_request());
        assert!(!m.take_focus_request());
        assert!(m.session().unwrap().is_focused());
    }

    #[test]
    fn input_typing_then_enter_commits() {
        let mut m = machine_with(EditType::Input, "Am", &[]);
        m.handle_key(&key_char('y'));
        assert_eq!(m.phase(), EditPhase::Editing);
        assert_eq!(
            m.handle_key(&key(KeyCode::Enter)),
            EditOutcome::Commit {
                cell: cell(),
                value: "Amy".into()
            }
        );
        assert!(!m.is_editing());
        assert_eq!(m.phase(), EditPhase::Viewing);
    }

    #[test]
    fn input_outside_click_commits_as_is() {
        let mut m = machine_with(EditType::Input, "Bob", &[]);
        m.handle_key(&key(KeyCode::Backspace));
        assert_eq!(
            m.outside_interaction(),
            EditOutcome::Commit {
                cell: cell(),
                value: "Bo".into()
            }
        );
    }

    #[test]
    fn escape_cancels_and_discards() {
        let mut m = machine_with(EditType::Input, "Bob", &[]);
        m.handle_key(&key_char('!'));
        assert_eq!(m.handle_key(&key(KeyCode::Esc)), EditOutcome::Cancel { cell: cell() });
        assert!(!m.is_editing());
    }

    #[test]
    fn caret_editing_in_the_middle() {
        let mut m = machine_with(EditType::Input, "ac", &[]);
        m.handle_key(&key(KeyCode::Left));
        m.handle_key(&key_char('b'));
        m.handle_key(&key(KeyCode::Home));
        m.handle_key(&key(KeyCode::Delete));
        assert_eq!(m.session().unwrap().temp_value, "bc");
        assert_eq!(m.session().unwrap().cursor(), 0);
    }

    #[test]
    fn select_first_outside_click_only_closes_popup() {
        let mut m = machine_with(EditType::Select, "Lima", &["Lima", "Oslo"]);
        assert!(m.session().unwrap().is_popup_open());
        assert_eq!(m.outside_interaction(), EditOutcome::Swallowed);
        assert!(m.is_editing());
        assert_eq!(
            m.outside_interaction(),
            EditOutcome::Commit {
                cell: cell(),
                value: "Lima".into()
            }
        );
    }

    #[test]
    fn choosing_an_option_keeps_session_open() {
        let mut m = machine_with(EditType::Select, "Lima", &["Lima", "Oslo"]);
        m.handle_key(&key(KeyCode::Down));
        assert_eq!(m.handle_key(&key(KeyCode::Enter)), EditOutcome::Redraw);
        let s = m.session().unwrap();
        assert_eq!(s.temp_value, "Oslo");
        assert!(!s.is_popup_open());
        assert_eq!(
            m.outside_interaction(),
            EditOutcome::Commit {
                cell: cell(),
                value: "Oslo".into()
            }
        );
    }

    #[test]
    fn date_steps_and_validates() {
        let mut m = machine_with(EditType::Date, "2024-02-28", &[]);
        m.handle_key(&key(KeyCode::Down));
        assert_eq!(m.session().unwrap().temp_value, "2024-02-29");
        m.handle_key(&key(KeyCode::Enter));
        assert!(!m.session().unwrap().is_popup_open());
        assert_eq!(
            m.handle_key(&key(KeyCode::Enter)),
            EditOutcome::Commit {
                cell: cell(),
                value: "2024-02-29".into()
            }
        );
    }

    #[test]
    fn unparsable_date_reverts_temp_value() {
        let mut m = machine_with(EditType::Date, "2024-01-01", &[]);
        m.outside_interaction();
        m.paste("garbage");
        let out = m.commit();
        assert!(matches!(out, EditOutcome::Rejected { .. }));
        let s = m.session().unwrap();
        assert_eq!(s.temp_value, "2024-01-01");
        assert!(!s.is_dirty());
    }

    #[test]
    fn blank_select_and_date_cells_still_close() {
        for edit_type in [EditType::Select, EditType::Date] {
            let mut m = machine_with(edit_type, "", &["A", "B"]);
            assert_eq!(m.outside_interaction(), EditOutcome::Swallowed);
            assert_eq!(
                m.outside_interaction(),
                EditOutcome::Commit {
                    cell: cell(),
                    value: String::new()
                }
            );
            assert!(!m.is_editing());
        }
    }

    #[test]
    fn reverted_blank_date_closes_on_next_commit() {
        let mut m = machine_with(EditType::Date, "", &[]);
        m.outside_interaction();
        m.paste("soon");
        assert!(matches!(m.commit(), EditOutcome::Rejected { .. }));
        assert!(m.is_editing());
        assert!(matches!(m.commit(), EditOutcome::Commit { .. }));
    }

    #[test]
    fn rebase_follows_untouched_sessions_only() {
        let mut m = machine_with(EditType::Input, "a", &[]);
        m.rebase("b".into());
        assert_eq!(m.session().unwrap().temp_value, "b");
        m.paste("!");
        m.rebase("c".into());
        let s = m.session().unwrap();
        assert_eq!((s.temp_value.as_str(), s.committed_value()), ("b!", "c"));
    }

    #[test]
    fn popup_transition_settles_with_time() {
        let mut m = machine_with(EditType::Select, "a", &["a", "b"]);
        assert_eq!(m.session().unwrap().popup().phase(), Phase::Entering);
        m.advance(Duration::from_secs(1));
        assert_eq!(m.session().unwrap().popup().phase(), Phase::Visible);
    }

    #[test]
    fn custom_commands_write_then_exit() {
        let mut m = machine_with(EditType::Input, "1", &[]);
        assert_eq!(m.apply(EditCommand::SetCellValue("42".into())), EditOutcome::Redraw);
        assert_eq!(
            m.apply(EditCommand::ExitEditMode),
            EditOutcome::Commit {
                cell: cell(),
                value: "42".into()
            }
        );
        assert_eq!(m.apply(EditCommand::ExitEditMode), EditOutcome::Ignored);
    }

    #[test]
    fn disabling_edit_mode_cancels_session() {
        let mut m = machine_with(EditType::Input, "x", &[]);
        assert_eq!(m.set_enabled(false), EditOutcome::Cancel { cell: cell() });
    }
}
