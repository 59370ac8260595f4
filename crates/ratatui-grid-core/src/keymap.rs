use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;

/// Grid-level commands reachable from the keyboard while no edit session is open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridCommand {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Top,
    Bottom,
    ScrollLeft,
    ScrollRight,
    ToggleSort,
    ToggleRow,
    ToggleAll,
    BeginEdit,
    DeleteRow,
}

/// Key bindings for [`GridCommand`]s.
///
/// The defaults follow the usual terminal conventions: arrows or `hjkl` move the cursor, `s`
/// cycles the sort of the cursor column, Space toggles the cursor row, `a` toggles every visible
/// row, Enter or F2 starts editing the cursor cell.
#[derive(Clone, Debug)]
pub struct GridBindings {
    pub horiz_step: i32,
    pub up: Vec<KeyEvent>,
    pub down: Vec<KeyEvent>,
    pub left: Vec<KeyEvent>,
    pub right: Vec<KeyEvent>,
    pub page_up: Vec<KeyEvent>,
    pub page_down: Vec<KeyEvent>,
    pub top: Vec<KeyEvent>,
    pub bottom: Vec<KeyEvent>,
    pub scroll_left: Vec<KeyEvent>,
    pub scroll_right: Vec<KeyEvent>,
    pub toggle_sort: Vec<KeyEvent>,
    pub toggle_row: Vec<KeyEvent>,
    pub toggle_all: Vec<KeyEvent>,
    pub begin_edit: Vec<KeyEvent>,
    pub delete_row: Vec<KeyEvent>,
}

impl Default for GridBindings {
    fn default() -> Self {
        Self {
            horiz_step: 4,
            up: vec![KeyEvent::new(KeyCode::Up), key_char('k')],
            down: vec![KeyEvent::new(KeyCode::Down), key_char('j')],
            left: vec![KeyEvent::new(KeyCode::Left), key_char('h')],
            right: vec![KeyEvent::new(KeyCode::Right), key_char('l')],
            page_up: vec![KeyEvent::new(KeyCode::PageUp), key_ctrl('u')],
            page_down: vec![KeyEvent::new(KeyCode::PageDown), key_ctrl('d')],
            top: vec![KeyEvent::new(KeyCode::Home), key_char('g')],
            bottom: vec![KeyEvent::new(KeyCode::End), key_char('G')],
            scroll_left: vec![key_char('H')],
            scroll_right: vec![key_char('L')],
            toggle_sort: vec![key_char('s')],
            toggle_row: vec![key_char(' ')],
            toggle_all: vec![key_char('a')],
            begin_edit: vec![KeyEvent::new(KeyCode::Enter), KeyEvent::new(KeyCode::F(2))],
            delete_row: vec![KeyEvent::new(KeyCode::Delete)],
        }
    }
}

impl GridBindings {
    pub fn action_for(&self, key: &KeyEvent) -> Option<GridCommand> {
        let table: [(&[KeyEvent], GridCommand); 15] = [
            (self.up.as_slice(), GridCommand::Up),
            (self.down.as_slice(), GridCommand::Down),
            (self.left.as_slice(), GridCommand::Left),
            (self.right.as_slice(), GridCommand::Right),
            (self.page_up.as_slice(), GridCommand::PageUp),
            (self.page_down.as_slice(), GridCommand::PageDown),
            (self.top.as_slice(), GridCommand::Top),
            (self.bottom.as_slice(), GridCommand::Bottom),
            (self.scroll_left.as_slice(), GridCommand::ScrollLeft),
            (self.scroll_right.as_slice(), GridCommand::ScrollRight),
            (self.toggle_sort.as_slice(), GridCommand::ToggleSort),
            (self.toggle_row.as_slice(), GridCommand::ToggleRow),
            (self.toggle_all.as_slice(), GridCommand::ToggleAll),
            (self.begin_edit.as_slice(), GridCommand::BeginEdit),
            (self.delete_row.as_slice(), GridCommand::DeleteRow),
        ];
        table
            .iter()
            .find(|(keys, _)| keys.iter().any(|p| key_event_matches(p, key)))
            .map(|(_, cmd)| *cmd)
    }
}

pub fn key_event_matches(pattern: &KeyEvent, event: &KeyEvent) -> bool {
    pattern.code == event.code && modifiers_match(pattern, event)
}

fn modifiers_match(pattern: &KeyEvent, event: &KeyEvent) -> bool {
    let (p, e) = (pattern.modifiers, event.modifiers);
    // Terminals report shift for upper-case letters inconsistently.
    let shift_ok = p.shift == e.shift || matches!(event.code, KeyCode::Char(c) if c.is_uppercase());
    shift_ok && p.ctrl == e.ctrl && p.alt == e.alt
}

pub fn key_char(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c))
}

pub fn key_ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_modifiers(KeyModifiers {
        shift: false,
        ctrl: true,
        alt: false,
    })
}
