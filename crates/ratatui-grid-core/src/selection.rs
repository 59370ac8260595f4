use crate::row::RowKey;
use std::collections::BTreeSet;
use std::fmt;

/// Aggregate state of the header checkbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriState {
    None,
    Partial,
    All,
}

pub type SelectionCallback = Box<dyn FnMut(&[RowKey])>;

/// Row selection keyed by the designated row key, so it survives filtering, sorting and row-list
/// replacement as long as keys are stable.
///
/// Aggregate queries take the currently visible keys: keys of rows that are filtered out stay in
/// the set but do not count towards "all" or "partial".
#[derive(Default)]
pub struct SelectionEngine {
    checked: BTreeSet<RowKey>,
    on_change: Option<SelectionCallback>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback receiving the full selected-key list after every change.
    pub fn on_change(&mut self, f: impl FnMut(&[RowKey]) + 'static) {
        self.on_change = Some(Box::new(f));
    }

    pub fn is_checked(&self, key: &RowKey) -> bool {
        self.checked.contains(key)
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    pub fn selected(&self) -> impl Iterator<Item = &RowKey> {
        self.checked.iter()
    }

    pub fn toggle(&mut self, key: RowKey) {
        if !self.checked.remove(&key) {
            self.checked.insert(key);
        }
        self.notify();
    }

    /// Selects every visible row unless they all already are, in which case clears the selection.
    pub fn toggle_all(&mut self, visible: &[RowKey]) {
        if self.is_all_checked(visible) {
            self.checked.clear();
        } else {
            self.checked = visible.iter().cloned().collect();
        }
        self.notify();
    }

    /// Adds a contiguous run of rows (shift-click on the check column).
    pub fn select_range(&mut self, keys: &[RowKey]) {
        let before = self.checked.len();
        self.checked.extend(keys.iter().cloned());
        if self.checked.len() != before {
            self.notify();
        }
    }

    pub fn set_checked(&mut self, keys: impl IntoIterator<Item = RowKey>) {
        self.checked = keys.into_iter().collect();
        self.notify();
    }

    pub fn clear(&mut self) {
        if self.checked.is_empty() {
            return;
        }
        self.checked.clear();
        self.notify();
    }

    /// Drops keys that no longer belong to any row.
    pub fn retain_existing(&mut self, existing: &BTreeSet<RowKey>) {
        let before = self.checked.len();
        self.checked.retain(|k| existing.contains(k));
        if self.checked.len() != before {
            self.notify();
        }
    }

    pub fn checked_among(&self, visible: &[RowKey]) -> usize {
        visible.iter().filter(|k| self.checked.contains(*k)).count()
    }

    pub fn is_all_checked(&self, visible: &[RowKey]) -> bool {
        !visible.is_empty() && self.checked_among(visible) == visible.len()
    }

    pub fn is_partially_checked(&self, visible: &[RowKey]) -> bool {
        let n = self.checked_among(visible);
        n > 0 && n < visible.len()
    }

    pub fn tri_state(&self, visible: &[RowKey]) -> TriState {
        if self.is_all_checked(visible) {
            TriState::All
        } else if self.is_partially_checked(visible) {
            TriState::Partial
        } else {
            TriState::None
        }
    }

    fn notify(&mut self) {
        if let Some(cb) = self.on_change.as_mut() {
            let keys: Vec<RowKey> = self.checked.iter().cloned().collect();
            cb(&keys);
        }
    }
}

impl fmt::Debug for SelectionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionEngine")
            .field("checked", &self.checked)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn keys(ids: &[u64]) -> Vec<RowKey> {
        ids.iter().copied().map(RowKey::from).collect()
    }

    #[test]
    fn toggle_all_selects_then_clears_visible_set() {
        let visible = keys(&[1, 2, 3]);
        let mut s = SelectionEngine::new();
        s.toggle_all(&visible);
        assert_eq!(s.selected().cloned().collect::<Vec<_>>(), visible);
        assert_eq!(s.tri_state(&visible), TriState::All);
        s.toggle_all(&visible);
        assert!(s.is_empty());
        assert_eq!(s.tri_state(&visible), TriState::None);
    }

    #[test]
    fn partial_selection_reports_partial() {
        let visible = keys(&[1, 2, 3]);
        let mut s = SelectionEngine::new();
        s.toggle(RowKey::from(2));
        assert!(s.is_partially_checked(&visible));
        assert!(!s.is_all_checked(&visible));

        s.toggle_all(&visible);
        assert!(s.is_all_checked(&visible));
    }

    #[test]
    fn empty_visible_set_is_never_all_checked() {
        let s = SelectionEngine::new();
        assert!(!s.is_all_checked(&[]));
        assert!(!s.is_partially_checked(&[]));
    }

    #[test]
    fn hidden_keys_do_not_count_towards_aggregate() {
        let mut s = SelectionEngine::new();
        s.toggle(RowKey::from(9));
        let visible = keys(&[1, 2]);
        assert_eq!(s.tri_state(&visible), TriState::None);
        s.toggle_all(&visible);
        assert!(!s.is_checked(&RowKey::from(9)));
    }

    #[test]
    fn callback_receives_selected_keys() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut s = SelectionEngine::new();
        s.on_change(move |k| sink.borrow_mut().push(k.to_vec()));
        s.toggle(RowKey::from(1));
        s.toggle(RowKey::from(2));
        s.toggle(RowKey::from(1));
        assert_eq!(
            *seen.borrow(),
            vec![keys(&[1]), keys(&[1, 2]), keys(&[2])]
        );
    }

    #[test]
    fn retain_drops_deleted_rows() {
        let mut s = SelectionEngine::new();
        s.set_checked(keys(&[1, 2]));
        s.retain_existing(&keys(&[2, 3]).into_iter().collect());
        assert_eq!(s.selected().cloned().collect::<Vec<_>>(), keys(&[2]));
    }

    #[test]
    fn select_range_adds_without_clearing() {
        let mut s = SelectionEngine::new();
        s.toggle(RowKey::from(7));
        s.select_range(&keys(&[1, 2, 3]));
        assert_eq!(s.len(), 4);
        assert_eq!(s.tri_state(&keys(&[1, 2, 3])), TriState::All);
    }
}
