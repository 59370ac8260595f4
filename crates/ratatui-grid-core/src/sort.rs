use crate::collate::natural_cmp;
use crate::header::Header;
use crate::header::HeaderId;
use crate::header::HeaderRegistry;
use crate::row::Row;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Next state of the tri-state cycle `Asc -> Desc -> unsorted -> Asc`.
    pub fn cycle(current: Option<SortDirection>) -> Option<SortDirection> {
        match current {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Whether activating one header clears the others.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Single,
    Multi,
}

/// Live per-header sort directions.
///
/// In [`SortMode::Multi`] every header keeps its own direction, but ordering is still decided by
/// a single key: the first header in registry order that has a direction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortState {
    mode: SortMode,
    directions: BTreeMap<HeaderId, SortDirection>,
}

impl SortState {
    pub fn new(mode: SortMode) -> Self {
        Self {
            mode,
            directions: BTreeMap::new(),
        }
    }

    /// Seeds directions from the headers' initial `sorter.direction`.
    pub fn from_headers(headers: &HeaderRegistry, mode: SortMode) -> Self {
        let mut state = Self::new(mode);
        for h in headers.iter().filter(|h| h.is_sortable()) {
            if let Some(dir) = h.sorter.direction {
                state.set_direction(&h.id, Some(dir));
            }
        }
        state
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn direction(&self, id: &HeaderId) -> Option<SortDirection> {
        self.directions.get(id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    pub fn clear(&mut self) {
        self.directions.clear();
    }

    pub fn set_direction(&mut self, id: &HeaderId, direction: Option<SortDirection>) {
        if self.mode == SortMode::Single && direction.is_some() {
            self.directions.clear();
        }
        match direction {
            Some(dir) => {
                self.directions.insert(id.clone(), dir);
            }
            None => {
                self.directions.remove(id);
            }
        }
    }

    /// Advances `id` through the tri-state cycle. Unknown and non-sortable headers are left
    /// untouched. Returns the direction the header ends up with.
    pub fn toggle(&mut self, headers: &HeaderRegistry, id: &HeaderId) -> Option<SortDirection> {
        let Some(header) = headers.get(id) else {
            return None;
        };
        if !header.is_sortable() {
            return self.direction(id);
        }
        let next = SortDirection::cycle(self.direction(id));
        self.set_direction(id, next);
        tracing::debug!(header = %id, direction = ?next, mode = ?self.mode, "sort toggled");
        next
    }

    /// The header that currently decides the row order.
    pub fn active<'h>(&self, headers: &'h HeaderRegistry) -> Option<(&'h Header, SortDirection)> {
        headers
            .iter()
            .filter(|h| h.is_sortable())
            .find_map(|h| self.direction(&h.id).map(|d| (h, d)))
    }
}

/// Stably reorders `order` (positions into `rows`) by the active sort key.
///
/// With no active header the input order is returned unchanged.
pub fn compute_sort(
    headers: &HeaderRegistry,
    rows: &[Row],
    order: &[usize],
    state: &SortState,
) -> Vec<usize> {
    let mut out = order.to_vec();
    let Some((header, direction)) = state.active(headers) else {
        return out;
    };

    match &header.id {
        HeaderId::Index => {
            out.sort_by(|&a, &b| direction.apply(rows[a].index.cmp(&rows[b].index)));
        }
        HeaderId::Column(key) => {
            let keys: Vec<String> = rows.iter().map(|r| r.display(key)).collect();
            out.sort_by(|&a, &b| direction.apply(natural_cmp(&keys[a], &keys[b])));
        }
        HeaderId::Check | HeaderId::Button => {}
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> HeaderRegistry {
        HeaderRegistry::new(vec![
            Header::column("name", "Name", 100).sortable(true),
            Header::column("age", "Age", 60).sortable(true),
            Header::column("note", "Note", 20),
        ])
        .unwrap()
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new(0).with("name", "Bob").with("age", 30).with("note", "b"),
            Row::new(1).with("name", "Amy").with("age", 25).with("note", "a"),
            Row::new(2).with("name", "carl").with("age", 25).with("note", "c"),
        ]
    }

    fn names(rows: &[Row], order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| rows[i].display("name")).collect()
    }

    #[test]
    fn toggle_cycles_through_three_states() {
        let reg = registry();
        let mut s = SortState::default();
        let name = HeaderId::parse("name");
        assert_eq!(s.toggle(&reg, &name), Some(SortDirection::Asc));
        assert_eq!(s.toggle(&reg, &name), Some(SortDirection::Desc));
        assert_eq!(s.toggle(&reg, &name), None);
        assert!(s.is_empty());
    }

    #[test]
    fn non_sortable_toggle_is_a_no_op() {
        let reg = registry();
        let mut s = SortState::default();
        assert_eq!(s.toggle(&reg, &HeaderId::parse("note")), None);
        assert_eq!(s.toggle(&reg, &HeaderId::parse("missing")), None);
        assert!(s.is_empty());
    }

    #[test]
    fn single_mode_is_exclusive() {
        let reg = registry();
        let mut s = SortState::new(SortMode::Single);
        s.toggle(&reg, &HeaderId::parse("name"));
        s.toggle(&reg, &HeaderId::parse("age"));
        assert_eq!(s.direction(&HeaderId::parse("name")), None);
        assert_eq!(s.direction(&HeaderId::parse("age")), Some(SortDirection::Asc));
    }

    #[test]
    fn multi_mode_keeps_directions_but_sorts_by_first_header() {
        let reg = registry();
        let rows = rows();
        let mut s = SortState::new(SortMode::Multi);
        s.toggle(&reg, &HeaderId::parse("age"));
        s.toggle(&reg, &HeaderId::parse("name"));
        s.toggle(&reg, &HeaderId::parse("name"));
        assert_eq!(s.direction(&HeaderId::parse("age")), Some(SortDirection::Asc));
        assert_eq!(s.direction(&HeaderId::parse("name")), Some(SortDirection::Desc));

        let (active, dir) = s.active(&reg).unwrap();
        assert_eq!(active.id, HeaderId::parse("name"));
        assert_eq!(dir, SortDirection::Desc);
        let order = compute_sort(&reg, &rows, &[0, 1, 2], &s);
        assert_eq!(names(&rows, &order), vec!["carl", "Bob", "Amy"]);
    }

    #[test]
    fn identity_without_active_header() {
        let reg = registry();
        let rows = rows();
        let order = compute_sort(&reg, &rows, &[2, 0, 1], &SortState::default());
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn ties_keep_input_order() {
        let reg = registry();
        let rows = rows();
        let mut s = SortState::default();
        s.toggle(&reg, &HeaderId::parse("age"));
        assert_eq!(compute_sort(&reg, &rows, &[2, 1, 0], &s), vec![2, 1, 0]);
        assert_eq!(compute_sort(&reg, &rows, &[1, 2, 0], &s), vec![1, 2, 0]);
    }

    #[test]
    fn sorting_sorted_input_is_a_no_op() {
        let reg = registry();
        let rows = rows();
        let mut s = SortState::default();
        s.toggle(&reg, &HeaderId::parse("name"));
        let once = compute_sort(&reg, &rows, &[0, 1, 2], &s);
        let twice = compute_sort(&reg, &rows, &once, &s);
        assert_eq!(once, twice);
    }

    #[test]
    fn three_toggles_restore_original_order() {
        let reg = registry();
        let rows = rows();
        let mut s = SortState::default();
        let name = HeaderId::parse("name");
        let base = vec![0, 1, 2];
        for _ in 0..3 {
            s.toggle(&reg, &name);
        }
        assert_eq!(s.direction(&name), None);
        assert_eq!(compute_sort(&reg, &rows, &base, &s), base);
    }

    #[test]
    fn initial_directions_seed_state() {
        let reg = HeaderRegistry::new(vec![
            Header::column("name", "Name", 10).sorted(SortDirection::Desc),
        ])
        .unwrap();
        let s = SortState::from_headers(&reg, SortMode::Single);
        assert_eq!(s.direction(&HeaderId::parse("name")), Some(SortDirection::Desc));
    }
}
