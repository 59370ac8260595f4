use crate::collate::natural_cmp;
use crate::header::HeaderId;
use crate::header::HeaderRegistry;
use crate::row::Row;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Per-header filter strings. An empty string means the header does not filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    values: BTreeMap<HeaderId, String>,
}

impl FilterState {
    pub fn from_headers(headers: &HeaderRegistry) -> Self {
        let mut state = Self::default();
        for h in headers.iter().filter(|h| h.is_filterable()) {
            if let Some(f) = &h.filter {
                state.set(&h.id, f.filter_value.clone());
            }
        }
        state
    }

    pub fn get(&self, id: &HeaderId) -> &str {
        self.values.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, id: &HeaderId, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(id);
        } else {
            self.values.insert(id.clone(), value);
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.values.is_empty()
    }

    /// Non-empty `(header, lowercased needle)` pairs for headers that exist and filter.
    fn predicates<'a>(&'a self, headers: &'a HeaderRegistry) -> Vec<(&'a str, String)> {
        headers
            .iter()
            .filter(|h| h.is_filterable())
            .filter_map(|h| {
                let key = h.id.data_key()?;
                let value = self.values.get(&h.id)?;
                Some((key, value.to_lowercase()))
            })
            .collect()
    }
}

/// Returns the positions of rows that pass every non-empty filter, in input order.
pub fn apply_filters(headers: &HeaderRegistry, rows: &[Row], state: &FilterState) -> Vec<usize> {
    let predicates = state.predicates(headers);
    if predicates.is_empty() {
        return (0..rows.len()).collect();
    }
    let out: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            predicates
                .iter()
                .all(|(key, needle)| row.display(key).to_lowercase().contains(needle.as_str()))
        })
        .map(|(i, _)| i)
        .collect();
    tracing::trace!(
        filters = predicates.len(),
        kept = out.len(),
        total = rows.len(),
        "filters applied"
    );
    out
}

/// Distinct display values of `key`, naturally ordered. Feeds select-type filter pickers.
pub fn select_options(rows: &[Row], key: &str) -> Vec<String> {
    let distinct: BTreeSet<String> = rows
        .iter()
        .map(|r| r.display(key))
        .filter(|s| !s.is_empty())
        .collect();
    let mut out: Vec<String> = distinct.into_iter().collect();
    out.sort_by(|a, b| natural_cmp(a, b));
    out
}
