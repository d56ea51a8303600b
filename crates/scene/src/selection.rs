use scenerep_common::OccurrenceId;
use std::collections::HashSet;

/// Set of selected occurrence ids of one world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: HashSet<OccurrenceId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `id` was already selected.
    pub fn insert(&mut self, id: OccurrenceId) -> bool {
        self.ids.insert(id)
    }

    /// Returns false if `id` was not selected.
    pub fn remove(&mut self, id: OccurrenceId) -> bool {
        self.ids.remove(&id)
    }

    pub fn contains(&self, id: OccurrenceId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = OccurrenceId> + '_ {
        self.ids.iter().copied()
    }

    /// Selected ids, sorted.
    pub fn ids(&self) -> Vec<OccurrenceId> {
        let mut ids: Vec<OccurrenceId> = self.iter().collect();
        ids.sort();
        ids
    }
}

/// How a [`SelectionEvent`] combines with the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// The event's ids become the whole selection.
    Replace,
    Add,
    Remove,
    /// Selected ids are unselected and the others selected.
    Toggle,
}

/// A batch selection request, typically produced by a picking gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub mode: SelectionMode,
    pub ids: Vec<OccurrenceId>,
}

impl SelectionEvent {
    pub fn new(mode: SelectionMode, ids: impl IntoIterator<Item = OccurrenceId>) -> Self {
        Self {
            mode,
            ids: ids.into_iter().collect(),
        }
    }
}

/// Whether unselecting also clears the render highlight and notifies observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Propagate,
    Keep,
}

/// A change reported to [`SelectionObserver`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected(OccurrenceId),
    Unselected(OccurrenceId),
    Cleared,
}

/// Hook notified when the selection highlight changes.
pub trait SelectionObserver {
    fn selection_changed(&mut self, change: SelectionChange);
}

impl<F: FnMut(SelectionChange)> SelectionObserver for F {
    fn selection_changed(&mut self, change: SelectionChange) {
        self(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut s = SelectionSet::new();
        assert!(s.insert(OccurrenceId(3)));
        assert!(!s.insert(OccurrenceId(3)));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn ids_are_sorted() {
        let mut s = SelectionSet::new();
        for raw in [7, 2, 5] {
            s.insert(OccurrenceId(raw));
        }
        assert_eq!(s.ids(), vec![OccurrenceId(2), OccurrenceId(5), OccurrenceId(7)]);
    }

    #[test]
    fn closures_are_observers() {
        let mut seen = Vec::new();
        {
            let mut observer = |c: SelectionChange| seen.push(c);
            observer.selection_changed(SelectionChange::Cleared);
        }
        assert_eq!(seen, vec![SelectionChange::Cleared]);
    }
}
