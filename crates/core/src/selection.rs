//! Bulk selection state machine.
//!
//! A selection is either a hand-picked set of ids or "everything matching
//! the current filter" minus a small exclusion set. The second mode lets an
//! operator target tens of thousands of archived leads while the client
//! only ever tracks the exceptions.

use std::collections::BTreeSet;

use crate::types::RecordId;

/// Which records are targeted by the next bulk operation.
///
/// The two modes are mutually exclusive. Switching modes drops the other
/// mode's set; nothing is merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    /// Records picked one by one, possibly across several pages.
    Explicit { selected: BTreeSet<RecordId> },
    /// Every record matching the active filter except `excluded`.
    AllMatching { excluded: BTreeSet<RecordId> },
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::Explicit {
            selected: BTreeSet::new(),
        }
    }
}

/// Mode label of a [`SelectionState`], for logging and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Explicit,
    AllMatching,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::AllMatching => "all_matching",
        }
    }
}

/// Tri-state of the "select page" checkbox for the visible rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCheckState {
    Unchecked,
    Partial,
    Checked,
}

impl SelectionState {
    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::Explicit { .. } => SelectionMode::Explicit,
            Self::AllMatching { .. } => SelectionMode::AllMatching,
        }
    }

    pub fn is_all_matching(&self) -> bool {
        self.mode() == SelectionMode::AllMatching
    }

    /// Check or uncheck a single record.
    ///
    /// In all-matching mode checking re-includes the record and unchecking
    /// excludes it.
    pub fn toggle(&mut self, id: RecordId, checked: bool) {
        match self {
            Self::Explicit { selected } => {
                if checked {
                    selected.insert(id);
                } else {
                    selected.remove(&id);
                }
            }
            Self::AllMatching { excluded } => {
                if checked {
                    excluded.remove(&id);
                } else {
                    excluded.insert(id);
                }
            }
        }
    }

    /// Check or uncheck every record on the visible page.
    ///
    /// In all-matching mode checking is a no-op and unchecking collapses
    /// the whole selection back to nothing, so "select all, then deselect
    /// all" ends with zero records selected.
    pub fn toggle_page(&mut self, page_ids: &[RecordId], checked: bool) {
        match self {
            Self::AllMatching { .. } => {
                if !checked {
                    self.clear();
                }
            }
            Self::Explicit { selected } => {
                for id in page_ids {
                    if checked {
                        selected.insert(*id);
                    } else {
                        selected.remove(id);
                    }
                }
            }
        }
    }

    /// Enter all-matching mode with no exclusions.
    pub fn select_all_matching(&mut self) {
        *self = Self::AllMatching {
            excluded: BTreeSet::new(),
        };
    }

    /// Reset to an empty explicit selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        match self {
            Self::Explicit { selected } => selected.contains(&id),
            Self::AllMatching { excluded } => !excluded.contains(&id),
        }
    }

    /// Number of selected records given the server-reported `total`.
    ///
    /// All-matching mode subtracts every exclusion, including ids outside
    /// the visible page, and never goes below zero.
    pub fn count(&self, total: u64) -> u64 {
        match self {
            Self::Explicit { selected } => selected.len() as u64,
            Self::AllMatching { excluded } => total.saturating_sub(excluded.len() as u64),
        }
    }

    pub fn has_selection(&self, total: u64) -> bool {
        self.count(total) > 0
    }

    /// Header checkbox state for the visible page.
    pub fn page_check_state(&self, page_ids: &[RecordId]) -> PageCheckState {
        if page_ids.is_empty() {
            return PageCheckState::Unchecked;
        }
        let checked = page_ids.iter().filter(|id| self.is_selected(**id)).count();
        if checked == 0 {
            PageCheckState::Unchecked
        } else if checked == page_ids.len() {
            PageCheckState::Checked
        } else {
            PageCheckState::Partial
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn explicit(ids: &[RecordId]) -> SelectionState {
        SelectionState::Explicit {
            selected: ids.iter().copied().collect(),
        }
    }

    #[test]
    fn mode_follows_variant() {
        let mut selection = SelectionState::default();
        assert_eq!(selection.mode(), SelectionMode::Explicit);
        selection.select_all_matching();
        assert_eq!(selection.mode().as_str(), "all_matching");
        selection.clear();
        assert_eq!(selection.mode(), SelectionMode::Explicit);
    }

    // -- Explicit mode -------------------------------------------------------

    #[test]
    fn starts_empty() {
        let state = SelectionState::default();
        assert_eq!(state.count(500), 0);
        assert!(!state.has_selection(500));
        assert!(!state.is_selected(1));
    }

    #[test]
    fn explicit_toggle_adds_and_removes() {
        let mut state = SelectionState::default();
        state.toggle(7, true);
        state.toggle(9, true);
        state.toggle(7, false);
        assert_eq!(state, explicit(&[9]));
        assert_eq!(state.count(1_000), 1);
    }

    #[test]
    fn explicit_count_ignores_total() {
        let state = explicit(&[1, 2, 3]);
        assert_eq!(state.count(0), 3);
    }

    #[test]
    fn explicit_page_toggle_applies_to_every_row() {
        let mut state = explicit(&[100]);
        state.toggle_page(&[1, 2, 3], true);
        assert_eq!(state.count(0), 4);
        state.toggle_page(&[1, 2, 3], false);
        assert_eq!(state, explicit(&[100]));
    }

    // -- AllMatching mode ----------------------------------------------------

    #[test]
    fn select_all_matching_discards_explicit_ids() {
        let mut state = explicit(&[1, 2]);
        state.select_all_matching();
        assert_matches!(&state, SelectionState::AllMatching { excluded } if excluded.is_empty());
        assert!(state.is_selected(424_242));
    }

    #[test]
    fn all_matching_uncheck_excludes() {
        let mut state = SelectionState::default();
        state.select_all_matching();
        for id in [10, 11, 12] {
            state.toggle(id, false);
        }
        assert_eq!(state.count(120), 117);
        assert!(!state.is_selected(11));
        assert!(state.is_selected(13));

        state.toggle(11, true);
        assert_eq!(state.count(120), 118);
        assert!(state.is_selected(11));
    }

    #[test]
    fn all_matching_count_clamps_at_zero() {
        let mut state = SelectionState::default();
        state.select_all_matching();
        for id in 0..10 {
            state.toggle(id, false);
        }
        assert_eq!(state.count(4), 0);
        assert!(!state.has_selection(4));
    }

    #[test]
    fn all_matching_counts_exclusions_outside_the_page() {
        let mut state = SelectionState::default();
        state.select_all_matching();
        // 9_001 is not on any visible page; it still counts.
        state.toggle(9_001, false);
        assert_eq!(state.count(50), 49);
    }

    #[test]
    fn all_matching_page_check_is_noop() {
        let mut state = SelectionState::default();
        state.select_all_matching();
        state.toggle(5, false);
        let before = state.clone();
        state.toggle_page(&[4, 5, 6], true);
        assert_eq!(state, before);
    }

    #[test]
    fn all_matching_page_uncheck_collapses_to_nothing() {
        let mut state = SelectionState::default();
        state.select_all_matching();
        state.toggle(3, false);
        state.toggle(8, false);
        state.toggle_page(&[1, 2], false);
        assert_eq!(state, SelectionState::default());
        assert_eq!(state.count(1_000), 0);
    }

    #[test]
    fn clear_always_returns_to_empty_explicit() {
        let mut state = SelectionState::default();
        state.select_all_matching();
        state.clear();
        assert_eq!(state, SelectionState::default());
    }

    // -- page_check_state ----------------------------------------------------

    #[test]
    fn page_check_state_reflects_visible_rows() {
        let state = explicit(&[1, 2]);
        assert_eq!(state.page_check_state(&[1, 2]), PageCheckState::Checked);
        assert_eq!(state.page_check_state(&[1, 3]), PageCheckState::Partial);
        assert_eq!(state.page_check_state(&[3, 4]), PageCheckState::Unchecked);
        assert_eq!(state.page_check_state(&[]), PageCheckState::Unchecked);
    }

    #[test]
    fn page_check_state_in_all_matching_mode() {
        let mut state = SelectionState::default();
        state.select_all_matching();
        assert_eq!(state.page_check_state(&[1, 2]), PageCheckState::Checked);
        state.toggle(2, false);
        assert_eq!(state.page_check_state(&[1, 2]), PageCheckState::Partial);
    }
}
