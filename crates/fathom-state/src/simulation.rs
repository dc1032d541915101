//! Simulation - the undo/redo history of datastates for one run
//!
//! The history is two stacks:
//!
//! ```text
//! active: [A, B, C]      (index 0 = oldest, last = current)
//! redo:   [F, E, D]      (last = earliest undone)
//!
//! timeline = active ++ reversed(redo) = [A, B, C, D, E, F]
//! ```
//!
//! Undo moves the top of `active` onto `redo`; redo moves the last element of
//! `redo` back. Appending a new state truncates the redo future.
//!
//! Masking hides a trailing range of the timeline without deleting it.
//! Masked states are skipped by the merged view and by "unmasked" level
//! queries, but they stay in place for unmasking and redo. Only
//! [`Simulation::pop_masked_states`] removes them for good.

use crate::{DataState, MergedState, PoolRef};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use tracing::debug;

/// Where masking starts, found by scanning one stack for `mask_after`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MaskBoundary {
    /// The target level appeared in the scanned sequence
    observed: bool,
    /// First position after the final run of the target level, if any
    /// state follows it
    start: Option<usize>,
}

impl MaskBoundary {
    /// Scan levels in chronological order
    ///
    /// Once the target has been seen, the start moves past each run of
    /// other levels and is cleared whenever the target reappears. The result
    /// points just after the last occurrence of the target.
    fn scan<'a>(levels: impl Iterator<Item = Option<&'a str>>, mask_after: &str) -> Self {
        let mut observed = false;
        let mut start = None;

        for (i, level) in levels.enumerate() {
            let is_target = level == Some(mask_after);

            if !observed {
                observed = is_target;
                continue;
            }

            if start.is_none() && !is_target {
                start = Some(i);
            } else if start.is_some() && is_target {
                start = None;
            }
        }

        Self { observed, start }
    }
}

fn selects(state: &DataState, search_str: Option<&str>) -> bool {
    search_str.map_or(true, |s| state.level_contains(s))
}

fn mask_matching<'a>(
    states: impl Iterator<Item = &'a mut DataState>,
    search_str: Option<&str>,
) -> usize {
    let mut count = 0;
    for state in states {
        if state.is_masked() || !selects(state, search_str) {
            continue;
        }
        debug!(level = state.level(), "masking datastate");
        state.mask();
        count += 1;
    }
    count
}

fn unmask_matching<'a>(
    states: impl Iterator<Item = &'a mut DataState>,
    search_str: Option<&str>,
) -> usize {
    let mut count = 0;
    for state in states {
        if !state.is_masked() || !selects(state, search_str) {
            continue;
        }
        debug!(level = state.level(), "unmasking datastate");
        state.unmask();
        count += 1;
    }
    count
}

fn level_filter(state: &DataState, show_none: bool, show_masked: bool) -> bool {
    (show_none || state.level().is_some()) && (show_masked || !state.is_masked())
}

/// Full datastate history of one simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Simulation {
    title: Option<String>,
    active: Vec<DataState>,
    redo: Vec<DataState>,
    /// Dropped by every structural mutation, rebuilt on first read
    #[serde(skip)]
    merged_cache: OnceCell<MergedState>,
}

impl Simulation {
    /// Create an empty simulation
    pub fn new(title: Option<String>) -> Self {
        match &title {
            Some(title) => debug!(title = %title, "created simulation"),
            None => debug!("created simulation"),
        }
        Self {
            title,
            ..Self::default()
        }
    }

    /// Get the title
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set or clear the title
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    fn invalidate(&mut self) {
        self.merged_cache.take();
    }

    // ========================================================================
    // Stack operations
    // ========================================================================

    /// Append a datastate, or replace the top state if `overwrite` is set
    ///
    /// Always clears the redo stack and returns what it held.
    pub fn add_state(&mut self, datastate: DataState, overwrite: bool) -> Vec<DataState> {
        match self.active.last_mut() {
            Some(top) if overwrite => *top = datastate,
            _ => self.active.push(datastate),
        }

        self.invalidate();
        std::mem::take(&mut self.redo)
    }

    /// Move the current state onto the redo stack
    pub fn undo_state(&mut self) {
        if let Some(state) = self.active.pop() {
            self.redo.push(state);
            self.invalidate();
        }
    }

    /// Restore the earliest undone state
    pub fn redo_state(&mut self) {
        if let Some(state) = self.redo.pop() {
            self.active.push(state);
            self.invalidate();
        }
    }

    /// Drop every state from both stacks
    pub fn clear_states(&mut self) {
        self.active.clear();
        self.redo.clear();
        self.invalidate();
    }

    /// Number of states held in both stacks
    pub fn count_states(&self) -> usize {
        self.active.len() + self.redo.len()
    }

    /// States on the active stack, oldest first
    pub fn active_states(&self) -> &[DataState] {
        &self.active
    }

    /// States on the redo stack, most recently undone first
    pub fn redo_states(&self) -> &[DataState] {
        &self.redo
    }

    /// Every state in chronological order (`active ++ reversed(redo)`)
    pub fn all_states(&self) -> impl Iterator<Item = &DataState> {
        self.active.iter().chain(self.redo.iter().rev())
    }

    // ========================================================================
    // Masking
    // ========================================================================

    /// Mask unmasked states whose level contains `search_str` (all states when
    /// `None`), starting after the final occurrence of `mask_after` in the
    /// timeline when it is given
    ///
    /// If `mask_after` never occurs nothing is masked. Returns the number of
    /// states masked.
    pub fn mask_states(&mut self, search_str: Option<&str>, mask_after: Option<&str>) -> usize {
        // Decide per stack, since the final occurrence may sit in either one
        let (active_start, redo_start) = match mask_after {
            None => (Some(0), Some(0)),
            Some(target) => {
                let active = MaskBoundary::scan(self.active.iter().map(DataState::level), target);
                let redo =
                    MaskBoundary::scan(self.redo.iter().rev().map(DataState::level), target);

                if redo.observed {
                    (None, redo.start)
                } else if active.observed {
                    (active.start, Some(0))
                } else {
                    (None, None)
                }
            }
        };

        let mut count = 0;

        if let Some(start) = active_start {
            count += mask_matching(self.active[start..].iter_mut(), search_str);
        }

        if let Some(start) = redo_start {
            // Chronological index `start` is redo index `len - 1 - start`
            let end = self.redo.len().saturating_sub(start);
            count += mask_matching(self.redo[..end].iter_mut().rev(), search_str);
        }

        if count > 0 {
            self.invalidate();
        }

        count
    }

    /// Unmask masked states whose level contains `search_str` (all masked
    /// states when `None`). Returns the number of states unmasked.
    pub fn unmask_states(&mut self, search_str: Option<&str>) -> usize {
        let count = unmask_matching(self.active.iter_mut(), search_str)
            + unmask_matching(self.redo.iter_mut(), search_str);

        if count > 0 {
            self.invalidate();
        }

        count
    }

    /// Permanently remove every masked state from both stacks
    ///
    /// Unmasked states keep their relative order. Removed states cannot be
    /// brought back by unmasking or redo.
    pub fn pop_masked_states(&mut self) -> Vec<DataState> {
        let (masked_active, active): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.active).into_iter().partition(DataState::is_masked);
        let (masked_redo, redo): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.redo).into_iter().partition(DataState::is_masked);

        self.active = active;
        self.redo = redo;
        self.invalidate();

        masked_active.into_iter().chain(masked_redo).collect()
    }

    // ========================================================================
    // Level queries
    // ========================================================================

    /// Levels of the active stack, oldest first
    pub fn get_active_levels(&self, show_none: bool, show_masked: bool) -> Vec<Option<&str>> {
        self.active
            .iter()
            .filter(|s| level_filter(s, show_none, show_masked))
            .map(DataState::level)
            .collect()
    }

    /// Levels of the whole timeline, oldest first
    pub fn get_all_levels(&self, show_none: bool, show_masked: bool) -> Vec<Option<&str>> {
        self.all_states()
            .filter(|s| level_filter(s, show_none, show_masked))
            .map(DataState::level)
            .collect()
    }

    /// Level of the most recent matching active state
    pub fn get_last_level(&self, show_none: bool, show_masked: bool) -> Option<&str> {
        self.active
            .iter()
            .rev()
            .find(|s| level_filter(s, show_none, show_masked))
            .and_then(DataState::level)
    }

    /// Check if an unmasked state in the active stack has the exact level
    pub fn has_active_level(&self, level: &str, show_masked: bool) -> bool {
        self.get_active_levels(false, show_masked)
            .into_iter()
            .any(|l| l == Some(level))
    }

    // ========================================================================
    // Merged view
    // ========================================================================

    /// Merged bindings of the unmasked active states
    pub fn merged_state(&self) -> &MergedState {
        self.merged_cache
            .get_or_init(|| MergedState::from_states(&self.active))
    }

    /// Check if the merged view binds the variable
    pub fn has_data(&self, id: &str) -> bool {
        self.merged_state().has_data(id)
    }

    /// Binding of a variable in the merged view
    pub fn binding(&self, id: &str) -> Option<PoolRef> {
        self.merged_state().binding(id)
    }

    /// Check whether the merged view is currently cached
    pub fn is_merged_cached(&self) -> bool {
        self.merged_cache.get().is_some()
    }
}
