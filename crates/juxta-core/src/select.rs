//! Selection state over loaded items, with stale-result invalidation.

use std::fmt;

use indexmap::IndexSet;

use crate::compare::{CompareOptions, ComparisonResult, aggregate};
use crate::error::{Error, Result};
use crate::item::{Item, ItemId};

/// How items are picked: two named slots for head-to-head comparison, or an
/// ordered multi-select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMode {
    TwoSlot,
    Multi,
}

impl fmt::Display for PickMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickMode::TwoSlot => f.write_str("two-slot"),
            PickMode::Multi => f.write_str("multi"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

/// Derived, never stored: `Comparing` iff a result is held, else `Partial`
/// iff anything is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Partial,
    Comparing,
}

#[derive(Debug, Clone)]
enum Picks {
    Slots {
        a: Option<ItemId>,
        b: Option<ItemId>,
    },
    Multi(IndexSet<ItemId>),
}

/// Tracks which items are picked and caches the latest comparison.
///
/// A held result always describes the current selection: every successful
/// mutation drops it, and failed operations change nothing. Picks are
/// validated against the `available` list passed to each call, so a selection
/// can never reference an item the host has not loaded.
#[derive(Debug, Clone)]
pub struct SelectionState {
    mode: PickMode,
    picks: Picks,
    result: Option<ComparisonResult>,
}

impl SelectionState {
    pub fn new(mode: PickMode) -> SelectionState {
        let picks = match mode {
            PickMode::TwoSlot => Picks::Slots { a: None, b: None },
            PickMode::Multi => Picks::Multi(IndexSet::new()),
        };
        SelectionState {
            mode,
            picks,
            result: None,
        }
    }

    pub fn mode(&self) -> PickMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        if self.result.is_some() {
            Phase::Comparing
        } else if self.is_empty_selection() {
            Phase::Idle
        } else {
            Phase::Partial
        }
    }

    /// Picked ids in selection order. For slots this is slot order (A then
    /// B), skipping empty slots, regardless of which slot was filled first.
    pub fn selected_ids(&self) -> Vec<ItemId> {
        match &self.picks {
            Picks::Slots { a, b } => a.iter().chain(b.iter()).cloned().collect(),
            Picks::Multi(set) => set.iter().cloned().collect(),
        }
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        match &self.picks {
            Picks::Slots { a, b } => a.as_ref() == Some(id) || b.as_ref() == Some(id),
            Picks::Multi(set) => set.contains(id),
        }
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref()
    }

    /// Puts `id` into a slot. Re-picking the id already held by that slot
    /// clears the slot; otherwise the slot is overwritten. The other slot is
    /// untouched.
    pub fn select_slot(&mut self, slot: Slot, id: ItemId, available: &[Item]) -> Result<()> {
        let Picks::Slots { a, b } = &mut self.picks else {
            return Err(Error::PickModeMismatch {
                operation: "select_slot",
                mode: self.mode,
            });
        };
        ensure_known(&id, available)?;
        let target = match slot {
            Slot::A => a,
            Slot::B => b,
        };
        if target.as_ref() == Some(&id) {
            *target = None;
        } else {
            *target = Some(id);
        }
        self.result = None;
        Ok(())
    }

    /// Adds `id` to the selection, or removes it when already picked. Order
    /// of the remaining picks is preserved.
    pub fn toggle(&mut self, id: ItemId, available: &[Item]) -> Result<()> {
        let Picks::Multi(set) = &mut self.picks else {
            return Err(Error::PickModeMismatch {
                operation: "toggle",
                mode: self.mode,
            });
        };
        ensure_known(&id, available)?;
        if !set.shift_remove(&id) {
            set.insert(id);
        }
        self.result = None;
        Ok(())
    }

    /// Replaces the selection with every available item, in list order.
    pub fn select_all(&mut self, available: &[Item]) -> Result<()> {
        let Picks::Multi(set) = &mut self.picks else {
            return Err(Error::PickModeMismatch {
                operation: "select_all",
                mode: self.mode,
            });
        };
        *set = available.iter().map(|item| item.id.clone()).collect();
        self.result = None;
        Ok(())
    }

    pub fn deselect_all(&mut self) -> Result<()> {
        let Picks::Multi(set) = &mut self.picks else {
            return Err(Error::PickModeMismatch {
                operation: "deselect_all",
                mode: self.mode,
            });
        };
        set.clear();
        self.result = None;
        Ok(())
    }

    /// Deselects everything when every available item is already picked,
    /// selects everything otherwise.
    pub fn toggle_select_all(&mut self, available: &[Item]) -> Result<()> {
        let Picks::Multi(set) = &mut self.picks else {
            return Err(Error::PickModeMismatch {
                operation: "toggle_select_all",
                mode: self.mode,
            });
        };
        let all_selected = available.iter().all(|item| set.contains(&item.id));
        if all_selected {
            set.clear();
        } else {
            *set = available.iter().map(|item| item.id.clone()).collect();
        }
        self.result = None;
        Ok(())
    }

    /// Drops a stored result without touching the picks. For settings
    /// changes that make a held table stale.
    pub fn invalidate(&mut self) {
        self.result = None;
    }

    /// Empties the selection. Works in both modes.
    pub fn clear(&mut self) {
        match &mut self.picks {
            Picks::Slots { a, b } => {
                *a = None;
                *b = None;
            }
            Picks::Multi(set) => set.clear(),
        }
        self.result = None;
    }

    /// Computes, stores, and returns the comparison for the current picks.
    ///
    /// The threshold is 2 picked items in two-slot mode and 1 in multi mode;
    /// below it the call fails and a previously stored result is kept. Picked
    /// ids are resolved from `available` in selection order.
    pub fn compare(
        &mut self,
        available: &[Item],
        options: &CompareOptions,
    ) -> Result<&ComparisonResult> {
        let selected = self.selected_ids();
        let required = match self.mode {
            PickMode::TwoSlot => 2,
            PickMode::Multi => 1,
        };
        if selected.len() < required {
            return Err(Error::SelectionTooSmall {
                required,
                selected: selected.len(),
            });
        }
        let mut picked = Vec::with_capacity(selected.len());
        for id in &selected {
            match available.iter().find(|item| &item.id == id) {
                Some(item) => picked.push(item.clone()),
                None => return Err(Error::UnknownItem { id: id.clone() }),
            }
        }
        let result = aggregate(&picked, options);
        Ok(self.result.insert(result))
    }

    fn is_empty_selection(&self) -> bool {
        match &self.picks {
            Picks::Slots { a, b } => a.is_none() && b.is_none(),
            Picks::Multi(set) => set.is_empty(),
        }
    }
}

fn ensure_known(id: &ItemId, available: &[Item]) -> Result<()> {
    if available.iter().any(|item| &item.id == id) {
        Ok(())
    } else {
        Err(Error::UnknownItem { id: id.clone() })
    }
}
