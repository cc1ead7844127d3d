#![forbid(unsafe_code)]

//! `juxta` is a headless engine for comparing loosely-schematized CMS content
//! side by side.
//!
//! The building blocks (text normalization, attribute aggregation, selection
//! state, CMS adaptation) live in `juxta-core` and are re-exported here.
//! [`Comparator`] bundles a source, a selection, and comparison settings into
//! one session object for hosts that want a single thing to drive.

use indexmap::{IndexMap, IndexSet};

pub use juxta_core::*;

/// Convenience wrapper that bundles an [`ItemSource`], a [`SelectionState`],
/// and [`CompareOptions`] for one comparison session.
///
/// Intended for UI integrations where threading an item list and options
/// through every call is noisy. It stays runtime-agnostic: [`load`] awaits
/// the source, everything else is CPU-bound.
///
/// Two-slot sessions put the Image/Title rows ahead of the description row;
/// multi sessions skip them. [`with_identity_rows`] overrides that default.
///
/// [`load`]: Comparator::load
/// [`with_identity_rows`]: Comparator::with_identity_rows
#[derive(Debug, Clone)]
pub struct Comparator<S> {
    source: S,
    items: Vec<Item>,
    total: Option<u64>,
    loaded: bool,
    state: SelectionState,
    options: CompareOptions,
}

impl<S: ItemSource> Comparator<S> {
    pub fn new(source: S, mode: PickMode) -> Comparator<S> {
        let identity_rows = mode == PickMode::TwoSlot;
        Comparator {
            source,
            items: Vec::new(),
            total: None,
            loaded: false,
            state: SelectionState::new(mode),
            options: CompareOptions {
                identity_rows,
                ..CompareOptions::default()
            },
        }
    }

    pub fn with_label_overrides(mut self, overrides: IndexMap<String, String>) -> Self {
        self.options.label_overrides = overrides;
        self.state.invalidate();
        self
    }

    pub fn with_active_criteria(mut self, criteria: IndexSet<String>) -> Self {
        self.options.active_criteria = Some(criteria);
        self.state.invalidate();
        self
    }

    pub fn with_identity_rows(mut self, identity_rows: bool) -> Self {
        self.options.identity_rows = identity_rows;
        self.state.invalidate();
        self
    }

    /// Fetches via the source and replaces the option list. The selection and
    /// any stored result are reset; the backend-reported total is kept. A
    /// fetch failure leaves the previous state untouched.
    pub async fn load(&mut self) -> Result<&[Item]> {
        let fetched = self.source.fetch_items().await?;
        self.items = fetched.items;
        self.total = fetched.total;
        self.loaded = true;
        self.state = SelectionState::new(self.state.mode());
        tracing::debug!(count = self.items.len(), "loaded comparison options");
        Ok(&self.items)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The loaded items, in fetch order.
    pub fn options(&self) -> &[Item] {
        &self.items
    }

    /// Collection total as reported by the backend, when it reported one.
    pub fn total_items(&self) -> Option<u64> {
        self.total
    }

    pub fn mode(&self) -> PickMode {
        self.state.mode()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Case-insensitive substring match on titles. A blank query matches
    /// everything.
    pub fn search(&self, query: &str) -> Vec<&Item> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|item| item.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Attribute keys of the loaded items with the session's labels, for
    /// criteria pickers.
    pub fn criteria(&self) -> Vec<Criterion> {
        criterion_options(&self.items, &self.options.label_overrides)
    }

    /// Narrows (or with `None` widens) the attribute rows a comparison
    /// emits. A stored result is invalidated.
    pub fn set_active_criteria(&mut self, criteria: Option<IndexSet<String>>) {
        self.options.active_criteria = criteria;
        self.state.invalidate();
    }

    pub fn select_slot(&mut self, slot: Slot, id: impl Into<ItemId>) -> Result<()> {
        self.state.select_slot(slot, id.into(), &self.items)
    }

    pub fn toggle(&mut self, id: impl Into<ItemId>) -> Result<()> {
        self.state.toggle(id.into(), &self.items)
    }

    pub fn select_all(&mut self) -> Result<()> {
        self.state.select_all(&self.items)
    }

    pub fn deselect_all(&mut self) -> Result<()> {
        self.state.deselect_all()
    }

    pub fn toggle_select_all(&mut self) -> Result<()> {
        self.state.toggle_select_all(&self.items)
    }

    pub fn clear_selection(&mut self) {
        self.state.clear()
    }

    pub fn selected_ids(&self) -> Vec<ItemId> {
        self.state.selected_ids()
    }

    pub fn is_selected(&self, id: &ItemId) -> bool {
        self.state.is_selected(id)
    }

    /// Selected items in selection order.
    pub fn selected_items(&self) -> Vec<&Item> {
        self.state
            .selected_ids()
            .iter()
            .filter_map(|id| self.items.iter().find(|item| &item.id == id))
            .collect()
    }

    /// Computes, stores, and returns the comparison for the current
    /// selection, with the session's settings.
    pub fn compare(&mut self) -> Result<&ComparisonResult> {
        self.state.compare(&self.items, &self.options)
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        self.state.result()
    }

    /// Head-to-head heading: the selected titles joined with `" vs "`.
    /// `None` when nothing is selected.
    pub fn versus_title(&self) -> Option<String> {
        let titles: Vec<&str> = self
            .selected_items()
            .into_iter()
            .map(|item| item.title.as_str())
            .collect();
        if titles.is_empty() {
            None
        } else {
            Some(titles.join(" vs "))
        }
    }
}
