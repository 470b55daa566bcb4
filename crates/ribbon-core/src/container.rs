#![forbid(unsafe_code)]

//! Top-level command surfaces.
//!
//! A container owns pages and categories and can participate in a merge
//! chain: at most one merged child and at most one merge parent at a time,
//! forming a singly linked, acyclic chain with exactly one top-most member.

use crate::category::Category;
use crate::page::Page;

/// Identity of a container inside a [`Surface`](crate::Surface) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

impl core::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "container:{}", self.0)
    }
}

/// A top-level composite command surface.
#[derive(Debug, Clone)]
pub struct Container {
    pub(crate) pages: Vec<Page>,
    pub(crate) categories: Vec<Category>,
    pub(crate) merged_child: Option<ContainerId>,
    pub(crate) merged_into: Option<ContainerId>,
    pub(crate) selected_page: Option<String>,
    pub(crate) last_selected_page: Option<String>,
    /// Cleared while the merge orchestrator tears pages down and rebuilds
    /// them, so re-entrant activation handling short-circuits.
    pub(crate) lazy_checks_enabled: bool,
    pub(crate) update_locks: u32,
}

impl Container {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            pages: Vec::new(),
            categories: Vec::new(),
            merged_child: None,
            merged_into: None,
            selected_page: None,
            last_selected_page: None,
            lazy_checks_enabled: true,
            update_locks: 0,
        }
    }

    /// Directly owned pages, in display order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Categories, each with its own pages.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Find a page by id, searching direct pages first, then categories.
    #[must_use]
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages
            .iter()
            .find(|p| p.id == id)
            .or_else(|| self.categories.iter().find_map(|c| c.page(id)))
    }

    pub(crate) fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        if let Some(idx) = self.pages.iter().position(|p| p.id == id) {
            return self.pages.get_mut(idx);
        }
        self.categories
            .iter_mut()
            .find_map(|c| c.pages.iter_mut().find(|p| p.id == id))
    }

    /// All pages, direct and categorized.
    pub fn all_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages
            .iter()
            .chain(self.categories.iter().flat_map(|c| c.pages.iter()))
    }

    /// The container currently merged into this one, if any.
    #[must_use]
    pub fn merged_child(&self) -> Option<ContainerId> {
        self.merged_child
    }

    /// The container this one is currently merged into, if any.
    #[must_use]
    pub fn merged_into(&self) -> Option<ContainerId> {
        self.merged_into
    }

    /// Whether this container is merged into a parent.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged_into.is_some()
    }

    /// Id of the currently selected page.
    #[must_use]
    pub fn selected_page(&self) -> Option<&str> {
        self.selected_page.as_deref()
    }

    /// Id of the most recently selected real page. Unlike
    /// [`selected_page`](Self::selected_page) this is not touched by merge
    /// teardown and rebuild.
    #[must_use]
    pub fn last_selected_page(&self) -> Option<&str> {
        self.last_selected_page.as_deref()
    }

    /// Suspend change notifications for a batch of mutations.
    pub fn begin_update(&mut self) {
        self.update_locks += 1;
    }

    /// Resume change notifications. Saturates at zero.
    pub fn end_update(&mut self) {
        self.update_locks = self.update_locks.saturating_sub(1);
    }

    /// Whether a batch update is in progress.
    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.update_locks > 0
    }

    /// Reset selection to the first page when the selected one is gone.
    pub(crate) fn fix_selection(&mut self) {
        let selected_exists = self
            .selected_page
            .as_deref()
            .is_some_and(|id| self.page(id).is_some());
        if !selected_exists {
            self.selected_page = self
                .pages
                .first()
                .map(|p| p.id.clone())
                .or_else(|| self.categories.iter().find_map(|c| c.pages.first().map(|p| p.id.clone())));
        }
    }
}
