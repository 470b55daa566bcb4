#![forbid(unsafe_code)]

//! The merge orchestrator.
//!
//! Merging projects one container's page/group/item tree into another's
//! visible tree as *copies*, tagged with the id of the container they came
//! from; the child's own tree is untouched, so unmerging is a pure
//! retraction and a merge/unmerge round trip restores the child exactly.
//!
//! Pages consolidate by id: the same page id in two chain members is one
//! logical page, and their group lists union under it. The reserved marker
//! group instead coalesces by id, so deferred-content markers from several
//! chain levels share a single hidden placeholder group.
//!
//! # Ordering obligation
//!
//! `unmerge` must be called starting from the top-most container and
//! proceeding downward. This is deliberately not guarded: a mid-chain
//! unmerge cannot retract copies already propagated to higher ancestors
//! and leaves content visible in two places. [`Surface::merge`] and
//! [`Surface::modify_unmerged`] handle the ordering themselves via an
//! explicit walk over the ancestor chain.

use ribbon_model::{PageDef, sort_by_order};

use crate::container::{Container, ContainerId};
use crate::error::{SurfaceError, SurfaceResult};
use crate::page::Page;
use crate::surface::{AddTrigger, Surface};
use crate::token::TokenId;

impl Surface {
    /// Whether `ancestor` is reachable from `cid` by walking merge-parent
    /// links.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: ContainerId, cid: ContainerId) -> bool {
        let mut cursor = self.containers.get(&cid).and_then(Container::merged_into);
        let mut hops = self.containers.len();
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            if hops == 0 {
                break;
            }
            hops -= 1;
            cursor = self.containers.get(&id).and_then(Container::merged_into);
        }
        false
    }

    /// The merge chain from `cid` (inclusive) up to the top-most container.
    #[must_use]
    pub fn chain_to_top(&self, cid: ContainerId) -> Vec<ContainerId> {
        let mut chain = vec![cid];
        let mut cursor = cid;
        while let Some(parent) = self.containers.get(&cursor).and_then(Container::merged_into) {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            cursor = parent;
        }
        chain
    }

    /// Merge `child`'s visible tree into `parent`.
    ///
    /// A previously merged child of `parent` is evicted back to standalone
    /// state first. If `child` is currently merged elsewhere, its former
    /// chain is unwound, the merge performed, and both affected chains are
    /// re-merged bottom-up so the new content propagates to every top.
    /// Re-merging a child into its current direct parent refreshes the
    /// projected content in place.
    pub fn merge(&mut self, parent: ContainerId, child: ContainerId) -> SurfaceResult<()> {
        if parent == child {
            return Err(SurfaceError::SameContainer(parent));
        }
        self.container(parent)?;
        self.container(child)?;
        if self.is_ancestor(child, parent) {
            return Err(SurfaceError::WouldCycle { parent, child });
        }
        if self.is_ancestor(parent, child)
            && self.container(child)?.merged_into() != Some(parent)
        {
            return Err(SurfaceError::MergedAboveTarget { parent, child });
        }
        let select = self.config.select_child_page_on_merge;
        // Unwind everything above the parent, top-down.
        let chain = self.chain_to_top(parent);
        for i in (1..chain.len()).rev() {
            self.raw_unmerge(chain[i]);
        }
        // Evict the current child; when it is `child` itself this is the
        // refresh path, clearing stale copies before re-projection.
        if self.container(parent)?.merged_child().is_some() {
            self.raw_unmerge(parent);
        }
        // Free the child from its former chain.
        let mut former: Vec<ContainerId> = Vec::new();
        if let Some(old_parent) = self.container(child)?.merged_into() {
            former = self.chain_to_top(old_parent);
            for i in (0..former.len()).rev() {
                self.raw_unmerge(former[i]);
            }
        }
        self.raw_merge(parent, child, select);
        // Re-merge the child's former chain without it, bottom-up.
        for i in 1..former.len() {
            self.raw_merge(former[i], former[i - 1], false);
        }
        // Re-merge the parent's own chain bottom-up so the new content
        // reaches the top-most container.
        for i in 1..chain.len() {
            self.raw_merge(chain[i], chain[i - 1], select);
        }
        Ok(())
    }

    /// Retract the merged child's content from `container` and restore the
    /// child to its standalone page/category set.
    ///
    /// Callers working on a chain must unmerge top-down; see the module
    /// docs. With no merged child this is a no-op.
    pub fn unmerge(&mut self, container: ContainerId) -> SurfaceResult<()> {
        self.container(container)?;
        self.raw_unmerge(container);
        Ok(())
    }

    /// Run a structural mutation against `container` as if it were
    /// standalone, regardless of its current merge depth.
    ///
    /// The chain above the container is unwound top-down, its own merged
    /// child is detached, the action runs, and everything is re-merged
    /// bottom-up even when the action fails, so the tree is never left
    /// partially unmerged. Batch updates are suspended on the top-most
    /// container and activation-side lazy checks are disabled chain-wide
    /// while pages are torn down and rebuilt. A mutation triggered from
    /// inside another mutation short-circuits and runs directly.
    pub fn modify_unmerged<F>(&mut self, container: ContainerId, action: F) -> SurfaceResult<()>
    where
        F: FnOnce(&mut Self) -> SurfaceResult<()>,
    {
        self.container(container)?;
        if self.structure_op {
            return action(self);
        }
        let chain = self.chain_to_top(container);
        let top = chain.last().copied().unwrap_or(container);
        let inner_child = self.container(container)?.merged_child();
        if chain.len() == 1 && inner_child.is_none() {
            self.structure_op = true;
            let result = action(self);
            self.structure_op = false;
            return result;
        }
        self.structure_op = true;
        if let Ok(c) = self.container_mut(top) {
            c.begin_update();
        }
        let saved_selection = self
            .containers
            .get(&top)
            .and_then(|c| c.selected_page().map(str::to_string));
        for id in &chain {
            if let Some(c) = self.containers.get_mut(id) {
                c.lazy_checks_enabled = false;
            }
        }
        for i in (1..chain.len()).rev() {
            self.raw_unmerge(chain[i]);
        }
        if inner_child.is_some() {
            self.raw_unmerge(container);
        }
        let result = action(self);
        // Rewind regardless of the action's outcome.
        if let Some(child) = inner_child
            && self.containers.contains_key(&child)
        {
            self.raw_merge(container, child, false);
        }
        for i in 1..chain.len() {
            self.raw_merge(chain[i], chain[i - 1], false);
        }
        for id in &chain {
            if let Some(c) = self.containers.get_mut(id) {
                c.lazy_checks_enabled = true;
            }
        }
        if let Some(selection) = saved_selection
            && let Some(c) = self.containers.get_mut(&top)
        {
            if c.page(&selection).is_some() {
                c.selected_page = Some(selection);
            } else {
                c.fix_selection();
            }
        }
        if let Ok(c) = self.container_mut(top) {
            c.end_update();
        }
        self.structure_op = false;
        result
    }

    /// Replace content for the pages named in `new_pages`.
    ///
    /// Each targeted page that already exists is cleared first (marker
    /// group excepted), then the new content is added respecting each
    /// page's content mode. Targeted pages that end up with zero groups
    /// are removed; supplying a contentless entry is how a caller deletes
    /// a page. Ids with no matching page are skipped, so a refill that
    /// arrives after its page was torn down is a no-op.
    pub fn refill(&mut self, cid: ContainerId, new_pages: Vec<PageDef>) -> SurfaceResult<()> {
        self.container(cid)?;
        let targeted: Vec<String> = new_pages.iter().map(|d| d.id.clone()).collect();
        self.modify_unmerged(cid, move |s| {
            for id in &targeted {
                if s.container(cid)?.page(id).is_some() {
                    s.clear_page_inner(cid, id, false)?;
                }
            }
            s.add_pages_inner(cid, new_pages, AddTrigger::Refill)?;
            let container = s.container_mut(cid)?;
            let mut dead: Vec<TokenId> = Vec::new();
            retain_untargeted_or_filled(&mut container.pages, &targeted, &mut dead);
            for cat in &mut container.categories {
                retain_untargeted_or_filled(&mut cat.pages, &targeted, &mut dead);
            }
            container.categories.retain(|c| !c.pages.is_empty());
            container.fix_selection();
            for tid in dead {
                s.tokens.remove(&tid);
            }
            Ok(())
        })
    }

    /// Remove a container from the surface, detaching it from any chain it
    /// participates in and dropping the tokens it owns.
    pub fn remove_container(&mut self, cid: ContainerId) -> SurfaceResult<()> {
        self.container(cid)?;
        let chain = self.chain_to_top(cid);
        for i in (1..chain.len()).rev() {
            self.raw_unmerge(chain[i]);
        }
        self.raw_unmerge(cid);
        self.containers.remove(&cid);
        for token in self.tokens.values_mut() {
            if token.container == cid {
                token.active = false;
            }
        }
        self.tokens.retain(|_, t| t.container != cid);
        // Close the gap: re-merge the former ancestors among themselves.
        for i in 2..chain.len() {
            self.raw_merge(chain[i], chain[i - 1], false);
        }
        Ok(())
    }

    /// Single-level merge: copy the child's visible tree into the parent
    /// and link the two.
    pub(crate) fn raw_merge(&mut self, parent_id: ContainerId, child_id: ContainerId, select: bool) {
        let Some(child) = self.containers.get(&child_id) else {
            return;
        };
        let child_pages = child.pages.clone();
        let child_categories = child.categories.clone();
        let child_selected = child.selected_page().map(str::to_string);
        let Some(parent) = self.containers.get_mut(&parent_id) else {
            return;
        };
        for page in &child_pages {
            merge_page_into(&mut parent.pages, page, child_id);
        }
        for category in &child_categories {
            if !parent.categories.iter().any(|c| c.id == category.id) {
                parent
                    .categories
                    .push(crate::category::Category::shell(&category.id, child_id));
            }
            if let Some(target) = parent.categories.iter_mut().find(|c| c.id == category.id) {
                for page in &category.pages {
                    merge_page_into(&mut target.pages, page, child_id);
                }
            }
        }
        sort_by_order(&mut parent.pages);
        for category in &mut parent.categories {
            sort_by_order(&mut category.pages);
        }
        parent.merged_child = Some(child_id);
        if select && child_selected.is_some() {
            parent.selected_page = child_selected.clone();
            parent.last_selected_page = child_selected;
        }
        if let Some(child) = self.containers.get_mut(&child_id) {
            child.merged_into = Some(parent_id);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "merge.attach", parent = %parent_id, child = %child_id);
    }

    /// Single-level unmerge: retract the merged child's copies and unlink.
    pub(crate) fn raw_unmerge(&mut self, parent_id: ContainerId) {
        let Some(parent) = self.containers.get_mut(&parent_id) else {
            return;
        };
        let Some(child_id) = parent.merged_child.take() else {
            return;
        };
        strip_merged(&mut parent.pages, child_id);
        for category in &mut parent.categories {
            strip_merged(&mut category.pages, child_id);
        }
        parent
            .categories
            .retain(|c| !(c.source == Some(child_id) && c.pages.is_empty()));
        for category in &mut parent.categories {
            if category.source == Some(child_id) {
                category.source = None;
            }
        }
        parent.fix_selection();
        if let Some(child) = self.containers.get_mut(&child_id) {
            child.merged_into = None;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "merge.detach", parent = %parent_id, child = %child_id);
    }
}

/// Project one page into a sibling list: union group lists under an
/// id-matching page, or append a tagged shell copy.
fn merge_page_into(pages: &mut Vec<Page>, src: &Page, child_id: ContainerId) {
    if let Some(target) = pages.iter_mut().find(|p| p.id == src.id) {
        for group in &src.groups {
            if group.is_marker()
                && let Some(marker) = target.groups.iter_mut().find(|g| g.is_marker())
            {
                // Marker groups coalesce by id instead of duplicating.
                for item in &group.items {
                    let mut item = item.clone();
                    item.source = Some(child_id);
                    marker.items.push(item);
                }
                continue;
            }
            let mut group = group.clone();
            group.source = Some(child_id);
            if group.is_marker() {
                for item in &mut group.items {
                    item.source = Some(child_id);
                }
            }
            target.groups.push(group);
        }
        sort_by_order(&mut target.groups);
    } else {
        let mut page = src.clone();
        page.source = Some(child_id);
        // The token stays owned by the child's page; the copy references
        // it only through its marker items.
        page.token = None;
        for group in &mut page.groups {
            group.source = Some(child_id);
            if group.is_marker() {
                for item in &mut group.items {
                    item.source = Some(child_id);
                }
            }
        }
        pages.push(page);
    }
}

/// Retract every copy contributed by `child_id` from a page list.
fn strip_merged(pages: &mut Vec<Page>, child_id: ContainerId) {
    for page in pages.iter_mut() {
        for group in page.groups.iter_mut().filter(|g| g.is_marker()) {
            group.items.retain(|it| it.source != Some(child_id));
        }
        page.groups.retain(|g| {
            if g.is_marker() {
                !g.items.is_empty()
            } else {
                g.source != Some(child_id)
            }
        });
        // A marker group inherited from the child but still carrying our
        // own token items becomes parent-owned.
        for group in page.groups.iter_mut().filter(|g| g.is_marker()) {
            if group.source == Some(child_id) {
                group.source = None;
            }
        }
    }
    pages.retain(|p| p.source != Some(child_id) || !p.groups.is_empty());
    for page in pages.iter_mut() {
        if page.source == Some(child_id) {
            page.source = None;
        }
    }
}

fn retain_untargeted_or_filled(pages: &mut Vec<Page>, targeted: &[String], dead: &mut Vec<TokenId>) {
    pages.retain(|page| {
        if targeted.iter().any(|id| *id == page.id) && page.groups.is_empty() {
            if let Some(tid) = page.token {
                dead.push(tid);
            }
            false
        } else {
            true
        }
    });
}
