#![forbid(unsafe_code)]

//! The surface: a container arena plus the deferred-content lifecycle.
//!
//! A [`Surface`] owns every container, the token side table, and the id
//! generator behind both. Token and container ids are scoped to the
//! surface instance, so two surfaces never share state and tests are
//! deterministic. Structural mutation always goes through the surface;
//! mutating a container's retained tree directly is not supported and
//! would desynchronize the token bookkeeping.
//!
//! Content population per page:
//!
//! - `Static` materializes immediately, unless
//!   [`SurfaceConfig::lazy_static_content`] is set, in which case the
//!   definition is withheld on a token until first activation.
//! - `OnDemandOnce` raises a single load-requested notification on first
//!   activation; the arriving [`refill`](Surface::refill) materializes the
//!   page and settles it to `Static`.
//! - `OnDemandEveryTime` raises the notification on every activation; a
//!   refill materializes content but keeps the token alive for the next
//!   round.

use ahash::AHashMap;
use ribbon_model::{
    CategoryDef, CheckState, ContentMode, PageDef, assign_orders_with, sort_by_order,
};

use crate::category::Category;
use crate::container::{Container, ContainerId};
use crate::error::{SurfaceError, SurfaceResult};
use crate::group::Group;
use crate::item::Item;
use crate::observer::{NullObserver, SurfaceObserver};
use crate::page::{Page, PagePosition};
use crate::token::{ContentToken, ResolveTrigger, TokenId};

/// Surface-wide policies.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceConfig {
    /// Withhold static page content on a token until first activation.
    pub lazy_static_content: bool,
    /// On merge, switch the parent's selected page to mirror the child's.
    pub select_child_page_on_merge: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            lazy_static_content: false,
            select_child_page_on_merge: true,
        }
    }
}

impl SurfaceConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Withhold static content until first activation.
    #[must_use]
    pub fn lazy_static_content(mut self, lazy: bool) -> Self {
        self.lazy_static_content = lazy;
        self
    }

    /// Mirror the child's selected page on merge.
    #[must_use]
    pub fn select_child_page_on_merge(mut self, select: bool) -> Self {
        self.select_child_page_on_merge = select;
        self
    }
}

/// What caused content to be added to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddTrigger {
    /// A collaborator declared content up front.
    Declare,
    /// Content arrived through [`Surface::refill`].
    Refill,
}

/// Container arena and merge/lazy-load orchestrator.
pub struct Surface {
    pub(crate) config: SurfaceConfig,
    pub(crate) containers: AHashMap<ContainerId, Container>,
    pub(crate) tokens: AHashMap<TokenId, ContentToken>,
    pub(crate) observer: Box<dyn SurfaceObserver>,
    /// Re-entrancy short-circuit for transactional structural mutation.
    pub(crate) structure_op: bool,
    next_id: u64,
}

impl Surface {
    /// Create an empty surface.
    #[must_use]
    pub fn new(config: SurfaceConfig) -> Self {
        Self {
            config,
            containers: AHashMap::new(),
            tokens: AHashMap::new(),
            observer: Box::new(NullObserver),
            structure_op: false,
            next_id: 0,
        }
    }

    /// Install the notification sink. Replaces any previous observer.
    pub fn set_observer(&mut self, observer: Box<dyn SurfaceObserver>) {
        self.observer = observer;
    }

    /// Surface-wide policies.
    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub(crate) fn next_raw_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Create a new, empty, unmerged container.
    pub fn add_container(&mut self) -> ContainerId {
        let id = ContainerId(self.next_raw_id());
        self.containers.insert(id, Container::new());
        id
    }

    /// Borrow a container.
    pub fn container(&self, id: ContainerId) -> SurfaceResult<&Container> {
        self.containers
            .get(&id)
            .ok_or(SurfaceError::UnknownContainer(id))
    }

    pub(crate) fn container_mut(&mut self, id: ContainerId) -> SurfaceResult<&mut Container> {
        self.containers
            .get_mut(&id)
            .ok_or(SurfaceError::UnknownContainer(id))
    }

    /// Look up a token side-table entry.
    #[must_use]
    pub fn token(&self, id: TokenId) -> Option<&ContentToken> {
        self.tokens.get(&id)
    }

    /// Declare or update a category's display attributes.
    pub fn define_category(&mut self, cid: ContainerId, def: &CategoryDef) -> SurfaceResult<()> {
        let container = self.container_mut(cid)?;
        match container.categories.iter_mut().find(|c| c.id == def.id) {
            Some(cat) => {
                cat.text = def.text.clone();
                cat.color = def.color;
                cat.visible = def.visible;
                cat.source = None;
            }
            None => container.categories.push(Category::from_def(def)),
        }
        Ok(())
    }

    /// Add declarative content to a container, regardless of its current
    /// merge depth.
    pub fn add_pages(&mut self, cid: ContainerId, defs: Vec<PageDef>) -> SurfaceResult<()> {
        self.container(cid)?;
        self.modify_unmerged(cid, move |s| s.add_pages_inner(cid, defs, AddTrigger::Declare))
    }

    pub(crate) fn add_pages_inner(
        &mut self,
        cid: ContainerId,
        mut defs: Vec<PageDef>,
        trigger: AddTrigger,
    ) -> SurfaceResult<()> {
        {
            let container = self.container(cid)?;
            // A refill only replaces content; ids with no matching page
            // (already torn down) are silently dropped.
            if trigger == AddTrigger::Refill {
                defs.retain(|def| container.page(&def.id).is_some());
            }
            // A def re-declaring an existing page without an explicit order
            // inherits the page's current one, so adding groups to a page
            // never relocates it in the tab strip.
            let mut taken: Vec<u32> = Vec::new();
            for page in container.all_pages() {
                match defs.iter_mut().find(|d| d.id == page.id) {
                    Some(def) if def.order == 0 => def.order = page.order,
                    _ => taken.push(page.order),
                }
            }
            assign_orders_with(&mut defs, taken);
        }
        for def in defs {
            self.add_page_def(cid, def, trigger)?;
        }
        let container = self.container_mut(cid)?;
        sort_by_order(&mut container.pages);
        for cat in &mut container.categories {
            sort_by_order(&mut cat.pages);
        }
        Ok(())
    }

    fn add_page_def(
        &mut self,
        cid: ContainerId,
        def: PageDef,
        trigger: AddTrigger,
    ) -> SurfaceResult<()> {
        let pre_existing = self.container(cid)?.page(&def.id).is_some();
        {
            let container = self.container_mut(cid)?;
            if pre_existing {
                if let Some(page) = container.page_mut(&def.id) {
                    page.text = def.text.clone();
                    if def.order != 0 {
                        page.order = def.order;
                    }
                    page.source = None;
                    if trigger == AddTrigger::Declare {
                        page.content_mode = def.content_mode;
                    }
                }
            } else {
                let shell = Page::shell(&def);
                match &def.category {
                    Some(cat_id) => {
                        if !container.categories.iter().any(|c| c.id == *cat_id) {
                            container
                                .categories
                                .push(Category::from_def(&CategoryDef::new(cat_id.clone())));
                        }
                        if let Some(cat) =
                            container.categories.iter_mut().find(|c| c.id == *cat_id)
                        {
                            cat.pages.push(shell);
                        }
                    }
                    None => container.pages.push(shell),
                }
            }
        }
        let token_id = self.container(cid)?.page(&def.id).and_then(Page::token);
        match trigger {
            AddTrigger::Declare => self.declare_content(cid, def),
            AddTrigger::Refill => match token_id {
                Some(tid) => {
                    if let Some(token) = self.tokens.get_mut(&tid) {
                        token.pending = Some(def);
                    }
                    self.resolve_token(tid, ResolveTrigger::Refill)
                }
                // Stale ids were dropped before assignment, so a tokenless
                // target is always a pre-existing page.
                None => {
                    if def.has_content() {
                        self.materialize_def_into_page(cid, &def.id.clone(), &def)?;
                        if let Some(page) = self.container_mut(cid)?.page_mut(&def.id)
                            && page.content_mode != ContentMode::OnDemandEveryTime
                        {
                            page.content_mode = ContentMode::Static;
                        }
                    }
                    Ok(())
                }
            },
        }
    }

    fn declare_content(&mut self, cid: ContainerId, def: PageDef) -> SurfaceResult<()> {
        match def.content_mode {
            ContentMode::Static if !self.config.lazy_static_content => {
                if def.has_content() {
                    self.materialize_def_into_page(cid, &def.id.clone(), &def)?;
                }
                // A static page with no declared groups intentionally
                // stays empty.
                Ok(())
            }
            ContentMode::Static => {
                if def.has_content() {
                    let tid = self.create_token(cid, &def.id.clone(), ContentMode::Static)?;
                    if let Some(token) = self.tokens.get_mut(&tid) {
                        token.pending = Some(def);
                    }
                }
                Ok(())
            }
            mode => {
                let tid = self.create_token(cid, &def.id.clone(), mode)?;
                if def.has_content()
                    && let Some(token) = self.tokens.get_mut(&tid)
                {
                    token.pending = Some(def);
                }
                Ok(())
            }
        }
    }

    /// Materialize a definition's groups and items into an existing page.
    fn materialize_def_into_page(
        &mut self,
        cid: ContainerId,
        page_id: &str,
        def: &PageDef,
    ) -> SurfaceResult<()> {
        let container = self.container_mut(cid)?;
        let Some(page) = container.page_mut(page_id) else {
            return Err(SurfaceError::UnknownPage {
                container: cid,
                page: page_id.to_string(),
            });
        };
        let mut group_defs = def.groups.clone();
        // As with pages, a def re-declaring an existing group without an
        // explicit order keeps the group where it is.
        let mut taken: Vec<u32> = Vec::new();
        for group in page.groups.iter().filter(|g| !g.is_marker()) {
            match group_defs.iter_mut().find(|d| d.id == group.id) {
                Some(gd) if gd.order == 0 => gd.order = group.order,
                _ => taken.push(group.order),
            }
        }
        assign_orders_with(&mut group_defs, taken);
        for group_def in &group_defs {
            match page
                .groups
                .iter_mut()
                .find(|g| g.id == group_def.id && !g.is_marker())
            {
                Some(group) => group.upsert_items(group_def),
                None => page.groups.push(Group::from_def(group_def)),
            }
        }
        sort_by_order(&mut page.groups);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            message = "page.materialize",
            container = %cid,
            page = page_id,
            groups = group_defs.len()
        );
        Ok(())
    }

    /// Create (or reuse, since a page has at most one) the deferred-content
    /// token for a page and anchor its marker in the group list.
    fn create_token(
        &mut self,
        cid: ContainerId,
        page_id: &str,
        mode: ContentMode,
    ) -> SurfaceResult<TokenId> {
        if let Some(tid) = self.container(cid)?.page(page_id).and_then(Page::token)
            && let Some(token) = self.tokens.get_mut(&tid)
        {
            token.mode = mode;
            if let Some(page) = self.container_mut(cid)?.page_mut(page_id) {
                page.content_mode = mode;
            }
            return Ok(tid);
        }
        let tid = TokenId(self.next_raw_id());
        self.tokens
            .insert(tid, ContentToken::new(cid, page_id.to_string(), mode));
        let container = self.container_mut(cid)?;
        let Some(page) = container.page_mut(page_id) else {
            return Err(SurfaceError::UnknownPage {
                container: cid,
                page: page_id.to_string(),
            });
        };
        page.token = Some(tid);
        page.content_mode = mode;
        if page.marker_group_mut().is_none() {
            page.groups.push(Group::marker());
        }
        if let Some(marker) = page.marker_group_mut() {
            marker.items.push(Item::marker(tid));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "token.create", container = %cid, page = page_id, token = %tid);
        Ok(tid)
    }

    /// Drop a page's token and its marker anchor.
    fn remove_token_for_page(&mut self, cid: ContainerId, page_id: &str) -> SurfaceResult<()> {
        let container = self.container_mut(cid)?;
        let Some(page) = container.page_mut(page_id) else {
            return Ok(());
        };
        let Some(tid) = page.token.take() else {
            return Ok(());
        };
        if let Some(marker) = page.marker_group_mut() {
            marker.items.retain(|it| it.token != Some(tid));
        }
        page.groups.retain(|g| !(g.is_marker() && g.items.is_empty()));
        if let Some(token) = self.tokens.get_mut(&tid) {
            token.active = false;
        }
        self.tokens.remove(&tid);
        Ok(())
    }

    /// Resolve a token: materialize its pending definition into the owning
    /// page, then retire the token unless an `OnDemandEveryTime` cycle is
    /// being kept alive by a refill.
    pub(crate) fn resolve_token(
        &mut self,
        tid: TokenId,
        trigger: ResolveTrigger,
    ) -> SurfaceResult<()> {
        let (owner, page_id, mode, def) = {
            let Some(token) = self.tokens.get_mut(&tid) else {
                return Ok(());
            };
            if !token.active {
                return Ok(());
            }
            let Some(def) = token.pending.take() else {
                return Ok(());
            };
            (token.container, token.page_id.clone(), token.mode, def)
        };
        if !self.containers.contains_key(&owner) {
            self.tokens.remove(&tid);
            return Ok(());
        }
        self.modify_unmerged(owner, move |s| {
            if s.container(owner)?.page(&page_id).is_none() {
                // Owning page disappeared between scheduling and
                // resolution: no data, drop the token.
                s.tokens.remove(&tid);
                return Ok(());
            }
            s.materialize_def_into_page(owner, &page_id, &def)?;
            let keep = mode == ContentMode::OnDemandEveryTime && trigger == ResolveTrigger::Refill;
            if keep {
                if let Some(token) = s.tokens.get_mut(&tid) {
                    token.requested = false;
                }
            } else {
                s.remove_token_for_page(owner, &page_id)?;
                if mode != ContentMode::OnDemandEveryTime
                    && let Some(page) = s.container_mut(owner)?.page_mut(&page_id)
                {
                    page.content_mode = ContentMode::Static;
                }
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                message = "token.resolve",
                container = %owner,
                page = page_id.as_str(),
                token = %tid,
                kept = keep
            );
            Ok(())
        })
    }

    /// Activate a page: record selection, then resolve or request every
    /// deferred-content token reachable from the visible page (own or
    /// merged in).
    ///
    /// Activating an unknown page, or activating while the merge
    /// orchestrator is rebuilding the chain, is a no-op.
    pub fn activate_page(&mut self, cid: ContainerId, page_id: &str) -> SurfaceResult<()> {
        {
            let container = self.container(cid)?;
            if !container.lazy_checks_enabled || container.page(page_id).is_none() {
                return Ok(());
            }
        }
        {
            let container = self.container_mut(cid)?;
            container.selected_page = Some(page_id.to_string());
            container.last_selected_page = Some(page_id.to_string());
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(message = "page.activate", container = %cid, page = page_id);
        let token_ids: Vec<TokenId> = self
            .container(cid)?
            .page(page_id)
            .map(|page| {
                page.groups
                    .iter()
                    .filter(|g| g.is_marker())
                    .flat_map(|g| g.items.iter())
                    .filter_map(Item::token)
                    .collect()
            })
            .unwrap_or_default();
        for tid in token_ids {
            self.resolve_or_request(cid, page_id, tid)?;
        }
        // Resolution rebuilds the chain; re-assert the visible selection.
        if let Ok(container) = self.container_mut(cid) {
            if container.page(page_id).is_some() {
                container.selected_page = Some(page_id.to_string());
            } else {
                container.fix_selection();
            }
        }
        Ok(())
    }

    fn resolve_or_request(
        &mut self,
        visible: ContainerId,
        page_id: &str,
        tid: TokenId,
    ) -> SurfaceResult<()> {
        let Some(token) = self.tokens.get(&tid) else {
            self.discard_marker_item(visible, page_id, tid);
            return Ok(());
        };
        let owner = token.container;
        let owner_page = token.page_id.clone();
        let mode = token.mode;
        let active = token.active;
        let has_data = token.has_data();
        let requested = token.requested;
        let owner_alive = self
            .containers
            .get(&owner)
            .is_some_and(|c| c.page(&owner_page).is_some());
        if !active || !owner_alive {
            // The token lost its owner: treated as no data, the marker is
            // silently discarded.
            self.tokens.remove(&tid);
            self.discard_marker_item(visible, page_id, tid);
            return Ok(());
        }
        if has_data {
            return self.resolve_token(tid, ResolveTrigger::Activation);
        }
        if mode.is_on_demand() {
            if mode == ContentMode::OnDemandOnce && requested {
                return Ok(());
            }
            if let Some(token) = self.tokens.get_mut(&tid) {
                token.requested = true;
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(message = "token.request", container = %owner, page = owner_page.as_str());
            self.observer.load_requested(owner, &owner_page, mode);
        }
        Ok(())
    }

    fn discard_marker_item(&mut self, cid: ContainerId, page_id: &str, tid: TokenId) {
        if let Some(container) = self.containers.get_mut(&cid)
            && let Some(page) = container.page_mut(page_id)
        {
            if let Some(marker) = page.marker_group_mut() {
                marker.items.retain(|it| it.token != Some(tid));
            }
            page.groups.retain(|g| !(g.is_marker() && g.items.is_empty()));
        }
    }

    /// Set the selected page without any deferred-content handling.
    ///
    /// Returns `false` when the page does not exist.
    pub fn select_page(&mut self, cid: ContainerId, page_id: &str) -> SurfaceResult<bool> {
        let container = self.container_mut(cid)?;
        if container.page(page_id).is_none() {
            return Ok(false);
        }
        container.selected_page = Some(page_id.to_string());
        container.last_selected_page = Some(page_id.to_string());
        Ok(true)
    }

    /// Classify a page's position inside a container's visible tree.
    #[must_use]
    pub fn page_position(&self, cid: ContainerId, page_id: &str) -> Option<PagePosition> {
        let container = self.containers.get(&cid)?;
        if let Some(page) = container.pages.iter().find(|p| p.id == page_id) {
            return Some(if page.source.is_some() {
                PagePosition::Merged
            } else {
                PagePosition::Owned
            });
        }
        for cat in &container.categories {
            if let Some(page) = cat.page(page_id) {
                return Some(if page.source.is_some() || cat.source.is_some() {
                    PagePosition::MergedInCategory
                } else {
                    PagePosition::InCategory
                });
            }
        }
        None
    }

    /// Fire a leaf command. Toggle-like items flip their check state in
    /// every chain member holding a copy, so the owning tree and the
    /// visible aggregate stay in sync.
    pub fn invoke_item(
        &mut self,
        cid: ContainerId,
        page_id: &str,
        item_id: &str,
    ) -> SurfaceResult<CheckState> {
        self.container(cid)?;
        let mut checked = None;
        // Walk from the chain's top so copies above the invoked member
        // flip along with the owning container and everything below it.
        let top = self.chain_to_top(cid).last().copied().unwrap_or(cid);
        let mut cursor = Some(top);
        while let Some(id) = cursor {
            cursor = self.containers.get(&id).and_then(Container::merged_child);
            if let Some(container) = self.containers.get_mut(&id)
                && let Some(page) = container.page_mut(page_id)
            {
                for group in &mut page.groups {
                    if let Some(item) = group.find_item_mut(item_id) {
                        if item.kind.is_checkable() {
                            item.checked = item.checked.toggled();
                        }
                        checked.get_or_insert(item.checked);
                        break;
                    }
                }
            }
        }
        let Some(checked) = checked else {
            return Err(SurfaceError::UnknownItem {
                page: page_id.to_string(),
                item: item_id.to_string(),
            });
        };
        self.observer.command_invoked(cid, item_id, checked);
        Ok(checked)
    }

    /// Items mirrored into the global quick-access toolbar, in toolbar
    /// order. Merged-in copies are skipped; only owning containers
    /// contribute.
    #[must_use]
    pub fn quick_access_items(&self) -> Vec<(ContainerId, &Item)> {
        let mut ids: Vec<ContainerId> = self.containers.keys().copied().collect();
        ids.sort_unstable();
        let mut out: Vec<(ContainerId, &Item)> = Vec::new();
        for cid in ids {
            let Some(container) = self.containers.get(&cid) else {
                continue;
            };
            for page in container.all_pages() {
                for group in page.groups.iter().filter(|g| !g.is_marker()) {
                    for item in &group.items {
                        if item.source.is_none() && item.toolbar_order.is_some() {
                            out.push((cid, item));
                        }
                    }
                }
            }
        }
        out.sort_by_key(|(cid, item)| (item.toolbar_order.unwrap_or(u32::MAX), *cid));
        out
    }

    /// Remove every page and category of a container, tokens included.
    pub fn clear(&mut self, cid: ContainerId) -> SurfaceResult<()> {
        self.container(cid)?;
        self.modify_unmerged(cid, move |s| {
            let container = s.container_mut(cid)?;
            container.pages.clear();
            container.categories.clear();
            container.selected_page = None;
            s.tokens.retain(|_, t| t.container != cid);
            Ok(())
        })
    }

    /// Clear a page's materialized content.
    ///
    /// A non-total clear keeps the marker group, and with it the token, for
    /// `OnDemandEveryTime` pages; `total` removes everything.
    pub fn clear_page_contents(
        &mut self,
        cid: ContainerId,
        page_id: &str,
        total: bool,
    ) -> SurfaceResult<()> {
        self.container(cid)?;
        self.modify_unmerged(cid, move |s| s.clear_page_inner(cid, page_id, total))
    }

    pub(crate) fn clear_page_inner(
        &mut self,
        cid: ContainerId,
        page_id: &str,
        total: bool,
    ) -> SurfaceResult<()> {
        let tid = match self.container(cid)?.page(page_id) {
            None => return Ok(()),
            Some(page) => page.token,
        };
        let keep_token = !total
            && tid.is_some_and(|t| {
                self.tokens
                    .get(&t)
                    .is_some_and(|tok| tok.mode == ContentMode::OnDemandEveryTime)
            });
        let container = self.container_mut(cid)?;
        if let Some(page) = container.page_mut(page_id) {
            if keep_token {
                page.groups.retain(Group::is_marker);
            } else {
                page.groups.clear();
                page.token = None;
            }
        }
        if !keep_token && let Some(t) = tid {
            self.tokens.remove(&t);
        }
        Ok(())
    }

    /// Drop pages with zero groups and categories with zero pages. Pages
    /// waiting on deferred content keep their marker group and survive.
    pub fn remove_void_containers(&mut self, cid: ContainerId) -> SurfaceResult<()> {
        let container = self.container_mut(cid)?;
        let mut dead: Vec<TokenId> = Vec::new();
        retain_non_void(&mut container.pages, &mut dead);
        for cat in &mut container.categories {
            retain_non_void(&mut cat.pages, &mut dead);
        }
        container.categories.retain(|c| !c.pages.is_empty());
        container.fix_selection();
        for tid in dead {
            self.tokens.remove(&tid);
        }
        Ok(())
    }
}

fn retain_non_void(pages: &mut Vec<Page>, dead: &mut Vec<TokenId>) {
    pages.retain(|page| {
        if page.is_void() {
            if let Some(tid) = page.token {
                dead.push(tid);
            }
            false
        } else {
            true
        }
    });
}
