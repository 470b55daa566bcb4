#![forbid(unsafe_code)]

//! Materialized command items.

use bitflags::bitflags;
use ribbon_model::{CheckState, ItemDef, ItemKind, Ordered, assign_orders, sort_by_order};

use crate::container::ContainerId;
use crate::token::TokenId;

bitflags! {
    /// Boolean display state of an item.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ItemFlags: u8 {
        const ENABLED = 1 << 0;
        /// Draw a separator before this item.
        const FIRST_IN_GROUP = 1 << 1;
    }
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self::ENABLED
    }
}

/// A materialized leaf or branching command element.
///
/// Items are created from an [`ItemDef`] at materialization time and
/// destroyed when their owning group is cleared. Marker items additionally
/// carry a [`TokenId`] anchoring a deferred-content token; copies
/// contributed by a merge carry the id of the container they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub text: String,
    pub kind: ItemKind,
    pub flags: ItemFlags,
    pub checked: CheckState,
    pub order: u32,
    pub tooltip: Option<String>,
    /// Presence mirrors the item into the global quick-access toolbar.
    pub toolbar_order: Option<u32>,
    pub sub_items: Vec<Item>,
    pub(crate) token: Option<TokenId>,
    pub(crate) source: Option<ContainerId>,
}

impl Item {
    /// Materialize an item (and its sub-items) from a definition.
    #[must_use]
    pub(crate) fn from_def(def: &ItemDef) -> Self {
        let mut flags = ItemFlags::empty();
        flags.set(ItemFlags::ENABLED, def.enabled);
        flags.set(ItemFlags::FIRST_IN_GROUP, def.first_in_group);
        let mut sub_defs = def.sub_items.clone();
        assign_orders(&mut sub_defs);
        sort_by_order(&mut sub_defs);
        Self {
            id: def.id.clone(),
            text: def.text.clone(),
            kind: def.kind,
            flags,
            checked: def.checked,
            order: def.order,
            tooltip: def.tooltip.clone(),
            toolbar_order: def.toolbar_order,
            sub_items: sub_defs.iter().map(Item::from_def).collect(),
            token: None,
            source: None,
        }
    }

    /// Hidden item anchoring a deferred-content token inside a marker group.
    #[must_use]
    pub(crate) fn marker(token: TokenId) -> Self {
        Self {
            id: format!("ribbon.internal.pending.{}", token.0),
            text: String::from("Loading\u{2026}"),
            kind: ItemKind::Button,
            flags: ItemFlags::empty(),
            checked: CheckState::Unknown,
            order: 0,
            tooltip: None,
            toolbar_order: None,
            sub_items: Vec::new(),
            token: Some(token),
            source: None,
        }
    }

    /// Update display attributes in place from a re-declared definition
    /// with the same id. The id itself and any sub-item structure already
    /// materialized stay untouched; sub-items are upserted recursively.
    pub(crate) fn update_from_def(&mut self, def: &ItemDef) {
        self.text = def.text.clone();
        self.kind = def.kind;
        self.flags.set(ItemFlags::ENABLED, def.enabled);
        self.flags.set(ItemFlags::FIRST_IN_GROUP, def.first_in_group);
        self.checked = def.checked;
        self.tooltip = def.tooltip.clone();
        self.toolbar_order = def.toolbar_order;
        if def.order != 0 {
            self.order = def.order;
        }
        for sub in &def.sub_items {
            match self.sub_items.iter_mut().find(|it| it.id == sub.id) {
                Some(existing) => existing.update_from_def(sub),
                None => self.sub_items.push(Item::from_def(sub)),
            }
        }
        let mut subs = std::mem::take(&mut self.sub_items);
        assign_orders(&mut subs);
        sort_by_order(&mut subs);
        self.sub_items = subs;
    }

    /// Whether the item responds to invocation.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ItemFlags::ENABLED)
    }

    /// Deferred-content token anchored by this item, if it is a marker.
    #[must_use]
    pub fn token(&self) -> Option<TokenId> {
        self.token
    }

    /// Container this item was copied from during a merge, if any.
    #[must_use]
    pub fn source(&self) -> Option<ContainerId> {
        self.source
    }
}

impl Ordered for Item {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_def_maps_flags_and_sorts_sub_items() {
        let def = ItemDef::new("styles", ItemKind::Menu)
            .enabled(false)
            .first_in_group(true)
            .sub_item(ItemDef::button("b").order(2))
            .sub_item(ItemDef::button("a"));
        let item = Item::from_def(&def);
        assert!(!item.is_enabled());
        assert!(item.flags.contains(ItemFlags::FIRST_IN_GROUP));
        // "a" was unset and takes order 1, sorting before "b" at 2.
        assert_eq!(item.sub_items[0].id, "a");
        assert_eq!(item.sub_items[1].id, "b");
    }

    #[test]
    fn update_from_def_keeps_id_and_upserts_sub_items() {
        let mut item = Item::from_def(&ItemDef::button("paste").text("Paste"));
        let redecl = ItemDef::toggle("paste")
            .text("Paste Special")
            .enabled(false)
            .sub_item(ItemDef::button("paste-values"));
        item.update_from_def(&redecl);
        assert_eq!(item.id, "paste");
        assert_eq!(item.text, "Paste Special");
        assert_eq!(item.kind, ItemKind::Toggle);
        assert!(!item.is_enabled());
        assert_eq!(item.sub_items.len(), 1);
    }

    #[test]
    fn marker_item_carries_token_and_is_disabled() {
        let item = Item::marker(TokenId(7));
        assert_eq!(item.token(), Some(TokenId(7)));
        assert!(!item.is_enabled());
        assert!(item.id.contains("pending"));
    }
}
