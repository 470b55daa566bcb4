#![forbid(unsafe_code)]

//! Materialized item groups.

use ribbon_model::{GroupDef, MARKER_GROUP_ID, Ordered, assign_orders, sort_by_order};

use crate::container::ContainerId;
use crate::item::Item;

/// An ordered, named collection of items, owned by exactly one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    pub text: String,
    pub order: u32,
    pub items: Vec<Item>,
    pub(crate) source: Option<ContainerId>,
}

impl Group {
    /// Materialize a group from a definition.
    #[must_use]
    pub(crate) fn from_def(def: &GroupDef) -> Self {
        let mut group = Self {
            id: def.id.clone(),
            text: def.text.clone(),
            order: def.order,
            items: Vec::new(),
            source: None,
        };
        group.upsert_items(def);
        group
    }

    /// The hidden group anchoring deferred-content tokens. Sorted last so
    /// the placeholder trails real content.
    #[must_use]
    pub(crate) fn marker() -> Self {
        Self {
            id: MARKER_GROUP_ID.to_string(),
            text: String::new(),
            order: u32::MAX,
            items: Vec::new(),
            source: None,
        }
    }

    /// Whether this is the reserved marker group.
    #[must_use]
    pub fn is_marker(&self) -> bool {
        self.id == MARKER_GROUP_ID
    }

    /// Container this group was copied from during a merge, if any.
    #[must_use]
    pub fn source(&self) -> Option<ContainerId> {
        self.source
    }

    /// Merge a re-declared definition into this group: colliding item ids
    /// update display attributes in place, new ids append, then the item
    /// list is re-ordered.
    pub(crate) fn upsert_items(&mut self, def: &GroupDef) {
        self.text = def.text.clone();
        if def.order != 0 {
            self.order = def.order;
        }
        for item_def in &def.items {
            match self.items.iter_mut().find(|it| it.id == item_def.id) {
                Some(existing) => existing.update_from_def(item_def),
                None => self.items.push(Item::from_def(item_def)),
            }
        }
        let mut items = std::mem::take(&mut self.items);
        assign_orders(&mut items);
        sort_by_order(&mut items);
        self.items = items;
    }

    /// Find an item by id, searching sub-items depth-first.
    #[must_use]
    pub fn find_item(&self, id: &str) -> Option<&Item> {
        fn walk<'a>(items: &'a [Item], id: &str) -> Option<&'a Item> {
            for item in items {
                if item.id == id {
                    return Some(item);
                }
                if let Some(found) = walk(&item.sub_items, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.items, id)
    }

    pub(crate) fn find_item_mut(&mut self, id: &str) -> Option<&mut Item> {
        fn walk<'a>(items: &'a mut [Item], id: &str) -> Option<&'a mut Item> {
            for item in items {
                if item.id == id {
                    return Some(item);
                }
                if let Some(found) = walk(&mut item.sub_items, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&mut self.items, id)
    }
}

impl Ordered for Group {
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
    use ribbon_model::ItemDef;

    #[test]
    fn marker_group_sorts_last() {
        let mut groups = vec![Group::marker(), Group::from_def(&GroupDef::new("clipboard"))];
        assign_orders(&mut groups);
        sort_by_order(&mut groups);
        assert!(!groups[0].is_marker());
        assert!(groups[1].is_marker());
    }

    #[test]
    fn upsert_updates_colliding_ids_in_place() {
        let mut group = Group::from_def(
            &GroupDef::new("clipboard").item(ItemDef::button("paste").text("Paste")),
        );
        group.upsert_items(
            &GroupDef::new("clipboard").item(ItemDef::button("paste").text("Paste Special")),
        );
        assert_eq!(group.items.len(), 1);
        assert_eq!(group.items[0].text, "Paste Special");
    }

    #[test]
    fn find_item_descends_into_sub_items() {
        let group = Group::from_def(&GroupDef::new("styles").item(
            ItemDef::new("menu", ribbon_model::ItemKind::Menu).sub_item(ItemDef::button("deep")),
        ));
        assert!(group.find_item("deep").is_some());
        assert!(group.find_item("missing").is_none());
    }
}
