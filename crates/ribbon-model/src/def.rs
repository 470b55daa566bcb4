#![forbid(unsafe_code)]

//! Definition types for declarative content trees.
//!
//! Ids are application-supplied strings. A page id is unique among its
//! siblings, but the *same* id appearing in two merge-chain members is
//! deliberate: it makes the retained layer consolidate both contributions
//! under one visible page.

use crate::order::Ordered;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a page's content is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContentMode {
    /// Content materializes when the definition is added (or, under the
    /// container-wide lazy policy, on first activation).
    #[default]
    Static,
    /// First activation raises a load-requested notification; the arriving
    /// refill materializes the page and it becomes [`ContentMode::Static`].
    OnDemandOnce,
    /// Every activation raises a load-requested notification; refilled
    /// content materializes but the deferred-content token stays alive.
    OnDemandEveryTime,
}

impl ContentMode {
    /// Whether activation of a page in this mode may raise a
    /// load-requested notification.
    #[must_use]
    pub const fn is_on_demand(self) -> bool {
        matches!(self, Self::OnDemandOnce | Self::OnDemandEveryTime)
    }
}

/// Tri-state check value for toggle and checkable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CheckState {
    /// Not yet determined (e.g. mixed selection).
    #[default]
    Unknown,
    Off,
    On,
}

impl CheckState {
    /// Flip the state. `Unknown` resolves to `On` on first interaction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off | Self::Unknown => Self::On,
        }
    }
}

/// Closed set of item variants, consumed by a rendering adapter outside
/// this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ItemKind {
    #[default]
    Button,
    Toggle,
    Checkable,
    Menu,
    SplitButton,
    Gallery,
}

impl ItemKind {
    /// Whether invoking the item flips its [`CheckState`].
    #[must_use]
    pub const fn is_checkable(self) -> bool {
        matches!(self, Self::Toggle | Self::Checkable)
    }
}

/// A leaf or branching command element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemDef {
    /// Identity, unique within the owning group.
    pub id: String,
    /// Display text.
    pub text: String,
    pub kind: ItemKind,
    pub enabled: bool,
    pub checked: CheckState,
    /// Draw a separator before this item.
    pub first_in_group: bool,
    /// Sort key. `0` means "assign in encounter order".
    pub order: u32,
    pub tooltip: Option<String>,
    /// Presence mirrors the item into the global quick-access toolbar, at
    /// this position.
    pub toolbar_order: Option<u32>,
    /// Sub-items for branching kinds (menus, split buttons, galleries).
    pub sub_items: Vec<ItemDef>,
}

impl ItemDef {
    /// Create an item definition with the given id and kind.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ItemKind) -> Self {
        let id = id.into();
        Self {
            text: id.clone(),
            id,
            kind,
            enabled: true,
            checked: CheckState::Unknown,
            first_in_group: false,
            order: 0,
            tooltip: None,
            toolbar_order: None,
            sub_items: Vec::new(),
        }
    }

    /// Shorthand for a plain button.
    #[must_use]
    pub fn button(id: impl Into<String>) -> Self {
        Self::new(id, ItemKind::Button)
    }

    /// Shorthand for a toggle button.
    #[must_use]
    pub fn toggle(id: impl Into<String>) -> Self {
        Self::new(id, ItemKind::Toggle)
    }

    /// Set display text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the explicit sort key.
    #[must_use]
    pub fn order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Set enabled state.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the tri-state check value.
    #[must_use]
    pub fn checked(mut self, checked: CheckState) -> Self {
        self.checked = checked;
        self
    }

    /// Draw a separator before this item.
    #[must_use]
    pub fn first_in_group(mut self, first: bool) -> Self {
        self.first_in_group = first;
        self
    }

    /// Set tooltip text.
    #[must_use]
    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Mirror into the quick-access toolbar at the given position.
    #[must_use]
    pub fn toolbar_order(mut self, order: u32) -> Self {
        self.toolbar_order = Some(order);
        self
    }

    /// Append a sub-item.
    #[must_use]
    pub fn sub_item(mut self, item: ItemDef) -> Self {
        self.sub_items.push(item);
        self
    }
}

impl Ordered for ItemDef {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// An ordered, named collection of items.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupDef {
    /// Identity, unique within the owning page.
    pub id: String,
    /// Display text; defaults to the id.
    pub text: String,
    /// Sort key. `0` means "assign in encounter order".
    pub order: u32,
    pub items: Vec<ItemDef>,
}

impl GroupDef {
    /// Create a group definition.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            text: id.clone(),
            id,
            order: 0,
            items: Vec::new(),
        }
    }

    /// Set display text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the explicit sort key.
    #[must_use]
    pub fn order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Append an item.
    #[must_use]
    pub fn item(mut self, item: ItemDef) -> Self {
        self.items.push(item);
        self
    }
}

impl Ordered for GroupDef {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// An ordered, named collection of groups, optionally inside a category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageDef {
    /// Identity, unique among siblings; shared across merge-chain members
    /// by design to consolidate content under one visible page.
    pub id: String,
    /// Display text; defaults to the id.
    pub text: String,
    /// Sort key. `0` means "assign in encounter order".
    pub order: u32,
    /// Name of the owning category, if any.
    pub category: Option<String>,
    pub content_mode: ContentMode,
    pub groups: Vec<GroupDef>,
}

impl PageDef {
    /// Create a page definition.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            text: id.clone(),
            id,
            order: 0,
            category: None,
            content_mode: ContentMode::Static,
            groups: Vec::new(),
        }
    }

    /// Set display text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the explicit sort key.
    #[must_use]
    pub fn order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Place the page inside a category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the population policy.
    #[must_use]
    pub fn content_mode(mut self, mode: ContentMode) -> Self {
        self.content_mode = mode;
        self
    }

    /// Append a group.
    #[must_use]
    pub fn group(mut self, group: GroupDef) -> Self {
        self.groups.push(group);
        self
    }

    /// Whether the definition carries any materializable content.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.groups.is_empty()
    }
}

impl Ordered for PageDef {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// Display attributes for a named category of pages.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryDef {
    /// Identity, unique within the container.
    pub id: String,
    /// Display text; defaults to the id.
    pub text: String,
    /// Accent color as `0xRRGGBB`.
    pub color: Option<u32>,
    pub visible: bool,
}

impl CategoryDef {
    /// Create a category definition.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            text: id.clone(),
            id,
            color: None,
            visible: true,
        }
    }

    /// Set display text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the accent color (`0xRRGGBB`).
    #[must_use]
    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Set visibility.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}
