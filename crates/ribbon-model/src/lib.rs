#![forbid(unsafe_code)]

//! Declarative content definitions for ribbon command surfaces.
//!
//! A collaborator describes content as an ordered tree of pages, groups, and
//! items (`PageDef` → `GroupDef` → `ItemDef`), hands it to a container, and
//! the retained layer in `ribbon-core` decides when to materialize it:
//! immediately, on first activation, or on demand via a refill handshake.
//!
//! Definitions are plain data. They carry no references into the retained
//! tree, so the same definition can be materialized more than once (e.g. an
//! `OnDemandEveryTime` page that is refilled on every activation).

pub mod def;
pub mod order;

pub use def::{
    CategoryDef, CheckState, ContentMode, GroupDef, ItemDef, ItemKind, PageDef,
};
pub use order::{Ordered, assign_orders, assign_orders_with, sort_by_order};

/// Reserved id of the hidden group that anchors a deferred-content token
/// inside a page's own group list.
///
/// The id is identical process-wide so that markers contributed by several
/// merge-chain levels coalesce into a single merged group instead of
/// fragmenting into duplicate placeholders. It is namespaced so that
/// application-supplied group ids cannot collide with it.
pub const MARKER_GROUP_ID: &str = "ribbon.internal.pending";
