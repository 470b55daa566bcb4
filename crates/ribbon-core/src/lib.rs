#![forbid(unsafe_code)]

//! Retained tree, merge orchestrator, and deferred-content lifecycle for
//! ribbon command surfaces.
//!
//! A [`Surface`] hosts any number of [`Container`]s, independently owned
//! command surfaces of pages, groups, and items. Containers merge into one
//! another to form a chain in which only the top-most member is visible;
//! merging projects copies, so unmerging restores every member exactly.
//! Page content can be materialized eagerly, withheld until first
//! activation, or populated on demand through a notification/refill
//! handshake, and both concerns compose across merge levels.
//!
//! # Invariants
//!
//! 1. Merge-parent links form an acyclic chain with exactly one top-most
//!    container.
//! 2. A container has at most one merged child; merging another evicts the
//!    first back to standalone state.
//! 3. A page id is unique among siblings but shared across chain members
//!    by design, consolidating their content under one visible page.
//! 4. The marker group id is identical process-wide, so deferred-content
//!    markers from several chain levels coalesce instead of duplicating.
//! 5. A page has at most one live deferred-content token.
//!
//! Everything runs on a single UI-affine thread. On-demand activation only
//! raises a notification and returns; materialization happens later, when
//! the collaborator calls [`Surface::refill`] from the same thread.

pub mod category;
pub mod container;
pub mod error;
pub mod group;
pub mod item;
pub mod merge;
pub mod observer;
pub mod page;
pub mod surface;
pub mod token;

pub use category::Category;
pub use container::{Container, ContainerId};
pub use error::{SurfaceError, SurfaceResult};
pub use group::Group;
pub use item::{Item, ItemFlags};
pub use observer::{NullObserver, SurfaceObserver};
pub use page::{Page, PagePosition};
pub use surface::{Surface, SurfaceConfig};
pub use token::{ContentToken, TokenId};
