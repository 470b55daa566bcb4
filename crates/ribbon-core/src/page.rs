#![forbid(unsafe_code)]

//! Materialized pages and page-position classification.

use ribbon_model::{ContentMode, Ordered, PageDef};

use crate::container::ContainerId;
use crate::group::Group;
use crate::token::TokenId;

/// Where a page sits inside a container's visible tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePosition {
    /// Directly owned by the container.
    Owned,
    /// Owned, inside a category.
    InCategory,
    /// Shell created by a merge for another container's content.
    Merged,
    /// Merge shell inside a category.
    MergedInCategory,
}

/// An ordered, named collection of groups.
///
/// A page is created when first referenced by a declarative definition and
/// destroyed when its owner removes it (typically because it became empty
/// after a clear). At most one deferred-content token is live per page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: String,
    pub text: String,
    pub order: u32,
    pub content_mode: ContentMode,
    pub groups: Vec<Group>,
    pub(crate) token: Option<TokenId>,
    pub(crate) source: Option<ContainerId>,
}

impl Page {
    /// Create an empty page shell from a definition header.
    #[must_use]
    pub(crate) fn shell(def: &PageDef) -> Self {
        Self {
            id: def.id.clone(),
            text: def.text.clone(),
            order: def.order,
            content_mode: def.content_mode,
            groups: Vec::new(),
            token: None,
            source: None,
        }
    }

    /// Find a group by id.
    #[must_use]
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// The hidden marker group, if present.
    #[must_use]
    pub fn marker_group(&self) -> Option<&Group> {
        self.groups.iter().find(|g| g.is_marker())
    }

    pub(crate) fn marker_group_mut(&mut self) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.is_marker())
    }

    /// Number of real (non-marker) groups.
    #[must_use]
    pub fn content_group_count(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_marker()).count()
    }

    /// Whether the page holds no groups at all. A marker group counts:
    /// a page waiting on deferred content must survive emptiness sweeps.
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.groups.is_empty()
    }

    /// The live deferred-content token for this page, if any.
    #[must_use]
    pub fn token(&self) -> Option<TokenId> {
        self.token
    }

    /// Container this page shell was created for during a merge, if any.
    #[must_use]
    pub fn source(&self) -> Option<ContainerId> {
        self.source
    }
}

impl Ordered for Page {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}
