#![forbid(unsafe_code)]

//! Named, colored collections of pages.

use ribbon_model::CategoryDef;

use crate::container::ContainerId;
use crate::page::Page;

/// A named, colored collection of pages inside a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub text: String,
    /// Accent color as `0xRRGGBB`.
    pub color: Option<u32>,
    pub visible: bool,
    pub pages: Vec<Page>,
    pub(crate) source: Option<ContainerId>,
}

impl Category {
    /// Create an empty category from a definition.
    #[must_use]
    pub(crate) fn from_def(def: &CategoryDef) -> Self {
        Self {
            id: def.id.clone(),
            text: def.text.clone(),
            color: def.color,
            visible: def.visible,
            pages: Vec::new(),
            source: None,
        }
    }

    /// Shell created during a merge for another container's category.
    #[must_use]
    pub(crate) fn shell(id: &str, source: ContainerId) -> Self {
        Self {
            id: id.to_string(),
            text: id.to_string(),
            color: None,
            visible: true,
            pages: Vec::new(),
            source: Some(source),
        }
    }

    /// Find a page by id.
    #[must_use]
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Container this category shell was created for during a merge, if any.
    #[must_use]
    pub fn source(&self) -> Option<ContainerId> {
        self.source
    }
}
