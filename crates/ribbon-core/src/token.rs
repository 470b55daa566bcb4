#![forbid(unsafe_code)]

//! Deferred-content tokens.
//!
//! A token records which population policy applies to a page and, when
//! statically known, the withheld declarative definition. It lives in a
//! side table keyed by [`TokenId`] and owned by the surface; the page's own
//! group list carries only a hidden marker group whose items reference the
//! token by id. Because merging copies groups, the marker (and with it the
//! token reference) survives any number of merge levels, while the token
//! itself stays bound to the owning container and page.

use ribbon_model::{ContentMode, PageDef};

use crate::container::ContainerId;

/// Identity of a deferred-content token, issued by the surface's own id
/// generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u64);

impl core::fmt::Display for TokenId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "token:{}", self.0)
    }
}

/// What caused a token resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolveTrigger {
    /// A page was activated somewhere in the merge chain.
    Activation,
    /// Content just arrived through `refill`.
    Refill,
}

/// Side-table entry for a page with deferred content.
#[derive(Debug, Clone)]
pub struct ContentToken {
    pub(crate) container: ContainerId,
    pub(crate) page_id: String,
    pub(crate) mode: ContentMode,
    /// Withheld definition, present once content is known.
    pub(crate) pending: Option<PageDef>,
    pub(crate) active: bool,
    /// Latch so `OnDemandOnce` raises at most one load notification.
    pub(crate) requested: bool,
}

impl ContentToken {
    #[must_use]
    pub(crate) fn new(container: ContainerId, page_id: String, mode: ContentMode) -> Self {
        Self {
            container,
            page_id,
            mode,
            pending: None,
            active: true,
            requested: false,
        }
    }

    /// Owning container.
    #[must_use]
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Owning page id.
    #[must_use]
    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Population policy this token applies.
    #[must_use]
    pub fn mode(&self) -> ContentMode {
        self.mode
    }

    /// Whether materializable content has arrived.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.pending.as_ref().is_some_and(PageDef::has_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ribbon_model::GroupDef;

    #[test]
    fn has_data_requires_non_empty_groups() {
        let mut token =
            ContentToken::new(ContainerId(1), "home".into(), ContentMode::OnDemandOnce);
        assert!(!token.has_data());
        token.pending = Some(PageDef::new("home"));
        assert!(!token.has_data());
        token.pending = Some(PageDef::new("home").group(GroupDef::new("review")));
        assert!(token.has_data());
    }
}
