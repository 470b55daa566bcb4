#![forbid(unsafe_code)]

//! Error types for structural surface operations.

use std::fmt;

use crate::container::ContainerId;

/// Result of a structural surface operation.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors raised by structural surface operations.
///
/// Note that out-of-order `unmerge` is deliberately *not* an error: it is a
/// documented caller obligation, and violating it produces duplicated
/// visible content instead of a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The container id is not part of this surface.
    UnknownContainer(ContainerId),
    /// No page with this id exists in the container.
    UnknownPage {
        container: ContainerId,
        page: String,
    },
    /// No item with this id exists in the page.
    UnknownItem { page: String, item: String },
    /// Merging a container into itself.
    SameContainer(ContainerId),
    /// The requested merge would close the chain into a cycle.
    WouldCycle {
        parent: ContainerId,
        child: ContainerId,
    },
    /// The child is already merged below the requested parent at a deeper
    /// level; re-merge through its direct parent instead.
    MergedAboveTarget {
        parent: ContainerId,
        child: ContainerId,
    },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownContainer(id) => write!(f, "unknown {id}"),
            Self::UnknownPage { container, page } => {
                write!(f, "no page '{page}' in {container}")
            }
            Self::UnknownItem { page, item } => {
                write!(f, "no item '{item}' in page '{page}'")
            }
            Self::SameContainer(id) => {
                write!(f, "cannot merge {id} into itself")
            }
            Self::WouldCycle { parent, child } => {
                write!(f, "merging {child} into {parent} would create a cycle")
            }
            Self::MergedAboveTarget { parent, child } => {
                write!(
                    f,
                    "{child} is already merged below {parent}; re-merge via its direct parent"
                )
            }
        }
    }
}

impl std::error::Error for SurfaceError {}
