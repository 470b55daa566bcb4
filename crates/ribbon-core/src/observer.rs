#![forbid(unsafe_code)]

//! Notification sinks for surface collaborators.

use ribbon_model::{CheckState, ContentMode};

use crate::container::ContainerId;

/// Collaborator notifications raised by a [`Surface`](crate::Surface).
///
/// All methods default to no-ops, so implementors override only what they
/// consume. Notifications are raised synchronously on the caller's thread;
/// a `load_requested` handler is expected to eventually call
/// [`Surface::refill`](crate::Surface::refill) (from the same thread) with
/// the requested page's content.
pub trait SurfaceObserver {
    /// An on-demand page was activated and has no pending data.
    fn load_requested(&mut self, container: ContainerId, page_id: &str, mode: ContentMode) {
        let _ = (container, page_id, mode);
    }

    /// A leaf command fired. `checked` is the item's state after any
    /// toggle flip.
    fn command_invoked(&mut self, container: ContainerId, item_id: &str, checked: CheckState) {
        let _ = (container, item_id, checked);
    }
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SurfaceObserver for NullObserver {}
