//! Mount generations for discarding superseded role resolutions.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks the current mount of one guarded subtree.
///
/// Every [`MountTracker::mount`] or [`MountTracker::unmount`] bumps the generation,
/// which invalidates tickets handed out earlier.
#[derive(Debug, Clone, Default)]
pub struct MountTracker {
    generation: Arc<AtomicU64>,
}

/// Proof that a resolution was started for a specific mount.
#[derive(Debug, Clone)]
pub struct MountTicket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl MountTracker {
    /// Creates a tracker with no mount.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new mount, superseding every earlier ticket.
    #[must_use]
    pub fn mount(&self) -> MountTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        MountTicket {
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    /// Ends the current mount.
    pub fn unmount(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns the current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl MountTicket {
    /// Returns the generation this ticket was issued for.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the mount that issued this ticket is still current.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}
