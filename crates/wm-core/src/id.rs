// ABOUTME: Stable identities for panes and divider lines.
// ABOUTME: Ids come from a process-wide counter and are never reused.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(pub u64);

impl PaneId {
    /// Allocate an id distinct from every id handed out before
    pub fn fresh() -> Self {
        PaneId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        let a = PaneId::fresh();
        let b = PaneId::fresh();
        assert_ne!(a, b);
        assert!(b > a);
    }
}
