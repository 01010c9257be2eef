//! Identifiers and simple allocators for curves, binders and listeners.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique curve identity; also the key of every per-curve index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CurveId(pub u64);

/// Binder identity, unique within one updater.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BinderId(pub u64);

/// Handle returned by listener registration, unique within one curve.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ListenerId(pub u64);

static NEXT_CURVE: AtomicU64 = AtomicU64::new(0);

impl CurveId {
    pub(crate) fn next() -> Self {
        CurveId(NEXT_CURVE.fetch_add(1, Ordering::Relaxed))
    }
}

/// Monotonic allocator for BinderId and ListenerId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_binder: u64,
    next_listener: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_binder(&mut self) -> BinderId {
        let id = BinderId(self.next_binder);
        self.next_binder = self.next_binder.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        id
    }
}
