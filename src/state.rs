//! States of the goto graph.

use core::sync::atomic::{AtomicU32, Ordering};

use smallvec::SmallVec;

/// Index of a state inside the machine's arena.
pub(crate) type StateId = u32;

// The root state id.
pub(crate) const ROOT_STATE_ID: StateId = 0;

/// An outgoing edge: an owned symbol label and the child it leads to.
pub(crate) struct Edge<S> {
    pub(crate) symbol: S,
    pub(crate) child: StateId,
}

/// Back-link from a state to the edge reaching it from its parent.
#[derive(Clone, Copy)]
pub(crate) struct Parent {
    pub(crate) state: StateId,
    /// Position of the edge inside the parent's edge list. Kept in sync when
    /// sibling edges are removed.
    pub(crate) index: u32,
}

/// A state of the goto graph.
///
/// `fail` and `output_count` are written while holding the machine's rebuild
/// lock and read without it; the machine's rebuild flag orders those
/// accesses, so plain `Relaxed` atomics suffice here.
pub(crate) struct State<S, V> {
    pub(crate) edges: SmallVec<[Edge<S>; 4]>,
    pub(crate) parent: Option<Parent>,
    fail: AtomicU32,
    output_count: AtomicU32,
    pub(crate) is_terminal: bool,
    pub(crate) rank: usize,
    pub(crate) value: Option<V>,
}

impl<S, V> Default for State<S, V> {
    fn default() -> Self {
        Self {
            edges: SmallVec::new(),
            parent: None,
            fail: AtomicU32::new(ROOT_STATE_ID),
            output_count: AtomicU32::new(0),
            is_terminal: false,
            rank: 0,
            value: None,
        }
    }
}

impl<S, V> State<S, V> {
    #[inline(always)]
    pub(crate) fn fail(&self) -> StateId {
        self.fail.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub(crate) fn set_fail(&self, x: StateId) {
        self.fail.store(x, Ordering::Relaxed);
    }

    #[inline(always)]
    pub(crate) fn output_count(&self) -> u32 {
        self.output_count.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub(crate) fn set_output_count(&self, x: u32) {
        self.output_count.store(x, Ordering::Relaxed);
    }
}
