//! Scanning cursors and retrieved matches.

use crate::machine::AhoCorasick;
use crate::state::{StateId, ROOT_STATE_ID};
use crate::symbol::{DefaultOps, SymbolOps};

/// A position inside a machine, advanced one symbol at a time by
/// [`AhoCorasick::feed`].
///
/// A cursor is a plain value wrapping a state index: copying it forks the
/// scan, and [`reset`](Self::reset) returns it to the root in constant time.
/// Each scanning thread owns its cursors; the machine itself is shared.
///
/// A cursor must only be used with the machine that created it.
///
/// # Examples
///
/// ```
/// use acdyn::AhoCorasick;
///
/// let mut pma = AhoCorasick::<u8>::new();
/// pma.register(b"aa", ());
///
/// let mut cur = pma.cursor();
/// assert_eq!(pma.feed(&mut cur, &b'a'), 0);
/// assert_eq!(pma.feed(&mut cur, &b'a'), 1);
///
/// cur.reset();
/// assert_eq!(pma.feed(&mut cur, &b'a'), 0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Cursor {
    pub(crate) state_id: StateId,
}

impl Cursor {
    #[inline(always)]
    pub(crate) fn new(state_id: StateId) -> Self {
        Self { state_id }
    }

    /// Moves the cursor back to the root.
    #[inline(always)]
    pub fn reset(&mut self) {
        self.state_id = ROOT_STATE_ID;
    }
}

/// One keyword occurrence, retrieved with [`AhoCorasick::match_at`].
///
/// The occurrence refers to a terminal state of the machine; the keyword
/// text is not stored anywhere and is only reconstructed on demand, by
/// walking the parent links back to the root.
pub struct Match<'a, S, V = (), O = DefaultOps> {
    machine: &'a AhoCorasick<S, V, O>,
    state_id: StateId,
}

impl<'a, S, V, O> Match<'a, S, V, O>
where
    O: SymbolOps<S>,
{
    #[inline(always)]
    pub(crate) fn new(machine: &'a AhoCorasick<S, V, O>, state_id: StateId) -> Self {
        Self { machine, state_id }
    }

    /// The rank assigned to the keyword when it was registered.
    ///
    /// Ranks increase with every successful registration and are never
    /// reused, so a rank identifies one insertion event of the machine.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.machine.states[self.state_id as usize].rank
    }

    /// The value registered with the keyword.
    #[must_use]
    pub fn value(&self) -> &'a V {
        self.machine.states[self.state_id as usize]
            .value
            .as_ref()
            .expect("a matching state always carries its registered value")
    }

    /// Number of symbols of the keyword, counted without reconstructing it.
    #[must_use]
    pub fn keyword_len(&self) -> usize {
        let mut len = 0;
        let mut state_id = self.state_id;
        while let Some(parent) = self.machine.states[state_id as usize].parent {
            len += 1;
            state_id = parent.state;
        }
        len
    }

    /// Reconstructs the keyword into `buf`, replacing its contents.
    ///
    /// The buffer is the caller's and can be reused across retrievals to
    /// avoid reallocation.
    pub fn keyword_into(&self, buf: &mut Vec<S>) {
        buf.clear();
        let mut state_id = self.state_id;
        while let Some(parent) = self.machine.states[state_id as usize].parent {
            let edge = &self.machine.states[parent.state as usize].edges[parent.index as usize];
            buf.push(self.machine.ops.copy(&edge.symbol));
            state_id = parent.state;
        }
        buf.reverse();
    }

    /// Reconstructs the keyword into a fresh buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use acdyn::AhoCorasick;
    ///
    /// let mut pma = AhoCorasick::<u8>::new();
    /// pma.register(b"sher", ());
    ///
    /// let mut cur = pma.cursor();
    /// let mut count = 0;
    /// for c in "usher".bytes() {
    ///     count = pma.feed(&mut cur, &c);
    /// }
    /// assert_eq!(count, 1);
    /// assert_eq!(pma.match_at(&cur, 0).keyword(), b"sher".to_vec());
    /// ```
    #[must_use]
    pub fn keyword(&self) -> Vec<S> {
        let mut buf = vec![];
        self.keyword_into(&mut buf);
        buf
    }
}
