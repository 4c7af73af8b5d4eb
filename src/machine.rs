//! The dynamic pattern match automaton.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;

use crate::cursor::{Cursor, Match};
use crate::state::{Edge, Parent, State, StateId, ROOT_STATE_ID};
use crate::symbol::{DefaultOps, SymbolOps};

/// Pending work on the failure layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
enum Rebuild {
    /// Failure links and output counts are up to date.
    Clean = 0,
    /// Failure links must be recomputed.
    Links = 1,
    /// Output counts must additionally be reset before the links are
    /// recomputed, because the previous propagation left composite counts.
    LinksAndCounts = 2,
}

impl Rebuild {
    #[inline(always)]
    fn from_u8(x: u8) -> Self {
        match x {
            0 => Self::Clean,
            1 => Self::Links,
            _ => Self::LinksAndCounts,
        }
    }
}

/// A pattern match automaton that keywords can be added to and removed from
/// at any time.
///
/// [`AhoCorasick`] implements the
/// [Aho-Corasick algorithm](https://dl.acm.org/doi/10.1145/360825.360855)
/// over a goto graph of individually allocated states rather than a frozen
/// table, so the keyword set may change between scans. The failure links and
/// cached match counts are rebuilt lazily: mutations only mark them stale,
/// and the next [`feed`](Self::feed) performs a single breadth-first rebuild
/// no matter how many mutations were batched before it.
///
/// The symbol type `S` is arbitrary; comparisons and copies go through a
/// [`SymbolOps`](crate::SymbolOps) bundle, so the alphabet is not limited to
/// bytes or characters. Because of this the root carries no materialized
/// self-loop: the transition function terminates at the root instead of
/// enumerating an alphabet that may be unbounded.
///
/// Each keyword may carry a value of type `V`, making the automaton usable
/// as an indexed dictionary. Values are dropped when their keyword is
/// unregistered or when the machine itself is dropped.
///
/// # Thread safety
///
/// Registration and unregistration take `&mut self` and therefore exclude
/// all other uses. Scanning takes `&self`: any number of threads may scan
/// one shared machine concurrently, each with its own [`Cursor`]. The only
/// suspension point is the first `feed` after a mutation, which may block
/// while one scanner rebuilds the failure layer for all of them.
///
/// # Examples
///
/// ```
/// use acdyn::AhoCorasick;
///
/// let mut pma = AhoCorasick::<u8>::new();
/// for kw in ["he", "she", "his", "hers"] {
///     assert!(pma.register(kw.as_bytes(), ()));
/// }
///
/// let mut cur = pma.cursor();
/// let mut found = vec![];
/// for c in "ushers".bytes() {
///     for i in 0..pma.feed(&mut cur, &c) {
///         found.push(pma.match_at(&cur, i).keyword());
///     }
/// }
/// assert_eq!(found, vec![b"she".to_vec(), b"he".to_vec(), b"hers".to_vec()]);
///
/// pma.unregister(b"she");
/// assert_eq!(pma.keyword_count(), 3);
/// ```
pub struct AhoCorasick<S, V = (), O = DefaultOps> {
    pub(crate) states: Vec<State<S, V>>,
    /// Arena slots recycled by keyword removal.
    pub(crate) free: Vec<StateId>,
    pub(crate) num_states: usize,
    pub(crate) next_rank: usize,
    pub(crate) num_keywords: usize,
    rebuild: AtomicU8,
    lock: Mutex<()>,
    pub(crate) ops: O,
}

impl<S, V> AhoCorasick<S, V>
where
    S: Clone + PartialEq,
{
    /// Creates an empty machine comparing and copying symbols with
    /// [`PartialEq`] and [`Clone`].
    ///
    /// # Examples
    ///
    /// ```
    /// use acdyn::AhoCorasick;
    ///
    /// let mut pma = AhoCorasick::<u8>::new();
    /// assert!(pma.register(b"abc", ()));
    /// assert_eq!(pma.keyword_count(), 1);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_ops(DefaultOps)
    }
}

impl<S, V> Default for AhoCorasick<S, V>
where
    S: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, V, O> AhoCorasick<S, V, O>
where
    O: SymbolOps<S>,
{
    /// Creates an empty machine with a custom symbol operator bundle.
    ///
    /// The bundle is stored by value and used for every subsequent
    /// registration and scan.
    #[must_use]
    pub fn with_ops(ops: O) -> Self {
        Self {
            states: vec![State::default()],
            free: vec![],
            num_states: 1,
            next_rank: 0,
            num_keywords: 0,
            // The first feed rebuilds the links; output counts are fresh
            // until then.
            rebuild: AtomicU8::new(Rebuild::Links as u8),
            lock: Mutex::new(()),
            ops,
        }
    }

    /// Registers a keyword with an associated value.
    ///
    /// Returns `true` if the keyword was added. Returns `false`, leaving the
    /// machine untouched, if the keyword is empty or already registered; in
    /// that case `value` is dropped and the previously registered value is
    /// kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use acdyn::AhoCorasick;
    ///
    /// let mut pma = AhoCorasick::<u8, u32>::new();
    /// assert!(pma.register(b"cat", 7));
    /// assert!(!pma.register(b"cat", 8));
    /// assert_eq!(pma.get(b"cat"), Some(&7));
    /// ```
    pub fn register(&mut self, keyword: &[S], value: V) -> bool {
        if keyword.is_empty() {
            return false;
        }
        let mut state_id = ROOT_STATE_ID;
        let mut consumed = 0;
        for symbol in keyword {
            match self.child(state_id, symbol) {
                Some(next_id) => {
                    state_id = next_id;
                    consumed += 1;
                }
                None => break,
            }
        }
        for symbol in &keyword[consumed..] {
            state_id = self.add_child(state_id, symbol);
        }
        let state = &mut self.states[state_id as usize];
        if state.is_terminal {
            return false;
        }
        // Dropping into the option also disposes of a value left behind by a
        // keyword that used to end here.
        state.value = Some(value);
        state.is_terminal = true;
        state.set_output_count(1);
        state.rank = self.next_rank;
        self.next_rank += 1;
        self.num_keywords += 1;
        self.mark_stale();
        true
    }

    /// Registers a keyword with a default value.
    ///
    /// Shorthand for [`register`](Self::register) when the machine is used
    /// as a plain keyword set (`V = ()`) or the values are filled in later.
    pub fn register_keyword(&mut self, keyword: &[S]) -> bool
    where
        V: Default,
    {
        self.register(keyword, V::default())
    }

    /// Removes a keyword, dropping its value.
    ///
    /// Returns `false` if the keyword is not currently registered. States
    /// that served only this keyword are pruned from the goto graph and
    /// their slots recycled; a state that other keywords pass through merely
    /// loses its terminality.
    ///
    /// Re-registering the same keyword later assigns a fresh rank: ranks
    /// identify insertion events, not keyword texts.
    pub fn unregister(&mut self, keyword: &[S]) -> bool {
        let Some(last_id) = self.locate(keyword) else {
            return false;
        };
        self.num_keywords -= 1;
        let last = &mut self.states[last_id as usize];
        if !last.edges.is_empty() {
            // Longer keywords run through this state; keep it.
            last.is_terminal = false;
            last.set_output_count(0);
            last.rank = 0;
            last.value = None;
            self.mark_stale();
            return true;
        }
        let mut dead_id = last_id;
        loop {
            let Parent { state: parent_id, index } = self.states[dead_id as usize]
                .parent
                .expect("a leaf under removal cannot be the root");
            self.remove_edge(parent_id, index);
            // Resetting the slot drops the state's value.
            self.states[dead_id as usize] = State::default();
            self.free.push(dead_id);
            self.num_states -= 1;
            let parent = &self.states[parent_id as usize];
            if parent_id == ROOT_STATE_ID || parent.is_terminal || !parent.edges.is_empty() {
                break;
            }
            dead_id = parent_id;
        }
        self.mark_stale();
        true
    }

    /// Returns `true` if the keyword is currently registered.
    #[must_use]
    pub fn is_registered(&self, keyword: &[S]) -> bool {
        self.locate(keyword).is_some()
    }

    /// Returns the value registered with the keyword, if any.
    #[must_use]
    pub fn get(&self, keyword: &[S]) -> Option<&V> {
        self.states[self.locate(keyword)? as usize].value.as_ref()
    }

    /// Number of currently registered keywords.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.num_keywords
    }

    /// Number of states of the goto graph, the root included.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Calls `f` with every registered keyword and its value.
    ///
    /// The keyword slice is a scratch buffer only valid for the duration of
    /// the call. Every current keyword is visited exactly once, in an
    /// unspecified order.
    ///
    /// # Examples
    ///
    /// ```
    /// use acdyn::AhoCorasick;
    ///
    /// let mut pma = AhoCorasick::<u8, u32>::new();
    /// pma.register(b"one", 1);
    /// pma.register(b"two", 2);
    ///
    /// let mut sum = 0;
    /// pma.for_each_keyword(|kw, v| {
    ///     assert_eq!(kw.len(), 3);
    ///     sum += *v;
    /// });
    /// assert_eq!(sum, 3);
    /// ```
    pub fn for_each_keyword<F>(&self, mut f: F)
    where
        F: FnMut(&[S], &V),
    {
        let mut buf = vec![];
        self.visit_keywords(ROOT_STATE_ID, &mut buf, &mut f);
    }

    /// Returns a fresh cursor positioned at the root.
    ///
    /// Cursors are cheap values; create as many as needed. A cursor is only
    /// meaningful for the machine that created it, and a mutation leaves
    /// outstanding cursors at a stale position: reset them before resuming a
    /// scan whose keyword set changed under removal.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(ROOT_STATE_ID)
    }

    /// Advances `cur` by one symbol and returns the number of keywords
    /// ending at the new position.
    ///
    /// If keywords were registered or unregistered since the last rebuild,
    /// the failure layer is rebuilt first; concurrent scanners serialize on
    /// an internal lock for that rebuild and run lock-free afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use acdyn::AhoCorasick;
    ///
    /// let mut pma = AhoCorasick::<u8>::new();
    /// pma.register(b"abcde", ());
    /// pma.register(b"bcd", ());
    ///
    /// let mut cur = pma.cursor();
    /// let counts: Vec<_> = "abcde".bytes().map(|c| pma.feed(&mut cur, &c)).collect();
    /// assert_eq!(counts, vec![0, 0, 0, 1, 1]);
    /// ```
    #[inline]
    pub fn feed(&self, cur: &mut Cursor, probe: &S) -> usize {
        self.ensure_clean();
        cur.state_id = self.next_state(cur.state_id, probe);
        self.states[cur.state_id as usize].output_count() as usize
    }

    /// Returns the `index`-th keyword matching at the cursor's position,
    /// index 0 being the longest match.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not strictly smaller than the count returned by
    /// the last [`feed`](Self::feed) of `cur`.
    #[must_use]
    pub fn match_at<'a>(&'a self, cur: &Cursor, index: usize) -> Match<'a, S, V, O> {
        let count = self.states[cur.state_id as usize].output_count() as usize;
        assert!(
            index < count,
            "match index out of range: the index is {index} but the match count is {count}"
        );
        let mut state_id = cur.state_id;
        let mut i = 0;
        loop {
            while !self.states[state_id as usize].is_terminal && state_id != ROOT_STATE_ID {
                state_id = self.states[state_id as usize].fail();
            }
            if i == index {
                break;
            }
            i += 1;
            state_id = self.states[state_id as usize].fail();
        }
        Match::new(self, state_id)
    }

    /// Rebuilds the failure layer if a mutation left it stale.
    ///
    /// Scanners that observe `Clean` with `Acquire` ordering see every link
    /// and count stored before the rebuilder's `Release`; scanners that
    /// observe a stale flag serialize on the lock instead.
    #[inline(always)]
    fn ensure_clean(&self) {
        if self.rebuild.load(Ordering::Acquire) != Rebuild::Clean as u8 {
            self.rebuild_fails();
        }
    }

    #[cold]
    fn rebuild_fails(&self) {
        let _guard = self.lock.lock();
        let pending = Rebuild::from_u8(self.rebuild.load(Ordering::Relaxed));
        if pending == Rebuild::Clean {
            return;
        }
        if pending == Rebuild::LinksAndCounts {
            // Recycled slots are reset along with live states; they hold no
            // terminality, so they simply return to zero.
            for state in &self.states {
                state.set_output_count(u32::from(state.is_terminal));
            }
        }
        // Breadth-first propagation from the root: a state's failure link is
        // final before any of its children are dequeued.
        let mut queue = Vec::with_capacity(self.num_states.saturating_sub(1));
        for edge in &self.states[ROOT_STATE_ID as usize].edges {
            self.states[edge.child as usize].set_fail(ROOT_STATE_ID);
            queue.push(edge.child);
        }
        let mut qi = 0;
        while qi < queue.len() {
            let r_id = queue[qi];
            qi += 1;
            let r_fail_id = self.states[r_id as usize].fail();
            for edge in &self.states[r_id as usize].edges {
                let fail_id = self.next_state(r_fail_id, &edge.symbol);
                let s = &self.states[edge.child as usize];
                s.set_fail(fail_id);
                s.set_output_count(
                    s.output_count() + self.states[fail_id as usize].output_count(),
                );
                queue.push(edge.child);
            }
        }
        self.rebuild.store(Rebuild::Clean as u8, Ordering::Release);
    }

    /// The goto/fail transition. Follows failure links until a state with an
    /// edge for `probe` is found, or yields the root: the root's self-loop
    /// on unmatched symbols is implicit because the alphabet is unbounded.
    #[inline(always)]
    pub(crate) fn next_state(&self, mut state_id: StateId, probe: &S) -> StateId {
        loop {
            if let Some(child_id) = self.child(state_id, probe) {
                return child_id;
            }
            if state_id == ROOT_STATE_ID {
                return ROOT_STATE_ID;
            }
            state_id = self.states[state_id as usize].fail();
        }
    }

    #[inline(always)]
    fn child(&self, state_id: StateId, probe: &S) -> Option<StateId> {
        self.states[state_id as usize]
            .edges
            .iter()
            .find(|e| self.ops.eq(&e.symbol, probe))
            .map(|e| e.child)
    }

    /// Walks the keyword through the goto graph; the endpoint qualifies only
    /// if a keyword currently ends there.
    fn locate(&self, keyword: &[S]) -> Option<StateId> {
        if keyword.is_empty() {
            return None;
        }
        let mut state_id = ROOT_STATE_ID;
        for symbol in keyword {
            state_id = self.child(state_id, symbol)?;
        }
        self.states[state_id as usize]
            .is_terminal
            .then_some(state_id)
    }

    fn add_child(&mut self, parent_id: StateId, symbol: &S) -> StateId {
        let symbol = self.ops.copy(symbol);
        let child_id = match self.free.pop() {
            Some(id) => id,
            None => {
                let id = u32::try_from(self.states.len())
                    .expect("the number of states must not exceed u32::MAX");
                self.states.push(State::default());
                id
            }
        };
        let parent = &mut self.states[parent_id as usize];
        let index = parent.edges.len() as u32;
        parent.edges.push(Edge {
            symbol,
            child: child_id,
        });
        self.states[child_id as usize].parent = Some(Parent {
            state: parent_id,
            index,
        });
        self.num_states += 1;
        child_id
    }

    /// Removes the `index`-th edge of `parent_id`, dropping its symbol.
    /// Surviving right siblings shift one slot left, so their children's
    /// back-links are re-indexed.
    fn remove_edge(&mut self, parent_id: StateId, index: u32) {
        self.states[parent_id as usize].edges.remove(index as usize);
        for i in index as usize..self.states[parent_id as usize].edges.len() {
            let child_id = self.states[parent_id as usize].edges[i].child;
            let parent_link = self.states[child_id as usize]
                .parent
                .as_mut()
                .expect("an edge target cannot be the root");
            parent_link.index = i as u32;
        }
    }

    fn visit_keywords<F>(&self, state_id: StateId, buf: &mut Vec<S>, f: &mut F)
    where
        F: FnMut(&[S], &V),
    {
        let state = &self.states[state_id as usize];
        if state.is_terminal && !buf.is_empty() {
            if let Some(value) = &state.value {
                f(buf, value);
            }
        }
        for edge in &state.edges {
            buf.push(self.ops.copy(&edge.symbol));
            self.visit_keywords(edge.child, buf, f);
            buf.pop();
        }
    }

    /// Mutations run under `&mut self`, with no scanner alive; the flag only
    /// escalates, so a pending `Links` rebuild is left as is.
    fn mark_stale(&mut self) {
        let flag = self.rebuild.get_mut();
        if *flag == Rebuild::Clean as u8 {
            *flag = Rebuild::LinksAndCounts as u8;
        }
    }

    #[cfg(test)]
    pub(crate) fn is_stale(&self) -> bool {
        self.rebuild.load(Ordering::Relaxed) != Rebuild::Clean as u8
    }
}

impl<S, V, O> fmt::Debug for AhoCorasick<S, V, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AhoCorasick")
            .field("num_states", &self.num_states)
            .field("num_keywords", &self.num_keywords)
            .finish()
    }
}
