//! Operator bundles for symbol types.

/// Operators a machine uses to compare and copy symbols.
///
/// A machine touches its symbols only through this trait, so the alphabet is
/// neither bounded nor restricted to types implementing [`PartialEq`]. The
/// bundle is captured when the machine is created and stored by value inside
/// it; all registrations and scans of that machine use the same operators.
///
/// The equality predicate receives the registered (keyword-side) symbol
/// first, which permits asymmetric predicates such as comparing a lowercased
/// keyword letter against raw text:
///
/// ```
/// use acdyn::{AhoCorasick, EqFn};
///
/// fn nocase(kw: &char, probe: &char) -> bool {
///     *kw == probe.to_ascii_lowercase()
/// }
///
/// let mut pma = AhoCorasick::with_ops(EqFn(nocase));
/// pma.register(&['h', 'e'], ());
///
/// let mut cur = pma.cursor();
/// assert_eq!(pma.feed(&mut cur, &'H'), 0);
/// assert_eq!(pma.feed(&mut cur, &'E'), 1);
/// ```
///
/// Symbol destruction needs no operator: edge labels are owned values and
/// are dropped when their edge is removed.
pub trait SymbolOps<S> {
    /// Tests a registered keyword symbol against a probe symbol.
    fn eq(&self, keyword: &S, probe: &S) -> bool;

    /// Copies a symbol so that an edge can take ownership of it.
    fn copy(&self, symbol: &S) -> S;
}

/// The default operator bundle: [`PartialEq`] equality and [`Clone`] copies.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultOps;

impl<S> SymbolOps<S> for DefaultOps
where
    S: Clone + PartialEq,
{
    #[inline(always)]
    fn eq(&self, keyword: &S, probe: &S) -> bool {
        keyword == probe
    }

    #[inline(always)]
    fn copy(&self, symbol: &S) -> S {
        symbol.clone()
    }
}

/// Adapts a plain equality predicate into an operator bundle.
///
/// Copies are made with [`Clone`]; only the comparison is customized.
#[derive(Clone, Copy, Debug)]
pub struct EqFn<F>(pub F);

impl<S, F> SymbolOps<S> for EqFn<F>
where
    S: Clone,
    F: Fn(&S, &S) -> bool,
{
    #[inline(always)]
    fn eq(&self, keyword: &S, probe: &S) -> bool {
        (self.0)(keyword, probe)
    }

    #[inline(always)]
    fn copy(&self, symbol: &S) -> S {
        symbol.clone()
    }
}
