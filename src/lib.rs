//! # Acdyn: a dynamic Aho-Corasick automaton
//!
//! An implementation of the Aho-Corasick algorithm for keyword sets that
//! change over time. Keywords can be registered and unregistered between
//! searches; the failure layer is rebuilt lazily on the next scan, so any
//! number of mutations costs a single rebuild.
//!
//! Unlike table-compiled pattern matchers, the symbol type is generic and
//! the alphabet unbounded: any type can label edges, compared and copied
//! through a pluggable operator bundle ([`SymbolOps`]). Keywords may carry
//! associated values, which makes the automaton double as an indexed
//! dictionary. One machine can be scanned by many threads at once, each with
//! its own [`Cursor`].
//!
//! ## Examples
//!
//! ```
//! use acdyn::AhoCorasick;
//!
//! let mut pma = AhoCorasick::<u8, u32>::new();
//! pma.register(b"he", 0);
//! pma.register(b"she", 1);
//! pma.register(b"hers", 2);
//!
//! // Scanning reports every keyword ending at the fed position.
//! let mut cur = pma.cursor();
//! let mut found = vec![];
//! for c in "ushers".bytes() {
//!     for i in 0..pma.feed(&mut cur, &c) {
//!         let m = pma.match_at(&cur, i);
//!         found.push((m.keyword(), *m.value()));
//!     }
//! }
//! assert_eq!(
//!     found,
//!     vec![
//!         (b"she".to_vec(), 1),
//!         (b"he".to_vec(), 0),
//!         (b"hers".to_vec(), 2),
//!     ]
//! );
//!
//! // The keyword set may change at any time; the next feed picks it up.
//! pma.unregister(b"she");
//! pma.register(b"ers", 3);
//!
//! let mut cur = pma.cursor();
//! let count: usize = "ushers".bytes().map(|c| pma.feed(&mut cur, &c)).sum();
//! assert_eq!(count, 3); // "he", "hers" and "ers"
//! ```
//!
//! Symbols do not have to be bytes. Any type works, including ones that own
//! heap memory:
//!
//! ```
//! use acdyn::AhoCorasick;
//!
//! let mut pma = AhoCorasick::<String>::new();
//! let keyword: Vec<String> = ["tick", "tock"].iter().map(|s| s.to_string()).collect();
//! pma.register(&keyword, ());
//!
//! let mut cur = pma.cursor();
//! pma.feed(&mut cur, &"tick".to_string());
//! assert_eq!(pma.feed(&mut cur, &"tock".to_string()), 1);
//! ```

mod cursor;
mod machine;
mod state;
mod symbol;

pub use cursor::{Cursor, Match};
pub use machine::AhoCorasick;
pub use symbol::{DefaultOps, EqFn, SymbolOps};


#[cfg(test)]
mod tests_random;
