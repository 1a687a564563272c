//! # lexitrie
//!
//! An in-memory, Unicode-aware associative text index for a dictionary
//! workload: associate string values (e.g. definitions) with string
//! keys (e.g. head-words), then retrieve them by exact key, by key
//! prefix, or by arbitrary substring appearing anywhere inside a
//! stored value.
//!
//! * `ordered_map` is a generic self-balancing red-black map, used
//!   internally as the suffix tree's per-node edge dispatch.
//! * `trie` is a red-black-balanced ternary search trie mapping
//!   Unicode strings to string values: exact lookup, prefix
//!   enumeration, insert, remove.
//! * `suffix_tree` is a generalized online suffix tree (Ukkonen's
//!   algorithm) over every inserted key, for substring search that
//!   returns the owning keys and values; persistable to disk.
//!
//! ## Example
//!
//! ```rs
//! use lexitrie::trie::{RbTst, SearchResult};
//! let mut dict = RbTst::new();
//! dict.insert("cafe\u{301}".as_bytes(), "a coffee shop");
//! assert_eq!(dict.search("caf\u{e9}".as_bytes()), SearchResult::Found("a coffee shop".to_string()));
//! ```

pub mod ordered_map;
pub mod suffix_tree;
pub mod trie;
pub mod unicode;

/// Errors surfaced by the normalization boundary. `NotFound` is
/// intentionally absent here: exact lookup failure is a distinguished
/// result (`trie::SearchResult::NotFound`), never an error value.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("empty key")]
    EmptyKey,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
