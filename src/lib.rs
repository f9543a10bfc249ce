//! Singly linked list with a "before the first element" sentinel.
//!
//! [`SList`] exposes forward-only positions ([`Position`] and its read-only
//! twin [`ConstPosition`]) for O(1) `insert_after`/`erase_after`, value-based
//! erasure, and a copy assignment that reuses the nodes it already owns.

mod error;
mod position;
mod slist;
mod snode;

pub use error::*;
pub use position::*;
pub use slist::*;

#[cfg(any(test, feature = "alloc-stats"))]
pub use snode::{alloc_stats, AllocStats};
