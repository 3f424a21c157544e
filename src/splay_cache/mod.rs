//! Memoization cache backed by a splay tree. Every successful lookup rotates the found node to the
//! root, so frequently requested keys stay close to the top of the tree.

mod cache;
mod node;
mod tree;

pub use self::cache::{CacheStats, Iter, SplayCache, DEFAULT_CHUNK_SIZE};

use std::result;
use thiserror::Error;

/// Structural defects reported by `SplayCache::check_invariants`.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("root node has a parent link")]
    RootHasParent,
    #[error("node at depth {depth} does not point back to its parent")]
    BrokenParentLink { depth: usize },
    #[error("keys are out of order at in-order position {position}")]
    OrderViolation { position: usize },
    #[error("{reachable} nodes are reachable from the root, but {allocated} are allocated")]
    UnreachableNodes { reachable: usize, allocated: usize },
}

pub type Result<T> = result::Result<T, Error>;
