//! Collections built around self-adjusting binary search trees.
//!
//! The main type is [`SplayCache`](splay_cache/struct.SplayCache.html), a memoization cache
//! backed by a splay tree whose nodes live in a [`TypedArena`](arena/struct.TypedArena.html).

pub mod arena;
pub mod splay_cache;
