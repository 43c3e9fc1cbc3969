//! Utility types.

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Insertion-ordered map; iteration order is deterministic for a
/// deterministic insertion sequence.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;

/// Insertion-ordered set with the same ordering guarantee.
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;
