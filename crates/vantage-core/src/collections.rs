//! Hash collections used across the runtime.
//!
//! Keys are small integer ids, so the default build uses `rustc-hash`'s
//! FxHasher. Enable the `std-hash` feature to fall back to the standard
//! library hasher when DoS-resistant hashing matters more than speed.

#[cfg(not(feature = "std-hash"))]
pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(not(feature = "std-hash"))]
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

#[cfg(feature = "std-hash")]
pub type HashMap<K, V> = std::collections::HashMap<K, V>;

#[cfg(feature = "std-hash")]
pub type HashSet<T> = std::collections::HashSet<T>;
