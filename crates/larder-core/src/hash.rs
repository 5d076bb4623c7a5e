use std::hash::{Hash, Hasher};

use crate::Key;

#[cfg(feature = "std-hash")]
pub mod default {
    pub use std::collections::hash_map::DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::new()
    }
}

#[cfg(not(feature = "std-hash"))]
pub mod default {
    pub use ahash::AHasher as DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::default()
    }
}

/// Hashes a reconciliation key into the compact form stored on elements.
pub fn hash_key<K: Hash + ?Sized>(key: &K) -> Key {
    let mut hasher = default::new();
    key.hash(&mut hasher);
    hasher.finish()
}
