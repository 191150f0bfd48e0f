//! Lock aliases so the lock implementation can be swapped in one place.

/// A reader-writer lock that never poisons.
pub type SyncRwLock<T> = parking_lot::RwLock<T>;
