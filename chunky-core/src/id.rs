//! # IDs
//! Structure members, documents and other identity-addressed things need an ID that stays the same
//! across undo and redo. This module provides `LocalID<T>`, which hands out IDs unique within this
//! execution of the program, namespaced by the type T. Order of IDs is not guaranteed.
//!
//! To get a fresh ID, use `LocalID<YourNamespaceTy>`'s `Default` impl. To eagerly acquire many ids,
//! use `LocalID::many`.

// Next available ID, by namespace type.
static ID_SERVER: parking_lot::RwLock<
    std::collections::BTreeMap<std::any::TypeId, std::sync::atomic::AtomicU64>,
> = parking_lot::const_rwlock(std::collections::BTreeMap::new());

/// ID that is guaranteed unique within this execution of the program.
/// IDs with different namespaces may share a value but are never comparable.
pub struct LocalID<T: std::any::Any> {
    id: std::num::NonZeroU64,
    _namespace: std::marker::PhantomData<T>,
}
impl<T: std::any::Any> Clone for LocalID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: std::any::Any> Copy for LocalID<T> {}
impl<T: std::any::Any> PartialEq for LocalID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T: std::any::Any> Eq for LocalID<T> {}

// Safety - only a u64 is stored. T is a marker and never instantiated,
// so its Send/Sync-ness is irrelevant.
unsafe impl<T: std::any::Any> Send for LocalID<T> {}
unsafe impl<T: std::any::Any> Sync for LocalID<T> {}

impl<T: std::any::Any> std::hash::Hash for LocalID<T> {
    /// Hashes depend on `TypeId`, which is unstable between compilations.
    /// Never persist them.
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::any::TypeId::of::<T>().hash(state);
        self.id.hash(state);
    }
}

impl<T: std::any::Any> LocalID<T> {
    /// Get the raw numeric value of this ID.
    /// IDs from differing namespaces may share the same numeric ID!
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id.get()
    }
    /// Allocate many IDs at once, taking the namespace lock only once.
    ///
    /// IDs are reserved eagerly - dropping the iterator early does *not* recycle the unused ones.
    /// Exhausting all `u64::MAX - 1` IDs of a namespace terminates the program.
    pub fn many(count: usize) -> impl ExactSizeIterator<Item = Self> {
        let count_u64 = count as u64;

        // Zero is reserved as invalid, start at one.
        let start_id = {
            let read = ID_SERVER.upgradable_read();
            let ty = std::any::TypeId::of::<T>();
            if let Some(atomic) = read.get(&ty) {
                atomic.fetch_add(count_u64, std::sync::atomic::Ordering::Relaxed)
            } else {
                // First use of this namespace.
                let mut write = parking_lot::RwLockUpgradableReadGuard::upgrade(read);
                // Another thread may have raced us here between the read and the upgrade.
                let atomic = write
                    .entry(ty)
                    .or_insert_with(|| std::sync::atomic::AtomicU64::new(1));
                atomic.fetch_add(count_u64, std::sync::atomic::Ordering::Relaxed)
            }
        };

        #[allow(clippy::manual_assert)]
        if start_id.wrapping_add(count_u64) < start_id || start_id == 0 {
            #[cfg(not(test))]
            {
                log::error!("{} ID overflow! Aborting!", std::any::type_name::<T>());
                log::logger().flush();
                // Handing out duplicate identities would corrupt every document. No recovery.
                std::process::abort();
            }
            #[cfg(test)]
            {
                panic!("{} ID overflow! Aborting!", std::any::type_name::<T>())
            }
        }

        (0..count).map(move |idx| {
            let id = idx as u64 + start_id;
            LocalID {
                // Non-zero-ness checked by the overflow check above.
                id: std::num::NonZeroU64::new(id).unwrap(),
                _namespace: std::marker::PhantomData,
            }
        })
    }
}
impl<T: std::any::Any> Default for LocalID<T> {
    fn default() -> Self {
        Self::many(1).next().unwrap()
    }
}
impl<T: std::any::Any> std::fmt::Display for LocalID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // rsplit always yields at least one element.
        write!(
            f,
            "{}#{}",
            std::any::type_name::<T>().rsplit("::").next().unwrap(),
            self.id
        )
    }
}
impl<T: std::any::Any> std::fmt::Debug for LocalID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}
