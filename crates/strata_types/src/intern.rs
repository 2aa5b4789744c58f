//! Sharded hash-consing table for composite types.
//!
//! Every composite [`Type`] is created here, so structurally identical
//! types always come back as the same canonical node.

use std::hash::{Hash, Hasher};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};

use crate::config::StoreConfig;
use crate::types::{Type, TypeKind, atomic};

/// Per-shard storage for interned types.
struct Shard {
    map: FxHashMap<TypeKind, Type>,
}

impl Shard {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }
}

/// Sharded interner for concurrent access.
///
/// Readers take a shard read lock; a miss upgrades to the write lock and
/// checks again before inserting, so two racing callers agree on one node.
pub(crate) struct Interner {
    shards: Box<[RwLock<Shard>]>,
}

impl Interner {
    /// Creates an empty interner sized by `config`.
    pub(crate) fn new(config: &StoreConfig) -> Self {
        let shards = (0..config.shard_count.max(1))
            .map(|_| RwLock::new(Shard::with_capacity(config.shard_capacity)))
            .collect();
        Self { shards }
    }

    fn shard_for(&self, kind: &TypeKind) -> &RwLock<Shard> {
        let mut hasher = FxHasher::default();
        kind.hash(&mut hasher);
        #[allow(clippy::cast_possible_truncation)]
        let index = hasher.finish() as usize % self.shards.len();
        &self.shards[index]
    }

    /// Returns the canonical type for `kind`, creating it on first use.
    pub(crate) fn intern(&self, kind: TypeKind) -> Type {
        if let Some(ty) = atomic(&kind) {
            return ty;
        }

        let shard = self.shard_for(&kind);

        if let Some(ty) = shard.read().map.get(&kind) {
            return ty.clone();
        }

        let mut guard = shard.write();
        if let Some(ty) = guard.map.get(&kind) {
            return ty.clone();
        }

        let ty = Type::from_kind(kind.clone());
        tracing::trace!(ty = %ty, "interned type");
        guard.map.insert(kind, ty.clone());
        ty
    }

    /// Returns the number of composite types interned so far.
    pub(crate) fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().map.len()).sum()
    }
}
