//! Byte-oriented key/value store interface.
//!
//! Everything above this layer (the transaction repository, the total-order
//! log) only needs point reads, point writes and atomic batches. Two
//! backends ship: [`MemoryKv`] for tests and throwaway nodes, and
//! [`SledKv`](super::db::SledKv) for disk.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::error::{StoreError, StoreResult};

/// One buffered write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

pub trait Kv: Send + Sync {
    /// Returns [`StoreError::NotFound`] when the key is absent.
    fn get(&self, key: &[u8]) -> StoreResult<Vec<u8>>;

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Deleting an absent key is not an error.
    fn delete(&self, key: &[u8]) -> StoreResult<()>;

    /// Applies all operations atomically, in order.
    fn apply(&self, ops: &[BatchOp]) -> StoreResult<()>;

    fn new_write_batch(&self) -> WriteBatch<'_>;
}

pub(crate) fn not_found(key: &[u8]) -> StoreError {
    StoreError::NotFound(format!("key {}", hex::encode(key)))
}

// ---------------------------------------------------------------------------
// WriteBatch
// ---------------------------------------------------------------------------

/// Buffers writes in memory until [`commit`](WriteBatch::commit).
pub struct WriteBatch<'a> {
    kv: &'a dyn Kv,
    ops: Vec<BatchOp>,
}

impl<'a> WriteBatch<'a> {
    pub fn new(kv: &'a dyn Kv) -> Self {
        Self { kv, ops: Vec::new() }
    }

    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Put(key.into(), value.into()));
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete(key.into()));
    }

    /// Writes everything buffered so far. The batch is empty afterwards
    /// and can be reused.
    pub fn commit(&mut self) -> StoreResult<()> {
        self.kv.apply(&self.ops)?;
        self.ops.clear();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn count(&self) -> usize {
        self.ops.len()
    }
}

// ---------------------------------------------------------------------------
// MemoryKv
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Keys starting with `prefix`, in order.
    pub fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        self.entries
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

impl Kv for MemoryKv {
    fn get(&self, key: &[u8]) -> StoreResult<Vec<u8>> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| not_found(key))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn apply(&self, ops: &[BatchOp]) -> StoreResult<()> {
        let mut entries = self.entries.write();
        for op in ops {
            match op {
                BatchOp::Put(k, v) => {
                    entries.insert(k.clone(), v.clone());
                }
                BatchOp::Delete(k) => {
                    entries.remove(k);
                }
            }
        }
        Ok(())
    }

    fn new_write_batch(&self) -> WriteBatch<'_> {
        WriteBatch::new(self)
    }
}
