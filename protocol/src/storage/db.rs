//! # LedgerDb - sled-backed storage
//!
//! The on-disk home of a Strata node, built on sled's embedded key-value
//! store. Two named trees hold everything:
//!
//! | Tree         | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | `ledger`     | transactions, states, receipts, commit markers        |
//! | `totalorder` | sequenced `TxIdAndHmac` entries and log metadata      |
//!
//! Both trees are exposed through [`SledKv`], so the repository and the
//! total-order log never see sled directly. Key layouts live next to the
//! code that owns them (`storage::keys` and `totalorder::store`).
//!
//! ## Atomicity
//!
//! [`Kv::apply`] maps onto a single sled `Batch`: either every write in it
//! lands or none does.

use sled::{Batch, Db, Tree};
use std::path::Path;

use super::error::StoreResult;
use super::kv::{not_found, BatchOp, Kv, WriteBatch};
use crate::config::{LEDGER_TREE, TOTAL_ORDER_TREE};

// ---------------------------------------------------------------------------
// SledKv
// ---------------------------------------------------------------------------

/// One sled tree behind the [`Kv`] interface.
#[derive(Debug, Clone)]
pub struct SledKv {
    tree: Tree,
}

impl SledKv {
    pub fn new(tree: Tree) -> Self {
        Self { tree }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl Kv for SledKv {
    fn get(&self, key: &[u8]) -> StoreResult<Vec<u8>> {
        match self.tree.get(key)? {
            Some(value) => Ok(value.to_vec()),
            None => Err(not_found(key)),
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.tree.insert(key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.tree.remove(key)?;
        Ok(())
    }

    fn apply(&self, ops: &[BatchOp]) -> StoreResult<()> {
        let mut batch = Batch::default();
        for op in ops {
            match op {
                BatchOp::Put(k, v) => batch.insert(k.as_slice(), v.as_slice()),
                BatchOp::Delete(k) => batch.remove(k.as_slice()),
            }
        }
        self.tree.apply_batch(batch)?;
        Ok(())
    }

    fn new_write_batch(&self) -> WriteBatch<'_> {
        WriteBatch::new(self)
    }
}

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// Handle to a node's database.
///
/// sled is thread-safe, so `LedgerDb` (and every `SledKv` it hands out) can
/// be cloned and shared freely.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
    ledger: Tree,
    total_order: Tree,
}

impl LedgerDb {
    /// Open or create a database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A database that lives in memory and disappears on drop.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let ledger = db.open_tree(LEDGER_TREE)?;
        let total_order = db.open_tree(TOTAL_ORDER_TREE)?;
        Ok(Self {
            db,
            ledger,
            total_order,
        })
    }

    pub fn ledger(&self) -> SledKv {
        SledKv::new(self.ledger.clone())
    }

    pub fn total_order(&self) -> SledKv {
        SledKv::new(self.total_order.clone())
    }

    /// Flush all pending writes to disk. Returns bytes flushed.
    pub fn flush(&self) -> StoreResult<usize> {
        Ok(self.db.flush()?)
    }
}
