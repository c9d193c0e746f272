//! The ledger's view of stored transactions and states.
//!
//! [`Repository`] is the seam between the commit pipeline and storage;
//! [`TransactionRepository`] implements it over any [`Kv`].

use std::sync::Arc;

use prost::Message;
use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::keys::{
    commit_key, consumed_state_key, receipt_key, state_info_key, state_key, transaction_key,
};
use super::kv::Kv;
use crate::crypto::HashAlgorithm;
use crate::encoding::marshal_deterministic;
use crate::transaction::{pb, Committed, Id, Receipt, State, StateId, StateInfo, Transaction};

/// Storage operations the commit pipeline relies on.
///
/// Every getter returns [`StoreError::NotFound`] for an absent record so the
/// pipeline can tell "missing" apart from "broken".
pub trait Repository: Send + Sync {
    fn put_transaction(&self, tx: &Transaction) -> StoreResult<()>;
    fn get_transaction(&self, txid: &Id) -> StoreResult<Transaction>;

    fn put_state(&self, state: &State) -> StoreResult<()>;
    /// Reads a live state, or a consumed one when `consumed` is set.
    fn get_state(&self, id: &StateId, consumed: bool) -> StoreResult<State>;
    /// Moves a live state to the consumed set.
    fn consume_state(&self, id: &StateId) -> StoreResult<()>;

    fn put_committed(&self, txid: &Id, committed: &Committed) -> StoreResult<()>;
    fn get_committed(&self, txid: &Id) -> StoreResult<Committed>;

    fn put_receipt(&self, receipt: &Receipt) -> StoreResult<()>;
    fn get_receipt(&self, receipt_id: &Id) -> StoreResult<Receipt>;
}

pub struct TransactionRepository {
    kv: Arc<dyn Kv>,
    hash: HashAlgorithm,
}

impl TransactionRepository {
    /// `hash` must be the algorithm transactions were identified with;
    /// stored transactions are re-identified on read.
    pub fn new(kv: Arc<dyn Kv>, hash: HashAlgorithm) -> Self {
        Self { kv, hash }
    }
}

impl Repository for TransactionRepository {
    fn put_transaction(&self, tx: &Transaction) -> StoreResult<()> {
        self.kv.put(&transaction_key(&tx.id), &tx.encoded)?;
        debug!(txid = %tx.id, bytes = tx.encoded.len(), "stored transaction");
        Ok(())
    }

    fn get_transaction(&self, txid: &Id) -> StoreResult<Transaction> {
        let payload = self.kv.get(&transaction_key(txid))?;
        let tx = Transaction::from_bytes(self.hash, &payload)?;
        if &tx.id != txid {
            return Err(StoreError::Corrupted(format!(
                "requested transaction {txid} but retrieved {}",
                tx.id
            )));
        }
        Ok(tx)
    }

    fn put_state(&self, state: &State) -> StoreResult<()> {
        let info = marshal_deterministic(&state.info.to_pb())?;

        let mut batch = self.kv.new_write_batch();
        batch.put(state_key(&state.id), state.data.clone());
        batch.put(state_info_key(&state.id), info);
        batch.commit()
    }

    fn get_state(&self, id: &StateId, consumed: bool) -> StoreResult<State> {
        let info = pb::StateInfo::decode(self.kv.get(&state_info_key(id))?.as_slice())?;
        let data = if consumed {
            self.kv.get(&consumed_state_key(id))?
        } else {
            self.kv.get(&state_key(id))?
        };

        Ok(State {
            id: id.clone(),
            info: StateInfo::from(&info),
            data,
        })
    }

    fn consume_state(&self, id: &StateId) -> StoreResult<()> {
        let live = state_key(id);
        let data = self.kv.get(&live)?;

        let mut batch = self.kv.new_write_batch();
        batch.put(consumed_state_key(id), data);
        batch.delete(live);
        batch.commit()?;

        debug!(state = %id, "consumed state");
        Ok(())
    }

    fn put_committed(&self, txid: &Id, committed: &Committed) -> StoreResult<()> {
        self.kv.put(&commit_key(txid), &bincode::serialize(committed)?)
    }

    fn get_committed(&self, txid: &Id) -> StoreResult<Committed> {
        let bytes = self.kv.get(&commit_key(txid))?;
        Ok(bincode::deserialize(&bytes)?)
    }

    fn put_receipt(&self, receipt: &Receipt) -> StoreResult<()> {
        self.kv.put(&receipt_key(&receipt.id), &bincode::serialize(receipt)?)
    }

    fn get_receipt(&self, receipt_id: &Id) -> StoreResult<Receipt> {
        let bytes = self.kv.get(&receipt_key(receipt_id))?;
        let mut receipt: Receipt = bincode::deserialize(&bytes)?;
        receipt.id = receipt_id.clone();
        Ok(receipt)
    }
}
