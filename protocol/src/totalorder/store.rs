//! # TotalOrderStore - the hash-chained log
//!
//! An append-only log of [`TxIdAndHmac`] entries. Every append gets the next
//! sequence number (0, 1, 2, ... with no gaps) and extends a running hash
//! chain:
//!
//! ```text
//! acc₀ = ""          acc₁ = H(acc₀ || e₀)      accₙ = H(accₙ₋₁ || eₙ₋₁)
//! ```
//!
//! ## Key layout (its own tree)
//!
//! | Key                  | Value                          |
//! |----------------------|--------------------------------|
//! | `0x01 0x01`          | last committed seq (BE u64)    |
//! | `0x01 0x02`          | accumulator                    |
//! | `0x02 ‖ BE64(seq)`   | 64-byte entry                  |
//!
//! The three writes of an append go out in a single batch.
//!
//! ## Waiting
//!
//! Readers may ask for a sequence number that doesn't exist yet. They get
//! parked on a one-shot `watch` signal for that number, which the matching
//! append fires exactly once. A reader that gives up (cancellation) just
//! drops its receiver; the append still fires into the void and moves on.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::entry::TxIdAndHmac;
use super::error::{TotalOrderError, TotalOrderResult};
use crate::config::{
    TOTAL_ORDER_ENTRY_LENGTH, TOTAL_ORDER_KEY_ACCUMULATOR, TOTAL_ORDER_KEY_LAST_COMMITTED,
    TOTAL_ORDER_SEQUENCE_PREFIX,
};
use crate::crypto::HashAlgorithm;
use crate::storage::{Kv, StoreError};

pub struct TotalOrderStore {
    kv: Arc<dyn Kv>,
    hash: HashAlgorithm,
    inner: Mutex<Inner>,
}

struct Inner {
    next_sequence: u64,
    accumulator: Vec<u8>,
    waiters: HashMap<u64, watch::Sender<bool>>,
}

impl TotalOrderStore {
    /// Opens the log in `kv`, picking up where a previous run left off.
    pub fn open(kv: Arc<dyn Kv>, hash: HashAlgorithm) -> TotalOrderResult<Self> {
        let (next_sequence, accumulator) = match kv.get(&TOTAL_ORDER_KEY_LAST_COMMITTED) {
            Ok(bytes) => {
                let last = decode_u64(&bytes).ok_or_else(|| {
                    TotalOrderError::Corrupted(format!(
                        "last committed sequence has {} bytes",
                        bytes.len()
                    ))
                })?;
                let accumulator = kv.get(&TOTAL_ORDER_KEY_ACCUMULATOR).map_err(|e| {
                    if e.is_not_found() {
                        TotalOrderError::Corrupted("accumulator missing".into())
                    } else {
                        TotalOrderError::Store(e)
                    }
                })?;
                (last + 1, accumulator)
            }
            Err(e) if e.is_not_found() => (0, Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if next_sequence > 0 {
            info!(next_sequence, "recovered total order log");
        }

        Ok(Self {
            kv,
            hash,
            inner: Mutex::new(Inner {
                next_sequence,
                accumulator,
                waiters: HashMap::new(),
            }),
        })
    }

    /// Appends `entry` and returns the sequence number it was given.
    ///
    /// # Panics
    ///
    /// If the entry is not 32 + 32 bytes.
    pub fn append(&self, entry: &TxIdAndHmac) -> TotalOrderResult<u64> {
        let bytes = entry.to_bytes();

        let mut inner = self.inner.lock();
        let seq = inner.next_sequence;
        let next_accumulator = self.hash.digest_parts(&[inner.accumulator.as_slice(), &bytes[..]]);

        let mut batch = self.kv.new_write_batch();
        batch.put(sequence_key(seq), bytes.to_vec());
        batch.put(TOTAL_ORDER_KEY_LAST_COMMITTED.to_vec(), seq.to_be_bytes().to_vec());
        batch.put(TOTAL_ORDER_KEY_ACCUMULATOR.to_vec(), next_accumulator.clone());
        batch
            .commit()
            .map_err(|source| TotalOrderError::Persist { seq, source })?;

        if let Some(waiter) = inner.waiters.remove(&seq) {
            waiter.send_replace(true);
        }
        inner.next_sequence += 1;
        inner.accumulator = next_accumulator;

        debug!(seq, "appended total order entry");
        Ok(seq)
    }

    /// Returns entry `seq`, waiting for it to be appended if necessary.
    pub async fn get(&self, cancel: &CancellationToken, seq: u64) -> TotalOrderResult<TxIdAndHmac> {
        if let Some(mut ready) = self.waiter(seq) {
            let arrived = tokio::select! {
                res = async { ready.wait_for(|appended| *appended).await.map(|_| ()) } => res.is_ok(),
                _ = cancel.cancelled() => {
                    drop(ready);
                    self.forget_waiter(seq);
                    return Err(TotalOrderError::Cancelled);
                }
            };
            if !arrived {
                return Err(TotalOrderError::Stopped);
            }
        }

        let bytes = self
            .kv
            .get(&sequence_key(seq))
            .map_err(|source| TotalOrderError::Read { seq, source })?;
        if bytes.len() != TOTAL_ORDER_ENTRY_LENGTH {
            return Err(TotalOrderError::Corrupted(format!(
                "entry {seq} has {} bytes",
                bytes.len()
            )));
        }
        Ok(TxIdAndHmac::from_bytes(&bytes))
    }

    pub fn next_sequence(&self) -> u64 {
        self.inner.lock().next_sequence
    }

    /// Current head of the hash chain. Empty before the first append.
    pub fn accumulator(&self) -> Vec<u8> {
        self.inner.lock().accumulator.clone()
    }

    /// `None` if `seq` is already in the log.
    fn waiter(&self, seq: u64) -> Option<watch::Receiver<bool>> {
        let mut inner = self.inner.lock();
        if seq < inner.next_sequence {
            return None;
        }
        Some(
            inner
                .waiters
                .entry(seq)
                .or_insert_with(|| watch::channel(false).0)
                .subscribe(),
        )
    }

    /// Drops the signal for `seq` once nobody is waiting on it.
    fn forget_waiter(&self, seq: u64) {
        let mut inner = self.inner.lock();
        if let Some(waiter) = inner.waiters.get(&seq) {
            if waiter.receiver_count() == 0 {
                inner.waiters.remove(&seq);
            }
        }
    }

    #[cfg(test)]
    fn pending_waiters(&self) -> usize {
        self.inner.lock().waiters.len()
    }
}

fn sequence_key(seq: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(TOTAL_ORDER_SEQUENCE_PREFIX);
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

fn decode_u64(bytes: &[u8]) -> Option<u64> {
    let arr: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(arr))
}

impl From<StoreError> for TotalOrderError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;
    use std::time::Duration;

    // -- Helpers ------------------------------------------------------------

    fn entry(n: u8) -> TxIdAndHmac {
        TxIdAndHmac::new(vec![n; 32], vec![n.wrapping_add(100); 32])
    }

    fn store() -> (Arc<MemoryKv>, TotalOrderStore) {
        let kv = Arc::new(MemoryKv::new());
        let store = TotalOrderStore::open(kv.clone(), HashAlgorithm::Sha256).unwrap();
        (kv, store)
    }

    // -- Tests --------------------------------------------------------------

    #[tokio::test]
    async fn sequential_appends_read_back_in_order() {
        let (_, store) = store();
        let cancel = CancellationToken::new();

        for n in 0..10u8 {
            assert_eq!(store.append(&entry(n)).unwrap(), n as u64);
        }
        for n in 0..10u8 {
            assert_eq!(store.get(&cancel, n as u64).await.unwrap(), entry(n));
        }
        assert_eq!(store.next_sequence(), 10);
    }

    #[test]
    fn accumulator_chains_entries() {
        let (kv, store) = store();
        assert!(store.accumulator().is_empty());

        let h = HashAlgorithm::Sha256;
        let mut expected: Vec<u8> = Vec::new();
        for n in 0..5u8 {
            store.append(&entry(n)).unwrap();
            expected = h.digest_parts(&[expected.as_slice(), &entry(n).to_bytes()[..]]);
        }

        assert_eq!(store.accumulator(), expected);
        assert_eq!(kv.get(&TOTAL_ORDER_KEY_ACCUMULATOR).unwrap(), expected);
        assert_eq!(kv.get(&TOTAL_ORDER_KEY_LAST_COMMITTED).unwrap(), 4u64.to_be_bytes());
        assert_eq!(kv.get(&[0x02, 0, 0, 0, 0, 0, 0, 0, 3]).unwrap(), entry(3).to_bytes());
    }

    #[test]
    fn first_accumulator_is_hash_of_first_entry() {
        let (_, store) = store();
        store.append(&entry(1)).unwrap();
        assert_eq!(store.accumulator(), HashAlgorithm::Sha256.digest(&entry(1).to_bytes()));
    }

    #[tokio::test]
    async fn get_blocks_until_append() {
        let (_, store) = store();
        let store = Arc::new(store);
        let cancel = CancellationToken::new();

        let reader = {
            let store = store.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { store.get(&cancel, 1).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!reader.is_finished());

        store.append(&entry(0)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!reader.is_finished());

        store.append(&entry(1)).unwrap();
        let got = tokio::time::timeout(Duration::from_secs(5), reader)
            .await
            .expect("reader should wake")
            .unwrap()
            .unwrap();
        assert_eq!(got, entry(1));
        assert_eq!(store.pending_waiters(), 0);
    }

    #[tokio::test]
    async fn several_readers_share_one_signal() {
        let (_, store) = store();
        let store = Arc::new(store);
        let cancel = CancellationToken::new();

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let store = store.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { store.get(&cancel, 0).await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.pending_waiters(), 1);
        store.append(&entry(9)).unwrap();

        for r in futures::future::join_all(readers).await {
            assert_eq!(r.unwrap().unwrap(), entry(9));
        }
    }

    #[tokio::test]
    async fn cancelled_get_does_not_block_later_append() {
        let (_, store) = store();
        let cancel = CancellationToken::new();

        let pending = store.get(&cancel, 0);
        cancel.cancel();
        assert!(matches!(pending.await, Err(TotalOrderError::Cancelled)));
        assert_eq!(store.pending_waiters(), 0);

        store.append(&entry(0)).unwrap();
        let fresh = CancellationToken::new();
        assert_eq!(store.get(&fresh, 0).await.unwrap(), entry(0));
    }

    #[tokio::test]
    async fn append_after_abandoned_waiter_still_signals() {
        let (_, store) = store();
        let store = Arc::new(store);

        let cancel = CancellationToken::new();
        let reader = {
            let store = store.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { store.get(&cancel, 0).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        reader.abort();
        let _ = reader.await;

        store.append(&entry(0)).unwrap();
        assert_eq!(store.pending_waiters(), 0);
    }

    #[test]
    fn reopen_recovers_position_and_chain() {
        let kv = Arc::new(MemoryKv::new());
        let first = TotalOrderStore::open(kv.clone(), HashAlgorithm::Sha256).unwrap();
        for n in 0..3u8 {
            first.append(&entry(n)).unwrap();
        }
        let acc = first.accumulator();
        drop(first);

        let second = TotalOrderStore::open(kv, HashAlgorithm::Sha256).unwrap();
        assert_eq!(second.next_sequence(), 3);
        assert_eq!(second.accumulator(), acc);
        assert_eq!(second.append(&entry(3)).unwrap(), 3);
    }

    #[test]
    fn reopen_with_truncated_metadata_is_corrupted() {
        let kv = Arc::new(MemoryKv::new());
        kv.put(&TOTAL_ORDER_KEY_LAST_COMMITTED, &[0, 1]).unwrap();
        let err = TotalOrderStore::open(kv, HashAlgorithm::Sha256).err().unwrap();
        assert!(matches!(err, TotalOrderError::Corrupted(_)));
    }

    #[test]
    #[should_panic(expected = "must be 32 bytes")]
    fn append_rejects_malformed_entry() {
        let (_, store) = store();
        let _ = store.append(&TxIdAndHmac::new(vec![0; 20], vec![0; 32]));
    }
}
