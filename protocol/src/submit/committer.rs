//! The resolve → validate → commit pipeline.
//!
//! ```text
//!   Trigger::Direct(signed) ─┐
//!                            ├─► Received ─► Resolving ─► Validating ─► Committing
//!   Trigger::Receipt(id) ────┘        │            │             │            │
//!                                AlreadyExists  MissingState  Rejected     Committed
//!                                     └──────────── Halt (any stage) ─────────┘
//! ```
//!
//! Both triggers end in the same body; they differ only in how the
//! transaction and its signatures are found, how duplicates are detected,
//! and which marker is written first when committing:
//!
//! | Trigger | Transaction from | Duplicate check        | Commit marker       |
//! |---------|------------------|------------------------|---------------------|
//! | Direct  | caller           | transaction stored     | the transaction     |
//! | Receipt | stored receipt   | commit marker stored   | `Committed` record  |
//!
//! The commit step is three separate repository calls (marker, outputs,
//! inputs). A failure part-way through is a halt, and whatever already
//! landed stays. Concurrent submission of the same transaction is only as
//! safe as the repository's own guarantees.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, error, info};

use super::error::{Stage, SubmitError, SubmitResult};
use crate::storage::{Repository, StoreError};
use crate::transaction::{Committed, Id, Resolved, Signature, Signed, Transaction};
use crate::validator::Validator;

/// What started a pipeline run.
#[derive(Debug, Clone, Copy)]
pub enum Trigger<'a> {
    /// A caller handed us a signed transaction.
    Direct(&'a Signed),
    /// A receipt for an already stored transaction.
    Receipt(&'a Id),
}

/// A transaction that made it past the trigger step.
struct Pending<'a> {
    tx: Cow<'a, Transaction>,
    signatures: Cow<'a, [Signature]>,
    marker: Marker,
}

enum Marker {
    Transaction,
    Committed(Id),
}

pub struct Committer {
    repo: Arc<dyn Repository>,
    validator: Arc<dyn Validator>,
}

impl Committer {
    pub fn new(repo: Arc<dyn Repository>, validator: Arc<dyn Validator>) -> Self {
        Self { repo, validator }
    }

    /// Direct submission of a signed transaction.
    pub fn submit(&self, signed: &Signed) -> SubmitResult<()> {
        self.process(Trigger::Direct(signed))
    }

    /// Commit the transaction behind a stored receipt.
    pub fn commit(&self, receipt_id: &Id) -> SubmitResult<()> {
        self.process(Trigger::Receipt(receipt_id))
    }

    pub fn process(&self, trigger: Trigger<'_>) -> SubmitResult<()> {
        let result = self.run(trigger);
        if let Err(e) = &result {
            match e {
                SubmitError::Halt { stage, .. } => error!(stage = %stage, error = %e, "pipeline halted"),
                _ => info!(error = %e, "transaction not committed"),
            }
        }
        result
    }

    fn run(&self, trigger: Trigger<'_>) -> SubmitResult<()> {
        let pending = self.receive(trigger)?;
        let txid = &pending.tx.id;

        debug!(txid = %txid, stage = %Stage::Resolving, "resolving inputs and references");
        let resolved = self.resolve(&pending)?;

        debug!(txid = %txid, stage = %Stage::Validating, "validating");
        self.validate(&resolved)?;

        debug!(txid = %txid, stage = %Stage::Committing, "committing");
        self.apply(&pending)?;

        info!(
            txid = %txid,
            outputs = pending.tx.outputs.len(),
            consumed = pending.tx.inputs.len(),
            "transaction committed"
        );
        Ok(())
    }

    fn receive<'a>(&self, trigger: Trigger<'a>) -> SubmitResult<Pending<'a>> {
        match trigger {
            Trigger::Direct(signed) => {
                let txid = signed.id();
                debug!(txid = %txid, stage = %Stage::Received, "direct submission");
                match self.repo.get_transaction(txid) {
                    Ok(_) => return Err(SubmitError::AlreadyExists(txid.clone())),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(SubmitError::halt(Stage::Received, "transaction store failure", e)),
                }
                Ok(Pending {
                    tx: Cow::Borrowed(&signed.transaction),
                    signatures: Cow::Borrowed(&signed.signatures),
                    marker: Marker::Transaction,
                })
            }
            Trigger::Receipt(receipt_id) => {
                debug!(receipt = %receipt_id, stage = %Stage::Received, "receipt commit");
                let receipt = self.repo.get_receipt(receipt_id).map_err(|e| {
                    let context = if e.is_not_found() {
                        "receipt should have been disseminated but was not found"
                    } else {
                        "transaction store failure"
                    };
                    SubmitError::halt(Stage::Received, context, e)
                })?;

                let tx = self.repo.get_transaction(&receipt.txid).map_err(|e| {
                    let context = if e.is_not_found() {
                        "transaction should have been disseminated but was not found"
                    } else {
                        "transaction store failure"
                    };
                    SubmitError::halt(Stage::Received, context, e)
                })?;

                match self.repo.get_committed(&tx.id) {
                    Ok(_) => return Err(SubmitError::AlreadyExists(tx.id)),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(SubmitError::halt(Stage::Received, "transaction store failure", e)),
                }

                Ok(Pending {
                    tx: Cow::Owned(tx),
                    signatures: Cow::Owned(receipt.signatures),
                    marker: Marker::Committed(receipt.id),
                })
            }
        }
    }

    fn resolve(&self, pending: &Pending<'_>) -> SubmitResult<Resolved> {
        let tx = &pending.tx;
        let fetch = |ids: &[crate::transaction::StateId]| {
            ids.iter()
                .map(|id| self.repo.get_state(id, false))
                .collect::<Result<Vec<_>, StoreError>>()
        };

        let classify = |e: StoreError| {
            if e.is_not_found() {
                SubmitError::MissingState {
                    txid: tx.id.clone(),
                    source: e,
                }
            } else {
                SubmitError::halt(
                    Stage::Resolving,
                    format!("state resolution for transaction {} failed", tx.id),
                    e,
                )
            }
        };

        let inputs = fetch(&tx.inputs).map_err(classify)?;
        let references = fetch(&tx.references).map_err(classify)?;

        Ok(Resolved {
            id: tx.id.clone(),
            inputs,
            references,
            outputs: tx.outputs.clone(),
            parameters: tx.parameters.clone(),
            required_signers: tx.required_signers.clone(),
            signatures: pending.signatures.to_vec(),
        })
    }

    fn validate(&self, resolved: &Resolved) -> SubmitResult<()> {
        let verdict = self
            .validator
            .validate(resolved)
            .map_err(|e| SubmitError::halt(Stage::Validating, "validator failed", e))?;

        if verdict.valid {
            return Ok(());
        }
        Err(SubmitError::Rejected {
            reason: verdict.error_message.filter(|m| !m.is_empty()),
        })
    }

    fn apply(&self, pending: &Pending<'_>) -> SubmitResult<()> {
        let tx = &pending.tx;

        match &pending.marker {
            Marker::Transaction => self.repo.put_transaction(tx).map_err(|e| {
                SubmitError::halt(Stage::Committing, format!("storing transaction {} failed", tx.id), e)
            })?,
            Marker::Committed(receipt_id) => {
                // Sequence numbers are assigned by the total order, not here.
                let committed = Committed {
                    seq_no: 0,
                    receipt_id: receipt_id.clone(),
                };
                self.repo.put_committed(&tx.id, &committed).map_err(|e| {
                    SubmitError::halt(Stage::Committing, format!("marking {} as committed failed", tx.id), e)
                })?
            }
        }

        for output in &tx.outputs {
            self.repo.put_state(output).map_err(|e| {
                SubmitError::halt(
                    Stage::Committing,
                    format!("storing transaction output {} failed", output.id),
                    e,
                )
            })?;
        }

        for input in &tx.inputs {
            self.repo.consume_state(input).map_err(|e| {
                SubmitError::halt(
                    Stage::Committing,
                    format!("consuming transaction state {input} failed"),
                    e,
                )
            })?;
        }

        Ok(())
    }
}
