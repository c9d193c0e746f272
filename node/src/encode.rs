//! JSON input for the `encode` subcommand.
//!
//! Mirrors the transaction wire message with every byte field written as a
//! hex string and every list optional:
//!
//! ```json
//! {
//!   "salt": "4e61436c...",
//!   "inputs": [{ "txid": "ab12...", "output_index": 0 }],
//!   "outputs": [{ "info": { "kind": "coin", "owners": [{ "public_key": "02..." }] },
//!                 "state": "3130" }],
//!   "parameters": [{ "name": "memo", "value": "6869" }],
//!   "required_signers": [{ "public_key": "03..." }]
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;

use strata_protocol::crypto::HashAlgorithm;
use strata_protocol::transaction::{pb, Transaction};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransactionJson {
    pub salt: String,
    pub inputs: Vec<StateReferenceJson>,
    pub references: Vec<StateReferenceJson>,
    pub outputs: Vec<StateJson>,
    pub parameters: Vec<ParameterJson>,
    pub required_signers: Vec<PartyJson>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateReferenceJson {
    pub txid: String,
    pub output_index: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateJson {
    pub info: Option<StateInfoJson>,
    pub state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateInfoJson {
    pub kind: String,
    pub owners: Vec<PartyJson>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartyJson {
    pub public_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterJson {
    pub name: String,
    pub value: String,
}

fn unhex(field: &str, s: &str) -> Result<Vec<u8>> {
    hex::decode(s).with_context(|| format!("{field} is not valid hex"))
}

impl PartyJson {
    fn to_pb(&self) -> Result<pb::Party> {
        Ok(pb::Party {
            public_key: unhex("public_key", &self.public_key)?,
        })
    }
}

impl StateReferenceJson {
    fn to_pb(&self) -> Result<pb::StateReference> {
        Ok(pb::StateReference {
            txid: unhex("txid", &self.txid)?,
            output_index: self.output_index,
        })
    }
}

impl StateJson {
    fn to_pb(&self) -> Result<pb::State> {
        let info = match &self.info {
            Some(info) => Some(pb::StateInfo {
                owners: info
                    .owners
                    .iter()
                    .map(PartyJson::to_pb)
                    .collect::<Result<_>>()?,
                kind: info.kind.clone(),
            }),
            None => None,
        };
        Ok(pb::State {
            info,
            state: unhex("state", &self.state)?,
        })
    }
}

impl ParameterJson {
    fn to_pb(&self) -> Result<pb::Parameter> {
        Ok(pb::Parameter {
            name: self.name.clone(),
            value: unhex("parameter value", &self.value)?,
        })
    }
}

impl TransactionJson {
    pub fn to_pb(&self) -> Result<pb::Transaction> {
        Ok(pb::Transaction {
            salt: unhex("salt", &self.salt)?,
            inputs: self
                .inputs
                .iter()
                .map(StateReferenceJson::to_pb)
                .collect::<Result<_>>()
                .context("bad input")?,
            references: self
                .references
                .iter()
                .map(StateReferenceJson::to_pb)
                .collect::<Result<_>>()
                .context("bad reference")?,
            outputs: self
                .outputs
                .iter()
                .map(StateJson::to_pb)
                .collect::<Result<_>>()
                .context("bad output")?,
            parameters: self
                .parameters
                .iter()
                .map(ParameterJson::to_pb)
                .collect::<Result<_>>()
                .context("bad parameter")?,
            required_signers: self
                .required_signers
                .iter()
                .map(PartyJson::to_pb)
                .collect::<Result<_>>()
                .context("bad required signer")?,
        })
    }
}

/// Parses `raw` and derives the transaction's identity.
pub fn transaction_from_json(hash: HashAlgorithm, raw: &str) -> Result<Transaction> {
    let parsed: TransactionJson =
        serde_json::from_str(raw).context("transaction is not valid JSON")?;
    let tx = Transaction::new(hash, parsed.to_pb()?)?;
    Ok(tx)
}
