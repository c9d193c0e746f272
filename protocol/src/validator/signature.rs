//! The built-in validator: every required signer must have signed.
//!
//! Required signers are the owners of every resolved input followed by the
//! transaction's explicit `required_signers`. Each one needs a signature
//! from its key over `sha256(txid)`. References don't count: reading a
//! state needs no permission from its owners.

use super::{Validator, ValidatorError, Verdict};
use crate::crypto::{ecdsa, sha256, EcdsaError};
use crate::transaction::{Party, Resolved, Signature};

#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureValidator;

impl SignatureValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for SignatureValidator {
    fn validate(&self, resolved: &Resolved) -> Result<Verdict, ValidatorError> {
        Ok(match check(resolved) {
            Ok(()) => Verdict::valid(),
            Err(message) => Verdict::invalid(message),
        })
    }
}

fn check(resolved: &Resolved) -> Result<(), String> {
    let digest = sha256(resolved.id.as_bytes());

    for signer in required_signers(resolved) {
        if signer.public_key.is_empty() {
            return Err("required signer missing public key".into());
        }
        let sig = find_signature(&signer.public_key, &resolved.signatures)
            .ok_or_else(|| format!("missing signature from {}", hex::encode(&signer.public_key)))?;

        match ecdsa::verify(&signer.public_key, &sig.signature, &digest) {
            Ok(true) => {}
            Ok(false) => return Err("signature verification failed".into()),
            Err(EcdsaError::InvalidPublicKey) => {
                return Err(format!(
                    "failed to unmarshal public key: {}",
                    EcdsaError::InvalidPublicKey
                ))
            }
            Err(e) => return Err(e.to_string()),
        }
    }
    Ok(())
}

fn required_signers(resolved: &Resolved) -> impl Iterator<Item = &Party> {
    resolved
        .inputs
        .iter()
        .flat_map(|input| input.info.owners.iter())
        .chain(resolved.required_signers.iter())
}

fn find_signature<'a>(public_key: &[u8], signatures: &'a [Signature]) -> Option<&'a Signature> {
    signatures.iter().find(|s| s.public_key == public_key)
}
