//! # ECDSA with Low-S Normalization
//!
//! secp256k1 ECDSA signatures over 32-byte digests. For every valid `(r, s)`
//! signature, `(r, n - s)` is also valid. That's a malleability problem:
//! anyone can flip `s` and get a "different" signature over the same
//! message. We close it the usual way:
//!
//! - [`sign`] always produces `s <= n/2`.
//! - [`verify`] rejects `s > n/2` outright, with [`EcdsaError::HighS`],
//!   before it even looks at the math.
//!
//! Public keys are SEC1 (compressed or uncompressed), signatures are DER.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::scalar::IsHigh;
use thiserror::Error;

/// Errors during signature operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcdsaError {
    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid secret key")]
    InvalidSecretKey,

    #[error("malformed signature ASN.1")]
    MalformedSignature,

    #[error("s must be smaller than the half order of the curve")]
    HighS,

    #[error("signing failed")]
    SigningFailed,
}

/// A secp256k1 keypair.
#[derive(Clone)]
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, EcdsaError> {
        SigningKey::from_slice(secret)
            .map(|signing| Self { signing })
            .map_err(|_| EcdsaError::InvalidSecretKey)
    }

    /// Compressed SEC1 encoding of the public key (33 bytes).
    pub fn public_key(&self) -> Vec<u8> {
        self.signing
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    pub fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, EcdsaError> {
        sign(&self.signing, digest)
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the secret.
        f.debug_struct("Keypair")
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

/// Sign a digest, returning a DER-encoded low-S signature.
pub fn sign(key: &SigningKey, digest: &[u8]) -> Result<Vec<u8>, EcdsaError> {
    let signature: Signature = key
        .sign_prehash(digest)
        .map_err(|_| EcdsaError::SigningFailed)?;
    Ok(to_low_s(signature).to_der().as_bytes().to_vec())
}

/// Verify a DER signature over `digest` with a SEC1 public key.
///
/// `Ok(false)` means the signature is well formed but doesn't verify.
/// Malformed input and high-S signatures are errors.
pub fn verify(public_key: &[u8], signature: &[u8], digest: &[u8]) -> Result<bool, EcdsaError> {
    let key = VerifyingKey::from_sec1_bytes(public_key).map_err(|_| EcdsaError::InvalidPublicKey)?;
    let signature = Signature::from_der(signature).map_err(|_| EcdsaError::MalformedSignature)?;

    if !is_low_s(&signature) {
        return Err(EcdsaError::HighS);
    }

    Ok(key.verify_prehash(digest, &signature).is_ok())
}

pub fn is_low_s(signature: &Signature) -> bool {
    !bool::from(signature.s().is_high())
}

/// Replace `s` with `n - s` when `s` is in the upper half.
pub fn to_low_s(signature: Signature) -> Signature {
    signature.normalize_s().unwrap_or(signature)
}
