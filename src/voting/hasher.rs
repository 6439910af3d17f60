use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use hmac::{Hmac, Mac};
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use thiserror::Error;

use crate::model::{common::VoteType, mongodb::Id};

pub type HmacSha256 = Hmac<Sha256>;

/// Separates vote commitments from any other use of the same key.
const DOMAIN_TAG: &[u8] = b"vote-integrity/vote-hash/v1";

pub const NONCE_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HasherError {
    #[error("Vote hash key must be at least {min} bytes, got {actual}")]
    KeyTooShort { min: usize, actual: usize },
    #[error("Nonce must be {NONCE_LENGTH} hex-encoded bytes")]
    MalformedNonce,
}

/// Fresh randomness mixed into every commitment, so equal votes never share
/// a hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LENGTH]);

impl Nonce {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0; NONCE_LENGTH];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }
}

impl From<[u8; NONCE_LENGTH]> for Nonce {
    fn from(bytes: [u8; NONCE_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Nonce {
    type Err = HasherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = HEXLOWER_PERMISSIVE
            .decode(s.as_bytes())
            .map_err(|_| HasherError::MalformedNonce)?;
        let bytes = bytes.try_into().map_err(|_| HasherError::MalformedNonce)?;
        Ok(Self(bytes))
    }
}

// Nonces link a receipt to its commitment; keep them out of logs.
impl Debug for Nonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Nonce(..)")
    }
}

/// Computes keyed commitments over individual votes.
#[derive(Clone)]
pub struct VoteHasher {
    mac: HmacSha256,
}

impl VoteHasher {
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Key a new hasher. Keys shorter than [`Self::MIN_KEY_LENGTH`] are refused.
    pub fn new(key: &[u8]) -> Result<Self, HasherError> {
        if key.len() < Self::MIN_KEY_LENGTH {
            return Err(HasherError::KeyTooShort {
                min: Self::MIN_KEY_LENGTH,
                actual: key.len(),
            });
        }
        let mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
        Ok(Self { mac })
    }

    /// Commit to one vote, returning 64 lowercase hex characters.
    ///
    /// Fields are length-prefixed in a fixed order and the candidate carries a
    /// presence byte, so no two distinct inputs share an encoding.
    pub fn hash(
        &self,
        ballot_id: Id,
        candidate_id: Option<Id>,
        vote_type: VoteType,
        nonce: &Nonce,
    ) -> String {
        let mut mac = self.mac.clone();
        mac.update(DOMAIN_TAG);
        update_field(&mut mac, &ballot_id.bytes());
        match candidate_id {
            Some(candidate_id) => {
                let mut field = vec![1];
                field.extend_from_slice(&candidate_id.bytes());
                update_field(&mut mac, &field);
            }
            None => update_field(&mut mac, &[0]),
        }
        update_field(&mut mac, vote_type.as_str().as_bytes());
        update_field(&mut mac, nonce.as_bytes());
        HEXLOWER.encode(&mac.finalize().into_bytes())
    }
}

fn update_field(mac: &mut HmacSha256, field: &[u8]) {
    // Fields are all tiny; a u32 length cannot overflow.
    mac.update(&(field.len() as u32).to_be_bytes());
    mac.update(field);
}

impl Debug for VoteHasher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteHasher").finish_non_exhaustive()
    }
}
