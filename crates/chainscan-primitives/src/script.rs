//! Deduplicated script records served by the script store.
//!
//! The dedup store itself is an external collaborator; this module defines
//! the record shapes the hash index reads from it and the [`ScriptAccess`]
//! trait it reads them through.

use crate::address::RawAddress;
use crate::hashes::{Hash160, Hash256, hash160};

/// Width of the fixed pubkey buffer in a [`PubkeyRecord`]. Large enough for
/// an uncompressed key; compressed keys only use the first 33 bytes.
pub const PUBKEY_BUF_LEN: usize = 65;

/// Returns the encoded length of a public key from its leading tag byte:
/// 33 bytes for a compressed key (`0x02`/`0x03`), 65 for an uncompressed or
/// hybrid key (`0x04`/`0x06`/`0x07`), `None` for anything else.
pub fn pubkey_encoded_len(tag: u8) -> Option<usize> {
    match tag {
        0x02 | 0x03 => Some(33),
        0x04 | 0x06 | 0x07 => Some(65),
        _ => None,
    }
}

/// Script store error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("no stored record for script number {0}")]
    MissingRecord(u32),

    #[error("stored public key has an unknown encoding tag {0:#04x}")]
    MalformedPubkey(u8),
}

/// Dedup record behind P2PKH and P2WPKH outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubkeyRecord {
    /// The full public key, when one has been revealed on-chain. Stored in a
    /// fixed-width buffer; the true encoded length follows from the tag byte.
    pub pubkey: Option<[u8; PUBKEY_BUF_LEN]>,
    /// HASH160 of the public key, always available.
    pub pubkey_hash: Hash160,
}

impl PubkeyRecord {
    /// The canonical 160-bit indexing key for this record.
    ///
    /// When the full key is known the hash is recomputed over the key's true
    /// encoded length; the fixed buffer may carry trailing bytes that must
    /// not enter the digest. Without a revealed key the stored hash is used
    /// as-is.
    pub fn indexing_hash(&self) -> Result<Hash160, ScriptError> {
        match &self.pubkey {
            Some(key) => {
                let len = pubkey_encoded_len(key[0]).ok_or(ScriptError::MalformedPubkey(key[0]))?;
                Ok(hash160(&key[..len]))
            }
            None => Ok(self.pubkey_hash),
        }
    }
}

/// Dedup record behind P2SH and P2WSH outputs.
///
/// One record backs both: the 160-bit hash keys P2SH lookups, the 256-bit
/// hash keys P2WSH lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHashRecord {
    /// HASH160 of the redeem script.
    pub hash160: Hash160,
    /// SHA-256 of the witness script.
    pub hash256: Hash256,
    /// The inner address revealed when the script was spent, if any. For a
    /// P2SH output wrapping a witness script this is the wrapped
    /// witness-script-hash address.
    pub wrapped: Option<RawAddress>,
}

/// Dedup record behind segwit outputs with an unhandled witness version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessUnknownRecord {
    /// Witness version of the output (1..=16).
    pub witness_version: u8,
    /// Raw witness program bytes.
    pub program: Vec<u8>,
}

impl WitnessUnknownRecord {
    /// The 32-byte program of a standard Taproot output, or `None` when the
    /// record is not version-1/32-byte. Non-Taproot programs are not
    /// indexed.
    pub fn taproot_program(&self) -> Option<Hash256> {
        if self.witness_version != 1 {
            return None;
        }
        let program: [u8; 32] = self.program.as_slice().try_into().ok()?;
        Some(Hash256::from_byte_array(program))
    }
}

/// Read access to the deduplicated script store.
///
/// Getters fail with [`ScriptError`] when the record is missing or garbled.
/// A correctly decoded transaction stream never triggers that; when it does
/// happen the caller must abort the transaction being indexed rather than
/// record a partial hash.
pub trait ScriptAccess {
    fn pubkey_record(&self, script_num: u32) -> Result<PubkeyRecord, ScriptError>;

    fn script_hash_record(&self, script_num: u32) -> Result<ScriptHashRecord, ScriptError>;

    fn witness_unknown_record(&self, script_num: u32) -> Result<WitnessUnknownRecord, ScriptError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn stored_key(bytes: &[u8]) -> [u8; PUBKEY_BUF_LEN] {
        let mut buf = [0xaau8; PUBKEY_BUF_LEN];
        buf[..bytes.len()].copy_from_slice(bytes);
        buf
    }

    #[test]
    fn indexing_hash_uses_compressed_length() {
        let key = hex!("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
        let record = PubkeyRecord {
            // Trailing buffer bytes are garbage and must not enter the hash.
            pubkey: Some(stored_key(&key)),
            pubkey_hash: Hash160::zero(),
        };
        assert_eq!(record.indexing_hash().unwrap(), hash160(&key));
    }

    #[test]
    fn indexing_hash_uses_uncompressed_length() {
        let mut key = [0u8; 65];
        key[0] = 0x04;
        key[1] = 0x7f;
        let record = PubkeyRecord {
            pubkey: Some(key),
            pubkey_hash: Hash160::zero(),
        };
        assert_eq!(record.indexing_hash().unwrap(), hash160(&key));
    }

    #[test]
    fn indexing_hash_falls_back_to_stored_hash() {
        let stored = hash160(b"some old output");
        let record = PubkeyRecord {
            pubkey: None,
            pubkey_hash: stored,
        };
        assert_eq!(record.indexing_hash().unwrap(), stored);
    }

    #[test]
    fn indexing_hash_rejects_unknown_tag() {
        let record = PubkeyRecord {
            pubkey: Some(stored_key(&[0x05])),
            pubkey_hash: Hash160::zero(),
        };
        assert_eq!(
            record.indexing_hash(),
            Err(ScriptError::MalformedPubkey(0x05))
        );
    }

    #[test]
    fn taproot_program_requires_version_one_and_32_bytes() {
        let record = WitnessUnknownRecord {
            witness_version: 1,
            program: vec![7u8; 32],
        };
        assert_eq!(
            record.taproot_program(),
            Some(Hash256::from_byte_array([7u8; 32]))
        );

        let v2 = WitnessUnknownRecord {
            witness_version: 2,
            program: vec![7u8; 32],
        };
        assert_eq!(v2.taproot_program(), None);

        let short = WitnessUnknownRecord {
            witness_version: 1,
            program: vec![7u8; 20],
        };
        assert_eq!(short.taproot_program(), None);
    }
}
