//! Primitives for the address hash-indexing engine.
//!
//! This crate holds the types shared between the codec and the hash index:
//! the address-type taxonomy, fixed-width hash keys and the hash functions
//! producing them, the deduplicated script records served by the script
//! store, and the raw transaction records emitted by the block decoder.

mod address;
mod hashes;
mod script;
mod transaction;

pub use address::{AddressType, HashedAddressType, RawAddress};
pub use hashes::{Hash160, Hash256, hash160, sha256, sha256d};
pub use script::{
    PUBKEY_BUF_LEN, PubkeyRecord, ScriptAccess, ScriptError, ScriptHashRecord,
    WitnessUnknownRecord, pubkey_encoded_len,
};
pub use transaction::{RawInput, RawOutput, RawTransaction};
