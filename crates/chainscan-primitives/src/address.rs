//! Address-type taxonomy.

use serde::{Deserialize, Serialize};

/// Output-level address types as classified by the transaction decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    NonStandard,
    Pubkey,
    PubkeyHash,
    ScriptHash,
    MultiSig,
    NullData,
    WitnessPubkeyHash,
    WitnessScriptHash,
    /// Segwit output with a witness version the decoder has no dedicated
    /// type for. Taproot (version 1) lives here.
    WitnessUnknown,
}

impl AddressType {
    /// Returns the script type name as used in Bitcoin Core RPC responses.
    pub fn script_type(&self) -> &'static str {
        match self {
            Self::NonStandard => "nonstandard",
            Self::Pubkey => "pubkey",
            Self::PubkeyHash => "pubkeyhash",
            Self::ScriptHash => "scripthash",
            Self::MultiSig => "multisig",
            Self::NullData => "nulldata",
            Self::WitnessPubkeyHash => "witness_v0_keyhash",
            Self::WitnessScriptHash => "witness_v0_scripthash",
            Self::WitnessUnknown => "witness_unknown",
        }
    }

    /// The hash-index variant this type is indexed under, if any.
    ///
    /// `Pubkey`, `MultiSig`, `NullData` and `NonStandard` outputs carry no
    /// canonical fixed-width hash and are not indexed.
    pub fn hashed(&self) -> Option<HashedAddressType> {
        match self {
            Self::PubkeyHash => Some(HashedAddressType::PubkeyHash),
            Self::ScriptHash => Some(HashedAddressType::ScriptHash),
            Self::WitnessPubkeyHash => Some(HashedAddressType::WitnessPubkeyHash),
            Self::WitnessScriptHash => Some(HashedAddressType::WitnessScriptHash),
            Self::WitnessUnknown => Some(HashedAddressType::WitnessUnknown),
            Self::NonStandard | Self::Pubkey | Self::MultiSig | Self::NullData => None,
        }
    }
}

/// The five address types that receive a hash-index table.
///
/// Closed over exactly the indexed set so the store's table dispatch and the
/// creator's caches are checked exhaustively; adding a variant is a
/// single-point change the compiler tracks through every `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashedAddressType {
    PubkeyHash,
    ScriptHash,
    WitnessPubkeyHash,
    WitnessScriptHash,
    /// Indexed only for version-1, 32-byte programs (Taproot).
    WitnessUnknown,
}

impl HashedAddressType {
    /// Every indexed variant, in table order.
    pub const ALL: [Self; 5] = [
        Self::PubkeyHash,
        Self::ScriptHash,
        Self::WitnessPubkeyHash,
        Self::WitnessScriptHash,
        Self::WitnessUnknown,
    ];

    /// Width in bytes of this variant's hash key.
    pub fn key_width(&self) -> usize {
        match self {
            Self::PubkeyHash | Self::ScriptHash | Self::WitnessPubkeyHash => 20,
            Self::WitnessScriptHash | Self::WitnessUnknown => 32,
        }
    }

    /// Name of this variant's table in the persistent store.
    pub fn table(&self) -> &'static str {
        match self {
            Self::PubkeyHash => "pubkeyhash",
            Self::ScriptHash => "scripthash",
            Self::WitnessPubkeyHash => "witness_pubkeyhash",
            Self::WitnessScriptHash => "witness_scripthash",
            Self::WitnessUnknown => "witness_unknown",
        }
    }
}

impl std::fmt::Display for HashedAddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// A decoded output or input address: the script number assigned by the
/// dedup script store together with the output-level type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAddress {
    /// Dense identifier within the type's dedup store.
    pub script_num: u32,
    /// Output-level address type.
    pub address_type: AddressType,
}

impl RawAddress {
    pub fn new(script_num: u32, address_type: AddressType) -> Self {
        Self {
            script_num,
            address_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_covers_exactly_the_indexed_types() {
        assert_eq!(
            AddressType::PubkeyHash.hashed(),
            Some(HashedAddressType::PubkeyHash)
        );
        assert_eq!(
            AddressType::WitnessUnknown.hashed(),
            Some(HashedAddressType::WitnessUnknown)
        );
        assert_eq!(AddressType::Pubkey.hashed(), None);
        assert_eq!(AddressType::MultiSig.hashed(), None);
        assert_eq!(AddressType::NullData.hashed(), None);
        assert_eq!(AddressType::NonStandard.hashed(), None);
    }

    #[test]
    fn key_widths_match_table_layout() {
        for ty in HashedAddressType::ALL {
            let expected = match ty {
                HashedAddressType::WitnessScriptHash | HashedAddressType::WitnessUnknown => 32,
                _ => 20,
            };
            assert_eq!(ty.key_width(), expected, "{ty}");
        }
    }
}
