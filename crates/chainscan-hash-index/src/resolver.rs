//! Resolve segwit address strings against the hash index.

use crate::db::HashIndexDb;
use crate::error::Result;
use chainscan_bech32::segwit;
use chainscan_primitives::HashedAddressType;

/// A successful address-string resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub script_num: u32,
    pub address_type: HashedAddressType,
}

/// Resolve a segwit address string to the script number it is indexed
/// under.
///
/// The string is decoded to its witness program, which is exactly the key
/// the matching table stores: a 20-byte version-0 program keys
/// `witness_pubkeyhash`, a 32-byte version-0 program `witness_scripthash`,
/// and a 32-byte version-1 program (Taproot) `witness_unknown`.
///
/// Malformed strings and program shapes the index does not cover resolve to
/// `Ok(None)` rather than an error; only store failures propagate.
pub async fn resolve_segwit_address(
    db: &HashIndexDb,
    hrp: &str,
    address: &str,
) -> Result<Option<ResolvedAddress>> {
    let Ok(decoded) = segwit::decode(hrp, address) else {
        return Ok(None);
    };

    let ty = match (decoded.version, decoded.program.len()) {
        (0, 20) => HashedAddressType::WitnessPubkeyHash,
        (0, 32) => HashedAddressType::WitnessScriptHash,
        (1, 32) => HashedAddressType::WitnessUnknown,
        _ => return Ok(None),
    };

    let script_num = db.lookup_address(ty, &decoded.program).await?;
    Ok(script_num.map(|script_num| ResolvedAddress {
        script_num,
        address_type: ty,
    }))
}
