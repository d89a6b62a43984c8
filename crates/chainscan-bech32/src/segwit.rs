//! Segwit address encoding on top of the bech32 codec.
//!
//! Packs a witness version (0..=16) and witness program (2..=40 bytes) into
//! a bech32(m) string and back. Witness version 0 is bound to the original
//! bech32 checksum, versions 1 and up to bech32m; a string carrying the
//! wrong variant for its version is invalid (BIP-350).

use crate::{DecodeError, EncodeError, Variant};

/// The human-readable prefix of mainnet segwit addresses.
pub const MAINNET_HRP: &str = "bc";

/// Minimum witness program length in bytes.
pub const MIN_PROGRAM_LEN: usize = 2;

/// Maximum witness program length in bytes.
pub const MAX_PROGRAM_LEN: usize = 40;

/// Segwit address error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SegwitError {
    #[error(transparent)]
    Bech32(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("human-readable prefix does not match the expected network prefix")]
    HrpMismatch,

    #[error("address carries no witness version")]
    MissingVersion,

    #[error("witness version {0} is out of range")]
    VersionOutOfRange(u8),

    #[error("witness version {version} cannot use the {variant:?} checksum")]
    WrongVariant { version: u8, variant: Variant },

    #[error("witness program bits do not pack into whole bytes")]
    InvalidPadding,

    #[error("witness program length {0} is invalid")]
    BadProgramLength(usize),

    #[error("encoded address failed its decode round-trip")]
    Unverifiable,
}

/// A decoded witness version and program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegwitAddress {
    pub version: u8,
    pub program: Vec<u8>,
}

/// The checksum variant bound to a witness version.
fn variant_for_version(version: u8) -> Variant {
    if version == 0 {
        Variant::Bech32
    } else {
        Variant::Bech32m
    }
}

/// Convert between power-of-2 number bases.
///
/// With `pad` the remaining bits are flushed into a final padded value;
/// without it any leftover bits must be zero padding of less than one input
/// digit, otherwise the data cannot round-trip and `None` is returned.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let max_acc: u32 = (1 << (from + to - 1)) - 1;
    let mut ret = Vec::with_capacity((data.len() * from as usize).div_ceil(to as usize));
    for &value in data {
        acc = ((acc << from) | u32::from(value)) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            ret.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            ret.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return None;
    }
    Some(ret)
}

/// Decode a segwit address with the expected human-readable prefix.
pub fn decode(expected_hrp: &str, addr: &str) -> Result<SegwitAddress, SegwitError> {
    let decoded = crate::decode(addr)?;
    if decoded.hrp != expected_hrp {
        return Err(SegwitError::HrpMismatch);
    }
    let (&version, data) = decoded
        .values
        .split_first()
        .ok_or(SegwitError::MissingVersion)?;

    if decoded.variant != variant_for_version(version) {
        return Err(SegwitError::WrongVariant {
            version,
            variant: decoded.variant,
        });
    }

    let program = convert_bits(data, 5, 8, false).ok_or(SegwitError::InvalidPadding)?;
    if !(MIN_PROGRAM_LEN..=MAX_PROGRAM_LEN).contains(&program.len()) {
        return Err(SegwitError::BadProgramLength(program.len()));
    }
    if version > 16 {
        return Err(SegwitError::VersionOutOfRange(version));
    }
    if version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(SegwitError::BadProgramLength(program.len()));
    }

    Ok(SegwitAddress {
        version,
        program,
    })
}

/// Encode a witness version and program as a segwit address.
///
/// The produced string is decoded again before being returned; an encoding
/// that does not round-trip to the same version and program would silently
/// fail every later index lookup, so it is reported as an error instead.
pub fn encode(hrp: &str, version: u8, program: &[u8]) -> Result<String, SegwitError> {
    if version > 16 {
        return Err(SegwitError::VersionOutOfRange(version));
    }

    let mut values = Vec::with_capacity(1 + (program.len() * 8).div_ceil(5));
    values.push(version);
    values.extend(
        convert_bits(program, 8, 5, true).expect("8-to-5 expansion with padding cannot fail; qed"),
    );

    let encoded = crate::encode(hrp, &values, variant_for_version(version))?;

    match decode(hrp, &encoded) {
        Ok(roundtrip) if roundtrip.version == version && roundtrip.program == program => Ok(encoded),
        _ => Err(SegwitError::Unverifiable),
    }
}
