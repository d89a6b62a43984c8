//! Bech32 and Bech32m string codec.
//!
//! Implements the BIP-173 checksummed base-32 encoding and its BIP-350 "m"
//! variant. A string is `hrp || '1' || data || checksum` where the data
//! characters each carry 5 bits and the final 6 characters are a BCH
//! checksum over the expanded hrp and the data. The two variants differ
//! only in the constant the checksum polynomial must evaluate to.
//!
//! The [`segwit`] module builds witness-address packing on top of this.

pub mod segwit;

/// Maximum overall length of a bech32 string.
pub const MAX_LENGTH: usize = 90;

/// The bech32 character set for encoding.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// The bech32 character set for decoding.
#[rustfmt::skip]
const CHARSET_REV: [i8; 128] = [
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    15, -1, 10, 17, 21, 20, 26, 30,  7,  5, -1, -1, -1, -1, -1, -1,
    -1, 29, -1, 24, 13, 25,  9,  8, 23, -1, 18, 22, 31, 27, 19, -1,
     1,  0,  3, 16, 11, 28, 12, 14,  6,  4,  2, -1, -1, -1, -1, -1,
    -1, 29, -1, 24, 13, 25,  9,  8, 23, -1, 18, 22, 31, 27, 19, -1,
     1,  0,  3, 16, 11, 28, 12, 14,  6,  4,  2, -1, -1, -1, -1, -1,
];

const BECH32_CONST: u32 = 1;
const BECH32M_CONST: u32 = 0x2bc830a3;

/// Which checksum constant a string was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Original BIP-173 checksum, used by witness version 0.
    Bech32,
    /// BIP-350 checksum, used by witness version 1 and up.
    Bech32m,
}

impl Variant {
    const fn checksum_constant(self) -> u32 {
        match self {
            Self::Bech32 => BECH32_CONST,
            Self::Bech32m => BECH32M_CONST,
        }
    }
}

/// Decode error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("character outside the printable range [33, 126]")]
    InvalidCharacter,

    #[error("string mixes upper and lower case")]
    MixedCase,

    #[error("string exceeds {MAX_LENGTH} characters")]
    TooLong,

    #[error("no separator '1' with a non-empty prefix and a full checksum after it")]
    BadSeparator,

    #[error("data character {0:?} is not in the bech32 charset")]
    InvalidData(char),

    #[error("checksum residue matches neither the bech32 nor the bech32m constant")]
    InvalidChecksum,
}

/// Encode error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("human-readable part is empty")]
    EmptyHrp,

    #[error("human-readable part contains a character outside [33, 126]")]
    InvalidHrp,

    #[error("data value {0} does not fit in 5 bits")]
    InvalidData(u8),
}

/// A successfully decoded bech32 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The human-readable part, lower-cased.
    pub hrp: String,
    /// The 5-bit data values with the checksum stripped.
    pub values: Vec<u8>,
    /// Which checksum constant the string satisfied.
    pub variant: Variant,
}

/// Find the polynomial with value coefficients mod the generator as 30-bit.
fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = (chk & 0x01ff_ffff) << 5 ^ u32::from(value);
        if top & 1 != 0 {
            chk ^= 0x3b6a_57b2;
        }
        if top & 2 != 0 {
            chk ^= 0x2650_8e6d;
        }
        if top & 4 != 0 {
            chk ^= 0x1ea1_19fa;
        }
        if top & 8 != 0 {
            chk ^= 0x3d42_33dd;
        }
        if top & 16 != 0 {
            chk ^= 0x2a14_62b3;
        }
    }
    chk
}

/// Expand a hrp for checksum computation: high bits, a zero, low bits.
fn expand_hrp(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut ret = Vec::with_capacity(bytes.len() * 2 + 1);
    ret.extend(bytes.iter().map(|b| b >> 5));
    ret.push(0);
    ret.extend(bytes.iter().map(|b| b & 0x1f));
    ret
}

/// Verify a checksum and determine the variant it was created with.
fn verify_checksum(hrp: &str, values: &[u8]) -> Option<Variant> {
    let mut data = expand_hrp(hrp);
    data.extend_from_slice(values);
    match polymod(&data) {
        BECH32_CONST => Some(Variant::Bech32),
        BECH32M_CONST => Some(Variant::Bech32m),
        _ => None,
    }
}

/// Create the 6-value checksum for the given hrp, data and variant.
fn create_checksum(hrp: &str, values: &[u8], variant: Variant) -> [u8; 6] {
    let mut enc = expand_hrp(hrp);
    enc.extend_from_slice(values);
    enc.extend_from_slice(&[0u8; 6]);
    let residue = polymod(&enc) ^ variant.checksum_constant();
    let mut checksum = [0u8; 6];
    for (i, value) in checksum.iter_mut().enumerate() {
        *value = ((residue >> (5 * (5 - i))) & 31) as u8;
    }
    checksum
}

/// Encode 5-bit data values under the given hrp and checksum variant.
///
/// The hrp is taken as supplied; callers wanting the canonical all-lowercase
/// form must pass it that way.
pub fn encode(hrp: &str, values: &[u8], variant: Variant) -> Result<String, EncodeError> {
    if hrp.is_empty() {
        return Err(EncodeError::EmptyHrp);
    }
    if hrp.bytes().any(|b| !(33..=126).contains(&b)) {
        return Err(EncodeError::InvalidHrp);
    }
    if let Some(&value) = values.iter().find(|&&v| v >= 32) {
        return Err(EncodeError::InvalidData(value));
    }

    let checksum = create_checksum(hrp, values, variant);
    let mut ret = String::with_capacity(hrp.len() + 1 + values.len() + checksum.len());
    ret.push_str(hrp);
    ret.push('1');
    for &value in values.iter().chain(checksum.iter()) {
        ret.push(CHARSET[value as usize] as char);
    }
    Ok(ret)
}

/// Decode a bech32(m) string.
///
/// Validation order: printable range, mixed case, overall length, separator
/// position, charset membership, checksum residue. The returned hrp is
/// lower-cased and the checksum values are stripped from the payload.
pub fn decode(s: &str) -> Result<Decoded, DecodeError> {
    let bytes = s.as_bytes();

    let mut lower = false;
    let mut upper = false;
    for &b in bytes {
        if !(33..=126).contains(&b) {
            return Err(DecodeError::InvalidCharacter);
        }
        lower |= b.is_ascii_lowercase();
        upper |= b.is_ascii_uppercase();
    }
    if lower && upper {
        return Err(DecodeError::MixedCase);
    }
    if bytes.len() > MAX_LENGTH {
        return Err(DecodeError::TooLong);
    }

    // The data part never contains '1', so the separator is the last one.
    let pos = s.rfind('1').ok_or(DecodeError::BadSeparator)?;
    if pos < 1 || pos + 7 > bytes.len() {
        return Err(DecodeError::BadSeparator);
    }

    let mut values = Vec::with_capacity(bytes.len() - 1 - pos);
    for &b in &bytes[pos + 1..] {
        match CHARSET_REV[b as usize] {
            -1 => return Err(DecodeError::InvalidData(b as char)),
            v => values.push(v as u8),
        }
    }

    let hrp = s[..pos].to_ascii_lowercase();
    let variant = verify_checksum(&hrp, &values).ok_or(DecodeError::InvalidChecksum)?;
    values.truncate(values.len() - 6);

    Ok(Decoded {
        hrp,
        values,
        variant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-173 valid strings.
    const VALID_BECH32: &[&str] = &[
        "A12UEL5L",
        "a12uel5l",
        "an83characterlonghumanreadablepartthatcontainsthenumber1andtheexcludedcharactersbio1tt5tgs",
        "abcdef1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw",
        "split1checkupstagehandshakeupstreamerranterredcaperred2y9e3w",
        "?1ezyfcl",
    ];

    // BIP-350 valid strings.
    const VALID_BECH32M: &[&str] = &[
        "A1LQFN3A",
        "a1lqfn3a",
        "abcdef1l7aum6echk45nj3s0wdvt2fg8x9yrzpqzd3ryx",
        "split1checkupstagehandshakeupstreamerranterredcaperredlc445v",
        "?1v759aa",
    ];

    #[test]
    fn valid_bech32_strings_decode() {
        for s in VALID_BECH32 {
            let decoded = decode(s).unwrap_or_else(|e| panic!("{s}: {e}"));
            assert_eq!(decoded.variant, Variant::Bech32, "{s}");
        }
    }

    #[test]
    fn valid_bech32m_strings_decode() {
        for s in VALID_BECH32M {
            let decoded = decode(s).unwrap_or_else(|e| panic!("{s}: {e}"));
            assert_eq!(decoded.variant, Variant::Bech32m, "{s}");
        }
    }

    #[test]
    fn decode_then_encode_round_trips() {
        for s in VALID_BECH32.iter().chain(VALID_BECH32M) {
            let decoded = decode(s).unwrap();
            let encoded = encode(&decoded.hrp, &decoded.values, decoded.variant).unwrap();
            assert_eq!(encoded, s.to_ascii_lowercase(), "{s}");
        }
    }

    #[test]
    fn rejects_mixed_case() {
        // Flip the case of the first alphabetic character of an otherwise
        // valid all-lowercase string.
        for s in VALID_BECH32.iter().chain(VALID_BECH32M) {
            let lower = s.to_ascii_lowercase();
            let Some(pos) = lower.find(|c: char| c.is_ascii_lowercase()) else {
                continue;
            };
            let mut flipped: Vec<u8> = lower.into_bytes();
            flipped[pos].make_ascii_uppercase();
            let flipped = String::from_utf8(flipped).unwrap();
            assert_eq!(decode(&flipped), Err(DecodeError::MixedCase), "{flipped}");
        }
    }

    #[test]
    fn rejects_out_of_range_characters() {
        assert_eq!(decode(" 1nwldj5"), Err(DecodeError::InvalidCharacter));
        assert_eq!(decode("\x7f1axkwrx"), Err(DecodeError::InvalidCharacter));
        assert_eq!(decode("\u{80}1eym55h"), Err(DecodeError::InvalidCharacter));
    }

    #[test]
    fn rejects_overlong_strings() {
        // 84-character hrp + separator + 6 checksum characters = 91.
        let s = format!("{}1qqqqqq", "a".repeat(84));
        assert_eq!(decode(&s), Err(DecodeError::TooLong));
    }

    #[test]
    fn rejects_bad_separators() {
        // No separator at all.
        assert_eq!(decode("pzry9x0s0muk"), Err(DecodeError::BadSeparator));
        // Empty hrp.
        assert_eq!(decode("1pzry9x0s0muk"), Err(DecodeError::BadSeparator));
        assert_eq!(decode("10a06t8"), Err(DecodeError::BadSeparator));
        // Checksum shorter than 6 characters.
        assert_eq!(decode("li1dgmt3"), Err(DecodeError::BadSeparator));
    }

    #[test]
    fn rejects_invalid_data_characters() {
        assert_eq!(decode("x1b4n0q5v"), Err(DecodeError::InvalidData('b')));
    }

    #[test]
    fn rejects_invalid_checksum() {
        assert_eq!(decode("A1G7SGD8"), Err(DecodeError::InvalidChecksum));
        // A bech32m checksum computed over a different hrp.
        assert_eq!(decode("in1lqfn3a"), Err(DecodeError::InvalidChecksum));
    }

    #[test]
    fn single_data_character_substitution_is_detected() {
        // The checksum's minimum distance guarantees any one substitution
        // within the data part is caught.
        for s in ["abcdef1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw", "a1lqfn3a"] {
            let sep = s.rfind('1').unwrap();
            let bytes = s.as_bytes();
            for i in sep + 1..bytes.len() {
                for &replacement in CHARSET.iter() {
                    if replacement == bytes[i] {
                        continue;
                    }
                    let mut corrupted = bytes.to_vec();
                    corrupted[i] = replacement;
                    let corrupted = String::from_utf8(corrupted).unwrap();
                    assert!(decode(&corrupted).is_err(), "{corrupted} decoded");
                }
            }
        }
    }

    #[test]
    fn hrp_corruption_is_detected() {
        assert!(decode("bcdef1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw").is_err());
        assert!(decode("abcdeg1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw").is_err());
    }

    #[test]
    fn encode_rejects_bad_inputs() {
        assert_eq!(
            encode("", &[0, 1], Variant::Bech32),
            Err(EncodeError::EmptyHrp)
        );
        assert_eq!(
            encode("b c", &[0, 1], Variant::Bech32),
            Err(EncodeError::InvalidHrp)
        );
        assert_eq!(
            encode("bc", &[0, 32], Variant::Bech32),
            Err(EncodeError::InvalidData(32))
        );
    }

    #[test]
    fn uppercase_hrp_decodes_to_lowercase() {
        let decoded = decode("A12UEL5L").unwrap();
        assert_eq!(decoded.hrp, "a");
        assert!(decoded.values.is_empty());
    }

    #[test]
    fn variant_determines_checksum() {
        let bech32 = encode("bc", &[0; 10], Variant::Bech32).unwrap();
        let bech32m = encode("bc", &[0; 10], Variant::Bech32m).unwrap();
        assert_ne!(bech32, bech32m);
        assert_eq!(decode(&bech32).unwrap().variant, Variant::Bech32);
        assert_eq!(decode(&bech32m).unwrap().variant, Variant::Bech32m);
    }
}
