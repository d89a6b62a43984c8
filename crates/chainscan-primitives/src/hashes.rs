//! Fixed-width hash keys and the hash functions that produce them.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Compute SHA-256 of the input data.
pub fn sha256(data: &[u8]) -> Hash256 {
    Hash256(Sha256::digest(data).into())
}

/// Compute double SHA-256 (SHA-256d), the hash used for transaction ids.
pub fn sha256d(data: &[u8]) -> Hash256 {
    sha256(sha256(data).as_bytes())
}

/// Compute RIPEMD160(SHA256(data)), the 160-bit hash behind P2PKH, P2SH and
/// P2WPKH addresses.
pub fn hash160(data: &[u8]) -> Hash160 {
    Hash160(Ripemd160::digest(Sha256::digest(data)).into())
}

/// A 160-bit hash key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash160([u8; 20]);

/// A 256-bit hash key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256([u8; 32]);

macro_rules! impl_hash_key {
    ($ty:ident, $len:expr) => {
        impl $ty {
            /// Key width in bytes.
            pub const LEN: usize = $len;

            pub const fn from_byte_array(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub const fn to_byte_array(self) -> [u8; $len] {
                self.0
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// The all-zero key. Only meaningful as a test fixture or
            /// placeholder; no real script hashes to it.
            pub const fn zero() -> Self {
                Self([0u8; $len])
            }
        }

        impl AsRef<[u8]> for $ty {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $ty {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($ty), "({})"), self)
            }
        }

        impl FromStr for $ty {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(s, &mut bytes)?;
                Ok(Self(bytes))
            }
        }
    };
}

impl_hash_key!(Hash160, 20);
impl_hash_key!(Hash256, 32);

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sha256_empty_input() {
        assert_eq!(
            sha256(b"").to_byte_array(),
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn sha256d_empty_input() {
        assert_eq!(
            sha256d(b"").to_byte_array(),
            hex!("5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456")
        );
    }

    #[test]
    fn hash160_of_generator_pubkey() {
        // Compressed secp256k1 generator point, the BIP-173 witness program
        // test key.
        let pubkey = hex!("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
        assert_eq!(
            hash160(&pubkey).to_byte_array(),
            hex!("751e76e8199196d454941c45d1b3a323f1433bd6")
        );
    }

    #[test]
    fn hex_round_trip() {
        let hash: Hash160 = "751e76e8199196d454941c45d1b3a323f1433bd6".parse().unwrap();
        assert_eq!(hash.to_string(), "751e76e8199196d454941c45d1b3a323f1433bd6");

        let hash: Hash256 = "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
            .parse()
            .unwrap();
        assert_eq!(
            hash.to_string(),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn rejects_wrong_length_hex() {
        assert!("751e76e8".parse::<Hash160>().is_err());
        assert!(
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c94"
                .parse::<Hash256>()
                .is_err()
        );
    }
}
