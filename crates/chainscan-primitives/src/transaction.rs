//! Raw transaction records as handed over by the block decoder.
//!
//! Inputs and outputs are already resolved to [`RawAddress`] entries; the
//! hash index never sees script bytes, only the decoder's classification
//! and the dedup store's script numbers.

use crate::address::RawAddress;
use crate::hashes::Hash256;

/// A spent output reference, reduced to the address it spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInput {
    pub address: RawAddress,
}

/// A transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawOutput {
    pub address: RawAddress,
    /// Value in satoshis.
    pub value: u64,
}

/// An already-decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    /// The transaction hash (txid).
    pub hash: Hash256,
    pub inputs: Vec<RawInput>,
    pub outputs: Vec<RawOutput>,
}

impl RawTransaction {
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Iterate the inputs. Finite and restartable; iteration order is the
    /// on-chain input order.
    pub fn inputs(&self) -> impl Iterator<Item = &RawInput> {
        self.inputs.iter()
    }

    /// Iterate the outputs in on-chain order.
    pub fn outputs(&self) -> impl Iterator<Item = &RawOutput> {
        self.outputs.iter()
    }
}
