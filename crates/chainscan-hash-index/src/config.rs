//! Creator configuration.

use chainscan_primitives::HashedAddressType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of cached entries per table before a flush.
pub const DEFAULT_CACHE_CAPACITY: usize = 1_000_000;

/// Configuration for the hash index creator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashIndexConfig {
    /// Directory holding the persistent store.
    pub path: PathBuf,
    /// Human-readable prefix for segwit address strings on this network.
    pub segwit_hrp: String,
    /// Per-table write-back cache capacity.
    pub cache_capacity: usize,
    /// Restrict indexing to a single address type. Used for narrow
    /// rebuild/repair passes; transaction hashes are not indexed while a
    /// filter is active.
    pub address_type_filter: Option<HashedAddressType>,
    /// Whether transaction hashes are indexed alongside addresses.
    pub index_tx_hashes: bool,
}

impl HashIndexConfig {
    /// Configuration for a full mainnet indexing pass storing at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            segwit_hrp: chainscan_bech32::segwit::MAINNET_HRP.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            address_type_filter: None,
            index_tx_hashes: true,
        }
    }

    /// Restrict the pass to a single address type.
    pub fn with_address_type_filter(mut self, ty: HashedAddressType) -> Self {
        self.address_type_filter = Some(ty);
        self
    }

    /// Override the per-table cache capacity.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}
