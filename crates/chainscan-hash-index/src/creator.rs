//! Incremental hash index builder.

use crate::cache::WriteBackCache;
use crate::config::HashIndexConfig;
use crate::db::{AccessMode, HashIndexDb};
use crate::error::Result;
use chainscan_primitives::{
    AddressType, Hash160, Hash256, HashedAddressType, RawAddress, RawTransaction, ScriptAccess,
};
use std::hash::Hash;

/// Per-input scan state for spotting P2SH spends that reveal a witness
/// script. Created fresh for every input, so stale state cannot leak across
/// inputs or transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum P2shScan {
    Outside,
    SawScriptHash,
}

/// One write-back cache per indexed address type.
struct AddressCaches {
    pubkey_hash: WriteBackCache<Hash160>,
    script_hash: WriteBackCache<Hash160>,
    witness_pubkey_hash: WriteBackCache<Hash160>,
    witness_script_hash: WriteBackCache<Hash256>,
    witness_unknown: WriteBackCache<Hash256>,
}

impl AddressCaches {
    fn new(capacity: usize) -> Self {
        Self {
            pubkey_hash: WriteBackCache::new(capacity),
            script_hash: WriteBackCache::new(capacity),
            witness_pubkey_hash: WriteBackCache::new(capacity),
            witness_script_hash: WriteBackCache::new(capacity),
            witness_unknown: WriteBackCache::new(capacity),
        }
    }
}

/// Incrementally builds the hash index from the decoded transaction stream.
///
/// Transactions must be fed strictly in increasing transaction-number
/// order, one [`process_tx`](Self::process_tx) call at a time. Writes go
/// through per-type write-back caches that flush to the store whenever they
/// fill up; [`close`](Self::close) flushes the remainder, so every caller
/// that wants its entries durable must finish through it.
pub struct HashIndexCreator {
    db: HashIndexDb,
    config: HashIndexConfig,
    caches: AddressCaches,
    tx_cache: WriteBackCache<Hash256>,
}

impl HashIndexCreator {
    /// Opens the store read-write and sets up empty caches.
    pub async fn new(config: HashIndexConfig) -> Result<Self> {
        let db = HashIndexDb::open(&config.path, AccessMode::ReadWrite).await?;
        let caches = AddressCaches::new(config.cache_capacity);
        let tx_cache = WriteBackCache::new(config.cache_capacity);

        Ok(Self {
            db,
            config,
            caches,
            tx_cache,
        })
    }

    /// The underlying store handle, usable for lookups while indexing.
    pub fn db(&self) -> &HashIndexDb {
        &self.db
    }

    pub fn config(&self) -> &HashIndexConfig {
        &self.config
    }

    fn should_process(&self, ty: HashedAddressType) -> bool {
        self.config
            .address_type_filter
            .is_none_or(|filter| filter == ty)
    }

    /// Process one transaction.
    ///
    /// A script-store failure aborts the transaction and propagates; no
    /// partially derived hash is ever cached.
    pub async fn process_tx<S: ScriptAccess>(
        &mut self,
        tx: &RawTransaction,
        tx_num: u32,
        scripts: &S,
    ) -> Result<()> {
        // A narrow single-type pass leaves transaction hashes alone.
        if self.config.index_tx_hashes && self.config.address_type_filter.is_none() {
            self.add_tx(tx.hash, tx_num).await?;
        }

        for input in tx.inputs() {
            self.scan_input(input.address, scripts).await?;
        }

        for output in tx.outputs() {
            self.index_output(output.address, scripts).await?;
        }

        Ok(())
    }

    /// Drive a contiguous, already-decoded slice of transactions through
    /// [`process_tx`](Self::process_tx), numbering from `first_tx_num`.
    pub async fn process_transactions<S: ScriptAccess>(
        &mut self,
        txs: &[RawTransaction],
        first_tx_num: u32,
        scripts: &S,
    ) -> Result<()> {
        for (offset, tx) in txs.iter().enumerate() {
            self.process_tx(tx, first_tx_num + offset as u32, scripts)
                .await?;
        }
        Ok(())
    }

    /// Look up a transaction number by hash, preferring not-yet-flushed
    /// cache entries over the store.
    pub async fn get_tx_index(&self, hash: &Hash256) -> Result<Option<u32>> {
        if let Some(tx_num) = self.tx_cache.get(hash) {
            return Ok(Some(tx_num));
        }
        self.db.lookup_tx(hash).await
    }

    /// Flush every cache to the store. Idempotent; empty caches are a no-op.
    pub async fn flush(&mut self) -> Result<()> {
        Self::flush_tx_cache(&self.db, &mut self.tx_cache).await?;

        let caches = &mut self.caches;
        Self::flush_address_cache(&self.db, HashedAddressType::PubkeyHash, &mut caches.pubkey_hash)
            .await?;
        Self::flush_address_cache(&self.db, HashedAddressType::ScriptHash, &mut caches.script_hash)
            .await?;
        Self::flush_address_cache(
            &self.db,
            HashedAddressType::WitnessPubkeyHash,
            &mut caches.witness_pubkey_hash,
        )
        .await?;
        Self::flush_address_cache(
            &self.db,
            HashedAddressType::WitnessScriptHash,
            &mut caches.witness_script_hash,
        )
        .await?;
        Self::flush_address_cache(
            &self.db,
            HashedAddressType::WitnessUnknown,
            &mut caches.witness_unknown,
        )
        .await?;

        Ok(())
    }

    /// Flush all residual cache entries and close the store.
    ///
    /// Consumes the creator so nothing can be indexed into a closed store.
    /// Dropping a creator without closing it loses whatever the caches
    /// still hold; every exit path must come through here.
    pub async fn close(mut self) -> Result<()> {
        self.flush().await?;
        self.db.close().await;
        tracing::info!("Hash index creator closed");
        Ok(())
    }

    /// Walk the address an input spends, looking for a P2SH wrapper that
    /// reveals a witness script. The redeem script of such a spend is a
    /// witness-script-hash address in its own right and is only visible
    /// here, never as an output.
    async fn scan_input<S: ScriptAccess>(&mut self, spent: RawAddress, scripts: &S) -> Result<()> {
        let mut scan = P2shScan::Outside;
        let mut current = Some(spent);

        while let Some(address) = current.take() {
            match (scan, address.address_type) {
                (_, AddressType::ScriptHash) => {
                    scan = P2shScan::SawScriptHash;
                    current = scripts.script_hash_record(address.script_num)?.wrapped;
                }
                (P2shScan::SawScriptHash, AddressType::WitnessScriptHash) => {
                    if self.should_process(HashedAddressType::WitnessScriptHash) {
                        let record = scripts.script_hash_record(address.script_num)?;
                        Self::add_address(
                            &self.db,
                            HashedAddressType::WitnessScriptHash,
                            &mut self.caches.witness_script_hash,
                            record.hash256,
                            address.script_num,
                        )
                        .await?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Derive and cache the canonical hash for one output.
    async fn index_output<S: ScriptAccess>(
        &mut self,
        address: RawAddress,
        scripts: &S,
    ) -> Result<()> {
        let RawAddress {
            script_num,
            address_type,
        } = address;

        match address_type {
            AddressType::PubkeyHash => {
                if self.should_process(HashedAddressType::PubkeyHash) {
                    let hash = scripts.pubkey_record(script_num)?.indexing_hash()?;
                    Self::add_address(
                        &self.db,
                        HashedAddressType::PubkeyHash,
                        &mut self.caches.pubkey_hash,
                        hash,
                        script_num,
                    )
                    .await?;
                }
            }
            AddressType::WitnessPubkeyHash => {
                if self.should_process(HashedAddressType::WitnessPubkeyHash) {
                    let hash = scripts.pubkey_record(script_num)?.indexing_hash()?;
                    Self::add_address(
                        &self.db,
                        HashedAddressType::WitnessPubkeyHash,
                        &mut self.caches.witness_pubkey_hash,
                        hash,
                        script_num,
                    )
                    .await?;
                }
            }
            AddressType::ScriptHash => {
                if self.should_process(HashedAddressType::ScriptHash) {
                    let record = scripts.script_hash_record(script_num)?;
                    Self::add_address(
                        &self.db,
                        HashedAddressType::ScriptHash,
                        &mut self.caches.script_hash,
                        record.hash160,
                        script_num,
                    )
                    .await?;
                }
            }
            AddressType::WitnessScriptHash => {
                if self.should_process(HashedAddressType::WitnessScriptHash) {
                    let record = scripts.script_hash_record(script_num)?;
                    Self::add_address(
                        &self.db,
                        HashedAddressType::WitnessScriptHash,
                        &mut self.caches.witness_script_hash,
                        record.hash256,
                        script_num,
                    )
                    .await?;
                }
            }
            AddressType::WitnessUnknown => {
                if self.should_process(HashedAddressType::WitnessUnknown) {
                    let record = scripts.witness_unknown_record(script_num)?;
                    // Only standard Taproot programs are indexed; other
                    // witness versions and lengths are skipped.
                    if let Some(program) = record.taproot_program() {
                        Self::add_address(
                            &self.db,
                            HashedAddressType::WitnessUnknown,
                            &mut self.caches.witness_unknown,
                            program,
                            script_num,
                        )
                        .await?;
                    }
                }
            }
            AddressType::NonStandard
            | AddressType::Pubkey
            | AddressType::MultiSig
            | AddressType::NullData => {}
        }

        Ok(())
    }

    async fn add_tx(&mut self, hash: Hash256, tx_num: u32) -> Result<()> {
        self.tx_cache.insert(hash, tx_num);
        if self.tx_cache.is_full() {
            Self::flush_tx_cache(&self.db, &mut self.tx_cache).await?;
        }
        Ok(())
    }

    /// Route one mapping through its cache, flushing the moment the cache
    /// fills up.
    async fn add_address<K>(
        db: &HashIndexDb,
        ty: HashedAddressType,
        cache: &mut WriteBackCache<K>,
        key: K,
        script_num: u32,
    ) -> Result<()>
    where
        K: AsRef<[u8]> + Eq + Hash,
    {
        cache.insert(key, script_num);
        if cache.is_full() {
            Self::flush_address_cache(db, ty, cache).await?;
        }
        Ok(())
    }

    async fn flush_address_cache<K>(
        db: &HashIndexDb,
        ty: HashedAddressType,
        cache: &mut WriteBackCache<K>,
    ) -> Result<()>
    where
        K: AsRef<[u8]> + Eq + Hash,
    {
        if cache.is_empty() {
            return Ok(());
        }
        let rows = cache.drain_rows();
        tracing::debug!(table = ty.table(), rows = rows.len(), "Flushing write-back cache");
        db.add_addresses(ty, &rows).await
    }

    async fn flush_tx_cache(db: &HashIndexDb, cache: &mut WriteBackCache<Hash256>) -> Result<()> {
        if cache.is_empty() {
            return Ok(());
        }
        let rows = cache.drain_rows();
        tracing::debug!(rows = rows.len(), "Flushing transaction hash cache");
        db.add_txes(&rows).await
    }
}
