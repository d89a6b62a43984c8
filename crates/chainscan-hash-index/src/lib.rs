//! Persistent address hash index.
//!
//! For every indexed script the engine derives a canonical fixed-width hash
//! and stores the mapping back to the script's compact 32-bit identifier,
//! one table per address type plus one for transaction hashes:
//! - [`HashIndexDb`] is the SQLite-backed store with batched inserts and
//!   point lookups;
//! - [`HashIndexCreator`] consumes the decoded transaction stream in
//!   transaction-number order and feeds the store through bounded
//!   write-back caches;
//! - [`resolve_segwit_address`] turns a segwit address string into the
//!   script number it is indexed under.

mod cache;
mod config;
mod creator;
mod db;
mod error;
mod resolver;

pub use cache::WriteBackCache;
pub use config::{DEFAULT_CACHE_CAPACITY, HashIndexConfig};
pub use creator::HashIndexCreator;
pub use db::{AccessMode, HashIndexDb};
pub use error::{Error, Result};
pub use resolver::{ResolvedAddress, resolve_segwit_address};
