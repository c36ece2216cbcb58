//! # Sherdor Net
//!
//! HTTP adapters for the Sherdor capability traits:
//!
//! - [`HttpNetwork`]: the service worker's network fallback and precache fetches
//! - [`DataStoreClient`]: exact row counts from the hosted data store

pub mod datastore;
pub mod loader;

pub use datastore::DataStoreClient;
pub use loader::{HttpNetwork, LoaderConfig};
