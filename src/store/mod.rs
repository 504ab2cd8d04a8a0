//! Store module entry
//!
//! Defines the entities, the repository gateway contract the dispatcher
//! calls into, and the store error type. The dispatcher never constructs
//! persistence queries; it only speaks this contract.

pub mod memory;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use memory::{CityGateway, CountyGateway, MemoryStore};

/// An administrative region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct County {
    pub id: u64,
    pub name: String,
}

/// A locality belonging to a county.
///
/// On the wire the name field travels as `city` and the foreign key as
/// `id_county`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: u64,
    #[serde(rename = "city")]
    pub name: String,
    pub zip_code: String,
    #[serde(rename = "id_county")]
    pub county_id: u64,
}

/// Failure inside the data-access collaborator.
///
/// Surfaces as a 500 at the dispatch boundary, never as a 404.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    LockPoisoned,
    #[error("entity encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("seed file {path}: {message}")]
    Seed { path: String, message: String },
}

/// Uniform CRUD capability, implemented once per collection.
///
/// `create` takes the decoded request body and answers the new id, or
/// `None` when the fields do not form a valid entity. `update` and
/// `delete` answer whether a row was touched.
pub trait Gateway: Send + Sync {
    fn find(&self, id: u64) -> Result<Option<Value>, StoreError>;
    fn list_all(&self) -> Result<Vec<Value>, StoreError>;
    fn list_by_parent(&self, parent_id: u64) -> Result<Vec<Value>, StoreError>;
    fn create(&self, fields: &Value) -> Result<Option<u64>, StoreError>;
    fn update(&self, id: u64, fields: &Value) -> Result<bool, StoreError>;
    fn delete(&self, id: u64) -> Result<bool, StoreError>;
}
