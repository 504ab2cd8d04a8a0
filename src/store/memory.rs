//! In-memory store module
//!
//! Holds counties and cities behind `RwLock`ed maps with atomic id
//! counters. This is the bundled data-access collaborator; a SQL-backed
//! one would implement the same `Gateway` contract.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Deserialize;
use serde_json::Value;

use super::{City, County, Gateway, StoreError};

/// Initial data loaded at startup from `[store] seed_file`.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub counties: Vec<County>,
    #[serde(default)]
    pub cities: Vec<City>,
}

/// Shared in-memory backing store for both collections.
pub struct MemoryStore {
    counties: RwLock<BTreeMap<u64, County>>,
    cities: RwLock<BTreeMap<u64, City>>,
    next_county_id: AtomicU64,
    next_city_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_seed(SeedData::default())
    }

    /// Load a JSON seed file of the shape `{"counties": [...], "cities": [...]}`.
    pub fn load_seed(path: &str) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::Seed {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let seed: SeedData = serde_json::from_str(&raw).map_err(|e| StoreError::Seed {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let county_ids_exhausted = seed.counties.iter().any(|c| c.id == u64::MAX);
        let city_ids_exhausted = seed.cities.iter().any(|c| c.id == u64::MAX);
        if county_ids_exhausted || city_ids_exhausted {
            return Err(StoreError::Seed {
                path: path.to_string(),
                message: format!("entity id {} leaves no room for new ids", u64::MAX),
            });
        }
        Ok(Self::with_seed(seed))
    }

    pub fn with_seed(seed: SeedData) -> Self {
        let counties: BTreeMap<u64, County> =
            seed.counties.into_iter().map(|c| (c.id, c)).collect();
        let cities: BTreeMap<u64, City> = seed.cities.into_iter().map(|c| (c.id, c)).collect();
        // Ids start above the highest seeded id and are never reused;
        // saturate rather than overflow at the top of the id space
        let next_county_id = counties.keys().max().copied().unwrap_or(0).saturating_add(1);
        let next_city_id = cities.keys().max().copied().unwrap_or(0).saturating_add(1);
        Self {
            counties: RwLock::new(counties),
            cities: RwLock::new(cities),
            next_county_id: AtomicU64::new(next_county_id),
            next_city_id: AtomicU64::new(next_city_id),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn encode<T: serde::Serialize>(entity: &T) -> Result<Value, StoreError> {
    serde_json::to_value(entity).map_err(StoreError::Encode)
}

/// A non-empty string field from a decoded body.
fn string_field<'a>(fields: &'a Value, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// County-collection gateway over the shared store.
pub struct CountyGateway(pub Arc<MemoryStore>);

impl Gateway for CountyGateway {
    fn find(&self, id: u64) -> Result<Option<Value>, StoreError> {
        let counties = self.0.counties.read().map_err(|_| StoreError::LockPoisoned)?;
        counties.get(&id).map(encode).transpose()
    }

    fn list_all(&self) -> Result<Vec<Value>, StoreError> {
        let counties = self.0.counties.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut all: Vec<&County> = counties.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all.into_iter().map(encode).collect()
    }

    fn list_by_parent(&self, _parent_id: u64) -> Result<Vec<Value>, StoreError> {
        // Counties have no parent collection; no route reaches this
        Ok(Vec::new())
    }

    fn create(&self, fields: &Value) -> Result<Option<u64>, StoreError> {
        let Some(name) = string_field(fields, "name") else {
            return Ok(None);
        };
        let mut counties = self.0.counties.write().map_err(|_| StoreError::LockPoisoned)?;
        let id = self.0.next_county_id.fetch_add(1, Ordering::SeqCst);
        counties.insert(
            id,
            County {
                id,
                name: name.to_string(),
            },
        );
        Ok(Some(id))
    }

    fn update(&self, id: u64, fields: &Value) -> Result<bool, StoreError> {
        let Some(name) = string_field(fields, "name") else {
            return Ok(false);
        };
        let mut counties = self.0.counties.write().map_err(|_| StoreError::LockPoisoned)?;
        match counties.get_mut(&id) {
            Some(county) => {
                county.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let mut counties = self.0.counties.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(counties.remove(&id).is_some())
    }
}

/// City-collection gateway over the shared store.
pub struct CityGateway(pub Arc<MemoryStore>);

impl Gateway for CityGateway {
    fn find(&self, id: u64) -> Result<Option<Value>, StoreError> {
        let cities = self.0.cities.read().map_err(|_| StoreError::LockPoisoned)?;
        cities.get(&id).map(encode).transpose()
    }

    fn list_all(&self) -> Result<Vec<Value>, StoreError> {
        let cities = self.0.cities.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut all: Vec<&City> = cities.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all.into_iter().map(encode).collect()
    }

    fn list_by_parent(&self, parent_id: u64) -> Result<Vec<Value>, StoreError> {
        let cities = self.0.cities.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut scoped: Vec<&City> = cities
            .values()
            .filter(|c| c.county_id == parent_id)
            .collect();
        scoped.sort_by(|a, b| a.name.cmp(&b.name));
        scoped.into_iter().map(encode).collect()
    }

    fn create(&self, fields: &Value) -> Result<Option<u64>, StoreError> {
        let Some(name) = string_field(fields, "city") else {
            return Ok(None);
        };
        let Some(zip_code) = fields.get("zip_code").and_then(Value::as_str) else {
            return Ok(None);
        };
        let Some(county_id) = fields.get("id_county").and_then(Value::as_u64) else {
            return Ok(None);
        };
        let mut cities = self.0.cities.write().map_err(|_| StoreError::LockPoisoned)?;
        let id = self.0.next_city_id.fetch_add(1, Ordering::SeqCst);
        cities.insert(
            id,
            City {
                id,
                name: name.to_string(),
                zip_code: zip_code.to_string(),
                county_id,
            },
        );
        Ok(Some(id))
    }

    fn update(&self, id: u64, fields: &Value) -> Result<bool, StoreError> {
        let Some(name) = string_field(fields, "name") else {
            return Ok(false);
        };
        let mut cities = self.0.cities.write().map_err(|_| StoreError::LockPoisoned)?;
        match cities.get_mut(&id) {
            Some(city) => {
                city.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let mut cities = self.0.cities.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(cities.remove(&id).is_some())
    }
}
