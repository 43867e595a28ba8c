//! Key/value store holding experiment inputs and step outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{ErrorInfo, PhyError};

/// Value bound to a pool key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoolValue {
    /// Single measurement or derived constant.
    Scalar(f64),
    /// Ordered series of measurements or per-sample results.
    Series(Vec<f64>),
}

impl PoolValue {
    /// Returns the scalar payload, if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            PoolValue::Scalar(value) => Some(*value),
            PoolValue::Series(_) => None,
        }
    }

    /// Returns the series payload, if this is a series.
    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            PoolValue::Series(values) => Some(values),
            PoolValue::Scalar(_) => None,
        }
    }

    /// Short label for the value shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PoolValue::Scalar(_) => "scalar",
            PoolValue::Series(_) => "series",
        }
    }
}

impl From<f64> for PoolValue {
    fn from(value: f64) -> Self {
        PoolValue::Scalar(value)
    }
}

impl From<Vec<f64>> for PoolValue {
    fn from(values: Vec<f64>) -> Self {
        PoolValue::Series(values)
    }
}

/// Data pool owned by a single experiment instance.
///
/// Reads come in three flavours: [`DataPool::get`] requires the key,
/// [`DataPool::get_or`] and [`DataPool::get_or_else`] fall back to a caller
/// supplied value, and [`DataPool::get_or_try`] lets the fallback itself fail.
/// Fallbacks never insert into the pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataPool {
    entries: BTreeMap<String, PoolValue>,
}

impl DataPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value bound to `key` or fails with [`PhyError::MissingKey`].
    pub fn get(&self, key: &str) -> Result<&PoolValue, PhyError> {
        self.entries
            .get(key)
            .ok_or_else(|| PhyError::missing_key(key))
    }

    /// Returns the bound value or `default` when the key is absent.
    pub fn get_or(&self, key: &str, default: PoolValue) -> PoolValue {
        self.get_or_else(key, || default)
    }

    /// Returns the bound value or the result of `default` when the key is absent.
    pub fn get_or_else<F>(&self, key: &str, default: F) -> PoolValue
    where
        F: FnOnce() -> PoolValue,
    {
        match self.entries.get(key) {
            Some(value) => value.clone(),
            None => {
                warn!(key, "data not found, using default");
                default()
            }
        }
    }

    /// Like [`DataPool::get_or_else`], but the fallback may fail.
    pub fn get_or_try<F>(&self, key: &str, default: F) -> Result<PoolValue, PhyError>
    where
        F: FnOnce() -> Result<PoolValue, PhyError>,
    {
        match self.entries.get(key) {
            Some(value) => Ok(value.clone()),
            None => {
                warn!(key, "data not found, using fallible default");
                default()
            }
        }
    }

    /// Reads a required scalar entry.
    pub fn scalar(&self, key: &str) -> Result<f64, PhyError> {
        let value = self.get(key)?;
        value
            .as_scalar()
            .ok_or_else(|| type_mismatch(key, "scalar", value))
    }

    /// Reads a required series entry.
    pub fn series(&self, key: &str) -> Result<&[f64], PhyError> {
        let value = self.get(key)?;
        value
            .as_series()
            .ok_or_else(|| type_mismatch(key, "series", value))
    }

    /// Binds `value` to `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PoolValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Unbinds `key`, returning the previous value.
    pub fn remove(&mut self, key: &str) -> Option<PoolValue> {
        self.entries.remove(key)
    }

    /// Returns whether `key` is bound.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the pool holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PoolValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Drops every entry. Only used ahead of a full reload.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn type_mismatch(key: &str, expected: &str, found: &PoolValue) -> PhyError {
    PhyError::Data(
        ErrorInfo::new("pool.type_mismatch", "pool entry has an unexpected shape")
            .with_context("key", key)
            .with_context("expected", expected)
            .with_context("found", found.kind()),
    )
}
