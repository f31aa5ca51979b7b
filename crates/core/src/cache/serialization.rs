//! Pure functions for serializing/deserializing entities to/from cache bytes.
//!
//! These functions use JSON serialization for cache storage, providing human-readable
//! cache values that are easy to debug and inspect. A cached value carries data only;
//! anything derived at runtime must be recomputed by the caller after a cache hit.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes a single entity to JSON bytes.
pub fn serialize_entity<T: Serialize>(entity: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(entity).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a single entity.
pub fn deserialize_entity<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}

/// Serializes an ordered slice of entities to JSON bytes.
///
/// # Returns
/// JSON-encoded bytes representing the entities array, in input order
pub fn serialize_entities<T: Serialize>(entities: &[T]) -> Result<Vec<u8>> {
    serde_json::to_vec(entities).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes to a vector of entities.
pub fn deserialize_entities<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>> {
    serde_json::from_slice(bytes).map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
}
