mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    collection_key, entity_key, entity_type_of, is_collection_key, is_reserved_segment,
    tracking_key, type_pattern, COLLECTION_SEGMENT, TRACKING_SEGMENT,
};
pub use patterns::KeyPattern;
pub use serialization::{
    deserialize_entities, deserialize_entity, serialize_entities, serialize_entity,
    SerializationError,
};
pub use traits::Cache;
