use crate::storage::EntityId;

/// Key segment reserved for the "all entities of this type" collection.
pub const COLLECTION_SEGMENT: &str = "all";

/// Key segment reserved for per-type key tracking sets.
pub const TRACKING_SEGMENT: &str = "_keys";

/// Returns the cache key for a single entity.
///
/// # Examples
///
/// ```
/// use roadwatch_core::cache::entity_key;
///
/// assert_eq!(entity_key("report", 42), "report:42");
/// ```
pub fn entity_key(entity_type: &str, id: EntityId) -> String {
    format!("{}:{}", entity_type, id)
}

/// Returns the cache key for the full collection of an entity type.
///
/// # Examples
///
/// ```
/// use roadwatch_core::cache::collection_key;
///
/// assert_eq!(collection_key("user"), "user:all");
/// ```
pub fn collection_key(entity_type: &str) -> String {
    format!("{}:{}", entity_type, COLLECTION_SEGMENT)
}

/// Returns the key of the set tracking every cache key of an entity type.
///
/// Backends that cannot scan their keyspace cheaply (Redis) keep this set
/// so `delete_pattern` can remove a whole type without `SCAN`.
pub fn tracking_key(entity_type: &str) -> String {
    format!("{}:{}", entity_type, TRACKING_SEGMENT)
}

/// Returns the [`KeyPattern`](super::KeyPattern) matching every key of an entity type.
pub fn type_pattern(entity_type: &str) -> String {
    format!("{}:*", entity_type)
}

/// Returns true for segments that can never be an entity id.
pub fn is_reserved_segment(segment: &str) -> bool {
    segment == COLLECTION_SEGMENT || segment == TRACKING_SEGMENT
}

/// Extracts the entity type from a cache key or pattern, if present.
///
/// Returns `None` when the key has no `:` separator, an empty type, or a
/// wildcard in the type position.
///
/// # Examples
///
/// ```
/// use roadwatch_core::cache::entity_type_of;
///
/// assert_eq!(entity_type_of("report:7"), Some("report"));
/// assert_eq!(entity_type_of("user:*"), Some("user"));
/// assert_eq!(entity_type_of("*:7"), None);
/// assert_eq!(entity_type_of("orphan"), None);
/// ```
pub fn entity_type_of(key: &str) -> Option<&str> {
    let (entity_type, rest) = key.split_once(':')?;
    if entity_type.is_empty() || rest.is_empty() || entity_type.contains('*') {
        return None;
    }
    Some(entity_type)
}

/// Returns true if the key is a collection key (`<type>:all`).
pub fn is_collection_key(key: &str) -> bool {
    key.split_once(':')
        .is_some_and(|(entity_type, rest)| !entity_type.is_empty() && rest == COLLECTION_SEGMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_format() {
        assert_eq!(entity_key("report", 1), "report:1");
        assert_eq!(entity_key("user", 1234567890), "user:1234567890");
    }

    #[test]
    fn test_collection_key_format() {
        assert_eq!(collection_key("report"), "report:all");
        assert_eq!(collection_key("role"), "role:all");
    }

    #[test]
    fn test_tracking_key_format() {
        assert_eq!(tracking_key("report"), "report:_keys");
    }

    #[test]
    fn test_type_pattern_format() {
        assert_eq!(type_pattern("user"), "user:*");
    }

    #[test]
    fn test_keys_of_distinct_types_never_collide() {
        assert_ne!(entity_key("report", 1), entity_key("user", 1));
        assert_ne!(collection_key("report"), collection_key("user"));
    }

    #[test]
    fn test_collection_key_never_matches_an_entity_key() {
        // Ids are numeric, so no id renders as "all" or "_keys".
        for id in [-1, 0, 1, i64::MAX, i64::MIN] {
            let key = entity_key("report", id);
            assert_ne!(key, collection_key("report"));
            assert_ne!(key, tracking_key("report"));
            assert!(!is_collection_key(&key));
        }
    }

    #[test]
    fn test_reserved_segments() {
        assert!(is_reserved_segment("all"));
        assert!(is_reserved_segment("_keys"));
        assert!(!is_reserved_segment("1"));
        assert!(!is_reserved_segment("ALL"));
    }

    #[test]
    fn test_entity_type_of() {
        assert_eq!(entity_type_of("report:1"), Some("report"));
        assert_eq!(entity_type_of("report:all"), Some("report"));
        assert_eq!(entity_type_of("report:_keys"), Some("report"));
        assert_eq!(entity_type_of("report:*"), Some("report"));
        assert_eq!(entity_type_of("report:"), None);
        assert_eq!(entity_type_of(":1"), None);
        assert_eq!(entity_type_of("*:1"), None);
        assert_eq!(entity_type_of("report"), None);
    }

    #[test]
    fn test_is_collection_key() {
        assert!(is_collection_key("report:all"));
        assert!(!is_collection_key("report:1"));
        assert!(!is_collection_key(":all"));
        assert!(!is_collection_key("all"));
    }
}
