//! Patterns accepted by [`Cache::delete_pattern`](super::Cache::delete_pattern).
//!
//! Patterns follow the `<type>:<segment>` key scheme, with `*` standing for
//! a whole part of the key, never for a substring.

use super::keys::entity_type_of;

/// A parsed `delete_pattern` argument.
///
/// | Pattern          | Matches                                 |
/// |------------------|-----------------------------------------|
/// | `*` or `*:*`     | every key                               |
/// | `report:*`       | every key of the `report` type          |
/// | `*:all`          | the `all` segment of every type         |
/// | `report:7`       | that key only                           |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPattern<'a> {
    Any,
    Type(&'a str),
    Segment(&'a str),
    Exact(&'a str),
}

impl<'a> KeyPattern<'a> {
    /// Parses a pattern. Returns `None` for wildcards inside a part
    /// (`rep*:1`) or empty parts (`:*`).
    ///
    /// # Examples
    ///
    /// ```
    /// use roadwatch_core::cache::KeyPattern;
    ///
    /// assert_eq!(KeyPattern::parse("report:*"), Some(KeyPattern::Type("report")));
    /// assert_eq!(KeyPattern::parse("*:all"), Some(KeyPattern::Segment("all")));
    /// assert_eq!(KeyPattern::parse("rep*"), None);
    /// ```
    pub fn parse(pattern: &'a str) -> Option<Self> {
        if pattern == "*" {
            return Some(Self::Any);
        }

        match pattern.split_once(':') {
            Some(("*", "*")) => Some(Self::Any),
            Some((entity_type, "*")) if is_literal(entity_type) => Some(Self::Type(entity_type)),
            Some(("*", segment)) if is_literal(segment) => Some(Self::Segment(segment)),
            _ if is_literal(pattern) => Some(Self::Exact(pattern)),
            _ => None,
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        match *self {
            Self::Any => true,
            Self::Type(entity_type) => entity_type_of(key) == Some(entity_type),
            Self::Segment(segment) => key
                .split_once(':')
                .is_some_and(|(entity_type, rest)| !entity_type.is_empty() && rest == segment),
            Self::Exact(exact) => key == exact,
        }
    }

    /// The entity type shared by every matching key, when there is one.
    ///
    /// Backends use it to look in a single tracking set instead of scanning.
    pub fn entity_type(&self) -> Option<&'a str> {
        match *self {
            Self::Type(entity_type) => Some(entity_type),
            Self::Exact(key) => entity_type_of(key),
            Self::Any | Self::Segment(_) => None,
        }
    }
}

fn is_literal(part: &str) -> bool {
    !part.is_empty() && !part.contains('*')
}
