//! Path parsing module
//!
//! Splits raw request paths into segments and resolves the target
//! collection and optional trailing entity id.

/// The two resource collections served by this API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Counties,
    Cities,
}

impl Collection {
    /// The path token identifying this collection.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Counties => "counties",
            Self::Cities => "cities",
        }
    }

    /// The body field that must be present on create.
    pub const fn required_field(self) -> &'static str {
        match self {
            Self::Counties => "name",
            Self::Cities => "city",
        }
    }
}

/// Split a raw path on `/`, preserving the empty leading segment.
///
/// An empty input yields a single empty segment, which resolves to no
/// collection downstream instead of raising.
pub fn split_segments(raw: &str) -> Vec<&str> {
    raw.split('/').collect()
}

/// Whether a segment parses as an entity id.
fn is_numeric(segment: &str) -> bool {
    segment.parse::<u64>().is_ok()
}

/// Resolve the collection targeted by the given segments.
///
/// Takes the last segment; if it is numeric (an id, not a collection name)
/// the second-to-last segment is used instead. Unknown tokens resolve to
/// `None`.
pub fn resolve_collection(segments: &[&str]) -> Option<Collection> {
    let mut candidate = segments.last()?;
    if is_numeric(candidate) {
        candidate = segments.get(segments.len().checked_sub(2)?)?;
    }
    match *candidate {
        "counties" => Some(Collection::Counties),
        "cities" => Some(Collection::Cities),
        _ => None,
    }
}

/// Resolve the entity id from the trailing segment.
///
/// The trailing numeric segment is always the entity's own id; a parent id
/// never occupies this slot (parent-scoped listing has its own route shape).
pub fn resolve_entity_id(segments: &[&str]) -> Option<u64> {
    segments.last().and_then(|s| s.parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_preserves_leading_empty() {
        assert_eq!(split_segments("/counties"), vec!["", "counties"]);
        assert_eq!(split_segments("/counties/10"), vec!["", "counties", "10"]);
    }

    #[test]
    fn test_split_empty_path() {
        assert_eq!(split_segments(""), vec![""]);
        assert_eq!(resolve_collection(&split_segments("")), None);
        assert_eq!(resolve_entity_id(&split_segments("")), None);
    }

    #[test]
    fn test_resolve_collection_plain() {
        assert_eq!(
            resolve_collection(&["", "counties"]),
            Some(Collection::Counties)
        );
        assert_eq!(resolve_collection(&["", "cities"]), Some(Collection::Cities));
    }

    #[test]
    fn test_resolve_collection_skips_numeric_tail() {
        assert_eq!(
            resolve_collection(&["", "counties", "10"]),
            Some(Collection::Counties)
        );
        assert_eq!(
            resolve_collection(&["", "cities", "7"]),
            Some(Collection::Cities)
        );
    }

    #[test]
    fn test_resolve_collection_unknown() {
        assert_eq!(resolve_collection(&["", "widgets"]), None);
        assert_eq!(resolve_collection(&["", "widgets", "9"]), None);
        // Bare numeric path has no collection token at all
        assert_eq!(resolve_collection(&["", "9"]), None);
    }

    #[test]
    fn test_resolve_entity_id() {
        assert_eq!(resolve_entity_id(&["", "counties", "10"]), Some(10));
        assert_eq!(resolve_entity_id(&["", "counties"]), None);
        assert_eq!(resolve_entity_id(&["", "counties", "abc"]), None);
    }

    #[test]
    fn test_trailing_slash_fails_closed() {
        let segments = split_segments("/counties/");
        assert_eq!(resolve_entity_id(&segments), None);
        assert_eq!(resolve_collection(&segments), None);
    }

    #[test]
    fn test_non_numeric_overflow_tail() {
        // An id too large for u64 is not numeric, so it reads as an
        // (unknown) collection token
        let segments = split_segments("/counties/99999999999999999999999");
        assert_eq!(resolve_entity_id(&segments), None);
        assert_eq!(resolve_collection(&segments), None);
    }
}
