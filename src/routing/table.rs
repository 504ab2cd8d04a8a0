//! Route table module
//!
//! An explicit table mapping (method, pattern) pairs to CRUD actions,
//! validated when built. Patterns are sequences of literal segments and
//! typed `{id}` placeholders; requests are matched in declaration order.

use hyper::Method;
use thiserror::Error;

use super::path::{self, Collection};

/// One segment of a route pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seg {
    Literal(&'static str),
    Id,
}

/// CRUD action a route maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Find,
    ListByParent,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Number of `{id}` placeholders the action's pattern must carry.
    const fn id_count(self) -> usize {
        match self {
            Self::List | Self::Create => 0,
            Self::Find | Self::ListByParent | Self::Update | Self::Delete => 1,
        }
    }
}

/// A matched route with its captured id, ready for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    List,
    Find { id: u64 },
    ListByParent { county_id: u64 },
    Create,
    Update { id: u64 },
    Delete { id: u64 },
}

/// Result of matching a request against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatch {
    pub collection: Collection,
    pub resolved: Resolved,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("duplicate route: {0} {1}")]
    Duplicate(Method, String),
    #[error("route {0} {1}: pattern must start with a literal segment")]
    LeadingPlaceholder(Method, String),
    #[error("route {0} {1}: placeholder count does not fit the action")]
    PlaceholderMismatch(Method, String),
}

struct RouteEntry {
    method: Method,
    pattern: Vec<Seg>,
    collection: Collection,
    action: Action,
}

impl RouteEntry {
    fn shape(&self) -> String {
        let mut out = String::new();
        for seg in &self.pattern {
            out.push('/');
            match seg {
                Seg::Literal(lit) => out.push_str(lit),
                Seg::Id => out.push_str("{id}"),
            }
        }
        out
    }
}

/// The validated route table for the whole API surface.
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table, rejecting duplicate (method, shape) pairs and
    /// patterns that cannot satisfy their action.
    fn new(entries: Vec<RouteEntry>) -> Result<Self, TableError> {
        for (i, entry) in entries.iter().enumerate() {
            if matches!(entry.pattern.first(), Some(Seg::Id) | None) {
                return Err(TableError::LeadingPlaceholder(
                    entry.method.clone(),
                    entry.shape(),
                ));
            }
            let ids = entry.pattern.iter().filter(|s| **s == Seg::Id).count();
            if ids != entry.action.id_count() {
                return Err(TableError::PlaceholderMismatch(
                    entry.method.clone(),
                    entry.shape(),
                ));
            }
            if entries[..i]
                .iter()
                .any(|other| other.method == entry.method && other.pattern == entry.pattern)
            {
                return Err(TableError::Duplicate(entry.method.clone(), entry.shape()));
            }
        }
        Ok(Self { entries })
    }

    /// The fixed route table of this API.
    ///
    /// Parent-scoped city listing is its own explicit shape rather than
    /// an overload of the trailing-id slot.
    pub fn standard() -> Result<Self, TableError> {
        use Collection::{Cities, Counties};
        let route = |method: Method, pattern: Vec<Seg>, collection, action| RouteEntry {
            method,
            pattern,
            collection,
            action,
        };
        Self::new(vec![
            route(Method::GET, vec![Seg::Literal("counties")], Counties, Action::List),
            route(
                Method::GET,
                vec![Seg::Literal("counties"), Seg::Id],
                Counties,
                Action::Find,
            ),
            route(
                Method::GET,
                vec![Seg::Literal("counties"), Seg::Id, Seg::Literal("cities")],
                Cities,
                Action::ListByParent,
            ),
            route(Method::GET, vec![Seg::Literal("cities")], Cities, Action::List),
            route(
                Method::GET,
                vec![Seg::Literal("cities"), Seg::Id],
                Cities,
                Action::Find,
            ),
            route(Method::POST, vec![Seg::Literal("counties")], Counties, Action::Create),
            route(Method::POST, vec![Seg::Literal("cities")], Cities, Action::Create),
            route(
                Method::PUT,
                vec![Seg::Literal("counties"), Seg::Id],
                Counties,
                Action::Update,
            ),
            route(
                Method::PUT,
                vec![Seg::Literal("cities"), Seg::Id],
                Cities,
                Action::Update,
            ),
            route(
                Method::DELETE,
                vec![Seg::Literal("counties"), Seg::Id],
                Counties,
                Action::Delete,
            ),
            route(
                Method::DELETE,
                vec![Seg::Literal("cities"), Seg::Id],
                Cities,
                Action::Delete,
            ),
        ])
    }

    /// Match a request against the table, first match wins.
    pub fn match_route(&self, method: &Method, raw_path: &str) -> Option<RouteMatch> {
        let segments = path::split_segments(raw_path);
        // Absolute paths carry an empty leading segment
        let segments = match segments.split_first() {
            Some((first, rest)) if first.is_empty() => rest,
            _ => &segments[..],
        };

        self.entries.iter().find_map(|entry| {
            if entry.method != *method {
                return None;
            }
            let id = match_pattern(&entry.pattern, segments)?;
            let resolved = resolve_action(entry.action, id)?;
            Some(RouteMatch {
                collection: entry.collection,
                resolved,
            })
        })
    }
}

/// Match segments against a pattern, returning the captured id if any.
///
/// The outer `Option` is the match result; the inner one is the capture.
#[allow(clippy::option_option)]
fn match_pattern(pattern: &[Seg], segments: &[&str]) -> Option<Option<u64>> {
    if pattern.len() != segments.len() {
        return None;
    }
    let mut captured = None;
    for (seg, part) in pattern.iter().zip(segments) {
        match seg {
            Seg::Literal(lit) => {
                if lit != part {
                    return None;
                }
            }
            Seg::Id => match part.parse::<u64>() {
                Ok(id) => captured = Some(id),
                Err(_) => return None,
            },
        }
    }
    Some(captured)
}

/// Pair an action with its captured id.
///
/// Placeholder counts are validated at construction, so a mismatch here
/// never happens for a table built through `new`.
const fn resolve_action(action: Action, id: Option<u64>) -> Option<Resolved> {
    match (action, id) {
        (Action::List, None) => Some(Resolved::List),
        (Action::Create, None) => Some(Resolved::Create),
        (Action::Find, Some(id)) => Some(Resolved::Find { id }),
        (Action::ListByParent, Some(county_id)) => Some(Resolved::ListByParent { county_id }),
        (Action::Update, Some(id)) => Some(Resolved::Update { id }),
        (Action::Delete, Some(id)) => Some(Resolved::Delete { id }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::standard().expect("standard table must validate")
    }

    #[test]
    fn test_standard_table_validates() {
        assert!(RouteTable::standard().is_ok());
    }

    #[test]
    fn test_duplicate_shape_rejected() {
        let entries = vec![
            RouteEntry {
                method: Method::GET,
                pattern: vec![Seg::Literal("counties")],
                collection: Collection::Counties,
                action: Action::List,
            },
            RouteEntry {
                method: Method::GET,
                pattern: vec![Seg::Literal("counties")],
                collection: Collection::Counties,
                action: Action::List,
            },
        ];
        assert!(matches!(
            RouteTable::new(entries),
            Err(TableError::Duplicate(_, _))
        ));
    }

    #[test]
    fn test_placeholder_count_validated() {
        let entries = vec![RouteEntry {
            method: Method::GET,
            pattern: vec![Seg::Literal("counties")],
            collection: Collection::Counties,
            action: Action::Find,
        }];
        assert!(matches!(
            RouteTable::new(entries),
            Err(TableError::PlaceholderMismatch(_, _))
        ));
    }

    #[test]
    fn test_match_list_and_find() {
        let t = table();
        assert_eq!(
            t.match_route(&Method::GET, "/counties"),
            Some(RouteMatch {
                collection: Collection::Counties,
                resolved: Resolved::List,
            })
        );
        assert_eq!(
            t.match_route(&Method::GET, "/cities/7"),
            Some(RouteMatch {
                collection: Collection::Cities,
                resolved: Resolved::Find { id: 7 },
            })
        );
    }

    #[test]
    fn test_match_parent_scoped_listing() {
        assert_eq!(
            table().match_route(&Method::GET, "/counties/10/cities"),
            Some(RouteMatch {
                collection: Collection::Cities,
                resolved: Resolved::ListByParent { county_id: 10 },
            })
        );
    }

    #[test]
    fn test_match_mutations() {
        let t = table();
        assert_eq!(
            t.match_route(&Method::POST, "/cities"),
            Some(RouteMatch {
                collection: Collection::Cities,
                resolved: Resolved::Create,
            })
        );
        assert_eq!(
            t.match_route(&Method::PUT, "/counties/3"),
            Some(RouteMatch {
                collection: Collection::Counties,
                resolved: Resolved::Update { id: 3 },
            })
        );
        assert_eq!(
            t.match_route(&Method::DELETE, "/counties/3"),
            Some(RouteMatch {
                collection: Collection::Counties,
                resolved: Resolved::Delete { id: 3 },
            })
        );
    }

    #[test]
    fn test_no_match_cases() {
        let t = table();
        assert_eq!(t.match_route(&Method::GET, "/widgets/9"), None);
        assert_eq!(t.match_route(&Method::POST, "/counties/5"), None);
        assert_eq!(t.match_route(&Method::PUT, "/counties"), None);
        assert_eq!(t.match_route(&Method::DELETE, "/cities"), None);
        assert_eq!(t.match_route(&Method::GET, "/counties/abc"), None);
        assert_eq!(t.match_route(&Method::GET, "/counties/"), None);
        assert_eq!(t.match_route(&Method::GET, ""), None);
        assert_eq!(t.match_route(&Method::PATCH, "/counties/3"), None);
    }
}
