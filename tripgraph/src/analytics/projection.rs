use serde::Serialize;

use crate::store::StoreError;

/// name of the projection rebuilt by every analytics call.
pub const DEFAULT_PROJECTION: &str = "trip_graph";

/// A GDS graph name, restricted to identifier characters. Graph names are
/// always passed as query parameters, never spliced into query text; the
/// validation here keeps the name enum-like rather than free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionName(String);

impl ProjectionName {
    pub fn new(name: &str) -> Result<Self, StoreError> {
        let mut chars = name.chars();
        let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        let valid_rest = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid_start && valid_rest {
            Ok(Self(name.to_string()))
        } else {
            Err(StoreError::InvalidProjectionName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// counts reported by the store when a projection is created.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionInfo {
    pub graph: String,
    pub nodes: i64,
    pub relationships: i64,
}

#[cfg(test)]
mod test {
    use super::{ProjectionName, DEFAULT_PROJECTION};

    #[test]
    fn test_default_projection_name_is_valid() {
        assert!(ProjectionName::new(DEFAULT_PROJECTION).is_ok());
    }

    #[test]
    fn test_identifier_names_are_accepted() {
        assert!(ProjectionName::new("g").is_ok());
        assert!(ProjectionName::new("trip_graph_2").is_ok());
    }

    #[test]
    fn test_non_identifier_names_are_rejected() {
        assert!(ProjectionName::new("").is_err());
        assert!(ProjectionName::new("2fast").is_err());
        assert!(ProjectionName::new("_leading").is_err());
        assert!(ProjectionName::new("has space").is_err());
        assert!(ProjectionName::new("drop') YIELD graphName //").is_err());
    }
}
