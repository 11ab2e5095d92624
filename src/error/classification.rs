//! Classification types for network failures
//!
//! This module provides the closed taxonomy that every failed HTTP or network
//! operation is mapped onto, and the [`BasicError`] wrapper pairing a category
//! with the error that produced it.

use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Boxed error type accepted and retained by the classifier.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The basic kind of a network failure, phrased so that a non-expert can act on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicErrorType {
    /// The host name could not be resolved to an address.
    CantResolveHost,
    /// The host could not be found or the secure session to it failed locally.
    CantFindHost,
    /// The host resolved but refused or never accepted the connection.
    CantConnectToHost,
    /// The connection ended before a complete response arrived.
    UnexpectedEof,
    /// The peer answered with something that is not valid HTTP.
    BadDataReceived,
    /// The failure did not match any known shape.
    Unknown,
}

impl BasicErrorType {
    /// All categories, in declaration order.
    pub const ALL: [BasicErrorType; 6] = [
        BasicErrorType::CantResolveHost,
        BasicErrorType::CantFindHost,
        BasicErrorType::CantConnectToHost,
        BasicErrorType::UnexpectedEof,
        BasicErrorType::BadDataReceived,
        BasicErrorType::Unknown,
    ];

    /// Returns the stable string identifier of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            BasicErrorType::CantResolveHost => "CantResolveHost",
            BasicErrorType::CantFindHost => "CantFindHost",
            BasicErrorType::CantConnectToHost => "CantConnectToHost",
            BasicErrorType::UnexpectedEof => "UnexpectedEof",
            BasicErrorType::BadDataReceived => "BadDataReceived",
            BasicErrorType::Unknown => "Unknown",
        }
    }

    /// Returns true if this category means the host could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            BasicErrorType::CantResolveHost
                | BasicErrorType::CantFindHost
                | BasicErrorType::CantConnectToHost
        )
    }
}

impl fmt::Display for BasicErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized category identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error category: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for BasicErrorType {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BasicErrorType::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// A classified error: the category the classifier settled on plus the original cause.
///
/// The cause is kept only for diagnostics; it is never re-classified once a
/// `BasicError` exists.
#[derive(Debug, thiserror::Error)]
#[error("{category}")]
pub struct BasicError {
    category: BasicErrorType,
    #[source]
    cause: BoxError,
}

impl BasicError {
    /// Creates a classified error from a category and its cause.
    pub fn new(category: BasicErrorType, cause: impl Into<BoxError>) -> Self {
        Self {
            category,
            cause: cause.into(),
        }
    }

    /// Returns the category.
    pub fn category(&self) -> BasicErrorType {
        self.category
    }

    /// Returns the original error.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    /// Consumes the classification and returns the original error.
    pub fn into_cause(self) -> BoxError {
        self.cause
    }

    /// Returns true if the category means the host could not be reached.
    pub fn is_connectivity(&self) -> bool {
        self.category.is_connectivity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_category_identifiers_match_variant_names() {
        assert_eq!(BasicErrorType::CantResolveHost.to_string(), "CantResolveHost");
        assert_eq!(BasicErrorType::CantFindHost.to_string(), "CantFindHost");
        assert_eq!(
            BasicErrorType::CantConnectToHost.to_string(),
            "CantConnectToHost"
        );
        assert_eq!(BasicErrorType::UnexpectedEof.to_string(), "UnexpectedEof");
        assert_eq!(BasicErrorType::BadDataReceived.to_string(), "BadDataReceived");
        assert_eq!(BasicErrorType::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_category_from_str() {
        for category in BasicErrorType::ALL {
            assert_eq!(category.as_str().parse::<BasicErrorType>(), Ok(category));
        }
        assert!("cantresolvehost".parse::<BasicErrorType>().is_err());
    }

    #[test]
    fn test_connectivity_categories() {
        let connectivity: Vec<_> = BasicErrorType::ALL
            .into_iter()
            .filter(BasicErrorType::is_connectivity)
            .collect();
        assert_eq!(
            connectivity,
            vec![
                BasicErrorType::CantResolveHost,
                BasicErrorType::CantFindHost,
                BasicErrorType::CantConnectToHost,
            ]
        );
    }

    #[test]
    fn test_category_serializes_as_identifier() {
        let json = serde_json::to_string(&BasicErrorType::UnexpectedEof).unwrap();
        assert_eq!(json, "\"UnexpectedEof\"");
    }

    #[test]
    fn test_basic_error_display_and_source() {
        let err = BasicError::new(
            BasicErrorType::CantConnectToHost,
            io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        );

        assert_eq!(err.to_string(), "CantConnectToHost");
        assert!(err.is_connectivity());
        let source = err.source().expect("cause is exposed as source");
        assert_eq!(source.to_string(), "connection refused");
    }

    #[test]
    fn test_basic_error_into_cause() {
        let err = BasicError::new(BasicErrorType::Unknown, "boom");
        assert_eq!(err.into_cause().to_string(), "boom");
    }
}
