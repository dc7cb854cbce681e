//! Observable events for the schema engine
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events
///
/// These cover:
/// - Schema construction
/// - Document normalization
/// - Partial path resolution
/// - Compilation and unique-key extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Construction
    /// Schema passed structural checks
    SchemaBuilt,
    /// Schema declaration rejected (FATAL)
    SchemaRejected,

    // Normalization
    /// Document validated and normalized
    DocumentNormalized,
    /// Document rejected
    DocumentRejected,
    /// Dotted path resolved and its value normalized
    LeafResolved,

    // Derivation
    /// Declarative validation document produced
    SchemaCompiled,
    /// Unique paths extracted
    UniqueKeysListed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaBuilt => "SCHEMA_BUILT",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::DocumentNormalized => "DOCUMENT_NORMALIZED",
            Event::DocumentRejected => "DOCUMENT_REJECTED",
            Event::LeafResolved => "LEAF_RESOLVED",
            Event::SchemaCompiled => "SCHEMA_COMPILED",
            Event::UniqueKeysListed => "UNIQUE_KEYS_LISTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::SchemaRejected)
    }

    /// Returns true if this event reports refused input
    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::SchemaRejected | Event::DocumentRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
