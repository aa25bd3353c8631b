//! Error taxonomy.
//!
//! One enum per failure category:
//!
//! - [`EventError`] - an event was constructed with invalid fields (producer bug)
//! - [`CastError`] - a consumer asked for the wrong view of an event (consumer bug)
//! - [`StructureError`] - nesting/pairing violations of the stream grammar
//! - [`ReferenceError`] - dangling references, duplicate IDs and other consistency violations
//! - [`ValidationError`] - one of the two above, tagged with the stream position
//! - [`ReaderError`] / [`WriterError`] - what the reader and writer surfaces return
//!
//! None of these are recoverable: after a structure or reference error the
//! position in the logical document is ambiguous and processing must stop.

use std::fmt;

use thiserror::Error;

use crate::kind::{ContentType, EventType, TopologyType};
use crate::location::Location;

/// Reasons an ID is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("an ID must not be empty")]
    Empty,

    #[error("an ID must not consist of whitespace only")]
    Whitespace,

    #[error("an ID must not start with {ch:?}")]
    InvalidStart { ch: char },

    #[error("an ID must not contain {ch:?} (byte {index})")]
    InvalidChar { ch: char, index: usize },
}

/// Constructor-level contract violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("invalid {field} \"{value}\": {source}")]
    InvalidId {
        field: &'static str,
        value: String,
        source: IdError,
    },

    #[error("the required field {field} of a {content} event is missing")]
    MissingField {
        content: ContentType,
        field: &'static str,
    },

    #[error("invalid character set interval [{start}, {end}): the start lies after the end")]
    InvalidInterval { start: u64, end: u64 },

    #[error("the atomic token \"{token}\" must not list constituents")]
    AtomicConstituents { token: String },

    #[error("{content} elements cannot be ended as a part")]
    PartsNotSupported { content: ContentType },

    #[error("{content} cannot be combined with the topology {topology}")]
    InvalidCombination {
        content: ContentType,
        topology: TopologyType,
    },
}

/// A consumer requested a view that does not match the event's variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a {found} event cannot be viewed as {expected}")]
pub struct CastError {
    pub expected: &'static str,
    pub found: EventType,
}

/// Grammar violations. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("the stream must start with DOCUMENT START, but found {found}")]
    UnexpectedRoot { found: EventType },

    #[error("An event of the type {child} was encountered under an event of the type {parent} which is invalid.")]
    UnexpectedChild { child: EventType, parent: ContentType },

    #[error("found the end of a {found} element while a {open} element is open")]
    MismatchedEnd { found: ContentType, open: ContentType },

    #[error("found the end of a {found} element without any open element")]
    UnmatchedEnd { found: ContentType },

    #[error("found an event of the type {found} after the end of the document")]
    AfterDocumentEnd { found: EventType },

    #[error("the stream ended with {open} open element(s), the innermost being {innermost}")]
    Unclosed { open: usize, innermost: ContentType },

    #[error("the stream ended without any document")]
    MissingDocument,
}

/// Referential and consistency violations the grammar cannot express.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("The encountered ID {id} already exists in the document.")]
    DuplicateId { id: String },

    #[error("The {role} node \"{node}\" of the edge \"{edge}\" was not declared in the enclosing {scope} before.")]
    UndeclaredNode {
        edge: String,
        role: &'static str,
        node: String,
        scope: ContentType,
    },

    #[error("The node \"{node}\" referenced by the edge \"{edge}\" was not declared before the end of the enclosing {scope}.")]
    UnresolvedNode {
        edge: String,
        node: String,
        scope: ContentType,
    },

    #[error("The character set \"{set}\" referenced the ID of a character that was not specified before (\"{id}\").")]
    UndeclaredCharacter { set: String, id: String },

    #[error("The character \"{id}\" added to the character set \"{set}\" has the index {index}, which is beyond the last addressable column.")]
    ColumnOutOfRange { set: String, id: String, index: u64 },

    #[error("The sequence token \"{token}\" references the undeclared column ID \"{id}\".")]
    UndeclaredColumn { token: String, id: String },

    #[error("The token definition \"{token}\" referenced the ID of a state that was not specified before (\"{constituent}\").")]
    UndeclaredConstituent { token: String, constituent: String },

    #[error("The token set \"{token_set}\" references the character set \"{id}\" which was not declared in the same alignment before.")]
    UndeclaredCharacterSet { token_set: String, id: String },

    #[error("More than one token set was assigned to the alignment column {column}.")]
    OverlappingTokenSets {
        column: u64,
        first: String,
        second: String,
    },

    #[error("The continuous token set \"{token_set}\" must not contain single token definitions.")]
    ContinuousTokenDefinition { token_set: String },

    #[error("The {content} \"{element}\" references the OTU list \"{id}\" which was not declared before.")]
    UndeclaredOtuList {
        content: ContentType,
        element: String,
        id: String,
    },

    #[error("The {content} \"{element}\" references the OTU \"{id}\" which was not declared before.")]
    UndeclaredOtu {
        content: ContentType,
        element: String,
        id: String,
    },

    #[error("The {content} \"{element}\" references the OTU \"{otu}\" which is not contained in the linked OTU list \"{list}\".")]
    OtuNotInList {
        content: ContentType,
        element: String,
        otu: String,
        list: String,
    },

    #[error("A continued part of the sequence \"{id}\" does not link the same OTU as its first part.")]
    PartOtuMismatch {
        id: String,
        first: Option<String>,
        found: Option<String>,
    },

    #[error("A set element of the {set} \"{set_id}\" references the ID \"{id}\" which was not declared before.")]
    UndeclaredSetElement {
        set: ContentType,
        set_id: String,
        id: String,
    },

    #[error("A set element referencing the {found} \"{id}\" is not allowed in a {set} element.")]
    InvalidSetElement {
        set: ContentType,
        id: String,
        found: ContentType,
    },

    #[error("An event references another event with the ID \"{id}\" which has not been encountered before.")]
    UnknownReference { id: String },
}

/// A grammar or reference violation at a zero-based stream position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("event {position}: {source}")]
    Structure { position: u64, source: StructureError },

    #[error("event {position}: {source}")]
    Reference { position: u64, source: ReferenceError },
}

impl ValidationError {
    /// Position of the offending event (or of the stream end).
    pub fn position(&self) -> u64 {
        match self {
            ValidationError::Structure { position, .. } => *position,
            ValidationError::Reference { position, .. } => *position,
        }
    }

    pub fn as_structure(&self) -> Option<&StructureError> {
        match self {
            ValidationError::Structure { source, .. } => Some(source),
            ValidationError::Reference { .. } => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceError> {
        match self {
            ValidationError::Reference { source, .. } => Some(source),
            ValidationError::Structure { .. } => None,
        }
    }
}

/// Renders `" (line L, column C)"` when a location is known.
struct AtLocation<'a>(&'a Option<Location>);

impl fmt::Display for AtLocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, " ({location})"),
            None => Ok(()),
        }
    }
}

/// Errors surfaced by [`crate::reader::EventReader`] implementations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReaderError {
    #[error("{source}{}", AtLocation(.location))]
    Validation {
        source: ValidationError,
        location: Option<Location>,
    },

    #[error("{source}{}", AtLocation(.location))]
    InvalidEvent {
        source: EventError,
        location: Option<Location>,
    },

    #[error("the event source failed: {message}{}", AtLocation(.location))]
    Source {
        message: String,
        location: Option<Location>,
    },

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("the match token at column {column} has no counterpart in the first sequence ({available} tokens)")]
    UnresolvedMatchToken { column: u64, available: u64 },

    #[error("the lookahead buffer is limited to {capacity} events")]
    LookaheadExceeded { capacity: usize },

    #[error("no further events are available")]
    EndOfStream,

    #[error("the reader was already closed")]
    Closed,
}

impl ReaderError {
    /// Shorthand for format plugins reporting their own failures.
    pub fn source_failure(message: impl Into<String>, location: Option<Location>) -> Self {
        ReaderError::Source {
            message: message.into(),
            location,
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ReaderError::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<EventError> for ReaderError {
    fn from(source: EventError) -> Self {
        ReaderError::InvalidEvent { source, location: None }
    }
}

/// Errors surfaced by [`crate::writer::DocumentWriter`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriterError {
    #[error("the written document is invalid: {0}")]
    Validation(#[from] ValidationError),

    #[error("inconsistent adapter data: {0}")]
    InconsistentAdapter(String),

    #[error("the event sink failed: {0}")]
    Sink(String),

    #[error(transparent)]
    Event(#[from] EventError),
}

impl WriterError {
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            WriterError::Validation(source) => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_message() {
        let error = ReferenceError::OverlappingTokenSets {
            column: 3,
            first: "ts1".into(),
            second: "ts2".into(),
        };
        assert_eq!(
            error.to_string(),
            "More than one token set was assigned to the alignment column 3."
        );
    }

    #[test]
    fn test_validation_error_position() {
        let error = ValidationError::Reference {
            position: 12,
            source: ReferenceError::DuplicateId { id: "n1".into() },
        };
        assert_eq!(error.position(), 12);
        assert!(error.as_structure().is_none());
        assert_eq!(
            error.to_string(),
            "event 12: The encountered ID n1 already exists in the document."
        );
    }

    #[test]
    fn test_reader_error_location_suffix() {
        let source = ValidationError::Structure {
            position: 0,
            source: StructureError::MissingDocument,
        };
        let error = ReaderError::Validation {
            source: source.clone(),
            location: Some(Location::new(10, 2, 4)),
        };
        assert_eq!(
            error.to_string(),
            "event 0: the stream ended without any document (line 2, column 4)"
        );
        let error = ReaderError::Validation {
            source,
            location: None,
        };
        assert_eq!(error.to_string(), "event 0: the stream ended without any document");
    }
}
