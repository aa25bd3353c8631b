//! PhyloIO Core
//!
//! Streaming event model for phylogenetic data: OTUs, alignments, character
//! and token sets, trees and networks. Format plugins turn files into event
//! streams and back; this crate defines the events, the rules a stream has
//! to obey, and the reader/writer contracts around them.
//!
//! # Architecture
//!
//! - **kind.rs** - Content and topology types, the legal combinations
//! - **event.rs** - Event payloads and the `Event` type
//! - **grammar.rs** - Nesting rules, pushdown state of a stream
//! - **validate.rs** - ID uniqueness and cross-reference checks
//! - **reader.rs** - Pull-reader contract, `EventSource` plugin seam
//! - **adapter.rs** / **writer.rs** - Document adapters and the validating writer
//! - **store.rs** - In-memory store bridging readers and writers
//! - **ids.rs**, **sequence.rs** - Helpers for format plugins
//!
//! # Example
//!
//! ```
//! use phyloio_core::{ContentType, Event, EventReader, ValidatingReader};
//!
//! let events = vec![
//!     Event::document_start(),
//!     Event::otu_list_start("otus", None).unwrap(),
//!     Event::otu_start("t1", Some("Homo sapiens")).unwrap(),
//!     Event::end(ContentType::Otu).unwrap(),
//!     Event::end(ContentType::OtuList).unwrap(),
//!     Event::document_end(),
//! ];
//! let mut reader = ValidatingReader::from_events(events).unwrap();
//! while reader.has_next_event().unwrap() {
//!     let event = reader.next_event().unwrap();
//!     println!("{}", event.event_type());
//! }
//! reader.close().unwrap();
//! ```

pub mod adapter;
pub mod error;
pub mod event;
pub mod grammar;
pub mod id;
pub mod ids;
pub mod kind;
pub mod location;
pub mod params;
pub mod reader;
pub mod sequence;
pub mod store;
pub mod streaming;
pub mod validate;
pub mod value;
pub mod writer;

pub use adapter::{
    AnnotatedAdapter, DocumentAdapter, EventReceiver, MatrixAdapter, ObjectListAdapter, OtuListAdapter,
    TreeNetworkAdapter, TreeNetworkGroupAdapter,
};
pub use error::{
    CastError, EventError, IdError, ReaderError, ReferenceError, StructureError, ValidationError, WriterError,
};
pub use event::{Event, IdRole, Payload};
pub use grammar::{Grammar, ParentInformation};
pub use id::Id;
pub use kind::{is_valid_combination, ContentType, EventType, TokenSetType, TopologyType};
pub use location::Location;
pub use params::{NodeReferences, ReadWriteParameters};
pub use reader::{
    EventForwarder, EventListener, EventReader, EventSource, ReadContext, ValidatingReader, VecEventSource,
};
pub use store::StoreDocument;
pub use streaming::EventRing;
pub use validate::StreamValidator;
pub use value::{Extensions, MetaValue};
pub use writer::{DocumentWriter, EventCollector, EventSink};
