//! Writing documents from adapters.
//!
//! [`DocumentWriter`] walks a [`DocumentAdapter`] in canonical order,
//! validates every event with the same grammar and reference rules readers
//! use, and hands valid events to an [`EventSink`] (the serializing half
//! of a format plugin).
//!
//! Canonical order:
//!
//! ```text
//! DOCUMENT
//!   metadata
//!   OTU_LIST*             metadata, OTU*, OTU_SET*
//!   ALIGNMENT*            metadata, CHARACTER_DEFINITION*, CHARACTER_SET*,
//!                         TOKEN_SET_DEFINITION*, SEQUENCE*
//!   TREE_NETWORK_GROUP*   metadata, (TREE | NETWORK)*, TREE_NETWORK_SET*
//!     TREE | NETWORK      metadata, NODE*, EDGE*, NODE_EDGE_SET*
//! ```
//!
//! A failed write leaves whatever the sink already received; that output
//! must be treated as invalid.

use log::debug;

use crate::adapter::{DocumentAdapter, EventReceiver, ObjectListAdapter};
use crate::error::WriterError;
use crate::event::{Comment, Event, Payload};
use crate::kind::{ContentType, TopologyType};
use crate::params::ReadWriteParameters;
use crate::sequence::sequence_token_events;
use crate::validate::StreamValidator;

/// The serializing side of a format plugin.
pub trait EventSink {
    fn write_event(&mut self, event: &Event) -> Result<(), WriterError>;

    /// Called once after the document end event was written.
    fn finish(&mut self) -> Result<(), WriterError> {
        Ok(())
    }
}

/// An [`EventSink`] that keeps every event.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
    finished: bool,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl EventSink for EventCollector {
    fn write_event(&mut self, event: &Event) -> Result<(), WriterError> {
        self.events.push(event.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), WriterError> {
        self.finished = true;
        Ok(())
    }
}

/// Validates, normalizes and forwards the events of one write.
struct ValidatingReceiver<'a> {
    params: &'a ReadWriteParameters,
    validator: StreamValidator,
    sink: &'a mut dyn EventSink,
}

impl<'a> ValidatingReceiver<'a> {
    fn new(params: &'a ReadWriteParameters, sink: &'a mut dyn EventSink) -> Self {
        Self {
            params,
            validator: StreamValidator::new(params),
            sink,
        }
    }

    fn forward(&mut self, event: Event) -> Result<(), WriterError> {
        self.validator.validate(&event)?;
        self.sink.write_event(&event)
    }

    fn finish(&mut self) -> Result<u64, WriterError> {
        self.validator.finish()?;
        self.sink.finish()?;
        Ok(self.validator.position())
    }
}

impl EventReceiver for ValidatingReceiver<'_> {
    /// Oversized token runs and comments are split to the configured limits.
    fn add(&mut self, event: Event) -> Result<(), WriterError> {
        match event.payload() {
            Payload::SequenceTokens(run) if run.len() > self.params.max_tokens_per_event() => {
                let tokens = run.tokens().to_vec();
                for part in sequence_token_events(tokens, self.params.max_tokens_per_event()) {
                    self.forward(part)?;
                }
                Ok(())
            }
            Payload::Comment(comment) if comment.content().len() > self.params.max_comment_length() => {
                let mut pieces = Comment::split(comment.content(), self.params.max_comment_length());
                if comment.is_continued() {
                    if let Some(last) = pieces.pop() {
                        pieces.push(Comment::new(last.content(), true));
                    }
                }
                for piece in pieces {
                    self.forward(Event::new(Payload::Comment(piece)))?;
                }
                Ok(())
            }
            _ => self.forward(event),
        }
    }
}

fn expect_start(event: Event, allowed: &[ContentType]) -> Result<Event, WriterError> {
    if event.topology_type() == TopologyType::Start && allowed.contains(&event.content_type()) {
        Ok(event)
    } else {
        Err(WriterError::InconsistentAdapter(format!(
            "expected a start event of {allowed:?}, the adapter provided {}",
            event.event_type()
        )))
    }
}

/// Writes documents from adapters.
#[derive(Debug, Clone, Default)]
pub struct DocumentWriter {
    params: ReadWriteParameters,
}

impl DocumentWriter {
    pub fn new(params: ReadWriteParameters) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &ReadWriteParameters {
        &self.params
    }

    /// Walk `document` and write its events to `sink`.
    pub fn write(&self, document: &dyn DocumentAdapter, sink: &mut dyn EventSink) -> Result<(), WriterError> {
        debug!("starting to write document");
        let mut receiver = ValidatingReceiver::new(&self.params, sink);

        receiver.add(Event::document_start())?;
        document.write_metadata(&mut receiver)?;

        for list in document.otu_lists() {
            receiver.add(expect_start(list.start_event(), &[ContentType::OtuList])?)?;
            list.write_metadata(&mut receiver)?;
            self.write_objects(&*list.otus(), ContentType::Otu, &mut receiver)?;
            self.write_objects(&*list.otu_sets(), ContentType::OtuSet, &mut receiver)?;
            receiver.add(Event::end(ContentType::OtuList)?)?;
        }

        for matrix in document.matrices() {
            receiver.add(expect_start(matrix.start_event(), &[ContentType::Alignment])?)?;
            matrix.write_metadata(&mut receiver)?;
            self.write_objects(
                &*matrix.character_definitions(),
                ContentType::CharacterDefinition,
                &mut receiver,
            )?;
            self.write_objects(&*matrix.character_sets(), ContentType::CharacterSet, &mut receiver)?;
            self.write_objects(&*matrix.token_sets(), ContentType::TokenSetDefinition, &mut receiver)?;
            self.write_objects(&*matrix.sequences(), ContentType::Sequence, &mut receiver)?;
            receiver.add(Event::end(ContentType::Alignment)?)?;
        }

        for group in document.tree_network_groups() {
            receiver.add(expect_start(group.start_event(), &[ContentType::TreeNetworkGroup])?)?;
            group.write_metadata(&mut receiver)?;
            for tree in group.trees_and_networks() {
                let start = expect_start(tree.start_event(), &[ContentType::Tree, ContentType::Network])?;
                let content = start.content_type();
                receiver.add(start)?;
                tree.write_metadata(&mut receiver)?;
                self.write_objects(&*tree.nodes(), ContentType::Node, &mut receiver)?;
                self.write_objects(&*tree.edges(), ContentType::Edge, &mut receiver)?;
                self.write_objects(&*tree.node_edge_sets(), ContentType::NodeEdgeSet, &mut receiver)?;
                receiver.add(Event::end(content)?)?;
            }
            self.write_objects(&*group.tree_network_sets(), ContentType::TreeNetworkSet, &mut receiver)?;
            receiver.add(Event::end(ContentType::TreeNetworkGroup)?)?;
        }

        receiver.add(Event::document_end())?;
        let written = receiver.finish()?;
        debug!("finished writing {written} events");
        Ok(())
    }

    fn write_objects(
        &self,
        list: &dyn ObjectListAdapter,
        content: ContentType,
        receiver: &mut ValidatingReceiver<'_>,
    ) -> Result<(), WriterError> {
        let ids = list.ids();
        if ids.len() != list.count() {
            return Err(WriterError::InconsistentAdapter(format!(
                "the {content} list reports {} elements but provides {} IDs",
                list.count(),
                ids.len()
            )));
        }

        for id in &ids {
            let start = expect_start(list.start_event(id)?, &[content])?;
            if start.id() != Some(id) {
                return Err(WriterError::InconsistentAdapter(format!(
                    "the {content} with the ID \"{id}\" has a start event with another ID"
                )));
            }
            receiver.add(start)?;
            list.write_content(&self.params, id, receiver)?;
            receiver.add(Event::end(content)?)?;
        }
        Ok(())
    }
}
