//! The pull-reader contract and the validating reader built on it.
//!
//! Format plugins implement [`EventSource`]: on each call they parse a bit
//! of input and emit events into a bounded lookahead buffer. A
//! [`ValidatingReader`] pulls from that buffer, checks every event against
//! the stream grammar and the reference rules, and hands it to the consumer
//! through [`EventReader`].
//!
//! ```ignore
//! let mut reader = ValidatingReader::new(MyFormat::open(path)?, ReadWriteParameters::new())?;
//! while reader.has_next_event()? {
//!     let event = reader.next_event()?;
//!     // ...
//! }
//! reader.close()?;
//! ```
//!
//! [`EventForwarder`] turns a reader around: it pulls every event and pushes
//! it to registered [`EventListener`]s.
//!
//! An event is validated when it becomes the next event, so a violation is
//! reported by the `has_next_event`/`peek`/`next_event` call that would
//! otherwise have delivered it. Checks that need a whole scope (forward node
//! references) report at the end event of that scope.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::error::{EventError, ReaderError};
use crate::event::{Event, Payload};
use crate::grammar::ParentInformation;
use crate::ids::IdGenerator;
use crate::kind::{ContentType, EventType, TopologyType};
use crate::location::Location;
use crate::params::ReadWriteParameters;
use crate::sequence::{sequence_token_events, MatchTokenTranslator};
use crate::streaming::EventRing;
use crate::validate::StreamValidator;
use crate::value::Extensions;

// ============================================================================
// Reader contract
// ============================================================================

/// A one-shot, forward-only, single-consumer event stream.
///
/// `peek` followed directly by `next_event` returns the same event. After
/// the first error every call returns that error.
pub trait EventReader {
    /// Whether another event is available. Does not consume it.
    fn has_next_event(&mut self) -> Result<bool, ReaderError>;

    /// The next event without consuming it. Repeatable.
    fn peek(&mut self) -> Result<&Event, ReaderError>;

    /// Consume and return the next event.
    fn next_event(&mut self) -> Result<Event, ReaderError>;

    /// Release the underlying resource. Closing twice is a no-op.
    fn close(&mut self) -> Result<(), ReaderError>;

    /// The event most recently returned by [`EventReader::next_event`].
    fn previous_event(&self) -> Option<&Event>;

    /// Like [`EventReader::previous_event`], skipping comments.
    fn last_non_comment_event(&self) -> Option<&Event>;

    /// Start events of the elements open at the current consumer position.
    fn parent_information(&self) -> &ParentInformation;

    /// Skip forward to the next event of one of `types`.
    ///
    /// Returns `None` when the stream ends first. Skipped events are lost.
    fn next_of_type(&mut self, types: &[EventType]) -> Result<Option<Event>, ReaderError> {
        while self.has_next_event()? {
            let event = self.next_event()?;
            if types.contains(&event.event_type()) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    /// Consume the reader as an iterator. Iteration stops after the first error.
    fn events(&mut self) -> Events<'_, Self>
    where
        Self: Sized,
    {
        Events {
            reader: self,
            failed: false,
        }
    }
}

/// Iterator returned by [`EventReader::events`].
pub struct Events<'r, R: ?Sized> {
    reader: &'r mut R,
    failed: bool,
}

impl<R: EventReader + ?Sized> Iterator for Events<'_, R> {
    type Item = Result<Event, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.has_next_event() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(error) => {
                self.failed = true;
                return Some(Err(error));
            }
        }
        let result = self.reader.next_event();
        self.failed = result.is_err();
        Some(result)
    }
}

// ============================================================================
// Format plugin seam
// ============================================================================

/// The parsing side of a format plugin.
pub trait EventSource {
    /// Parse more input and emit the resulting events into `context`.
    ///
    /// Each call must emit at least one event, call [`ReadContext::finish`]
    /// or advance the input. Emitting more events than
    /// [`ReadContext::space`] allows fails with
    /// [`ReaderError::LookaheadExceeded`].
    fn produce(&mut self, context: &mut ReadContext<'_>) -> Result<(), ReaderError>;

    /// Current position in the input, attached to reported errors.
    fn location(&self) -> Option<Location> {
        None
    }

    /// Release held resources.
    fn close(&mut self) -> Result<(), ReaderError> {
        Ok(())
    }
}

/// Per-document state handed to [`EventSource::produce`].
pub struct ReadContext<'a> {
    params: &'a ReadWriteParameters,
    ring: &'a mut EventRing,
    ids: &'a mut IdGenerator,
    shared: &'a mut Extensions,
    finished: &'a mut bool,
}

impl ReadContext<'_> {
    #[inline]
    pub fn params(&self) -> &ReadWriteParameters {
        self.params
    }

    /// Generator for IDs the input does not provide.
    #[inline]
    pub fn ids(&mut self) -> &mut IdGenerator {
        self.ids
    }

    /// State shared between the parsing stages of one document.
    #[inline]
    pub fn shared(&mut self) -> &mut Extensions {
        self.shared
    }

    /// Number of events that can still be emitted in this call.
    #[inline]
    pub fn space(&self) -> usize {
        self.ring.space()
    }

    pub fn emit(&mut self, event: Event) -> Result<(), ReaderError> {
        self.ring.try_push(event).map_err(|_| ReaderError::LookaheadExceeded {
            capacity: self.ring.capacity(),
        })
    }

    /// Emit sequence tokens, split into events of the configured maximum size.
    pub fn emit_tokens(&mut self, tokens: Vec<String>) -> Result<(), ReaderError> {
        for event in sequence_token_events(tokens, self.params.max_tokens_per_event()) {
            self.emit(event)?;
        }
        Ok(())
    }

    /// Emit a comment, split into continued events of the configured maximum length.
    pub fn emit_comment(&mut self, content: &str) -> Result<(), ReaderError> {
        for event in Event::comments(content, self.params.max_comment_length()) {
            self.emit(event)?;
        }
        Ok(())
    }

    /// Signal that the input is exhausted.
    #[inline]
    pub fn finish(&mut self) {
        *self.finished = true;
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        *self.finished
    }
}

// ============================================================================
// Validating reader
// ============================================================================

/// [`EventReader`] over an [`EventSource`] that validates every event.
pub struct ValidatingReader<S: EventSource> {
    source: S,
    params: ReadWriteParameters,
    ring: EventRing,
    ids: IdGenerator,
    shared: Extensions,
    validator: StreamValidator,
    translator: Option<MatchTokenTranslator>,
    /// Start events open at the consumer position
    parents: ParentInformation,
    upcoming: Option<Event>,
    previous: Option<Event>,
    last_non_comment: Option<Event>,
    failure: Option<ReaderError>,
    source_finished: bool,
    stream_checked: bool,
    closed: bool,
}

impl<S: EventSource> ValidatingReader<S> {
    /// Fails if the configured generated ID prefix is not a valid ID.
    pub fn new(source: S, params: ReadWriteParameters) -> Result<Self, ReaderError> {
        let ids = IdGenerator::new(params.generated_id_prefix()).map_err(|source| EventError::InvalidId {
            field: "generated ID prefix",
            value: params.generated_id_prefix().to_owned(),
            source,
        })?;
        debug!(
            "starting to read, lookahead capacity {}",
            params.lookahead_capacity()
        );
        Ok(Self {
            source,
            ring: EventRing::new(params.lookahead_capacity()),
            ids,
            shared: Extensions::new(),
            validator: StreamValidator::new(&params),
            translator: params
                .translate_match_token()
                .then(|| MatchTokenTranslator::new(params.match_token())),
            params,
            parents: ParentInformation::default(),
            upcoming: None,
            previous: None,
            last_non_comment: None,
            failure: None,
            source_finished: false,
            stream_checked: false,
            closed: false,
        })
    }

    #[inline]
    pub fn params(&self) -> &ReadWriteParameters {
        &self.params
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The shared information map of the current document.
    #[inline]
    pub fn shared_information(&self) -> &Extensions {
        &self.shared
    }

    /// Number of events validated so far, including a peeked one.
    #[inline]
    pub fn position(&self) -> u64 {
        self.validator.position()
    }

    fn fail(&mut self, error: ReaderError) -> ReaderError {
        debug!("reading failed: {error}");
        self.failure = Some(error.clone());
        error
    }

    /// Make the next event available in `upcoming`. Returns false at the end.
    fn fill_upcoming(&mut self) -> Result<bool, ReaderError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        if self.closed {
            return Err(ReaderError::Closed);
        }

        loop {
            if self.upcoming.is_some() {
                return Ok(true);
            }
            if let Some(event) = self.ring.pop() {
                match self.accept(event) {
                    Ok(event) => {
                        self.upcoming = Some(event);
                        return Ok(true);
                    }
                    Err(error) => return Err(self.fail(error)),
                }
            }
            if self.source_finished {
                if !self.stream_checked {
                    self.stream_checked = true;
                    if let Err(source) = self.validator.finish() {
                        let location = self.source.location();
                        return Err(self.fail(ReaderError::Validation { source, location }));
                    }
                    debug!("finished reading after {} events", self.validator.position());
                }
                return Ok(false);
            }

            let mut context = ReadContext {
                params: &self.params,
                ring: &mut self.ring,
                ids: &mut self.ids,
                shared: &mut self.shared,
                finished: &mut self.source_finished,
            };
            if let Err(error) = self.source.produce(&mut context) {
                return Err(self.fail(error));
            }
        }
    }

    /// Translate and validate an event leaving the lookahead buffer.
    fn accept(&mut self, event: Event) -> Result<Event, ReaderError> {
        let event = match &mut self.translator {
            Some(translator)
                if matches!(
                    event.payload(),
                    Payload::SequenceTokens(_) | Payload::SingleSequenceTokenStart(_)
                ) =>
            {
                let sequence = self
                    .validator
                    .parent_information()
                    .nearest(ContentType::Sequence)
                    .and_then(Event::id)
                    .cloned();
                match sequence {
                    Some(sequence) => translator.translate_event(&sequence, event)?,
                    None => event,
                }
            }
            _ => event,
        };

        self.validator
            .validate(&event)
            .map_err(|source| ReaderError::Validation {
                source,
                location: self.source.location(),
            })?;
        Ok(event)
    }
}

impl ValidatingReader<VecEventSource> {
    /// Reader over prepared events with default parameters.
    pub fn from_events(events: Vec<Event>) -> Result<Self, ReaderError> {
        Self::new(VecEventSource::from(events), ReadWriteParameters::default())
    }
}

impl<S: EventSource> EventReader for ValidatingReader<S> {
    fn has_next_event(&mut self) -> Result<bool, ReaderError> {
        self.fill_upcoming()
    }

    fn peek(&mut self) -> Result<&Event, ReaderError> {
        if !self.fill_upcoming()? {
            return Err(ReaderError::EndOfStream);
        }
        self.upcoming.as_ref().ok_or(ReaderError::EndOfStream)
    }

    fn next_event(&mut self) -> Result<Event, ReaderError> {
        if !self.fill_upcoming()? {
            return Err(ReaderError::EndOfStream);
        }
        let event = self.upcoming.take().ok_or(ReaderError::EndOfStream)?;
        match event.topology_type() {
            TopologyType::Start => self.parents.push(event.clone()),
            TopologyType::End => {
                self.parents.pop();
            }
            TopologyType::Sole => {}
        }
        if !event.is_comment() {
            self.last_non_comment = Some(event.clone());
        }
        self.previous = Some(event.clone());
        Ok(event)
    }

    fn close(&mut self) -> Result<(), ReaderError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.ring.clear();
        self.upcoming = None;
        debug!("closing reader after {} events", self.validator.position());
        self.source.close()
    }

    fn previous_event(&self) -> Option<&Event> {
        self.previous.as_ref()
    }

    fn last_non_comment_event(&self) -> Option<&Event> {
        self.last_non_comment.as_ref()
    }

    fn parent_information(&self) -> &ParentInformation {
        &self.parents
    }
}

impl<S: EventSource> Drop for ValidatingReader<S> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(error) = self.close() {
                warn!("closing reader on drop failed: {error}");
            }
        }
    }
}

// ============================================================================
// In-memory source
// ============================================================================

/// An [`EventSource`] replaying prepared events.
#[derive(Debug, Default)]
pub struct VecEventSource {
    events: VecDeque<Event>,
}

impl VecEventSource {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Events not yet handed to the reader.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl From<Vec<Event>> for VecEventSource {
    fn from(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

impl EventSource for VecEventSource {
    fn produce(&mut self, context: &mut ReadContext<'_>) -> Result<(), ReaderError> {
        while context.space() > 0 {
            match self.events.pop_front() {
                Some(event) => context.emit(event)?,
                None => break,
            }
        }
        if self.events.is_empty() {
            context.finish();
        }
        Ok(())
    }
}

// ============================================================================
// Push bridge
// ============================================================================

/// Receives the events an [`EventForwarder`] pulls from its reader.
pub trait EventListener {
    /// `parents` holds the start events of the elements enclosing `event`.
    /// For an end event the element it closes is no longer included.
    fn process_event(&mut self, parents: &ParentInformation, event: &Event) -> Result<(), ReaderError>;
}

impl<F> EventListener for F
where
    F: FnMut(&ParentInformation, &Event) -> Result<(), ReaderError>,
{
    fn process_event(&mut self, parents: &ParentInformation, event: &Event) -> Result<(), ReaderError> {
        self(parents, event)
    }
}

/// Drives a reader and hands every event to each listener in turn.
///
/// ```ignore
/// let mut forwarder = EventForwarder::new(&mut reader)
///     .with_listener(|_: &ParentInformation, event: &Event| count_taxa(event))
///     .with_listener(TreeStatistics::default());
/// forwarder.read_all()?;
/// ```
pub struct EventForwarder<'a> {
    reader: &'a mut dyn EventReader,
    parents: ParentInformation,
    listeners: Vec<Box<dyn EventListener + 'a>>,
    forwarded: u64,
}

impl<'a> EventForwarder<'a> {
    pub fn new(reader: &'a mut dyn EventReader) -> Self {
        Self {
            reader,
            parents: ParentInformation::default(),
            listeners: Vec::new(),
            forwarded: 0,
        }
    }

    pub fn with_listener(mut self, listener: impl EventListener + 'a) -> Self {
        self.add_listener(listener);
        self
    }

    /// Listeners are called in the order they were added.
    pub fn add_listener(&mut self, listener: impl EventListener + 'a) {
        self.listeners.push(Box::new(listener));
    }

    #[inline]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Events forwarded so far.
    #[inline]
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// The elements open after the last forwarded event.
    #[inline]
    pub fn parent_information(&self) -> &ParentInformation {
        &self.parents
    }

    /// Forward every remaining event.
    pub fn read_all(&mut self) -> Result<(), ReaderError> {
        self.read_until(&[])
    }

    /// Forward events until the next one has one of the content types in
    /// `stop`. That event stays in the reader.
    pub fn read_until(&mut self, stop: &[ContentType]) -> Result<(), ReaderError> {
        while self.reader.has_next_event()? {
            if stop.contains(&self.reader.peek()?.content_type()) {
                debug!("forwarding stopped before {}", self.reader.peek()?.event_type());
                return Ok(());
            }
            let event = self.reader.next_event()?;
            if event.is_end() {
                self.parents.pop();
            }
            for listener in &mut self.listeners {
                listener.process_event(&self.parents, &event)?;
            }
            if event.is_start() {
                self.parents.push(event);
            }
            self.forwarded += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReferenceError, StructureError};

    fn tree_document() -> Vec<Event> {
        vec![
            Event::document_start(),
            Event::tree_network_group_start("g", None, None).unwrap(),
            Event::tree_start("t", None).unwrap(),
            Event::node_start("n1", None, None, true).unwrap(),
            Event::end(ContentType::Node).unwrap(),
            Event::comment("root edge follows"),
            Event::edge_start("e1", None, None, "n1", f64::NAN).unwrap(),
            Event::end(ContentType::Edge).unwrap(),
            Event::end(ContentType::Tree).unwrap(),
            Event::end(ContentType::TreeNetworkGroup).unwrap(),
            Event::document_end(),
        ]
    }

    #[test]
    fn test_forwarder_passes_enclosing_elements() {
        let mut reader = ValidatingReader::from_events(tree_document()).unwrap();
        let mut depths = Vec::new();
        let mut forwarder = EventForwarder::new(&mut reader)
            .with_listener(|parents: &ParentInformation, _: &Event| {
                depths.push(parents.depth());
                Ok(())
            });
        assert_eq!(forwarder.listener_count(), 1);
        forwarder.read_all().unwrap();
        assert_eq!(forwarder.forwarded(), 11);
        drop(forwarder);
        assert_eq!(depths, [0, 1, 2, 3, 3, 3, 3, 3, 2, 1, 0]);
    }

    #[test]
    fn test_forwarder_stops_before_requested_type() {
        let mut reader = ValidatingReader::from_events(tree_document()).unwrap();
        let mut forwarder = EventForwarder::new(&mut reader);
        forwarder.read_until(&[ContentType::Edge]).unwrap();
        assert_eq!(forwarder.forwarded(), 6);
        assert_eq!(forwarder.parent_information().depth(), 3);
        drop(forwarder);
        assert_eq!(reader.next_event().unwrap().content_type(), ContentType::Edge);
    }

    #[test]
    fn test_listener_failure_stops_forwarding() {
        let mut reader = ValidatingReader::from_events(tree_document()).unwrap();
        let mut forwarder = EventForwarder::new(&mut reader).with_listener(|_: &ParentInformation, event: &Event| {
            match event.content_type() {
                ContentType::Node => Err(ReaderError::Source {
                    message: "nodes are not supported".into(),
                    location: None,
                }),
                _ => Ok(()),
            }
        });
        let error = forwarder.read_all().unwrap_err();
        assert!(error.to_string().contains("nodes are not supported"));
        assert_eq!(forwarder.forwarded(), 3);
    }

    #[test]
    fn test_peek_then_next_returns_same_event() {
        let mut reader = ValidatingReader::from_events(tree_document()).unwrap();
        while reader.has_next_event().unwrap() {
            let peeked = reader.peek().unwrap().clone();
            assert_eq!(reader.peek().unwrap(), &peeked);
            assert_eq!(reader.next_event().unwrap(), peeked);
        }
        assert_eq!(reader.next_event(), Err(ReaderError::EndOfStream));
        assert_eq!(reader.peek().err(), Some(ReaderError::EndOfStream));
    }

    #[test]
    fn test_previous_and_parents() {
        let mut reader = ValidatingReader::from_events(tree_document()).unwrap();
        for _ in 0..6 {
            reader.next_event().unwrap();
        }
        assert!(reader.previous_event().unwrap().is_comment());
        assert!(reader.last_non_comment_event().unwrap().is_end());
        let parents = reader.parent_information();
        assert_eq!(parents.depth(), 3);
        assert_eq!(parents.direct_parent_content_type(), Some(ContentType::Tree));
    }

    #[test]
    fn test_next_of_type() {
        let mut reader = ValidatingReader::from_events(tree_document()).unwrap();
        let edge_start = EventType::new(ContentType::Edge, TopologyType::Start).unwrap();
        let edge = reader.next_of_type(&[edge_start]).unwrap().unwrap();
        assert_eq!(edge.id().unwrap(), "e1");
        let otu_start = EventType::new(ContentType::Otu, TopologyType::Start).unwrap();
        assert_eq!(reader.next_of_type(&[otu_start]).unwrap(), None);
    }

    #[test]
    fn test_small_lookahead() {
        let params = ReadWriteParameters::new().with_lookahead_capacity(2);
        let mut reader = ValidatingReader::new(VecEventSource::from(tree_document()), params).unwrap();
        let events: Result<Vec<_>, _> = reader.events().collect();
        assert_eq!(events.unwrap(), tree_document());
    }

    #[test]
    fn test_error_is_reported_before_delivery() {
        let mut events = tree_document();
        events[4] = Event::end(ContentType::Edge).unwrap();
        let mut reader = ValidatingReader::from_events(events).unwrap();
        for _ in 0..4 {
            reader.next_event().unwrap();
        }
        let error = reader.has_next_event().unwrap_err();
        assert_eq!(
            error.validation().and_then(|e| e.as_structure()),
            Some(&StructureError::MismatchedEnd {
                found: ContentType::Edge,
                open: ContentType::Node,
            })
        );
        // sticky
        assert_eq!(reader.next_event(), Err(error));
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut events = tree_document();
        events[3] = Event::node_start("t", None, None, true).unwrap();
        let mut reader = ValidatingReader::from_events(events).unwrap();
        let results: Vec<_> = reader.events().collect();
        assert_eq!(results.len(), 4);
        let error = results[3].as_ref().unwrap_err();
        assert_eq!(
            error.validation().and_then(|e| e.as_reference()),
            Some(&ReferenceError::DuplicateId { id: "t".into() })
        );
    }

    #[test]
    fn test_unclosed_stream() {
        let mut events = tree_document();
        events.truncate(5);
        let mut reader = ValidatingReader::from_events(events).unwrap();
        let error = reader.events().find_map(Result::err).unwrap();
        assert!(matches!(
            error.validation().and_then(|e| e.as_structure()),
            Some(StructureError::Unclosed { open: 3, .. })
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut reader = ValidatingReader::from_events(tree_document()).unwrap();
        reader.next_event().unwrap();
        reader.close().unwrap();
        reader.close().unwrap();
        assert_eq!(reader.has_next_event(), Err(ReaderError::Closed));
    }

    #[test]
    fn test_invalid_id_prefix() {
        let params = ReadWriteParameters::new().with_generated_id_prefix("1st");
        let result = ValidatingReader::new(VecEventSource::default(), params);
        assert!(matches!(result, Err(ReaderError::InvalidEvent { .. })));
    }

    #[test]
    fn test_match_token_translation() {
        let events = vec![
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::sequence_start("s1", None, None).unwrap(),
            Event::sequence_tokens(["A", "C"]),
            Event::end(ContentType::Sequence).unwrap(),
            Event::sequence_start("s2", None, None).unwrap(),
            Event::sequence_tokens([".", "G"]),
            Event::end(ContentType::Sequence).unwrap(),
            Event::end(ContentType::Alignment).unwrap(),
            Event::document_end(),
        ];
        let params = ReadWriteParameters::new().with_match_token_translation(".");
        let mut reader = ValidatingReader::new(VecEventSource::from(events), params).unwrap();
        let tokens: Vec<Vec<String>> = reader
            .events()
            .filter_map(|event| {
                let event = event.unwrap();
                event.as_sequence_tokens().ok().map(|run| run.tokens().to_vec())
            })
            .collect();
        assert_eq!(tokens, vec![vec!["A", "C"], vec!["A", "G"]]);
    }

    struct Chatty {
        remaining: usize,
    }

    impl EventSource for Chatty {
        fn produce(&mut self, context: &mut ReadContext<'_>) -> Result<(), ReaderError> {
            if self.remaining == 0 {
                context.finish();
                return Ok(());
            }
            self.remaining -= 1;
            context.emit(Event::document_start())?;
            context.emit_comment("way too long for one event")?;
            Ok(())
        }
    }

    #[test]
    fn test_lookahead_exceeded() {
        let params = ReadWriteParameters::new()
            .with_lookahead_capacity(2)
            .with_max_comment_length(4);
        let mut reader = ValidatingReader::new(Chatty { remaining: 1 }, params).unwrap();
        assert_eq!(
            reader.has_next_event(),
            Err(ReaderError::LookaheadExceeded { capacity: 2 })
        );
    }
}
