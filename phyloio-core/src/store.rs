//! In-memory document store.
//!
//! A [`StoreDocument`] keeps a whole event stream in an index-based arena:
//! every START/END pair becomes an element, sole events stay attached to
//! the element they occur in. Navigation goes through lightweight
//! [`StoreElement`] handles.
//!
//! The store implements every adapter trait, so a document that was read
//! can be written again:
//!
//! ```ignore
//! let document = StoreDocument::read(&mut reader)?;
//! DocumentWriter::new(params).write(&document, &mut sink)?;
//! ```
//!
//! Writing normalizes the document: annotations of container elements come
//! before their content, content follows the canonical writer order, and
//! the parts of interleaved sequences and character sets are merged.

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use crate::adapter::{
    AnnotatedAdapter, DocumentAdapter, EventReceiver, MatrixAdapter, ObjectListAdapter, OtuListAdapter,
    TreeNetworkAdapter, TreeNetworkGroupAdapter,
};
use crate::error::{ReaderError, StructureError, ValidationError, WriterError};
use crate::event::Event;
use crate::grammar::Grammar;
use crate::id::Id;
use crate::kind::{ContentType, TopologyType};
use crate::params::ReadWriteParameters;
use crate::reader::EventReader;

// ============================================================================
// Core Types
// ============================================================================

/// Index into the document's element arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

impl ElementId {
    #[inline]
    fn new(index: usize) -> Self {
        ElementId(index)
    }

    #[inline]
    fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum Item {
    Event(Event),
    Child(ElementId),
}

#[derive(Debug)]
struct ElementData {
    parent: Option<ElementId>,
    start: Event,
    items: Vec<Item>,
    /// The end event of the last part seen.
    end: Option<Event>,
}

// ============================================================================
// Document
// ============================================================================

#[derive(Debug)]
pub struct StoreDocument {
    elements: Vec<ElementData>,
    root: ElementId,
    index: HashMap<Id, ElementId>,
}

impl StoreDocument {
    /// Consume all remaining events of `reader`. The reader is not closed.
    pub fn read<R: EventReader + ?Sized>(reader: &mut R) -> Result<Self, ReaderError> {
        let mut builder = StoreBuilder::default();
        while reader.has_next_event()? {
            builder.handle_event(reader.next_event()?);
        }
        builder.finish().ok_or(ReaderError::Validation {
            source: ValidationError::Structure {
                position: 0,
                source: StructureError::MissingDocument,
            },
            location: None,
        })
    }

    /// Build a store from events that are checked for structure only.
    ///
    /// References are not validated, so stores with dangling or duplicate
    /// IDs can be built and handed to a writer.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Result<Self, ValidationError> {
        let mut grammar = Grammar::new();
        let mut builder = StoreBuilder::default();
        let mut position = 0;
        for event in events {
            grammar
                .accept(&event)
                .map_err(|source| ValidationError::Structure { position, source })?;
            builder.handle_event(event);
            position += 1;
        }
        grammar
            .finish()
            .map_err(|source| ValidationError::Structure { position, source })?;
        builder.finish().ok_or(ValidationError::Structure {
            position,
            source: StructureError::MissingDocument,
        })
    }

    /// The `DOCUMENT` element.
    pub fn root(&self) -> StoreElement<'_> {
        StoreElement { doc: self, id: self.root }
    }

    /// The element declaring `id`.
    pub fn get(&self, id: &str) -> Option<StoreElement<'_>> {
        self.index.get(id).map(|&id| StoreElement { doc: self, id })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Replay the stored stream. Parts are merged.
    pub fn events(&self) -> Vec<Event> {
        let mut events = Vec::new();
        let result: Result<(), Infallible> = self.replay(self.root, &mut |event| {
            events.push(event);
            Ok(())
        });
        match result {
            Ok(()) => events,
            Err(never) => match never {},
        }
    }

    fn data(&self, id: ElementId) -> &ElementData {
        &self.elements[id.index()]
    }

    fn replay<E>(&self, id: ElementId, out: &mut dyn FnMut(Event) -> Result<(), E>) -> Result<(), E> {
        let data = self.data(id);
        out(data.start.clone())?;
        self.replay_items(id, out)?;
        if let Some(end) = &data.end {
            out(end.clone())?;
        }
        Ok(())
    }

    fn replay_items<E>(&self, id: ElementId, out: &mut dyn FnMut(Event) -> Result<(), E>) -> Result<(), E> {
        for item in &self.data(id).items {
            match item {
                Item::Event(event) => out(event.clone())?,
                Item::Child(child) => self.replay(*child, out)?,
            }
        }
        Ok(())
    }

    fn replay_into(&self, id: ElementId, receiver: &mut dyn EventReceiver) -> Result<(), WriterError> {
        self.replay(id, &mut |event| receiver.add(event))
    }
}

// ============================================================================
// StoreElement (navigation handle)
// ============================================================================

/// A handle for navigating the store. Borrows from the document.
#[derive(Debug, Clone, Copy)]
pub struct StoreElement<'doc> {
    doc: &'doc StoreDocument,
    id: ElementId,
}

impl<'doc> StoreElement<'doc> {
    #[inline]
    pub fn element_id(&self) -> ElementId {
        self.id
    }

    /// The start event. For merged parts, the start event of the first part.
    #[inline]
    pub fn start(&self) -> &'doc Event {
        &self.doc.data(self.id).start
    }

    #[inline]
    pub fn content_type(&self) -> ContentType {
        self.start().content_type()
    }

    /// The declared ID, if the element has one.
    #[inline]
    pub fn id(&self) -> Option<&'doc Id> {
        self.start().id()
    }

    pub fn parent(&self) -> Option<StoreElement<'doc>> {
        let doc = self.doc;
        doc.data(self.id).parent.map(|id| StoreElement { doc, id })
    }

    /// Nested elements in stream order.
    pub fn children(&self) -> impl Iterator<Item = StoreElement<'doc>> + 'doc {
        let doc = self.doc;
        doc.data(self.id).items.iter().filter_map(move |item| match item {
            Item::Child(id) => Some(StoreElement { doc, id: *id }),
            Item::Event(_) => None,
        })
    }

    pub fn children_of_type(&self, content: ContentType) -> impl Iterator<Item = StoreElement<'doc>> + 'doc {
        self.children().filter(move |child| child.content_type() == content)
    }

    /// Sole events directly inside this element.
    pub fn sole_events(&self) -> impl Iterator<Item = &'doc Event> + 'doc {
        self.doc.data(self.id).items.iter().filter_map(|item| match item {
            Item::Event(event) => Some(event),
            Item::Child(_) => None,
        })
    }

    fn object_list(&self, content: ContentType) -> StoreObjectList<'doc> {
        StoreObjectList {
            doc: self.doc,
            elements: self.children_of_type(content).map(|child| child.id).collect(),
        }
    }
}

impl AnnotatedAdapter for StoreElement<'_> {
    /// Comments, unknown commands and metadata subtrees, in stream order.
    fn write_metadata(&self, receiver: &mut dyn EventReceiver) -> Result<(), WriterError> {
        for item in &self.doc.data(self.id).items {
            match item {
                Item::Event(event) => receiver.add(event.clone())?,
                Item::Child(child) => {
                    let content = self.doc.data(*child).start.content_type();
                    if content.is_annotation() {
                        self.doc.replay_into(*child, receiver)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl OtuListAdapter for StoreElement<'_> {
    fn start_event(&self) -> Event {
        self.start().clone()
    }

    fn otus(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::Otu))
    }

    fn otu_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::OtuSet))
    }
}

impl MatrixAdapter for StoreElement<'_> {
    fn start_event(&self) -> Event {
        self.start().clone()
    }

    fn character_definitions(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::CharacterDefinition))
    }

    fn character_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::CharacterSet))
    }

    fn token_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::TokenSetDefinition))
    }

    fn sequences(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::Sequence))
    }
}

impl TreeNetworkGroupAdapter for StoreElement<'_> {
    fn start_event(&self) -> Event {
        self.start().clone()
    }

    fn trees_and_networks(&self) -> Vec<Box<dyn TreeNetworkAdapter + '_>> {
        self.children()
            .filter(|child| matches!(child.content_type(), ContentType::Tree | ContentType::Network))
            .map(|child| Box::new(child) as Box<dyn TreeNetworkAdapter + '_>)
            .collect()
    }

    fn tree_network_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::TreeNetworkSet))
    }
}

impl TreeNetworkAdapter for StoreElement<'_> {
    fn start_event(&self) -> Event {
        self.start().clone()
    }

    fn nodes(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::Node))
    }

    fn edges(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::Edge))
    }

    fn node_edge_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(self.object_list(ContentType::NodeEdgeSet))
    }
}

impl AnnotatedAdapter for StoreDocument {
    fn write_metadata(&self, receiver: &mut dyn EventReceiver) -> Result<(), WriterError> {
        self.root().write_metadata(receiver)
    }
}

impl DocumentAdapter for StoreDocument {
    fn otu_lists(&self) -> Vec<Box<dyn OtuListAdapter + '_>> {
        self.root()
            .children_of_type(ContentType::OtuList)
            .map(|list| Box::new(list) as Box<dyn OtuListAdapter + '_>)
            .collect()
    }

    fn matrices(&self) -> Vec<Box<dyn MatrixAdapter + '_>> {
        self.root()
            .children_of_type(ContentType::Alignment)
            .map(|matrix| Box::new(matrix) as Box<dyn MatrixAdapter + '_>)
            .collect()
    }

    fn tree_network_groups(&self) -> Vec<Box<dyn TreeNetworkGroupAdapter + '_>> {
        self.root()
            .children_of_type(ContentType::TreeNetworkGroup)
            .map(|group| Box::new(group) as Box<dyn TreeNetworkGroupAdapter + '_>)
            .collect()
    }
}

/// Stored elements of one type, written with their complete content.
#[derive(Debug)]
pub struct StoreObjectList<'doc> {
    doc: &'doc StoreDocument,
    elements: Vec<ElementId>,
}

impl StoreObjectList<'_> {
    fn element(&self, id: &Id) -> Result<ElementId, WriterError> {
        self.doc
            .index
            .get(id)
            .copied()
            .filter(|element| self.elements.contains(element))
            .ok_or_else(|| WriterError::InconsistentAdapter(format!("no stored element with the ID \"{id}\"")))
    }
}

impl ObjectListAdapter for StoreObjectList<'_> {
    fn count(&self) -> usize {
        self.elements.len()
    }

    fn ids(&self) -> Vec<Id> {
        self.elements
            .iter()
            .filter_map(|&element| self.doc.data(element).start.id().cloned())
            .collect()
    }

    fn start_event(&self, id: &Id) -> Result<Event, WriterError> {
        Ok(self.doc.data(self.element(id)?).start.clone())
    }

    fn write_content(
        &self,
        _params: &ReadWriteParameters,
        id: &Id,
        receiver: &mut dyn EventReceiver,
    ) -> Result<(), WriterError> {
        let element = self.element(id)?;
        self.doc.replay_items(element, &mut |event| receiver.add(event))
    }
}

// ============================================================================
// StoreBuilder (event consumer)
// ============================================================================

#[derive(Default)]
struct StoreBuilder {
    elements: Vec<ElementData>,
    /// Stack of open element IDs.
    stack: Vec<ElementId>,
    index: HashMap<Id, ElementId>,
    /// Elements whose last part ended without terminating them.
    open_parts: HashSet<ElementId>,
}

impl StoreBuilder {
    fn continued_element(&self, event: &Event) -> Option<ElementId> {
        if !event.content_type().has_parts() {
            return None;
        }
        let element = *self.index.get(event.id()?)?;
        let same_type = self.elements[element.index()].start.content_type() == event.content_type();
        (same_type && self.open_parts.contains(&element)).then_some(element)
    }

    fn handle_event(&mut self, event: Event) {
        match event.topology_type() {
            TopologyType::Start => {
                if let Some(element) = self.continued_element(&event) {
                    self.open_parts.remove(&element);
                    self.stack.push(element);
                    return;
                }
                let parent = self.stack.last().copied();
                let element = ElementId::new(self.elements.len());
                if let Some(id) = event.id() {
                    self.index.insert(id.clone(), element);
                }
                self.elements.push(ElementData {
                    parent,
                    start: event,
                    items: Vec::new(),
                    end: None,
                });
                if let Some(parent) = parent {
                    self.elements[parent.index()].items.push(Item::Child(element));
                }
                self.stack.push(element);
            }
            TopologyType::End => {
                if let Some(element) = self.stack.pop() {
                    let terminated = event.as_end().map_or(true, |end| end.sequence_terminated());
                    if !terminated {
                        self.open_parts.insert(element);
                    }
                    self.elements[element.index()].end = Some(event);
                }
            }
            TopologyType::Sole => {
                if let Some(&current) = self.stack.last() {
                    self.elements[current.index()].items.push(Item::Event(event));
                }
            }
        }
    }

    fn finish(self) -> Option<StoreDocument> {
        if self.elements.is_empty() {
            return None;
        }
        Some(StoreDocument {
            elements: self.elements,
            root: ElementId::new(0),
            index: self.index,
        })
    }
}
