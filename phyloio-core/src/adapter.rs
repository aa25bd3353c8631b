//! Document adapters - the read-only object graph a writer walks.
//!
//! An application exposes its data model through these traits. The writer
//! asks each adapter for start events and lets it push nested content into
//! an [`EventReceiver`]; it emits the matching end events itself.
//!
//! ```text
//! DocumentAdapter
//! ├── OtuListAdapter            otus, otu_sets
//! ├── MatrixAdapter             character_definitions, character_sets, token_sets, sequences
//! └── TreeNetworkGroupAdapter   tree_network_sets
//!     └── TreeNetworkAdapter    nodes, edges, node_edge_sets
//! ```

use crate::error::WriterError;
use crate::event::Event;
use crate::id::Id;
use crate::params::ReadWriteParameters;

/// Target of the events an adapter pushes.
pub trait EventReceiver {
    fn add(&mut self, event: Event) -> Result<(), WriterError>;
}

impl EventReceiver for Vec<Event> {
    fn add(&mut self, event: Event) -> Result<(), WriterError> {
        self.push(event);
        Ok(())
    }
}

/// Elements that may carry metadata and comments.
pub trait AnnotatedAdapter {
    /// Push complete metadata subsequences (`LITERAL_META`, `RESOURCE_META`)
    /// and comments attached to this element.
    fn write_metadata(&self, _receiver: &mut dyn EventReceiver) -> Result<(), WriterError> {
        Ok(())
    }
}

/// A homogeneous list of elements addressed by ID (OTUs, sequences, nodes, ...).
pub trait ObjectListAdapter {
    fn count(&self) -> usize;

    /// IDs in writing order. Must yield exactly [`ObjectListAdapter::count`] IDs.
    fn ids(&self) -> Vec<Id>;

    /// The start event of the element with the given ID.
    fn start_event(&self, id: &Id) -> Result<Event, WriterError>;

    /// Push everything between the start and end event of the element.
    fn write_content(
        &self,
        _params: &ReadWriteParameters,
        _id: &Id,
        _receiver: &mut dyn EventReceiver,
    ) -> Result<(), WriterError> {
        Ok(())
    }
}

/// An object list without elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyObjectList;

impl ObjectListAdapter for EmptyObjectList {
    fn count(&self) -> usize {
        0
    }

    fn ids(&self) -> Vec<Id> {
        Vec::new()
    }

    fn start_event(&self, id: &Id) -> Result<Event, WriterError> {
        Err(WriterError::InconsistentAdapter(format!(
            "no element with the ID \"{id}\" exists in an empty list"
        )))
    }
}

pub trait DocumentAdapter: AnnotatedAdapter {
    fn otu_lists(&self) -> Vec<Box<dyn OtuListAdapter + '_>>;

    fn matrices(&self) -> Vec<Box<dyn MatrixAdapter + '_>>;

    fn tree_network_groups(&self) -> Vec<Box<dyn TreeNetworkGroupAdapter + '_>>;
}

pub trait OtuListAdapter: AnnotatedAdapter {
    fn start_event(&self) -> Event;

    fn otus(&self) -> Box<dyn ObjectListAdapter + '_>;

    fn otu_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(EmptyObjectList)
    }
}

/// An alignment.
pub trait MatrixAdapter: AnnotatedAdapter {
    fn start_event(&self) -> Event;

    fn character_definitions(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(EmptyObjectList)
    }

    fn character_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(EmptyObjectList)
    }

    fn token_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(EmptyObjectList)
    }

    fn sequences(&self) -> Box<dyn ObjectListAdapter + '_>;
}

pub trait TreeNetworkGroupAdapter: AnnotatedAdapter {
    fn start_event(&self) -> Event;

    fn trees_and_networks(&self) -> Vec<Box<dyn TreeNetworkAdapter + '_>>;

    fn tree_network_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(EmptyObjectList)
    }
}

pub trait TreeNetworkAdapter: AnnotatedAdapter {
    /// A `TREE` or `NETWORK` start event.
    fn start_event(&self) -> Event;

    fn nodes(&self) -> Box<dyn ObjectListAdapter + '_>;

    fn edges(&self) -> Box<dyn ObjectListAdapter + '_>;

    fn node_edge_sets(&self) -> Box<dyn ObjectListAdapter + '_> {
        Box::new(EmptyObjectList)
    }
}
