//! Event stream grammar.
//!
//! A pushdown automaton over event types. Start events push, end events pop
//! and must match the top of the stack, sole events only check that they
//! are a permitted child of the element currently open.
//!
//! ```text
//! DOCUMENT            OTU_LIST, ALIGNMENT, TREE_NETWORK_GROUP, UNKNOWN_COMMAND
//! OTU_LIST            OTU, OTU_SET, UNKNOWN_COMMAND
//! ALIGNMENT           CHARACTER_DEFINITION, CHARACTER_SET, TOKEN_SET_DEFINITION, SEQUENCE, UNKNOWN_COMMAND
//! CHARACTER_SET       CHARACTER_SET_INTERVAL, SET_ELEMENT
//! TOKEN_SET_DEFINITION  SINGLE_TOKEN_DEFINITION, CHARACTER_SET_INTERVAL
//! SEQUENCE            SEQUENCE_TOKENS, SINGLE_SEQUENCE_TOKEN
//! TREE_NETWORK_GROUP  TREE, NETWORK, TREE_NETWORK_SET, UNKNOWN_COMMAND
//! TREE, NETWORK       NODE, EDGE, NODE_EDGE_SET
//! *_SET               SET_ELEMENT
//! LITERAL_META        LITERAL_META_CONTENT, COMMENT
//! RESOURCE_META       LITERAL_META, RESOURCE_META, COMMENT
//! ```
//!
//! Every element except the two metadata types also accepts
//! `LITERAL_META`, `RESOURCE_META` and `COMMENT`.

use crate::error::StructureError;
use crate::event::Event;
use crate::kind::{ContentType, TopologyType};

use ContentType::*;

const ANNOTATIONS: &[ContentType] = &[LiteralMeta, ResourceMeta, Comment];

/// Content types that may appear directly inside `parent`, not counting annotations.
pub fn structural_children(parent: ContentType) -> &'static [ContentType] {
    match parent {
        Document => &[OtuList, Alignment, TreeNetworkGroup, UnknownCommand],
        OtuList => &[Otu, OtuSet, UnknownCommand],
        Alignment => &[CharacterDefinition, CharacterSet, TokenSetDefinition, Sequence, UnknownCommand],
        CharacterSet => &[CharacterSetInterval, SetElement],
        TokenSetDefinition => &[SingleTokenDefinition, CharacterSetInterval],
        Sequence => &[SequenceTokens, SingleSequenceToken],
        TreeNetworkGroup => &[Tree, Network, TreeNetworkSet, UnknownCommand],
        Tree | Network => &[Node, Edge, NodeEdgeSet],
        OtuSet | NodeEdgeSet | TreeNetworkSet => &[SetElement],
        LiteralMeta => &[LiteralMetaContent],
        ResourceMeta => &[LiteralMeta, ResourceMeta],
        Otu | CharacterDefinition | SingleTokenDefinition | SingleSequenceToken | Node | Edge => &[],
        LiteralMetaContent | Comment | UnknownCommand | SequenceTokens | CharacterSetInterval
        | SetElement => &[],
    }
}

/// Tests whether `child` may appear directly inside `parent`.
///
/// `None` stands for the stream root, which only admits a document.
pub fn is_allowed_child(parent: Option<ContentType>, child: ContentType) -> bool {
    match parent {
        None => child == Document,
        Some(LiteralMeta) => matches!(child, LiteralMetaContent | Comment),
        Some(parent) if parent.is_sole() => false,
        Some(parent) => ANNOTATIONS.contains(&child) || structural_children(parent).contains(&child),
    }
}

// ============================================================================
// Parent information
// ============================================================================

/// The start events of all currently open elements, outermost first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentInformation {
    stack: Vec<Event>,
}

impl ParentInformation {
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The innermost open start event.
    #[inline]
    pub fn direct_parent(&self) -> Option<&Event> {
        self.stack.last()
    }

    #[inline]
    pub fn direct_parent_content_type(&self) -> Option<ContentType> {
        self.direct_parent().map(Event::content_type)
    }

    /// The open start event `level` steps out from the innermost (0 = direct parent).
    pub fn parent(&self, level: usize) -> Option<&Event> {
        self.stack.iter().rev().nth(level)
    }

    /// The innermost open start event of the given type.
    pub fn nearest(&self, content: ContentType) -> Option<&Event> {
        self.stack.iter().rev().find(|e| e.content_type() == content)
    }

    #[inline]
    pub fn contains(&self, content: ContentType) -> bool {
        self.nearest(content).is_some()
    }

    /// Innermost first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.stack.iter().rev()
    }

    pub(crate) fn push(&mut self, event: Event) {
        self.stack.push(event);
    }

    pub(crate) fn pop(&mut self) -> Option<Event> {
        self.stack.pop()
    }
}

// ============================================================================
// Grammar
// ============================================================================

/// Pushdown state of one stream.
///
/// [`Grammar::check`] inspects an event without changing state,
/// [`Grammar::apply`] performs the transition. [`Grammar::accept`] does both.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    parents: ParentInformation,
    started: bool,
    finished: bool,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn parent_information(&self) -> &ParentInformation {
        &self.parents
    }

    /// Whether the document end was seen.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn check(&self, event: &Event) -> Result<(), StructureError> {
        let event_type = event.event_type();
        if self.finished {
            return Err(StructureError::AfterDocumentEnd { found: event_type });
        }

        let parent = self.parents.direct_parent_content_type();
        match event_type.topology_type() {
            TopologyType::End => {
                let found = event_type.content_type();
                match parent {
                    None => Err(StructureError::UnmatchedEnd { found }),
                    Some(open) if open != found => Err(StructureError::MismatchedEnd { found, open }),
                    Some(_) => Ok(()),
                }
            }
            TopologyType::Start | TopologyType::Sole => match parent {
                None if !is_allowed_child(None, event_type.content_type()) => {
                    Err(StructureError::UnexpectedRoot { found: event_type })
                }
                Some(parent) if !is_allowed_child(Some(parent), event_type.content_type()) => {
                    Err(StructureError::UnexpectedChild {
                        child: event_type,
                        parent,
                    })
                }
                _ => Ok(()),
            },
        }
    }

    /// Transition on an event that passed [`Grammar::check`].
    pub fn apply(&mut self, event: &Event) {
        match event.topology_type() {
            TopologyType::Start => {
                self.started = true;
                self.parents.push(event.clone());
            }
            TopologyType::End => {
                self.parents.pop();
                if self.parents.is_empty() {
                    self.finished = true;
                }
            }
            TopologyType::Sole => {}
        }
    }

    pub fn accept(&mut self, event: &Event) -> Result<(), StructureError> {
        self.check(event)?;
        self.apply(event);
        Ok(())
    }

    /// Check the state at the end of the stream.
    pub fn finish(&self) -> Result<(), StructureError> {
        if !self.started {
            return Err(StructureError::MissingDocument);
        }
        match self.parents.direct_parent_content_type() {
            Some(innermost) => Err(StructureError::Unclosed {
                open: self.parents.depth(),
                innermost,
            }),
            None => Ok(()),
        }
    }
}
