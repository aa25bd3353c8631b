//! Events - the unit of exchange between format plugins and consumers.
//!
//! This is a SAX-style event model: structure is represented by start/end
//! event pairs, self-contained data by sole events. Events never own other
//! events; elements reference each other by [`Id`] only.
//!
//! A minimal alignment emits:
//! ```text
//! AlignmentStart { id: "m1", linked_id: "otus" }
//! CharacterDefinitionStart { id: "c0", index: 0 }
//! End(CHARACTER_DEFINITION)
//! SequenceStart { id: "s1", linked_id: "t1" }
//! SequenceTokens ["A", "C", "G"]
//! End(SEQUENCE, terminated)
//! End(ALIGNMENT)
//! ```
//!
//! Interleaved formats emit one logical sequence in several parts:
//! ```text
//! SequenceStart { id: "s1" }  SequenceTokens [..]  PartEnd(SEQUENCE, terminated: false)
//! SequenceStart { id: "s2" }  SequenceTokens [..]  PartEnd(SEQUENCE, terminated: false)
//! SequenceStart { id: "s1" }  SequenceTokens [..]  PartEnd(SEQUENCE, terminated: true)
//! ```
//!
//! All payload structs validate their fields on construction and expose
//! read-only accessors. The typed `as_*` views on [`Event`] return a
//! [`CastError`] when the event is of another kind.

use std::ops::Range;

use crate::error::{CastError, EventError};
use crate::id::Id;
use crate::kind::{
    CharacterSymbolMeaning, CharacterSymbolType, ContentType, EventType, LiteralContentSequenceType,
    TokenSetType, TopologyType,
};
use crate::value::{Extensions, MetaValue};

fn owned_label(label: Option<&str>) -> Option<String> {
    label.map(str::to_owned)
}

// ============================================================================
// Payload structs
// ============================================================================

/// ID and optional label, the head of every ID-declaring start event.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledId {
    id: Id,
    label: Option<String>,
}

impl LabeledId {
    pub fn new(id: &str, label: Option<&str>) -> Result<Self, EventError> {
        Ok(Self {
            id: Id::for_field("ID", id)?,
            label: owned_label(label),
        })
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// A [`LabeledId`] with an optional link to another element.
///
/// Alignments and tree/network groups link an OTU list, sequences link a
/// single OTU.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedId {
    head: LabeledId,
    linked_id: Option<Id>,
}

impl LinkedId {
    pub fn new(id: &str, label: Option<&str>, linked_id: Option<&str>) -> Result<Self, EventError> {
        Ok(Self {
            head: LabeledId::new(id, label)?,
            linked_id: Id::for_optional_field("linked ID", linked_id)?,
        })
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.head.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.head.label()
    }

    #[inline]
    pub fn linked_id(&self) -> Option<&Id> {
        self.linked_id.as_ref()
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked_id.is_some()
    }
}

/// An alignment column.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterDefinition {
    head: LabeledId,
    index: u64,
}

impl CharacterDefinition {
    pub fn new(id: &str, label: Option<&str>, index: u64) -> Result<Self, EventError> {
        Ok(Self {
            head: LabeledId::new(id, label)?,
            index,
        })
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.head.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.head.label()
    }

    /// Zero-based column index.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }
}

/// The alphabet for a range of alignment columns.
///
/// The validity range is the union of the linked character set and any
/// nested [`CharacterSetInterval`] events. Without either, the token set
/// applies to the whole alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSetDefinition {
    head: LabeledId,
    set_type: TokenSetType,
    character_set_id: Option<Id>,
}

impl TokenSetDefinition {
    pub fn new(
        id: &str,
        label: Option<&str>,
        set_type: TokenSetType,
        character_set_id: Option<&str>,
    ) -> Result<Self, EventError> {
        Ok(Self {
            head: LabeledId::new(id, label)?,
            set_type,
            character_set_id: Id::for_optional_field("character set ID", character_set_id)?,
        })
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.head.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.head.label()
    }

    #[inline]
    pub fn set_type(&self) -> TokenSetType {
        self.set_type
    }

    #[inline]
    pub fn character_set_id(&self) -> Option<&Id> {
        self.character_set_id.as_ref()
    }
}

/// One symbol of a token set.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleTokenDefinition {
    head: LabeledId,
    token_name: String,
    meaning: CharacterSymbolMeaning,
    symbol_type: CharacterSymbolType,
    constituents: Vec<String>,
}

impl SingleTokenDefinition {
    /// An atomic token without constituents.
    pub fn atomic(
        id: &str,
        label: Option<&str>,
        token_name: &str,
        meaning: CharacterSymbolMeaning,
    ) -> Result<Self, EventError> {
        Self::new(id, label, token_name, meaning, CharacterSymbolType::Atomic, Vec::new())
    }

    /// `constituents` name the IDs or token names of earlier definitions in
    /// the same token set. Only uncertain and polymorphic tokens may list them.
    pub fn new(
        id: &str,
        label: Option<&str>,
        token_name: &str,
        meaning: CharacterSymbolMeaning,
        symbol_type: CharacterSymbolType,
        constituents: Vec<String>,
    ) -> Result<Self, EventError> {
        if token_name.is_empty() {
            return Err(EventError::MissingField {
                content: ContentType::SingleTokenDefinition,
                field: "token name",
            });
        }
        if symbol_type == CharacterSymbolType::Atomic && !constituents.is_empty() {
            return Err(EventError::AtomicConstituents {
                token: token_name.to_owned(),
            });
        }
        Ok(Self {
            head: LabeledId::new(id, label)?,
            token_name: token_name.to_owned(),
            meaning,
            symbol_type,
            constituents,
        })
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.head.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.head.label()
    }

    #[inline]
    pub fn token_name(&self) -> &str {
        &self.token_name
    }

    #[inline]
    pub fn meaning(&self) -> CharacterSymbolMeaning {
        self.meaning
    }

    #[inline]
    pub fn symbol_type(&self) -> CharacterSymbolType {
        self.symbol_type
    }

    #[inline]
    pub fn constituents(&self) -> &[String] {
        &self.constituents
    }
}

/// A single sequence token that may carry nested metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleSequenceToken {
    label: Option<String>,
    token: String,
    column_id: Option<Id>,
}

impl SingleSequenceToken {
    pub fn new(label: Option<&str>, token: &str, column_id: Option<&str>) -> Result<Self, EventError> {
        if token.is_empty() {
            return Err(EventError::MissingField {
                content: ContentType::SingleSequenceToken,
                field: "token",
            });
        }
        Ok(Self {
            label: owned_label(label),
            token: token.to_owned(),
            column_id: Id::for_optional_field("column ID", column_id)?,
        })
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The [`CharacterDefinition`] this token belongs to, if the format names columns.
    #[inline]
    pub fn column_id(&self) -> Option<&Id> {
        self.column_id.as_ref()
    }
}

/// A tree or network node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    head: LabeledId,
    otu_id: Option<Id>,
    root: bool,
}

impl Node {
    pub fn new(id: &str, label: Option<&str>, otu_id: Option<&str>, root: bool) -> Result<Self, EventError> {
        Ok(Self {
            head: LabeledId::new(id, label)?,
            otu_id: Id::for_optional_field("OTU ID", otu_id)?,
            root,
        })
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.head.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.head.label()
    }

    #[inline]
    pub fn otu_id(&self) -> Option<&Id> {
        self.otu_id.as_ref()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.root
    }
}

/// A directed edge. A missing source marks the root edge.
#[derive(Debug, Clone)]
pub struct Edge {
    head: LabeledId,
    source_id: Option<Id>,
    target_id: Id,
    length: f64,
}

impl Edge {
    /// Pass `f64::NAN` as `length` if the edge has none.
    pub fn new(
        id: &str,
        label: Option<&str>,
        source_id: Option<&str>,
        target_id: &str,
        length: f64,
    ) -> Result<Self, EventError> {
        Ok(Self {
            head: LabeledId::new(id, label)?,
            source_id: Id::for_optional_field("source node ID", source_id)?,
            target_id: Id::for_field("target node ID", target_id)?,
            length,
        })
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.head.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.head.label()
    }

    #[inline]
    pub fn source_id(&self) -> Option<&Id> {
        self.source_id.as_ref()
    }

    #[inline]
    pub fn target_id(&self) -> &Id {
        &self.target_id
    }

    /// NaN if no length is defined.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.source_id.is_none()
    }

    #[inline]
    pub fn has_length(&self) -> bool {
        !self.length.is_nan()
    }
}

/// Two edges without length are equal in that respect.
impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        let same_length = self.length == other.length || (!self.has_length() && !other.has_length());
        self.head == other.head
            && self.source_id == other.source_id
            && self.target_id == other.target_id
            && same_length
    }
}

/// A metadata predicate or relation: a URI, a plain string key, or both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    uri: Option<String>,
    key: Option<String>,
}

impl Predicate {
    pub fn uri(uri: &str) -> Self {
        Self {
            uri: Some(uri.to_owned()),
            key: None,
        }
    }

    pub fn key(key: &str) -> Self {
        Self {
            uri: None,
            key: Some(key.to_owned()),
        }
    }

    pub fn new(uri: Option<&str>, key: Option<&str>) -> Result<Self, EventError> {
        if uri.is_none() && key.is_none() {
            return Err(EventError::MissingField {
                content: ContentType::LiteralMeta,
                field: "predicate",
            });
        }
        Ok(Self {
            uri: uri.map(str::to_owned),
            key: key.map(str::to_owned),
        })
    }

    #[inline]
    pub fn as_uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    #[inline]
    pub fn as_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The URI if present, otherwise the string key.
    pub fn as_str(&self) -> &str {
        self.uri.as_deref().or(self.key.as_deref()).unwrap_or_default()
    }
}

/// Start of a literal metadata element.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMeta {
    head: LabeledId,
    predicate: Predicate,
    sequence_type: LiteralContentSequenceType,
}

impl LiteralMeta {
    pub fn new(
        id: &str,
        label: Option<&str>,
        predicate: Predicate,
        sequence_type: LiteralContentSequenceType,
    ) -> Result<Self, EventError> {
        Ok(Self {
            head: LabeledId::new(id, label)?,
            predicate,
            sequence_type,
        })
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.head.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.head.label()
    }

    #[inline]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[inline]
    pub fn sequence_type(&self) -> LiteralContentSequenceType {
        self.sequence_type
    }
}

/// Start of a resource metadata element.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMeta {
    head: LabeledId,
    rel: Predicate,
    href: Option<String>,
    about: Option<String>,
}

impl ResourceMeta {
    pub fn new(
        id: &str,
        label: Option<&str>,
        rel: Predicate,
        href: Option<&str>,
        about: Option<&str>,
    ) -> Result<Self, EventError> {
        Ok(Self {
            head: LabeledId::new(id, label)?,
            rel,
            href: href.map(str::to_owned),
            about: about.map(str::to_owned),
        })
    }

    #[inline]
    pub fn id(&self) -> &Id {
        &self.head.id
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.head.label()
    }

    #[inline]
    pub fn rel(&self) -> &Predicate {
        &self.rel
    }

    #[inline]
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    #[inline]
    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }
}

/// Closes an element, or one part of an element emitted in several parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct End {
    content: ContentType,
    part: Option<bool>,
}

impl End {
    pub fn new(content: ContentType) -> Result<Self, EventError> {
        if content.is_sole() {
            return Err(EventError::InvalidCombination {
                content,
                topology: TopologyType::End,
            });
        }
        Ok(Self { content, part: None })
    }

    /// A part end. Only [`ContentType::Sequence`] and [`ContentType::CharacterSet`] have parts.
    ///
    /// If `terminated` is false, a later start event with the same ID
    /// continues the element.
    pub fn part(content: ContentType, terminated: bool) -> Result<Self, EventError> {
        if !content.has_parts() {
            return Err(EventError::PartsNotSupported { content });
        }
        Ok(Self {
            content,
            part: Some(terminated),
        })
    }

    #[inline]
    pub fn content_type(&self) -> ContentType {
        self.content
    }

    #[inline]
    pub fn is_part_end(&self) -> bool {
        self.part.is_some()
    }

    /// Plain end events always terminate their element.
    #[inline]
    pub fn sequence_terminated(&self) -> bool {
        self.part.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    content: String,
    continued: bool,
}

impl Comment {
    /// `continued` marks a comment that goes on in the next comment event.
    pub fn new(content: &str, continued: bool) -> Self {
        Self {
            content: content.to_owned(),
            continued,
        }
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    pub fn is_continued(&self) -> bool {
        self.continued
    }

    /// Split `content` into comments of at most `max_len` bytes, breaking only
    /// at character boundaries. All but the last piece are continued.
    pub fn split(content: &str, max_len: usize) -> Vec<Comment> {
        let max_len = max_len.max(4);
        let mut pieces = Vec::with_capacity(content.len() / max_len + 1);
        let mut rest = content;
        while rest.len() > max_len {
            let mut cut = max_len;
            while !rest.is_char_boundary(cut) {
                cut -= 1;
            }
            let (piece, tail) = rest.split_at(cut);
            pieces.push(Comment::new(piece, true));
            rest = tail;
        }
        pieces.push(Comment::new(rest, false));
        pieces
    }
}

/// A command the format plugin does not understand, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand {
    name: String,
    content: String,
    continued: bool,
}

impl UnknownCommand {
    pub fn new(name: &str, content: &str, continued: bool) -> Result<Self, EventError> {
        if name.is_empty() {
            return Err(EventError::MissingField {
                content: ContentType::UnknownCommand,
                field: "command name",
            });
        }
        Ok(Self {
            name: name.to_owned(),
            content: content.to_owned(),
            continued,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    pub fn is_continued(&self) -> bool {
        self.continued
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceTokens {
    tokens: Vec<String>,
}

impl SequenceTokens {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    #[inline]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A half-open column interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacterSetInterval {
    start: u64,
    end: u64,
}

impl CharacterSetInterval {
    pub fn new(start: u64, end: u64) -> Result<Self, EventError> {
        if start > end {
            return Err(EventError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// First column after the interval.
    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn contains(&self, column: u64) -> bool {
        self.start <= column && column < self.end
    }

    #[inline]
    pub fn columns(&self) -> Range<u64> {
        self.start..self.end
    }
}

/// A member of an enclosing set, referenced by ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetElement {
    linked_id: Id,
    linked_type: ContentType,
}

impl SetElement {
    pub fn new(linked_id: &str, linked_type: ContentType) -> Result<Self, EventError> {
        Ok(Self {
            linked_id: Id::for_field("set element ID", linked_id)?,
            linked_type,
        })
    }

    #[inline]
    pub fn linked_id(&self) -> &Id {
        &self.linked_id
    }

    #[inline]
    pub fn linked_type(&self) -> ContentType {
        self.linked_type
    }
}

/// A value of an enclosing literal metadata element.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMetaContent {
    string_value: Option<String>,
    object_value: Option<MetaValue>,
    original_type: Option<String>,
    continued: bool,
}

impl LiteralMetaContent {
    pub fn new(
        string_value: Option<&str>,
        object_value: Option<MetaValue>,
        original_type: Option<&str>,
        continued: bool,
    ) -> Result<Self, EventError> {
        if string_value.is_none() && object_value.is_none() {
            return Err(EventError::MissingField {
                content: ContentType::LiteralMetaContent,
                field: "value",
            });
        }
        Ok(Self {
            string_value: string_value.map(str::to_owned),
            object_value,
            original_type: original_type.map(str::to_owned),
            continued,
        })
    }

    /// Keep the text and derive the typed value from it.
    ///
    /// An `original_type` hint takes precedence over syntactic typing; text
    /// that does not conform to the hinted type keeps no typed value.
    pub fn from_text(text: &str, original_type: Option<&str>) -> Self {
        let object_value = match original_type {
            Some(original_type) => MetaValue::parse_typed(text, original_type),
            None => Some(MetaValue::parse(text)),
        };
        Self {
            string_value: Some(text.to_owned()),
            object_value,
            original_type: original_type.map(str::to_owned),
            continued: false,
        }
    }

    #[inline]
    pub fn string_value(&self) -> Option<&str> {
        self.string_value.as_deref()
    }

    #[inline]
    pub fn object_value(&self) -> Option<&MetaValue> {
        self.object_value.as_ref()
    }

    #[inline]
    pub fn original_type(&self) -> Option<&str> {
        self.original_type.as_deref()
    }

    #[inline]
    pub fn is_continued(&self) -> bool {
        self.continued
    }
}

// ============================================================================
// Payload
// ============================================================================

/// The variant part of an [`Event`]; one variant per legal event type.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    // ========== Start Events ==========
    DocumentStart,
    OtuListStart(LabeledId),
    OtuStart(LabeledId),
    OtuSetStart(LabeledId),
    /// Links the OTU list the sequences refer to.
    AlignmentStart(LinkedId),
    CharacterDefinitionStart(CharacterDefinition),
    CharacterSetStart(LabeledId),
    TokenSetDefinitionStart(TokenSetDefinition),
    SingleTokenDefinitionStart(SingleTokenDefinition),
    /// Links the OTU of the sequence.
    SequenceStart(LinkedId),
    SingleSequenceTokenStart(SingleSequenceToken),
    /// Links the OTU list the nodes refer to.
    TreeNetworkGroupStart(LinkedId),
    TreeStart(LabeledId),
    NetworkStart(LabeledId),
    NodeStart(Node),
    EdgeStart(Edge),
    NodeEdgeSetStart(LabeledId),
    TreeNetworkSetStart(LabeledId),
    LiteralMetaStart(LiteralMeta),
    ResourceMetaStart(ResourceMeta),

    // ========== End Events ==========
    End(End),

    // ========== Sole Events ==========
    Comment(Comment),
    UnknownCommand(UnknownCommand),
    SequenceTokens(SequenceTokens),
    CharacterSetInterval(CharacterSetInterval),
    SetElement(SetElement),
    LiteralMetaContent(LiteralMetaContent),
}

impl Payload {
    pub fn content_type(&self) -> ContentType {
        match self {
            Payload::DocumentStart => ContentType::Document,
            Payload::OtuListStart(_) => ContentType::OtuList,
            Payload::OtuStart(_) => ContentType::Otu,
            Payload::OtuSetStart(_) => ContentType::OtuSet,
            Payload::AlignmentStart(_) => ContentType::Alignment,
            Payload::CharacterDefinitionStart(_) => ContentType::CharacterDefinition,
            Payload::CharacterSetStart(_) => ContentType::CharacterSet,
            Payload::TokenSetDefinitionStart(_) => ContentType::TokenSetDefinition,
            Payload::SingleTokenDefinitionStart(_) => ContentType::SingleTokenDefinition,
            Payload::SequenceStart(_) => ContentType::Sequence,
            Payload::SingleSequenceTokenStart(_) => ContentType::SingleSequenceToken,
            Payload::TreeNetworkGroupStart(_) => ContentType::TreeNetworkGroup,
            Payload::TreeStart(_) => ContentType::Tree,
            Payload::NetworkStart(_) => ContentType::Network,
            Payload::NodeStart(_) => ContentType::Node,
            Payload::EdgeStart(_) => ContentType::Edge,
            Payload::NodeEdgeSetStart(_) => ContentType::NodeEdgeSet,
            Payload::TreeNetworkSetStart(_) => ContentType::TreeNetworkSet,
            Payload::LiteralMetaStart(_) => ContentType::LiteralMeta,
            Payload::ResourceMetaStart(_) => ContentType::ResourceMeta,
            Payload::End(end) => end.content,
            Payload::Comment(_) => ContentType::Comment,
            Payload::UnknownCommand(_) => ContentType::UnknownCommand,
            Payload::SequenceTokens(_) => ContentType::SequenceTokens,
            Payload::CharacterSetInterval(_) => ContentType::CharacterSetInterval,
            Payload::SetElement(_) => ContentType::SetElement,
            Payload::LiteralMetaContent(_) => ContentType::LiteralMetaContent,
        }
    }

    pub fn topology_type(&self) -> TopologyType {
        match self {
            Payload::End(_) => TopologyType::End,
            Payload::Comment(_)
            | Payload::UnknownCommand(_)
            | Payload::SequenceTokens(_)
            | Payload::CharacterSetInterval(_)
            | Payload::SetElement(_)
            | Payload::LiteralMetaContent(_) => TopologyType::Sole,
            _ => TopologyType::Start,
        }
    }

    /// Every variant is a legal combination by construction.
    #[inline]
    pub fn event_type(&self) -> EventType {
        EventType::new_unchecked(self.content_type(), self.topology_type())
    }

    /// The ID and label of an ID-declaring start event.
    fn head(&self) -> Option<&LabeledId> {
        match self {
            Payload::OtuListStart(e)
            | Payload::OtuStart(e)
            | Payload::OtuSetStart(e)
            | Payload::CharacterSetStart(e)
            | Payload::TreeStart(e)
            | Payload::NetworkStart(e)
            | Payload::NodeEdgeSetStart(e)
            | Payload::TreeNetworkSetStart(e) => Some(e),
            Payload::AlignmentStart(e) | Payload::SequenceStart(e) | Payload::TreeNetworkGroupStart(e) => {
                Some(&e.head)
            }
            Payload::CharacterDefinitionStart(e) => Some(&e.head),
            Payload::TokenSetDefinitionStart(e) => Some(&e.head),
            Payload::SingleTokenDefinitionStart(e) => Some(&e.head),
            Payload::NodeStart(e) => Some(&e.head),
            Payload::EdgeStart(e) => Some(&e.head),
            Payload::LiteralMetaStart(e) => Some(&e.head),
            Payload::ResourceMetaStart(e) => Some(&e.head),
            _ => None,
        }
    }

    fn head_mut(&mut self) -> Option<&mut LabeledId> {
        match self {
            Payload::OtuListStart(e)
            | Payload::OtuStart(e)
            | Payload::OtuSetStart(e)
            | Payload::CharacterSetStart(e)
            | Payload::TreeStart(e)
            | Payload::NetworkStart(e)
            | Payload::NodeEdgeSetStart(e)
            | Payload::TreeNetworkSetStart(e) => Some(e),
            Payload::AlignmentStart(e) | Payload::SequenceStart(e) | Payload::TreeNetworkGroupStart(e) => {
                Some(&mut e.head)
            }
            Payload::CharacterDefinitionStart(e) => Some(&mut e.head),
            Payload::TokenSetDefinitionStart(e) => Some(&mut e.head),
            Payload::SingleTokenDefinitionStart(e) => Some(&mut e.head),
            Payload::NodeStart(e) => Some(&mut e.head),
            Payload::EdgeStart(e) => Some(&mut e.head),
            Payload::LiteralMetaStart(e) => Some(&mut e.head),
            Payload::ResourceMetaStart(e) => Some(&mut e.head),
            _ => None,
        }
    }

    /// Mutable access to every ID this payload references (not declares).
    fn references_mut(&mut self) -> Vec<&mut Id> {
        match self {
            Payload::AlignmentStart(e) | Payload::SequenceStart(e) | Payload::TreeNetworkGroupStart(e) => {
                e.linked_id.iter_mut().collect()
            }
            Payload::TokenSetDefinitionStart(e) => e.character_set_id.iter_mut().collect(),
            Payload::SingleSequenceTokenStart(e) => e.column_id.iter_mut().collect(),
            Payload::NodeStart(e) => e.otu_id.iter_mut().collect(),
            Payload::EdgeStart(e) => e
                .source_id
                .iter_mut()
                .chain(std::iter::once(&mut e.target_id))
                .collect(),
            Payload::SetElement(e) => vec![&mut e.linked_id],
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Event
// ============================================================================

/// How an ID passed to [`Event::try_map_ids`] is used by its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRole {
    Declared,
    Reference,
    /// A constituent of a token definition that has the form of an ID. It
    /// may as well be the token name of an earlier definition.
    Constituent,
}

/// An immutable event: a typed payload plus the extension side-channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    payload: Payload,
    extensions: Extensions,
}

impl From<Payload> for Event {
    fn from(payload: Payload) -> Self {
        Event::new(payload)
    }
}

macro_rules! cast {
    ($(#[$meta:meta])* $name:ident -> $ty:ty, $expected:literal, $($variant:ident)|+) => {
        $(#[$meta])*
        pub fn $name(&self) -> Result<&$ty, CastError> {
            match &self.payload {
                $(Payload::$variant(e))|+ => Ok(e),
                _ => Err(self.cast_error($expected)),
            }
        }
    };
}

impl Event {
    #[inline]
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            extensions: Extensions::new(),
        }
    }

    #[inline]
    pub fn with_extensions(payload: Payload, extensions: Extensions) -> Self {
        Self { payload, extensions }
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn into_payload(self) -> Payload {
        self.payload
    }

    #[inline]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    #[inline]
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    #[inline]
    pub fn content_type(&self) -> ContentType {
        self.payload.content_type()
    }

    #[inline]
    pub fn topology_type(&self) -> TopologyType {
        self.payload.topology_type()
    }

    #[inline]
    pub fn is_start(&self) -> bool {
        self.topology_type() == TopologyType::Start
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        matches!(self.payload, Payload::End(_))
    }

    #[inline]
    pub fn is_sole(&self) -> bool {
        self.topology_type() == TopologyType::Sole
    }

    #[inline]
    pub fn is(&self, content: ContentType, topology: TopologyType) -> bool {
        self.event_type().is(content, topology)
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self.payload, Payload::Comment(_))
    }

    /// The ID declared by a start event.
    #[inline]
    pub fn id(&self) -> Option<&Id> {
        self.payload.head().map(LabeledId::id)
    }

    pub fn label(&self) -> Option<&str> {
        match &self.payload {
            Payload::SingleSequenceTokenStart(e) => e.label(),
            payload => payload.head().and_then(LabeledId::label),
        }
    }

    /// The OTU or OTU list linked by alignments, sequences, groups and nodes.
    pub fn linked_otu_id(&self) -> Option<&Id> {
        match &self.payload {
            Payload::AlignmentStart(e) | Payload::SequenceStart(e) | Payload::TreeNetworkGroupStart(e) => {
                e.linked_id()
            }
            Payload::NodeStart(e) => e.otu_id(),
            _ => None,
        }
    }

    fn cast_error(&self, expected: &'static str) -> CastError {
        CastError {
            expected,
            found: self.event_type(),
        }
    }

    /// View of any ID-declaring start event.
    pub fn as_labeled_id(&self) -> Result<&LabeledId, CastError> {
        self.payload.head().ok_or_else(|| self.cast_error("a labeled ID event"))
    }

    cast!(as_linked_id -> LinkedId, "a linked ID event", AlignmentStart | SequenceStart | TreeNetworkGroupStart);
    cast!(as_character_definition -> CharacterDefinition, "a character definition event", CharacterDefinitionStart);
    cast!(as_token_set_definition -> TokenSetDefinition, "a token set definition event", TokenSetDefinitionStart);
    cast!(as_single_token_definition -> SingleTokenDefinition, "a single token definition event", SingleTokenDefinitionStart);
    cast!(as_single_sequence_token -> SingleSequenceToken, "a single sequence token event", SingleSequenceTokenStart);
    cast!(as_node -> Node, "a node event", NodeStart);
    cast!(as_edge -> Edge, "an edge event", EdgeStart);
    cast!(as_literal_meta -> LiteralMeta, "a literal metadata event", LiteralMetaStart);
    cast!(as_resource_meta -> ResourceMeta, "a resource metadata event", ResourceMetaStart);
    cast!(as_end -> End, "an end event", End);
    cast!(as_comment -> Comment, "a comment event", Comment);
    cast!(as_unknown_command -> UnknownCommand, "an unknown command event", UnknownCommand);
    cast!(as_sequence_tokens -> SequenceTokens, "a sequence tokens event", SequenceTokens);
    cast!(as_character_set_interval -> CharacterSetInterval, "a character set interval event", CharacterSetInterval);
    cast!(as_set_element -> SetElement, "a set element event", SetElement);
    cast!(as_literal_meta_content -> LiteralMetaContent, "a literal metadata content event", LiteralMetaContent);

    /// Rebuild the event with every declared and referenced ID passed through `f`.
    ///
    /// The declared ID is mapped before any reference. Constituents that
    /// are not valid IDs are token names and stay as they are.
    pub fn try_map_ids<E>(mut self, mut f: impl FnMut(IdRole, &Id) -> Result<Id, E>) -> Result<Event, E> {
        if let Some(head) = self.payload.head_mut() {
            head.id = f(IdRole::Declared, &head.id)?;
        }
        for id in self.payload.references_mut() {
            *id = f(IdRole::Reference, id)?;
        }
        if let Payload::SingleTokenDefinitionStart(definition) = &mut self.payload {
            for constituent in &mut definition.constituents {
                if let Ok(id) = Id::new(constituent.as_str()) {
                    *constituent = f(IdRole::Constituent, &id)?.into_string();
                }
            }
        }
        Ok(self)
    }

    // ========== Constructors ==========

    pub fn document_start() -> Self {
        Event::new(Payload::DocumentStart)
    }

    pub fn document_end() -> Self {
        Event::new(Payload::End(End {
            content: ContentType::Document,
            part: None,
        }))
    }

    /// A plain end event for any non-sole content type.
    pub fn end(content: ContentType) -> Result<Self, EventError> {
        Ok(Event::new(Payload::End(End::new(content)?)))
    }

    pub fn part_end(content: ContentType, terminated: bool) -> Result<Self, EventError> {
        Ok(Event::new(Payload::End(End::part(content, terminated)?)))
    }

    pub fn otu_list_start(id: &str, label: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::OtuListStart(LabeledId::new(id, label)?)))
    }

    pub fn otu_start(id: &str, label: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::OtuStart(LabeledId::new(id, label)?)))
    }

    pub fn otu_set_start(id: &str, label: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::OtuSetStart(LabeledId::new(id, label)?)))
    }

    pub fn alignment_start(id: &str, label: Option<&str>, otu_list_id: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::AlignmentStart(LinkedId::new(id, label, otu_list_id)?)))
    }

    pub fn character_definition_start(id: &str, label: Option<&str>, index: u64) -> Result<Self, EventError> {
        Ok(Event::new(Payload::CharacterDefinitionStart(CharacterDefinition::new(
            id, label, index,
        )?)))
    }

    pub fn character_set_start(id: &str, label: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::CharacterSetStart(LabeledId::new(id, label)?)))
    }

    pub fn token_set_definition_start(
        id: &str,
        label: Option<&str>,
        set_type: TokenSetType,
        character_set_id: Option<&str>,
    ) -> Result<Self, EventError> {
        Ok(Event::new(Payload::TokenSetDefinitionStart(TokenSetDefinition::new(
            id,
            label,
            set_type,
            character_set_id,
        )?)))
    }

    pub fn single_token_definition_start(definition: SingleTokenDefinition) -> Self {
        Event::new(Payload::SingleTokenDefinitionStart(definition))
    }

    pub fn sequence_start(id: &str, label: Option<&str>, otu_id: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::SequenceStart(LinkedId::new(id, label, otu_id)?)))
    }

    pub fn single_sequence_token_start(token: &str, column_id: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::SingleSequenceTokenStart(SingleSequenceToken::new(
            None, token, column_id,
        )?)))
    }

    pub fn tree_network_group_start(
        id: &str,
        label: Option<&str>,
        otu_list_id: Option<&str>,
    ) -> Result<Self, EventError> {
        Ok(Event::new(Payload::TreeNetworkGroupStart(LinkedId::new(id, label, otu_list_id)?)))
    }

    pub fn tree_start(id: &str, label: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::TreeStart(LabeledId::new(id, label)?)))
    }

    pub fn network_start(id: &str, label: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::NetworkStart(LabeledId::new(id, label)?)))
    }

    pub fn node_start(id: &str, label: Option<&str>, otu_id: Option<&str>, root: bool) -> Result<Self, EventError> {
        Ok(Event::new(Payload::NodeStart(Node::new(id, label, otu_id, root)?)))
    }

    pub fn edge_start(
        id: &str,
        label: Option<&str>,
        source_id: Option<&str>,
        target_id: &str,
        length: f64,
    ) -> Result<Self, EventError> {
        Ok(Event::new(Payload::EdgeStart(Edge::new(id, label, source_id, target_id, length)?)))
    }

    pub fn node_edge_set_start(id: &str, label: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::NodeEdgeSetStart(LabeledId::new(id, label)?)))
    }

    pub fn tree_network_set_start(id: &str, label: Option<&str>) -> Result<Self, EventError> {
        Ok(Event::new(Payload::TreeNetworkSetStart(LabeledId::new(id, label)?)))
    }

    pub fn literal_meta_start(
        id: &str,
        label: Option<&str>,
        predicate: Predicate,
        sequence_type: LiteralContentSequenceType,
    ) -> Result<Self, EventError> {
        Ok(Event::new(Payload::LiteralMetaStart(LiteralMeta::new(
            id,
            label,
            predicate,
            sequence_type,
        )?)))
    }

    pub fn resource_meta_start(
        id: &str,
        label: Option<&str>,
        rel: Predicate,
        href: Option<&str>,
    ) -> Result<Self, EventError> {
        Ok(Event::new(Payload::ResourceMetaStart(ResourceMeta::new(
            id, label, rel, href, None,
        )?)))
    }

    pub fn comment(content: &str) -> Self {
        Event::new(Payload::Comment(Comment::new(content, false)))
    }

    /// A comment split into continued events of at most `max_len` bytes each.
    pub fn comments(content: &str, max_len: usize) -> Vec<Self> {
        Comment::split(content, max_len)
            .into_iter()
            .map(|comment| Event::new(Payload::Comment(comment)))
            .collect()
    }

    pub fn sequence_tokens<S: Into<String>>(tokens: impl IntoIterator<Item = S>) -> Self {
        Event::new(Payload::SequenceTokens(SequenceTokens::new(
            tokens.into_iter().map(Into::into).collect(),
        )))
    }

    pub fn character_set_interval(start: u64, end: u64) -> Result<Self, EventError> {
        Ok(Event::new(Payload::CharacterSetInterval(CharacterSetInterval::new(start, end)?)))
    }

    pub fn set_element(linked_id: &str, linked_type: ContentType) -> Result<Self, EventError> {
        Ok(Event::new(Payload::SetElement(SetElement::new(linked_id, linked_type)?)))
    }

    /// Literal content typed from its text (see [`LiteralMetaContent::from_text`]).
    pub fn literal_meta_content(text: &str, original_type: Option<&str>) -> Self {
        Event::new(Payload::LiteralMetaContent(LiteralMetaContent::from_text(text, original_type)))
    }
}
