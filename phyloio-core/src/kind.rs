//! Event taxonomy - the closed set of content and topology types.
//!
//! Every event is classified by a [`ContentType`] (what it describes) and a
//! [`TopologyType`] (whether it opens an element, closes it, or stands alone).
//! Only some combinations are legal; [`is_valid_combination`] is the single
//! check used by event constructors, readers and writers.
//!
//! ```text
//! START/END pairs:  DOCUMENT, OTU_LIST, OTU, OTU_SET, ALIGNMENT, CHARACTER_DEFINITION,
//!                   SEQUENCE, SINGLE_SEQUENCE_TOKEN, CHARACTER_SET, TOKEN_SET_DEFINITION,
//!                   SINGLE_TOKEN_DEFINITION, TREE_NETWORK_GROUP, TREE, NETWORK, NODE, EDGE,
//!                   NODE_EDGE_SET, TREE_NETWORK_SET, LITERAL_META, RESOURCE_META
//! SOLE:             COMMENT, UNKNOWN_COMMAND, LITERAL_META_CONTENT, SEQUENCE_TOKENS,
//!                   CHARACTER_SET_INTERVAL, SET_ELEMENT
//! ```

use std::fmt;

use phf::phf_map;

use crate::error::EventError;

/// Whether an event opens an element, closes it, or is self-contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopologyType {
    /// Opens an element. Always followed later by a matching [`TopologyType::End`].
    Start,
    /// Closes the most recently opened element of the same content type.
    End,
    /// Self-contained; never participates in nesting.
    Sole,
}

impl fmt::Display for TopologyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TopologyType::Start => "START",
            TopologyType::End => "END",
            TopologyType::Sole => "SOLE",
        })
    }
}

/// What a data element describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentType {
    // ========== General ==========
    /// The whole document.
    Document,
    /// Literal metadata attached to the enclosing element.
    LiteralMeta,
    /// A value of an enclosing [`ContentType::LiteralMeta`].
    LiteralMetaContent,
    /// Resource metadata, possibly nesting further metadata.
    ResourceMeta,
    /// A comment found in the data source.
    Comment,
    /// Contents of a command the format reader does not understand.
    UnknownCommand,

    // ========== OTUs ==========
    OtuList,
    Otu,
    OtuSet,

    // ========== Alignments ==========
    Alignment,
    CharacterDefinition,
    Sequence,
    /// A run of sequence tokens.
    SequenceTokens,
    /// A single sequence token that may carry nested metadata.
    SingleSequenceToken,
    CharacterSet,
    /// A half-open column interval of an enclosing character or token set.
    CharacterSetInterval,
    TokenSetDefinition,
    SingleTokenDefinition,

    // ========== Trees and networks ==========
    TreeNetworkGroup,
    Tree,
    Network,
    Node,
    Edge,
    NodeEdgeSet,
    TreeNetworkSet,

    // ========== Sets ==========
    /// A reference to an element contained in an enclosing set.
    SetElement,
}

static CONTENT_TYPE_NAMES: phf::Map<&'static str, ContentType> = phf_map! {
    "DOCUMENT" => ContentType::Document,
    "LITERAL_META" => ContentType::LiteralMeta,
    "LITERAL_META_CONTENT" => ContentType::LiteralMetaContent,
    "RESOURCE_META" => ContentType::ResourceMeta,
    "COMMENT" => ContentType::Comment,
    "UNKNOWN_COMMAND" => ContentType::UnknownCommand,
    "OTU_LIST" => ContentType::OtuList,
    "OTU" => ContentType::Otu,
    "OTU_SET" => ContentType::OtuSet,
    "ALIGNMENT" => ContentType::Alignment,
    "CHARACTER_DEFINITION" => ContentType::CharacterDefinition,
    "SEQUENCE" => ContentType::Sequence,
    "SEQUENCE_TOKENS" => ContentType::SequenceTokens,
    "SINGLE_SEQUENCE_TOKEN" => ContentType::SingleSequenceToken,
    "CHARACTER_SET" => ContentType::CharacterSet,
    "CHARACTER_SET_INTERVAL" => ContentType::CharacterSetInterval,
    "TOKEN_SET_DEFINITION" => ContentType::TokenSetDefinition,
    "SINGLE_TOKEN_DEFINITION" => ContentType::SingleTokenDefinition,
    "TREE_NETWORK_GROUP" => ContentType::TreeNetworkGroup,
    "TREE" => ContentType::Tree,
    "NETWORK" => ContentType::Network,
    "NODE" => ContentType::Node,
    "EDGE" => ContentType::Edge,
    "NODE_EDGE_SET" => ContentType::NodeEdgeSet,
    "TREE_NETWORK_SET" => ContentType::TreeNetworkSet,
    "SET_ELEMENT" => ContentType::SetElement,
};

impl ContentType {
    /// All content types in declaration order.
    pub const ALL: [ContentType; 26] = [
        ContentType::Document,
        ContentType::LiteralMeta,
        ContentType::LiteralMetaContent,
        ContentType::ResourceMeta,
        ContentType::Comment,
        ContentType::UnknownCommand,
        ContentType::OtuList,
        ContentType::Otu,
        ContentType::OtuSet,
        ContentType::Alignment,
        ContentType::CharacterDefinition,
        ContentType::Sequence,
        ContentType::SequenceTokens,
        ContentType::SingleSequenceToken,
        ContentType::CharacterSet,
        ContentType::CharacterSetInterval,
        ContentType::TokenSetDefinition,
        ContentType::SingleTokenDefinition,
        ContentType::TreeNetworkGroup,
        ContentType::Tree,
        ContentType::Network,
        ContentType::Node,
        ContentType::Edge,
        ContentType::NodeEdgeSet,
        ContentType::TreeNetworkSet,
        ContentType::SetElement,
    ];

    /// The canonical upper-case name, e.g. `OTU_LIST`.
    pub fn name(self) -> &'static str {
        match self {
            ContentType::Document => "DOCUMENT",
            ContentType::LiteralMeta => "LITERAL_META",
            ContentType::LiteralMetaContent => "LITERAL_META_CONTENT",
            ContentType::ResourceMeta => "RESOURCE_META",
            ContentType::Comment => "COMMENT",
            ContentType::UnknownCommand => "UNKNOWN_COMMAND",
            ContentType::OtuList => "OTU_LIST",
            ContentType::Otu => "OTU",
            ContentType::OtuSet => "OTU_SET",
            ContentType::Alignment => "ALIGNMENT",
            ContentType::CharacterDefinition => "CHARACTER_DEFINITION",
            ContentType::Sequence => "SEQUENCE",
            ContentType::SequenceTokens => "SEQUENCE_TOKENS",
            ContentType::SingleSequenceToken => "SINGLE_SEQUENCE_TOKEN",
            ContentType::CharacterSet => "CHARACTER_SET",
            ContentType::CharacterSetInterval => "CHARACTER_SET_INTERVAL",
            ContentType::TokenSetDefinition => "TOKEN_SET_DEFINITION",
            ContentType::SingleTokenDefinition => "SINGLE_TOKEN_DEFINITION",
            ContentType::TreeNetworkGroup => "TREE_NETWORK_GROUP",
            ContentType::Tree => "TREE",
            ContentType::Network => "NETWORK",
            ContentType::Node => "NODE",
            ContentType::Edge => "EDGE",
            ContentType::NodeEdgeSet => "NODE_EDGE_SET",
            ContentType::TreeNetworkSet => "TREE_NETWORK_SET",
            ContentType::SetElement => "SET_ELEMENT",
        }
    }

    /// Look up a content type by its canonical name.
    pub fn from_name(name: &str) -> Option<ContentType> {
        CONTENT_TYPE_NAMES.get(name).copied()
    }

    /// Content types that are always [`TopologyType::Sole`].
    #[inline]
    pub fn is_sole(self) -> bool {
        matches!(
            self,
            ContentType::Comment
                | ContentType::UnknownCommand
                | ContentType::LiteralMetaContent
                | ContentType::SequenceTokens
                | ContentType::CharacterSetInterval
                | ContentType::SetElement
        )
    }

    /// Set containers, the only parents of [`ContentType::SetElement`].
    #[inline]
    pub fn is_set(self) -> bool {
        matches!(
            self,
            ContentType::OtuSet
                | ContentType::CharacterSet
                | ContentType::NodeEdgeSet
                | ContentType::TreeNetworkSet
        )
    }

    /// Metadata and comment types, legal below almost every element.
    #[inline]
    pub fn is_annotation(self) -> bool {
        matches!(
            self,
            ContentType::LiteralMeta | ContentType::ResourceMeta | ContentType::Comment
        )
    }

    /// Elements that may be emitted in several parts (interleaved formats).
    #[inline]
    pub fn has_parts(self) -> bool {
        matches!(self, ContentType::Sequence | ContentType::CharacterSet)
    }

    /// Elements whose start event declares a document-unique ID.
    #[inline]
    pub fn declares_id(self) -> bool {
        !self.is_sole()
            && !matches!(self, ContentType::Document | ContentType::SingleSequenceToken)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tests whether a content type may be combined with a topology type.
///
/// Sole-only types never form START/END pairs and every other type is never sole.
#[inline]
pub fn is_valid_combination(content: ContentType, topology: TopologyType) -> bool {
    if content.is_sole() {
        topology == TopologyType::Sole
    } else {
        topology != TopologyType::Sole
    }
}

/// A legal (content type, topology type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventType {
    content: ContentType,
    topology: TopologyType,
}

impl EventType {
    /// Create an event type, rejecting illegal combinations.
    pub fn new(content: ContentType, topology: TopologyType) -> Result<Self, EventError> {
        if is_valid_combination(content, topology) {
            Ok(Self { content, topology })
        } else {
            Err(EventError::InvalidCombination { content, topology })
        }
    }

    /// Only called with combinations that are legal by construction.
    pub(crate) const fn new_unchecked(content: ContentType, topology: TopologyType) -> Self {
        Self { content, topology }
    }

    #[inline]
    pub fn content_type(&self) -> ContentType {
        self.content
    }

    #[inline]
    pub fn topology_type(&self) -> TopologyType {
        self.topology
    }

    #[inline]
    pub fn is(&self, content: ContentType, topology: TopologyType) -> bool {
        self.content == content && self.topology == topology
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.content, self.topology)
    }
}

// ============================================================================
// Payload enumerations
// ============================================================================

static TOKEN_SET_FORMAT_NAMES: phf::Map<&'static str, TokenSetType> = phf_map! {
    "nucleotide" => TokenSetType::Nucleotide,
    "dna" => TokenSetType::Dna,
    "rna" => TokenSetType::Rna,
    "protein" => TokenSetType::AminoAcid,
    "aminoacid" => TokenSetType::AminoAcid,
    "amino_acid" => TokenSetType::AminoAcid,
    "standard" => TokenSetType::Discrete,
    "discrete" => TokenSetType::Discrete,
    "restriction" => TokenSetType::Discrete,
    "continuous" => TokenSetType::Continuous,
};

/// Coarse type of a token set (alphabet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenSetType {
    Nucleotide,
    Dna,
    Rna,
    AminoAcid,
    /// Discrete states that are not nucleotides or amino acids.
    Discrete,
    /// Numeric states; such a set has no enumerable alphabet.
    Continuous,
    /// Stands in for "not known" instead of an absent value.
    #[default]
    Unknown,
}

impl TokenSetType {
    #[inline]
    pub fn is_nucleotide(self) -> bool {
        matches!(self, TokenSetType::Nucleotide | TokenSetType::Dna | TokenSetType::Rna)
    }

    /// `false` for [`TokenSetType::Continuous`] and [`TokenSetType::Unknown`].
    #[inline]
    pub fn is_discrete(self) -> bool {
        !matches!(self, TokenSetType::Continuous | TokenSetType::Unknown)
    }

    /// Map a format specific data type name (e.g. a Nexus `DATATYPE`) to a set type.
    ///
    /// Matching is case-insensitive; unrecognized names map to [`TokenSetType::Unknown`].
    pub fn from_format_name(name: &str) -> TokenSetType {
        let lower = name.trim().to_ascii_lowercase();
        TOKEN_SET_FORMAT_NAMES
            .get(lower.as_str())
            .copied()
            .unwrap_or(TokenSetType::Unknown)
    }
}

/// Meaning of a single token symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterSymbolMeaning {
    CharacterState,
    Gap,
    Missing,
    Match,
    Other,
}

/// Whether a token is an atomic state or combines other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharacterSymbolType {
    #[default]
    Atomic,
    Uncertain,
    Polymorphic,
}

/// How the content of a literal metadata element is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LiteralContentSequenceType {
    /// A single simple value.
    #[default]
    Simple,
    /// An array of simple values, one content event each.
    SimpleArray,
    /// Serialized XML content.
    Xml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sole_types_only_combine_with_sole() {
        for content in ContentType::ALL {
            if content.is_sole() {
                assert!(is_valid_combination(content, TopologyType::Sole));
                assert!(!is_valid_combination(content, TopologyType::Start));
                assert!(!is_valid_combination(content, TopologyType::End));
            } else {
                assert!(!is_valid_combination(content, TopologyType::Sole));
                assert!(is_valid_combination(content, TopologyType::Start));
                assert!(is_valid_combination(content, TopologyType::End));
            }
        }
    }

    #[test]
    fn test_structural_types_are_paired() {
        for content in [
            ContentType::Document,
            ContentType::Alignment,
            ContentType::Sequence,
            ContentType::Tree,
            ContentType::Network,
            ContentType::Node,
            ContentType::Edge,
            ContentType::Otu,
            ContentType::OtuList,
            ContentType::TokenSetDefinition,
            ContentType::CharacterSet,
            ContentType::TreeNetworkGroup,
        ] {
            assert!(!content.is_sole(), "{content} must be paired");
        }
    }

    #[test]
    fn test_event_type_rejects_invalid_combination() {
        assert!(EventType::new(ContentType::Comment, TopologyType::Sole).is_ok());
        assert_eq!(
            EventType::new(ContentType::Comment, TopologyType::Start),
            Err(EventError::InvalidCombination {
                content: ContentType::Comment,
                topology: TopologyType::Start,
            })
        );
        assert!(EventType::new(ContentType::Tree, TopologyType::Sole).is_err());
    }

    #[test]
    fn test_name_lookup() {
        for content in ContentType::ALL {
            assert_eq!(ContentType::from_name(content.name()), Some(content));
        }
        assert_eq!(ContentType::from_name("otu_list"), None);
        assert_eq!(ContentType::from_name("META_INFORMATION"), None);
    }

    #[test]
    fn test_token_set_type_helpers() {
        assert!(TokenSetType::Dna.is_nucleotide());
        assert!(!TokenSetType::AminoAcid.is_nucleotide());
        assert!(TokenSetType::Discrete.is_discrete());
        assert!(!TokenSetType::Continuous.is_discrete());
        assert!(!TokenSetType::Unknown.is_discrete());
        assert_eq!(TokenSetType::from_format_name("Protein"), TokenSetType::AminoAcid);
        assert_eq!(TokenSetType::from_format_name(" DNA "), TokenSetType::Dna);
        assert_eq!(TokenSetType::from_format_name("mixed"), TokenSetType::Unknown);
    }
}
