//! Read/write configuration shared by readers and writers.
//!
//! ```ignore
//! let params = ReadWriteParameters::new()
//!     .with_max_tokens_per_event(512)
//!     .with_match_token_translation(".")
//!     .with_node_references(NodeReferences::Deferred);
//! ```

use crate::value::{Extensions, MetaValue};

/// Default longest run of tokens in one `SEQUENCE_TOKENS` event.
pub const DEFAULT_MAX_TOKENS_PER_EVENT: usize = 2048;

/// Default longest comment before it is split into continued events.
pub const DEFAULT_MAX_COMMENT_LENGTH: usize = 1024 * 1024;

/// Default bound of the reader lookahead buffer.
pub const DEFAULT_LOOKAHEAD_CAPACITY: usize = 1024;

/// Whether edges may reference nodes that appear later in their tree or network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeReferences {
    /// Both endpoints must already be declared.
    #[default]
    Backward,
    /// Unknown endpoints are recorded and must be declared before the
    /// enclosing tree or network ends.
    Deferred,
}

/// Parameters for reading and writing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadWriteParameters {
    max_tokens_per_event: usize,
    max_comment_length: usize,
    match_token: Option<String>,
    lookahead_capacity: usize,
    node_references: NodeReferences,
    generated_id_prefix: String,
    extensions: Extensions,
}

impl Default for ReadWriteParameters {
    fn default() -> Self {
        Self {
            max_tokens_per_event: DEFAULT_MAX_TOKENS_PER_EVENT,
            max_comment_length: DEFAULT_MAX_COMMENT_LENGTH,
            match_token: None,
            lookahead_capacity: DEFAULT_LOOKAHEAD_CAPACITY,
            node_references: NodeReferences::Backward,
            generated_id_prefix: "id".to_owned(),
            extensions: Extensions::new(),
        }
    }
}

impl ReadWriteParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_tokens_per_event(mut self, max: usize) -> Self {
        self.max_tokens_per_event = max.max(1);
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_comment_length(mut self, max: usize) -> Self {
        self.max_comment_length = max.max(1);
        self
    }

    /// Replace `match_token` in sequences by the token of the first sequence
    /// at the same column.
    pub fn with_match_token_translation(mut self, match_token: &str) -> Self {
        self.match_token = Some(match_token.to_owned());
        self
    }

    /// Values below 2 are raised to 2.
    pub fn with_lookahead_capacity(mut self, capacity: usize) -> Self {
        self.lookahead_capacity = capacity.max(2);
        self
    }

    pub fn with_node_references(mut self, node_references: NodeReferences) -> Self {
        self.node_references = node_references;
        self
    }

    pub fn with_generated_id_prefix(mut self, prefix: &str) -> Self {
        self.generated_id_prefix = prefix.to_owned();
        self
    }

    /// Format specific parameter, available to plugins through [`ReadWriteParameters::extension`].
    pub fn with_extension(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.extensions.insert(key, value);
        self
    }

    #[inline]
    pub fn max_tokens_per_event(&self) -> usize {
        self.max_tokens_per_event
    }

    #[inline]
    pub fn max_comment_length(&self) -> usize {
        self.max_comment_length
    }

    #[inline]
    pub fn translate_match_token(&self) -> bool {
        self.match_token.is_some()
    }

    /// The match symbol, `"."` unless configured otherwise.
    #[inline]
    pub fn match_token(&self) -> &str {
        self.match_token.as_deref().unwrap_or(".")
    }

    #[inline]
    pub fn lookahead_capacity(&self) -> usize {
        self.lookahead_capacity
    }

    #[inline]
    pub fn node_references(&self) -> NodeReferences {
        self.node_references
    }

    #[inline]
    pub fn generated_id_prefix(&self) -> &str {
        &self.generated_id_prefix
    }

    #[inline]
    pub fn extension(&self, key: &str) -> Option<&MetaValue> {
        self.extensions.get(key)
    }

    #[inline]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }
}
