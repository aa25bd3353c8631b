//! Cross-reference validation.
//!
//! [`ReferenceValidator`] keeps the side tables needed to check references
//! between elements that appear at different stream positions: declared IDs,
//! OTUs per OTU list, columns and character sets per alignment, tokens per
//! token set, nodes per tree. Scoped tables are dropped when their element
//! ends, so memory stays bounded by the open elements plus the global ID set.
//!
//! [`StreamValidator`] runs the [`Grammar`] and the reference checks
//! together and tags failures with the stream position. It is used by both
//! readers and writers.

use std::collections::{HashMap, HashSet};

use log::trace;

use crate::error::{ReferenceError, ValidationError};
use crate::event::{CharacterSetInterval, Event, Payload};
use crate::grammar::{Grammar, ParentInformation};
use crate::id::Id;
use crate::kind::{ContentType, TokenSetType};
use crate::params::{NodeReferences, ReadWriteParameters};

/// Content types a set element inside `set` may reference.
pub fn set_element_types(set: ContentType) -> &'static [ContentType] {
    match set {
        ContentType::OtuSet => &[ContentType::Otu, ContentType::OtuSet],
        ContentType::CharacterSet => &[ContentType::CharacterDefinition, ContentType::CharacterSet],
        ContentType::NodeEdgeSet => &[ContentType::Node, ContentType::Edge, ContentType::NodeEdgeSet],
        ContentType::TreeNetworkSet => &[ContentType::Tree, ContentType::Network, ContentType::TreeNetworkSet],
        _ => &[],
    }
}

/// First column covered by both interval lists, if any.
pub fn first_common_column(a: &[CharacterSetInterval], b: &[CharacterSetInterval]) -> Option<u64> {
    let mut first = None;
    for x in a {
        for y in b {
            let start = x.start().max(y.start());
            if start < x.end().min(y.end()) {
                first = Some(first.map_or(start, |f: u64| f.min(start)));
            }
        }
    }
    first
}

#[derive(Debug, Default)]
struct AlignmentScope {
    otu_list: Option<Id>,
    /// Column ID -> column index
    characters: HashMap<Id, u64>,
    character_sets: HashMap<Id, Vec<CharacterSetInterval>>,
    /// Completed token sets that are restricted to columns.
    token_sets: Vec<TokenSetColumns>,
    /// Sequence ID -> OTU linked by its first part
    sequence_otus: HashMap<Id, Option<Id>>,
    /// Elements whose last part ended without terminating them.
    open_parts: HashMap<Id, ContentType>,
}

#[derive(Debug)]
struct TokenSetColumns {
    id: Id,
    /// Grows with later parts of this character set.
    character_set: Option<Id>,
    ranges: Vec<CharacterSetInterval>,
}

#[derive(Debug)]
struct TokenSetScope {
    id: Id,
    set_type: TokenSetType,
    character_set: Option<Id>,
    /// IDs and token names of the definitions seen so far.
    tokens: HashSet<String>,
    intervals: Vec<CharacterSetInterval>,
}

#[derive(Debug)]
struct TreeScope {
    kind: ContentType,
    nodes: HashSet<Id>,
    edges: HashSet<Id>,
    /// (edge, node) references waiting for the node to be declared.
    pending: Vec<(Id, Id)>,
}

/// Incremental referential-integrity checks.
#[derive(Debug, Default)]
pub struct ReferenceValidator {
    node_references: NodeReferences,
    declared: HashMap<Id, ContentType>,
    /// OTU list ID -> OTU IDs
    otu_lists: HashMap<Id, HashSet<Id>>,
    current_otu_list: Option<Id>,
    alignment: Option<AlignmentScope>,
    current_character_set: Option<Id>,
    token_set: Option<TokenSetScope>,
    group_otu_list: Option<Id>,
    tree: Option<TreeScope>,
}

impl ReferenceValidator {
    pub fn new(node_references: NodeReferences) -> Self {
        Self {
            node_references,
            ..Self::default()
        }
    }

    /// Whether `id` was declared anywhere in the document so far.
    #[inline]
    pub fn is_declared(&self, id: &str) -> bool {
        self.declared.contains_key(id)
    }

    /// Check `event` and record what it declares.
    ///
    /// `parents` must describe the open elements *before* `event` is applied
    /// to the grammar, and the event must already have passed the grammar.
    pub fn validate(&mut self, event: &Event, parents: &ParentInformation) -> Result<(), ReferenceError> {
        match event.payload() {
            Payload::End(end) => {
                let closing = parents.direct_parent().and_then(Event::id).cloned();
                self.close(end.content_type(), closing, end.sequence_terminated())
            }
            Payload::CharacterSetInterval(interval) => {
                match parents.direct_parent_content_type() {
                    Some(ContentType::TokenSetDefinition) => {
                        if let Some(scope) = self.token_set.as_mut() {
                            scope.intervals.push(*interval);
                        }
                    }
                    _ => return self.extend_character_set(*interval),
                }
                Ok(())
            }
            Payload::SetElement(element) => {
                let Some(set) = parents.direct_parent() else {
                    return Ok(());
                };
                self.check_set_element(set, element.linked_id(), element.linked_type())
            }
            Payload::SingleSequenceTokenStart(token) => match token.column_id() {
                Some(column) if !self.alignment.as_ref().is_some_and(|a| a.characters.contains_key(column)) => {
                    Err(ReferenceError::UndeclaredColumn {
                        token: token.token().to_owned(),
                        id: column.to_string(),
                    })
                }
                _ => Ok(()),
            },
            payload => {
                let Some(id) = event.id() else {
                    return Ok(());
                };
                let continued = self.declare(id, payload.content_type())?;
                self.open(payload, id, continued)
            }
        }
    }

    /// Register a declared ID. Returns true if the start event continues a
    /// previously unterminated part.
    fn declare(&mut self, id: &Id, content: ContentType) -> Result<bool, ReferenceError> {
        if content.has_parts() {
            if let Some(alignment) = self.alignment.as_mut() {
                if alignment.open_parts.get(id) == Some(&content) {
                    alignment.open_parts.remove(id);
                    return Ok(true);
                }
            }
        }
        if self.declared.contains_key(id) {
            return Err(ReferenceError::DuplicateId { id: id.to_string() });
        }
        self.declared.insert(id.clone(), content);
        Ok(false)
    }

    fn open(&mut self, payload: &Payload, id: &Id, continued: bool) -> Result<(), ReferenceError> {
        match payload {
            Payload::OtuListStart(_) => {
                self.otu_lists.insert(id.clone(), HashSet::new());
                self.current_otu_list = Some(id.clone());
            }
            Payload::OtuStart(_) => {
                if let Some(list) = self.current_otu_list.as_ref().and_then(|l| self.otu_lists.get_mut(l)) {
                    list.insert(id.clone());
                }
            }
            Payload::AlignmentStart(alignment) => {
                self.check_otu_list(ContentType::Alignment, id, alignment.linked_id())?;
                self.alignment = Some(AlignmentScope {
                    otu_list: alignment.linked_id().cloned(),
                    ..AlignmentScope::default()
                });
            }
            Payload::CharacterDefinitionStart(definition) => {
                if let Some(alignment) = self.alignment.as_mut() {
                    alignment.characters.insert(id.clone(), definition.index());
                }
            }
            Payload::CharacterSetStart(_) => {
                if let Some(alignment) = self.alignment.as_mut() {
                    alignment.character_sets.entry(id.clone()).or_default();
                }
                self.current_character_set = Some(id.clone());
            }
            Payload::TokenSetDefinitionStart(definition) => {
                if let Some(set) = definition.character_set_id() {
                    let known = self
                        .alignment
                        .as_ref()
                        .is_some_and(|a| a.character_sets.contains_key(set));
                    if !known {
                        return Err(ReferenceError::UndeclaredCharacterSet {
                            token_set: id.to_string(),
                            id: set.to_string(),
                        });
                    }
                }
                self.token_set = Some(TokenSetScope {
                    id: id.clone(),
                    set_type: definition.set_type(),
                    character_set: definition.character_set_id().cloned(),
                    tokens: HashSet::new(),
                    intervals: Vec::new(),
                });
            }
            Payload::SingleTokenDefinitionStart(definition) => {
                if let Some(scope) = self.token_set.as_mut() {
                    if scope.set_type == TokenSetType::Continuous {
                        return Err(ReferenceError::ContinuousTokenDefinition {
                            token_set: scope.id.to_string(),
                        });
                    }
                    if let Some(missing) = definition
                        .constituents()
                        .iter()
                        .find(|c| !scope.tokens.contains(c.as_str()))
                    {
                        return Err(ReferenceError::UndeclaredConstituent {
                            token: id.to_string(),
                            constituent: missing.clone(),
                        });
                    }
                    scope.tokens.insert(id.to_string());
                    scope.tokens.insert(definition.token_name().to_owned());
                }
            }
            Payload::SequenceStart(sequence) if !continued => {
                let list = self.alignment.as_ref().and_then(|a| a.otu_list.clone());
                self.check_otu(ContentType::Sequence, id, sequence.linked_id(), list.as_ref())?;
                if let Some(alignment) = self.alignment.as_mut() {
                    alignment.sequence_otus.insert(id.clone(), sequence.linked_id().cloned());
                }
            }
            Payload::SequenceStart(sequence) => {
                let first = self
                    .alignment
                    .as_ref()
                    .and_then(|a| a.sequence_otus.get(id))
                    .cloned()
                    .flatten();
                if first.as_ref() != sequence.linked_id() {
                    return Err(ReferenceError::PartOtuMismatch {
                        id: id.to_string(),
                        first: first.map(Id::into_string),
                        found: sequence.linked_id().map(Id::to_string),
                    });
                }
            }
            Payload::TreeNetworkGroupStart(group) => {
                self.check_otu_list(ContentType::TreeNetworkGroup, id, group.linked_id())?;
                self.group_otu_list = group.linked_id().cloned();
            }
            Payload::TreeStart(_) | Payload::NetworkStart(_) => {
                self.tree = Some(TreeScope {
                    kind: payload.content_type(),
                    nodes: HashSet::new(),
                    edges: HashSet::new(),
                    pending: Vec::new(),
                });
            }
            Payload::NodeStart(node) => {
                let list = self.group_otu_list.clone();
                self.check_otu(ContentType::Node, id, node.otu_id(), list.as_ref())?;
                if let Some(tree) = self.tree.as_mut() {
                    tree.pending.retain(|(_, pending)| pending != id);
                    tree.nodes.insert(id.clone());
                }
            }
            Payload::EdgeStart(edge) => {
                let mode = self.node_references;
                if let Some(tree) = self.tree.as_mut() {
                    let endpoints = edge
                        .source_id()
                        .map(|source| ("source", source))
                        .into_iter()
                        .chain(std::iter::once(("target", edge.target_id())));
                    for (role, node) in endpoints {
                        if tree.nodes.contains(node) {
                            continue;
                        }
                        match mode {
                            NodeReferences::Deferred => tree.pending.push((id.clone(), node.clone())),
                            NodeReferences::Backward => {
                                return Err(ReferenceError::UndeclaredNode {
                                    edge: id.to_string(),
                                    role,
                                    node: node.to_string(),
                                    scope: tree.kind,
                                })
                            }
                        }
                    }
                    tree.edges.insert(id.clone());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, content: ContentType, closing: Option<Id>, terminated: bool) -> Result<(), ReferenceError> {
        match content {
            ContentType::OtuList => self.current_otu_list = None,
            ContentType::Alignment => self.alignment = None,
            ContentType::CharacterSet => self.current_character_set = None,
            ContentType::TreeNetworkGroup => self.group_otu_list = None,
            ContentType::TokenSetDefinition => self.close_token_set()?,
            ContentType::Tree | ContentType::Network => {
                if let Some(tree) = self.tree.take() {
                    if let Some((edge, node)) = tree.pending.into_iter().next() {
                        return Err(ReferenceError::UnresolvedNode {
                            edge: edge.into_string(),
                            node: node.into_string(),
                            scope: tree.kind,
                        });
                    }
                }
            }
            _ => {}
        }
        if content.has_parts() && !terminated {
            if let (Some(alignment), Some(id)) = (self.alignment.as_mut(), closing) {
                alignment.open_parts.insert(id, content);
            }
        }
        Ok(())
    }

    fn close_token_set(&mut self) -> Result<(), ReferenceError> {
        let (Some(scope), Some(alignment)) = (self.token_set.take(), self.alignment.as_mut()) else {
            return Ok(());
        };
        let overlap = |column: u64, first: &Id| ReferenceError::OverlappingTokenSets {
            column,
            first: first.to_string(),
            second: scope.id.to_string(),
        };

        let mut ranges: Vec<_> = scope.intervals.iter().copied().filter(|r| !r.is_empty()).collect();
        for (index, interval) in ranges.iter().enumerate() {
            if let Some(column) = first_common_column(std::slice::from_ref(interval), &ranges[index + 1..]) {
                return Err(overlap(column, &scope.id));
            }
        }
        if let Some(set) = scope.character_set.as_ref().and_then(|s| alignment.character_sets.get(s)) {
            if let Some(column) = first_common_column(&ranges, set) {
                return Err(overlap(column, &scope.id));
            }
            ranges.extend(set.iter().copied().filter(|r| !r.is_empty()));
        }
        if ranges.is_empty() && scope.character_set.is_none() {
            // Applies to every column; not part of the overlap check.
            return Ok(());
        }

        for other in &alignment.token_sets {
            if let Some(column) = first_common_column(&other.ranges, &ranges) {
                return Err(overlap(column, &other.id));
            }
        }
        alignment.token_sets.push(TokenSetColumns {
            id: scope.id.clone(),
            character_set: scope.character_set.clone(),
            ranges,
        });
        Ok(())
    }

    /// Add `interval` to the open character set. Token sets linking that
    /// set take over the new columns.
    fn extend_character_set(&mut self, interval: CharacterSetInterval) -> Result<(), ReferenceError> {
        let (Some(alignment), Some(set)) = (self.alignment.as_mut(), self.current_character_set.as_ref()) else {
            return Ok(());
        };
        alignment.character_sets.entry(set.clone()).or_default().push(interval);
        if interval.is_empty() {
            return Ok(());
        }

        for linked in 0..alignment.token_sets.len() {
            if alignment.token_sets[linked].character_set.as_ref() != Some(set) {
                continue;
            }
            let conflict = alignment
                .token_sets
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != linked)
                .find_map(|(_, other)| Some((other, first_common_column(&other.ranges, &[interval])?)));
            if let Some((other, column)) = conflict {
                return Err(ReferenceError::OverlappingTokenSets {
                    column,
                    first: other.id.to_string(),
                    second: alignment.token_sets[linked].id.to_string(),
                });
            }
            alignment.token_sets[linked].ranges.push(interval);
        }
        Ok(())
    }

    fn check_set_element(&mut self, set: &Event, id: &Id, linked: ContentType) -> Result<(), ReferenceError> {
        let set_type = set.content_type();
        let set_id = set.id().map(Id::to_string).unwrap_or_default();
        if !set_element_types(set_type).contains(&linked) {
            return Err(ReferenceError::InvalidSetElement {
                set: set_type,
                id: id.to_string(),
                found: linked,
            });
        }

        let declared = match linked {
            ContentType::CharacterDefinition => {
                let Some(index) = self.alignment.as_ref().and_then(|a| a.characters.get(id)).copied() else {
                    return Err(ReferenceError::UndeclaredCharacter {
                        set: set_id,
                        id: id.to_string(),
                    });
                };
                let column = index
                    .checked_add(1)
                    .and_then(|end| CharacterSetInterval::new(index, end).ok())
                    .ok_or_else(|| ReferenceError::ColumnOutOfRange {
                        set: set_id.clone(),
                        id: id.to_string(),
                        index,
                    })?;
                self.extend_character_set(column)?;
                true
            }
            ContentType::Node => self.tree.as_ref().is_some_and(|t| t.nodes.contains(id)),
            ContentType::Edge => self.tree.as_ref().is_some_and(|t| t.edges.contains(id)),
            _ => self.declared.get(id) == Some(&linked),
        };
        if !declared {
            return Err(ReferenceError::UndeclaredSetElement {
                set: set_type,
                set_id,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn check_otu_list(&self, content: ContentType, element: &Id, list: Option<&Id>) -> Result<(), ReferenceError> {
        match list {
            Some(list) if !self.otu_lists.contains_key(list) => Err(ReferenceError::UndeclaredOtuList {
                content,
                element: element.to_string(),
                id: list.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn check_otu(
        &self,
        content: ContentType,
        element: &Id,
        otu: Option<&Id>,
        list: Option<&Id>,
    ) -> Result<(), ReferenceError> {
        let Some(otu) = otu else {
            return Ok(());
        };
        if self.declared.get(otu) != Some(&ContentType::Otu) {
            return Err(ReferenceError::UndeclaredOtu {
                content,
                element: element.to_string(),
                id: otu.to_string(),
            });
        }
        if let Some(list) = list {
            let contained = self.otu_lists.get(list).is_some_and(|otus| otus.contains(otu));
            if !contained {
                return Err(ReferenceError::OtuNotInList {
                    content,
                    element: element.to_string(),
                    otu: otu.to_string(),
                    list: list.to_string(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Stream validator
// ============================================================================

/// Grammar and reference validation of one event stream.
///
/// After the first failure every further call returns the same error.
#[derive(Debug, Default)]
pub struct StreamValidator {
    grammar: Grammar,
    references: ReferenceValidator,
    position: u64,
    failure: Option<ValidationError>,
}

impl StreamValidator {
    pub fn new(params: &ReadWriteParameters) -> Self {
        Self {
            references: ReferenceValidator::new(params.node_references()),
            ..Self::default()
        }
    }

    /// Number of events accepted so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    #[inline]
    pub fn parent_information(&self) -> &ParentInformation {
        self.grammar.parent_information()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.grammar.is_finished()
    }

    pub fn validate(&mut self, event: &Event) -> Result<(), ValidationError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let position = self.position;
        let result = self
            .grammar
            .check(event)
            .map_err(|source| ValidationError::Structure { position, source })
            .and_then(|()| {
                self.references
                    .validate(event, self.grammar.parent_information())
                    .map_err(|source| ValidationError::Reference { position, source })
            });
        match result {
            Ok(()) => {
                trace!("event {position}: {}", event.event_type());
                self.grammar.apply(event);
                self.position += 1;
                Ok(())
            }
            Err(error) => {
                self.failure = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Check that the stream is complete.
    pub fn finish(&mut self) -> Result<(), ValidationError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let position = self.position;
        self.grammar.finish().map_err(|source| {
            let error = ValidationError::Structure { position, source };
            self.failure = Some(error.clone());
            error
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureError;
    use crate::event::SingleTokenDefinition;
    use crate::kind::{CharacterSymbolMeaning, CharacterSymbolType};

    fn validate_all(events: &[Event], params: &ReadWriteParameters) -> Result<(), ValidationError> {
        let mut validator = StreamValidator::new(params);
        for event in events {
            validator.validate(event)?;
        }
        validator.finish()
    }

    fn reference_error(events: &[Event]) -> ReferenceError {
        validate_all(events, &ReadWriteParameters::default())
            .unwrap_err()
            .as_reference()
            .cloned()
            .unwrap()
    }

    fn token(id: &str, name: &str) -> Event {
        Event::single_token_definition_start(
            SingleTokenDefinition::atomic(id, None, name, CharacterSymbolMeaning::CharacterState).unwrap(),
        )
    }

    fn end(content: ContentType) -> Event {
        Event::end(content).unwrap()
    }

    #[test]
    fn test_first_common_column() {
        let a = [CharacterSetInterval::new(0, 4).unwrap()];
        let b = [CharacterSetInterval::new(3, 6).unwrap(), CharacterSetInterval::new(1, 2).unwrap()];
        assert_eq!(first_common_column(&a, &b), Some(1));
        let c = [CharacterSetInterval::new(4, 9).unwrap()];
        assert_eq!(first_common_column(&a, &c), None);
    }

    #[test]
    fn test_duplicate_id() {
        let error = reference_error(&[
            Event::document_start(),
            Event::otu_list_start("otus", None).unwrap(),
            Event::otu_start("t1", None).unwrap(),
            end(ContentType::Otu),
            Event::otu_start("t1", None).unwrap(),
        ]);
        assert_eq!(error, ReferenceError::DuplicateId { id: "t1".into() });
        assert!(error.to_string().contains("t1"));
    }

    #[test]
    fn test_edge_to_undeclared_node() {
        let error = reference_error(&[
            Event::document_start(),
            Event::tree_network_group_start("g", None, None).unwrap(),
            Event::tree_start("tree", None).unwrap(),
            Event::node_start("n1", None, None, true).unwrap(),
            end(ContentType::Node),
            Event::edge_start("e1", None, Some("n1"), "n2", 1.0).unwrap(),
        ]);
        assert_eq!(
            error,
            ReferenceError::UndeclaredNode {
                edge: "e1".into(),
                role: "target",
                node: "n2".into(),
                scope: ContentType::Tree,
            }
        );
    }

    #[test]
    fn test_nodes_are_scoped_to_their_tree() {
        let error = reference_error(&[
            Event::document_start(),
            Event::tree_network_group_start("g", None, None).unwrap(),
            Event::tree_start("tree1", None).unwrap(),
            Event::node_start("n1", None, None, true).unwrap(),
            end(ContentType::Node),
            end(ContentType::Tree),
            Event::network_start("net", None).unwrap(),
            Event::edge_start("e1", None, None, "n1", f64::NAN).unwrap(),
        ]);
        assert!(matches!(error, ReferenceError::UndeclaredNode { scope: ContentType::Network, .. }));
    }

    #[test]
    fn test_deferred_node_references() {
        let params = ReadWriteParameters::new().with_node_references(NodeReferences::Deferred);
        let mut events = vec![
            Event::document_start(),
            Event::tree_network_group_start("g", None, None).unwrap(),
            Event::tree_start("tree", None).unwrap(),
            Event::edge_start("e1", None, None, "n1", f64::NAN).unwrap(),
            end(ContentType::Edge),
            Event::node_start("n1", None, None, false).unwrap(),
            end(ContentType::Node),
            end(ContentType::Tree),
            end(ContentType::TreeNetworkGroup),
            Event::document_end(),
        ];
        assert_eq!(validate_all(&events, &params), Ok(()));

        events[5] = Event::node_start("n2", None, None, false).unwrap();
        let error = validate_all(&events, &params).unwrap_err();
        assert_eq!(error.position(), 7);
        assert!(matches!(
            error.as_reference(),
            Some(ReferenceError::UnresolvedNode { node, .. }) if node == "n1"
        ));
    }

    #[test]
    fn test_constituent_order() {
        let uncertain = SingleTokenDefinition::new(
            "tR",
            None,
            "R",
            CharacterSymbolMeaning::CharacterState,
            CharacterSymbolType::Uncertain,
            vec!["A".into(), "G".into()],
        )
        .unwrap();
        let prefix = vec![
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::token_set_definition_start("ts", None, TokenSetType::Dna, None).unwrap(),
            token("tA", "A"),
            end(ContentType::SingleTokenDefinition),
        ];

        let mut ok = prefix.clone();
        ok.extend([
            token("tG", "G"),
            end(ContentType::SingleTokenDefinition),
            Event::single_token_definition_start(uncertain.clone()),
        ]);
        let mut validator = StreamValidator::default();
        for event in &ok {
            validator.validate(event).unwrap();
        }

        let mut bad = prefix;
        bad.push(Event::single_token_definition_start(uncertain));
        let error = reference_error(&bad);
        assert_eq!(
            error,
            ReferenceError::UndeclaredConstituent {
                token: "tR".into(),
                constituent: "G".into(),
            }
        );
        assert!(error.to_string().contains("referenced the ID of a state that was not specified before"));
    }

    #[test]
    fn test_continuous_token_set_has_no_definitions() {
        let error = reference_error(&[
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::token_set_definition_start("ts", None, TokenSetType::Continuous, None).unwrap(),
            token("t0", "0"),
        ]);
        assert_eq!(error, ReferenceError::ContinuousTokenDefinition { token_set: "ts".into() });
    }

    #[test]
    fn test_character_set_references_undeclared_character() {
        let error = reference_error(&[
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::character_definition_start("c0", None, 0).unwrap(),
            end(ContentType::CharacterDefinition),
            Event::character_set_start("cs", None).unwrap(),
            Event::set_element("c0", ContentType::CharacterDefinition).unwrap(),
            Event::set_element("c1", ContentType::CharacterDefinition).unwrap(),
        ]);
        assert!(error
            .to_string()
            .contains("referenced the ID of a character that was not specified before"));
    }

    #[test]
    fn test_undeclared_column_id() {
        let error = reference_error(&[
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::sequence_start("s", None, None).unwrap(),
            Event::single_sequence_token_start("A", Some("c9")).unwrap(),
        ]);
        assert!(error.to_string().contains("undeclared column ID"));
    }

    #[test]
    fn test_token_set_with_undeclared_character_set() {
        let error = reference_error(&[
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::token_set_definition_start("ts", None, TokenSetType::Dna, Some("cs")).unwrap(),
        ]);
        assert_eq!(
            error,
            ReferenceError::UndeclaredCharacterSet {
                token_set: "ts".into(),
                id: "cs".into(),
            }
        );
    }

    #[test]
    fn test_overlapping_token_sets() {
        let error = reference_error(&[
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::character_set_start("cs", None).unwrap(),
            Event::character_set_interval(0, 4).unwrap(),
            end(ContentType::CharacterSet),
            Event::token_set_definition_start("ts1", None, TokenSetType::Dna, Some("cs")).unwrap(),
            end(ContentType::TokenSetDefinition),
            Event::token_set_definition_start("ts2", None, TokenSetType::AminoAcid, None).unwrap(),
            Event::character_set_interval(3, 8).unwrap(),
            end(ContentType::TokenSetDefinition),
        ]);
        assert_eq!(
            error.to_string(),
            "More than one token set was assigned to the alignment column 3."
        );
    }

    #[test]
    fn test_token_set_interval_inside_its_character_set() {
        let error = reference_error(&[
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::character_set_start("cs", None).unwrap(),
            Event::character_set_interval(0, 4).unwrap(),
            end(ContentType::CharacterSet),
            Event::token_set_definition_start("ts", None, TokenSetType::Dna, Some("cs")).unwrap(),
            Event::character_set_interval(1, 2).unwrap(),
            end(ContentType::TokenSetDefinition),
        ]);
        assert_eq!(
            error,
            ReferenceError::OverlappingTokenSets {
                column: 1,
                first: "ts".into(),
                second: "ts".into(),
            }
        );
    }

    #[test]
    fn test_unrestricted_token_sets_do_not_overlap() {
        let events = [
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::token_set_definition_start("ts1", None, TokenSetType::Dna, None).unwrap(),
            end(ContentType::TokenSetDefinition),
            Event::token_set_definition_start("ts2", None, TokenSetType::Dna, None).unwrap(),
            Event::character_set_interval(0, 2).unwrap(),
            end(ContentType::TokenSetDefinition),
            end(ContentType::Alignment),
            Event::document_end(),
        ];
        assert_eq!(validate_all(&events, &ReadWriteParameters::default()), Ok(()));
    }

    #[test]
    fn test_otu_links() {
        let prefix = [
            Event::document_start(),
            Event::otu_list_start("otus", None).unwrap(),
            Event::otu_start("t1", None).unwrap(),
            end(ContentType::Otu),
            end(ContentType::OtuList),
            Event::otu_list_start("other", None).unwrap(),
            Event::otu_start("t2", None).unwrap(),
            end(ContentType::Otu),
            end(ContentType::OtuList),
        ];

        let mut events = prefix.to_vec();
        events.push(Event::alignment_start("m", None, Some("nope")).unwrap());
        assert!(matches!(reference_error(&events), ReferenceError::UndeclaredOtuList { .. }));

        let mut events = prefix.to_vec();
        events.push(Event::alignment_start("m", None, Some("otus")).unwrap());
        events.push(Event::sequence_start("s", None, Some("t2")).unwrap());
        assert_eq!(
            reference_error(&events),
            ReferenceError::OtuNotInList {
                content: ContentType::Sequence,
                element: "s".into(),
                otu: "t2".into(),
                list: "otus".into(),
            }
        );

        let mut events = prefix.to_vec();
        events.push(Event::tree_network_group_start("g", None, None).unwrap());
        events.push(Event::tree_start("tree", None).unwrap());
        events.push(Event::node_start("n", None, Some("t9"), false).unwrap());
        assert!(matches!(reference_error(&events), ReferenceError::UndeclaredOtu { .. }));
    }

    #[test]
    fn test_interleaved_parts_are_not_duplicates() {
        let events = [
            Event::document_start(),
            Event::alignment_start("m", None, None).unwrap(),
            Event::sequence_start("s1", None, None).unwrap(),
            Event::sequence_tokens(["A", "C"]),
            Event::part_end(ContentType::Sequence, false).unwrap(),
            Event::sequence_start("s2", None, None).unwrap(),
            Event::sequence_tokens(["A", "G"]),
            Event::part_end(ContentType::Sequence, false).unwrap(),
            Event::sequence_start("s1", None, None).unwrap(),
            Event::sequence_tokens(["T"]),
            Event::part_end(ContentType::Sequence, true).unwrap(),
            end(ContentType::Alignment),
            Event::document_end(),
        ];
        assert_eq!(validate_all(&events, &ReadWriteParameters::default()), Ok(()));

        let mut terminated = events.to_vec();
        terminated[4] = Event::part_end(ContentType::Sequence, true).unwrap();
        assert_eq!(
            reference_error(&terminated),
            ReferenceError::DuplicateId { id: "s1".into() }
        );
    }

    #[test]
    fn test_set_elements() {
        let prefix = [
            Event::document_start(),
            Event::otu_list_start("otus", None).unwrap(),
            Event::otu_start("t1", None).unwrap(),
            end(ContentType::Otu),
            Event::otu_set_start("set", None).unwrap(),
        ];

        let mut events = prefix.to_vec();
        events.push(Event::set_element("t1", ContentType::Otu).unwrap());
        let mut validator = StreamValidator::default();
        for event in &events {
            validator.validate(event).unwrap();
        }

        let mut events = prefix.to_vec();
        events.push(Event::set_element("t1", ContentType::Node).unwrap());
        assert!(matches!(reference_error(&events), ReferenceError::InvalidSetElement { .. }));

        let mut events = prefix.to_vec();
        events.push(Event::set_element("otus", ContentType::OtuSet).unwrap());
        assert!(matches!(reference_error(&events), ReferenceError::UndeclaredSetElement { .. }));
    }

    #[test]
    fn test_failure_is_sticky() {
        let mut validator = StreamValidator::default();
        let error = validator.validate(&Event::comment("x")).unwrap_err();
        assert!(matches!(error.as_structure(), Some(StructureError::UnexpectedRoot { .. })));
        assert_eq!(validator.validate(&Event::document_start()), Err(error.clone()));
        assert_eq!(validator.finish(), Err(error));
    }
}
