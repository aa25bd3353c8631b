//! Test infrastructure for the PhyloIO event model
//!
//! Provides stream builders for the documents used across the integration
//! tests and a small line-based event source standing in for a format plugin.

#![allow(dead_code)]

use phyloio_core::event::{Predicate, SingleTokenDefinition};
use phyloio_core::kind::{CharacterSymbolMeaning, CharacterSymbolType, LiteralContentSequenceType};
use phyloio_core::sequence::split_tokens;
use phyloio_core::{ContentType, Event, EventSource, Location, ReadContext, ReaderError, TokenSetType};

// =============================================================================
// Stream builders
// =============================================================================

pub fn end(content: ContentType) -> Event {
    Event::end(content).unwrap()
}

/// `OTU_LIST` with one OTU per ID, labeled with the ID in upper case.
pub fn otu_list(id: &str, otus: &[&str]) -> Vec<Event> {
    let mut events = vec![Event::otu_list_start(id, None).unwrap()];
    for otu in otus {
        events.push(Event::otu_start(otu, Some(otu.to_uppercase().as_str())).unwrap());
        events.push(end(ContentType::Otu));
    }
    events.push(end(ContentType::OtuList));
    events
}

pub fn sequence(id: &str, otu: &str, tokens: &str) -> Vec<Event> {
    vec![
        Event::sequence_start(id, None, Some(otu)).unwrap(),
        Event::sequence_tokens(split_tokens(tokens, false)),
        end(ContentType::Sequence),
    ]
}

/// Three OTUs and a DNA alignment of three sequences over five columns.
pub fn minimal_alignment_document() -> Vec<Event> {
    let mut events = vec![Event::document_start()];
    events.extend(otu_list("otus", &["t1", "t2", "t3"]));
    events.push(Event::alignment_start("m1", None, Some("otus")).unwrap());
    for index in 0..5 {
        events.push(Event::character_definition_start(&format!("c{index}"), None, index).unwrap());
        events.push(end(ContentType::CharacterDefinition));
    }
    events.push(Event::token_set_definition_start("dna", None, TokenSetType::Dna, None).unwrap());
    events.push(end(ContentType::TokenSetDefinition));
    events.extend(sequence("s1", "t1", "ACGTA"));
    events.extend(sequence("s2", "t2", "ACGTT"));
    events.extend(sequence("s3", "t3", "AC-TN"));
    events.push(end(ContentType::Alignment));
    events.push(Event::document_end());
    events
}

fn atomic(id: &str, token: &str) -> Vec<Event> {
    vec![
        Event::single_token_definition_start(
            SingleTokenDefinition::atomic(id, None, token, CharacterSymbolMeaning::CharacterState).unwrap(),
        ),
        end(ContentType::SingleTokenDefinition),
    ]
}

/// OTUs, an alignment with a DNA token set and character sets, and a tree
/// with edge lengths and metadata, in canonical writer order.
pub fn representative_document() -> Vec<Event> {
    let mut events = vec![Event::document_start()];
    events.extend(otu_list("otus", &["t1", "t2", "t3"]));

    events.push(Event::alignment_start("m1", Some("COI"), Some("otus")).unwrap());
    events.push(Event::comment("aligned by hand"));
    for index in 0..5 {
        events.push(Event::character_definition_start(&format!("c{index}"), None, index).unwrap());
        events.push(end(ContentType::CharacterDefinition));
    }
    events.push(Event::character_set_start("codon1", Some("first positions")).unwrap());
    events.push(Event::character_set_interval(0, 1).unwrap());
    events.push(Event::character_set_interval(3, 4).unwrap());
    events.push(end(ContentType::CharacterSet));
    events.push(Event::character_set_start("rest", None).unwrap());
    events.push(Event::character_set_interval(1, 3).unwrap());
    events.push(Event::set_element("c4", ContentType::CharacterDefinition).unwrap());
    events.push(end(ContentType::CharacterSet));
    events.push(Event::token_set_definition_start("dna", None, TokenSetType::Dna, None).unwrap());
    for (id, token) in [("sA", "A"), ("sC", "C"), ("sG", "G"), ("sT", "T")] {
        events.extend(atomic(id, token));
    }
    events.push(Event::single_token_definition_start(
        SingleTokenDefinition::new(
            "sR",
            None,
            "R",
            CharacterSymbolMeaning::CharacterState,
            CharacterSymbolType::Uncertain,
            vec!["A".into(), "sG".into()],
        )
        .unwrap(),
    ));
    events.push(end(ContentType::SingleTokenDefinition));
    events.push(end(ContentType::TokenSetDefinition));
    events.extend(sequence("s1", "t1", "ACGTA"));
    events.extend(sequence("s2", "t2", "ACGTR"));
    events.extend(sequence("s3", "t3", "AC-TA"));
    events.push(end(ContentType::Alignment));

    events.push(Event::tree_network_group_start("trees", None, Some("otus")).unwrap());
    events.push(Event::tree_start("tree1", Some("ML tree")).unwrap());
    events.push(
        Event::literal_meta_start(
            "meta1",
            None,
            Predicate::key("lnL"),
            LiteralContentSequenceType::Simple,
        )
        .unwrap(),
    );
    events.push(Event::literal_meta_content("-1234.5", None));
    events.push(end(ContentType::LiteralMeta));
    events.push(Event::node_start("n1", None, None, true).unwrap());
    events.push(end(ContentType::Node));
    events.push(Event::node_start("n2", Some("t1"), Some("t1"), false).unwrap());
    events.push(end(ContentType::Node));
    events.push(Event::node_start("n3", Some("t2"), Some("t2"), false).unwrap());
    events.push(end(ContentType::Node));
    events.push(Event::edge_start("e0", None, None, "n1", f64::NAN).unwrap());
    events.push(end(ContentType::Edge));
    events.push(Event::edge_start("e1", None, Some("n1"), "n2", 0.5).unwrap());
    events.push(end(ContentType::Edge));
    events.push(Event::edge_start("e2", None, Some("n1"), "n3", 1.25).unwrap());
    events.push(end(ContentType::Edge));
    events.push(end(ContentType::Tree));
    events.push(end(ContentType::TreeNetworkGroup));

    events.push(Event::document_end());
    events
}

/// `"OTU_LIST START"` style names, for compact order assertions.
pub fn event_types(events: &[Event]) -> Vec<String> {
    events.iter().map(|event| event.event_type().to_string()).collect()
}

// =============================================================================
// Line-based source
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum FastaState {
    Start,
    Records { in_sequence: bool },
    Done,
}

/// Reads FASTA-like text (`>name` headers followed by sequence lines) into
/// one alignment. Sequence IDs are generated, names become labels.
pub struct FastaSource {
    lines: Vec<String>,
    next_line: usize,
    location: Location,
    state: FastaState,
    pub closed: bool,
}

impl FastaSource {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
            next_line: 0,
            location: Location::START,
            state: FastaState::Start,
            closed: false,
        }
    }
}

impl EventSource for FastaSource {
    fn produce(&mut self, context: &mut ReadContext<'_>) -> Result<(), ReaderError> {
        match self.state {
            FastaState::Start => {
                context.emit(Event::document_start())?;
                let id = context.ids().next_id();
                context.emit(Event::alignment_start(&id, None, None)?)?;
                self.state = FastaState::Records { in_sequence: false };
            }
            FastaState::Records { in_sequence } => {
                let Some(line) = self.lines.get(self.next_line).cloned() else {
                    if in_sequence {
                        context.emit(Event::end(ContentType::Sequence)?)?;
                    }
                    context.emit(Event::end(ContentType::Alignment)?)?;
                    context.emit(Event::document_end())?;
                    context.finish();
                    self.state = FastaState::Done;
                    return Ok(());
                };

                if let Some(name) = line.strip_prefix('>') {
                    if in_sequence {
                        context.emit(Event::end(ContentType::Sequence)?)?;
                    }
                    let id = context.ids().next_id();
                    context.emit(Event::sequence_start(&id, Some(name.trim()), None)?)?;
                    let records = context.shared().get("fasta.records").and_then(|v| v.as_integer());
                    context.shared().insert("fasta.records", records.unwrap_or(0) + 1);
                    self.state = FastaState::Records { in_sequence: true };
                } else if !line.trim().is_empty() {
                    if !in_sequence {
                        return Err(ReaderError::source_failure(
                            "sequence data before the first header",
                            Some(self.location),
                        ));
                    }
                    context.emit_tokens(split_tokens(&line, false))?;
                }
                self.next_line += 1;
                self.location.advance(&line);
                self.location.advance("\n");
            }
            FastaState::Done => context.finish(),
        }
        Ok(())
    }

    fn location(&self) -> Option<Location> {
        Some(self.location)
    }

    fn close(&mut self) -> Result<(), ReaderError> {
        self.closed = true;
        Ok(())
    }
}
