//! Read, store and write back
//!
//! A document read through `ValidatingReader` into a `StoreDocument` and
//! written by `DocumentWriter` must come out as the same event stream, up to
//! the writer's normalizations (annotations first, canonical order, merged
//! parts, split token runs).

mod common;

use common::{end, minimal_alignment_document, representative_document, FastaSource};
use phyloio_core::{
    ContentType, DocumentWriter, Event, EventCollector, EventReader, ReadWriteParameters, ReferenceError,
    StoreDocument, TokenSetType, ValidatingReader, VecEventSource, WriterError,
};
use pretty_assertions::assert_eq;

fn read_into_store(events: Vec<Event>) -> StoreDocument {
    let mut reader = ValidatingReader::from_events(events).unwrap();
    let document = StoreDocument::read(&mut reader).unwrap();
    reader.close().unwrap();
    document
}

fn write(document: &StoreDocument, params: ReadWriteParameters) -> Result<Vec<Event>, WriterError> {
    let mut sink = EventCollector::new();
    DocumentWriter::new(params).write(document, &mut sink)?;
    assert!(sink.is_finished());
    Ok(sink.into_events())
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_representative_document() {
    let document = read_into_store(representative_document());
    let written = write(&document, ReadWriteParameters::new()).unwrap();
    assert_eq!(written, representative_document());
}

#[test]
fn test_minimal_alignment_document() {
    let document = read_into_store(minimal_alignment_document());
    assert_eq!(write(&document, ReadWriteParameters::new()).unwrap(), minimal_alignment_document());
}

#[test]
fn test_written_document_reads_again() {
    let document = read_into_store(representative_document());
    let written = write(&document, ReadWriteParameters::new()).unwrap();
    let mut reader = ValidatingReader::from_events(written.clone()).unwrap();
    let reread = reader.events().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(reread, written);
}

#[test]
fn test_store_navigation() {
    let document = read_into_store(representative_document());
    let tree = document.get("tree1").unwrap();
    assert_eq!(tree.content_type(), ContentType::Tree);
    assert_eq!(tree.parent().unwrap().id().unwrap().as_str(), "trees");

    let edges: Vec<_> = tree
        .children_of_type(ContentType::Edge)
        .map(|edge| edge.start().as_edge().unwrap().clone())
        .collect();
    assert_eq!(edges.len(), 3);
    assert!(edges[0].is_root());
    assert!(!edges[0].has_length());
    assert_eq!(edges[2].length(), 1.25);

    let rest = document.get("rest").unwrap();
    let intervals: Vec<_> = rest
        .sole_events()
        .filter_map(|event| event.as_character_set_interval().ok())
        .map(|interval| interval.columns())
        .collect();
    assert_eq!(intervals, [1u64..3]);
}

#[test]
fn test_generated_ids_survive() {
    let fasta = ">a\nACGT\n>b\nAC-T\n";
    let mut reader = ValidatingReader::new(FastaSource::new(fasta), ReadWriteParameters::new()).unwrap();
    let document = StoreDocument::read(&mut reader).unwrap();
    reader.close().unwrap();

    let written = write(&document, ReadWriteParameters::new()).unwrap();
    let ids: Vec<String> = written
        .iter()
        .filter_map(|event| event.id().map(|id| id.to_string()))
        .collect();
    assert_eq!(ids, ["id0", "id1", "id2"]);
}

// =============================================================================
// Writer normalizations
// =============================================================================

#[test]
fn test_interleaved_sequences_are_merged() {
    let mut events = vec![
        Event::document_start(),
        Event::alignment_start("m", None, None).unwrap(),
    ];
    for (block, terminated) in [("AC", false), ("GT", true)] {
        for (id, offset) in [("s1", 0), ("s2", 1)] {
            events.push(Event::sequence_start(id, None, None).unwrap());
            events.push(Event::sequence_tokens(block.chars().skip(offset).map(String::from)));
            events.push(Event::part_end(ContentType::Sequence, terminated).unwrap());
        }
    }
    events.push(end(ContentType::Alignment));
    events.push(Event::document_end());

    let mut reader = ValidatingReader::new(VecEventSource::new(events), ReadWriteParameters::new()).unwrap();
    let document = StoreDocument::read(&mut reader).unwrap();
    let written = write(&document, ReadWriteParameters::new()).unwrap();

    let expected = vec![
        Event::document_start(),
        Event::alignment_start("m", None, None).unwrap(),
        Event::sequence_start("s1", None, None).unwrap(),
        Event::sequence_tokens(["A", "C"]),
        Event::sequence_tokens(["G", "T"]),
        end(ContentType::Sequence),
        Event::sequence_start("s2", None, None).unwrap(),
        Event::sequence_tokens(["C"]),
        Event::sequence_tokens(["T"]),
        end(ContentType::Sequence),
        end(ContentType::Alignment),
        Event::document_end(),
    ];
    assert_eq!(written, expected);
}

#[test]
fn test_token_runs_split_on_write() {
    let document = read_into_store(minimal_alignment_document());
    let written = write(&document, ReadWriteParameters::new().with_max_tokens_per_event(2)).unwrap();
    let runs: Vec<usize> = written
        .iter()
        .filter_map(|event| event.as_sequence_tokens().ok().map(|run| run.len()))
        .collect();
    assert_eq!(runs, [2, 2, 1, 2, 2, 1, 2, 2, 1]);
}

// =============================================================================
// Invalid stores
// =============================================================================

fn overlapping_token_sets() -> Vec<Event> {
    let mut events = vec![
        Event::document_start(),
        Event::alignment_start("m", None, None).unwrap(),
    ];
    for index in 0..6 {
        events.push(Event::character_definition_start(&format!("c{index}"), None, index).unwrap());
        events.push(end(ContentType::CharacterDefinition));
    }
    events.push(Event::token_set_definition_start("nucleotides", None, TokenSetType::Dna, None).unwrap());
    events.push(Event::character_set_interval(0, 4).unwrap());
    events.push(end(ContentType::TokenSetDefinition));
    events.push(Event::token_set_definition_start("morphology", None, TokenSetType::Discrete, None).unwrap());
    events.push(Event::character_set_interval(3, 6).unwrap());
    events.push(end(ContentType::TokenSetDefinition));
    events.push(end(ContentType::Alignment));
    events.push(Event::document_end());
    events
}

#[test]
fn test_overlapping_token_sets_are_not_written() {
    let document = StoreDocument::from_events(overlapping_token_sets()).unwrap();
    let error = write(&document, ReadWriteParameters::new()).unwrap_err();
    let reference = error.validation().and_then(|v| v.as_reference()).unwrap();
    assert_eq!(
        reference,
        &ReferenceError::OverlappingTokenSets {
            column: 3,
            first: "nucleotides".to_owned(),
            second: "morphology".to_owned(),
        }
    );
    assert_eq!(
        reference.to_string(),
        "More than one token set was assigned to the alignment column 3."
    );
}

#[test]
fn test_duplicate_ids_are_not_written() {
    let mut events = vec![Event::document_start(), Event::otu_list_start("otus", None).unwrap()];
    for _ in 0..2 {
        events.push(Event::otu_start("t1", None).unwrap());
        events.push(end(ContentType::Otu));
    }
    events.push(end(ContentType::OtuList));
    events.push(Event::document_end());

    let document = StoreDocument::from_events(events).unwrap();
    let mut sink = EventCollector::new();
    let error = DocumentWriter::default().write(&document, &mut sink).unwrap_err();
    assert!(matches!(
        error.validation().and_then(|v| v.as_reference()),
        Some(ReferenceError::DuplicateId { .. })
    ));
    assert!(!sink.is_finished());
}
