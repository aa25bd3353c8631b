//! Sequence token helpers for format plugins.
//!
//! Character data arrives as text (`ACGT-N{AG}`) or as whitespace separated
//! long tokens (`0.23 1.7 ?`). These helpers turn it into bounded
//! `SEQUENCE_TOKENS` events and resolve match symbols against the first
//! sequence of an alignment.

use std::collections::HashMap;

use crate::error::ReaderError;
use crate::event::{Event, Payload, SequenceTokens, SingleSequenceToken};
use crate::id::Id;

/// Split sequence text into tokens.
///
/// With `long_tokens`, tokens are separated by whitespace. Otherwise every
/// non-whitespace character is a token, except that `{...}` and `(...)`
/// groups (uncertain and polymorphic states) form a single token.
pub fn split_tokens(text: &str, long_tokens: bool) -> Vec<String> {
    if long_tokens {
        return text.split_whitespace().map(str::to_owned).collect();
    }

    let mut tokens = Vec::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }
        let close = match ch {
            '{' => '}',
            '(' => ')',
            _ => {
                tokens.push(ch.to_string());
                continue;
            }
        };
        let mut end = text.len();
        for (index, inner) in chars.by_ref() {
            if inner == close {
                end = index + inner.len_utf8();
                break;
            }
        }
        tokens.push(text[start..end].to_owned());
    }
    tokens
}

/// Chunk `tokens` into `SEQUENCE_TOKENS` events of at most `max_per_event` tokens.
pub fn sequence_token_events(tokens: Vec<String>, max_per_event: usize) -> Vec<Event> {
    let max_per_event = max_per_event.max(1);
    if tokens.len() <= max_per_event {
        return if tokens.is_empty() {
            Vec::new()
        } else {
            vec![Event::sequence_tokens(tokens)]
        };
    }

    let mut events = Vec::with_capacity(tokens.len().div_ceil(max_per_event));
    let mut tokens = tokens.into_iter().peekable();
    while tokens.peek().is_some() {
        events.push(Event::sequence_tokens(tokens.by_ref().take(max_per_event)));
    }
    events
}

/// Replaces match symbols by the token of the first sequence at the same column.
///
/// Column positions are tracked per sequence ID, so interleaved parts of
/// the same sequence continue where the previous part stopped.
#[derive(Debug)]
pub struct MatchTokenTranslator {
    match_token: String,
    first_sequence: Option<Id>,
    first_tokens: Vec<String>,
    positions: HashMap<Id, u64>,
}

impl MatchTokenTranslator {
    pub fn new(match_token: &str) -> Self {
        Self {
            match_token: match_token.to_owned(),
            first_sequence: None,
            first_tokens: Vec::new(),
            positions: HashMap::new(),
        }
    }

    #[inline]
    pub fn match_token(&self) -> &str {
        &self.match_token
    }

    /// Translate the tokens of the next run of `sequence`.
    pub fn translate(&mut self, sequence: &Id, tokens: &[String]) -> Result<Vec<String>, ReaderError> {
        let first = self.first_sequence.get_or_insert_with(|| sequence.clone());
        let is_first = *first == *sequence;
        let position = self.positions.entry(sequence.clone()).or_insert(0);

        let mut translated = Vec::with_capacity(tokens.len());
        for token in tokens {
            let column = *position;
            *position += 1;
            if is_first {
                self.first_tokens.push(token.clone());
                translated.push(token.clone());
            } else if *token == self.match_token {
                let resolved = usize::try_from(column)
                    .ok()
                    .and_then(|index| self.first_tokens.get(index))
                    .ok_or(ReaderError::UnresolvedMatchToken {
                        column,
                        available: self.first_tokens.len() as u64,
                    })?;
                translated.push(resolved.clone());
            } else {
                translated.push(token.clone());
            }
        }
        Ok(translated)
    }

    /// Translate a token event of `sequence`. Other events pass unchanged.
    pub fn translate_event(&mut self, sequence: &Id, event: Event) -> Result<Event, ReaderError> {
        match event.payload() {
            Payload::SequenceTokens(run) => {
                let tokens = self.translate(sequence, run.tokens())?;
                Ok(Event::with_extensions(
                    Payload::SequenceTokens(SequenceTokens::new(tokens)),
                    event.extensions().clone(),
                ))
            }
            Payload::SingleSequenceTokenStart(single) => {
                let token = [single.token().to_owned()];
                let token = self.translate(sequence, &token)?.concat();
                let rebuilt = SingleSequenceToken::new(single.label(), &token, single.column_id().map(Id::as_str))?;
                Ok(Event::with_extensions(
                    Payload::SingleSequenceTokenStart(rebuilt),
                    event.extensions().clone(),
                ))
            }
            _ => Ok(event),
        }
    }
}
