//! ID generation and replacement.
//!
//! Formats without IDs (Newick, Phylip, ...) need generated ones, and
//! merging several documents needs colliding IDs renamed consistently.

use std::collections::{HashMap, HashSet};

use crate::error::{IdError, ReferenceError};
use crate::event::{Event, IdRole, Payload};
use crate::id::{check_nc_name, Id};
use crate::kind::ContentType;

/// Yields `count` IDs `prefix + index`, starting at `start`.
#[derive(Debug, Clone)]
pub struct NumberedIds {
    prefix: String,
    next: u64,
    end: u64,
}

impl NumberedIds {
    pub fn new(prefix: &str, start: u64, count: u64) -> Self {
        Self {
            prefix: prefix.to_owned(),
            next: start,
            end: start.saturating_add(count),
        }
    }

    /// Starting at index 0.
    pub fn from_zero(prefix: &str, count: u64) -> Self {
        Self::new(prefix, 0, count)
    }
}

impl Iterator for NumberedIds {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next >= self.end {
            return None;
        }
        self.next += 1;
        Some(format!("{}{}", self.prefix, self.next - 1))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for NumberedIds {}

/// The index of an ID produced by [`NumberedIds`] with the same prefix.
pub fn extract_index(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}

/// Generates document-unique IDs `prefix + counter`.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
}

impl IdGenerator {
    /// `prefix` must itself be a valid ID.
    pub fn new(prefix: &str) -> Result<Self, IdError> {
        check_nc_name(prefix)?;
        Ok(Self {
            prefix: prefix.to_owned(),
            next: 0,
        })
    }

    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn next_id(&mut self) -> Id {
        let id = Id::from_validated(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }

    /// Skip IDs for which `is_taken` returns true.
    pub fn next_unused(&mut self, is_taken: impl Fn(&str) -> bool) -> Id {
        loop {
            let id = self.next_id();
            if !is_taken(&id) {
                return id;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            prefix: "id".to_owned(),
            next: 0,
        }
    }
}

/// Renames IDs that collide with earlier ones and remaps references.
///
/// The second element declaring `x` becomes `x1`, the third `x2`, and so on,
/// skipping any name already in use. References resolve to the most recent
/// element declared under the original ID, so they must point backwards.
/// Continued parts of interleaved sequences and character sets keep the
/// name of their first part. Constituents naming a token definition of the
/// same token set follow that definition's new ID.
#[derive(Debug, Default)]
pub struct UniqueIdReplacer {
    used: HashSet<String>,
    /// Original ID -> most recent replacement
    replacements: HashMap<Id, Id>,
    /// Original IDs of the open start events; `None` for starts without ID.
    open: Vec<Option<Id>>,
    /// Original IDs of elements whose last part was not terminated.
    open_parts: HashSet<Id>,
    /// Token definitions of the current token set: original ID -> replacement
    tokens: HashMap<Id, Id>,
}

impl UniqueIdReplacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, event: Event) -> Result<Event, ReferenceError> {
        match event.payload() {
            Payload::End(end) => {
                let original = self.open.pop().flatten();
                if let Some(original) = original {
                    if end.content_type().has_parts() && !end.sequence_terminated() {
                        self.open_parts.insert(original);
                    }
                }
                return Ok(event);
            }
            _ if event.is_start() => self.open.push(event.id().cloned()),
            _ => {}
        }

        let continued = event
            .id()
            .filter(|id| event.content_type().has_parts() && self.open_parts.contains(*id))
            .cloned();
        if let Some(original) = continued {
            self.open_parts.remove(&original);
            return event.try_map_ids(|role, id| match role {
                IdRole::Declared | IdRole::Constituent => {
                    Ok(self.replacements.get(id).cloned().unwrap_or_else(|| id.clone()))
                }
                IdRole::Reference => self.resolve(id),
            });
        }

        let content = event.content_type();
        let original = event.id().cloned();
        let replaced = event.try_map_ids(|role, id| match role {
            IdRole::Declared => Ok(self.rename(id)),
            IdRole::Reference => self.resolve(id),
            IdRole::Constituent => Ok(self.tokens.get(id).cloned().unwrap_or_else(|| id.clone())),
        })?;
        match (content, original, replaced.id()) {
            (ContentType::TokenSetDefinition, _, _) => self.tokens.clear(),
            (ContentType::SingleTokenDefinition, Some(original), Some(renamed)) => {
                self.tokens.insert(original, renamed.clone());
            }
            _ => {}
        }
        Ok(replaced)
    }

    fn rename(&mut self, id: &Id) -> Id {
        let renamed = if self.used.contains(id.as_str()) {
            (1u64..)
                .map(|suffix| format!("{id}{suffix}"))
                .find(|candidate| !self.used.contains(candidate))
                .map(Id::from_validated)
                .unwrap_or_else(|| id.clone())
        } else {
            id.clone()
        };
        self.used.insert(renamed.to_string());
        self.replacements.insert(id.clone(), renamed.clone());
        renamed
    }

    fn resolve(&self, id: &Id) -> Result<Id, ReferenceError> {
        self.replacements
            .get(id)
            .cloned()
            .ok_or_else(|| ReferenceError::UnknownReference { id: id.to_string() })
    }
}
