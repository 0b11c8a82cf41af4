//! Structured query input: free text interleaved with resource references.
//!
//! The generation prompt is an ordered list of [`Segment`]s. A reference to a
//! document or template is a single, indivisible token; cursor offsets count
//! one unit per text character and one unit per reference.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// What a reference token points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Document,
    Template,
}

/// An attached document or template, as sent with a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Reference(ResourceReference),
}

impl Segment {
    fn units(&self) -> usize {
        match self {
            Segment::Text(text) => text.chars().count(),
            Segment::Reference(_) => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryInput {
    segments: Vec<Segment>,
}

impl QueryInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Length in cursor units.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::units).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Insert text at `offset` (clamped to the end). Returns the cursor
    /// offset just after the inserted text.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> usize {
        let offset = offset.min(self.len());
        if text.is_empty() {
            return offset;
        }
        let at = self.split_at(offset);
        self.segments.insert(at, Segment::Text(text.to_string()));
        self.normalize();
        offset + text.chars().count()
    }

    /// Insert a reference token at `offset` (clamped to the end), splitting a
    /// text run if needed. Returns the cursor offset just after the token.
    pub fn insert_reference(&mut self, offset: usize, reference: ResourceReference) -> usize {
        let offset = offset.min(self.len());
        let at = self.split_at(offset);
        self.segments.insert(at, Segment::Reference(reference));
        self.normalize();
        offset + 1
    }

    /// Delete the unit before `offset`: one character, or a whole reference.
    /// Returns the new cursor offset.
    pub fn delete_backward(&mut self, offset: usize) -> usize {
        let offset = offset.min(self.len());
        if offset == 0 {
            return 0;
        }
        let at = self.split_at(offset - 1);
        // `split_at` leaves a boundary at `offset - 1`; the unit to delete
        // starts the segment at `at`.
        match self.segments.get_mut(at) {
            Some(Segment::Text(text)) => {
                let mut chars = text.chars();
                chars.next();
                *text = chars.as_str().to_string();
            }
            Some(Segment::Reference(_)) => {
                self.segments.remove(at);
            }
            None => {}
        }
        self.normalize();
        offset - 1
    }

    /// Text as sent to the generator; references render as `@name`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Reference(r) => {
                    out.push('@');
                    out.push_str(&r.name);
                }
            }
        }
        out
    }

    /// Distinct references in order of first appearance.
    pub fn references(&self) -> Vec<ResourceReference> {
        let mut seen = HashSet::new();
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Reference(r) if seen.insert((r.kind, r.id)) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// Ensure a segment boundary at `offset` and return the index of the
    /// segment starting there (or `segments.len()` at the end).
    fn split_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for i in 0..self.segments.len() {
            if pos == offset {
                return i;
            }
            let units = self.segments[i].units();
            if offset < pos + units {
                if let Segment::Text(text) = &mut self.segments[i] {
                    let byte = text
                        .char_indices()
                        .nth(offset - pos)
                        .map_or(text.len(), |(b, _)| b);
                    let tail = text.split_off(byte);
                    self.segments.insert(i + 1, Segment::Text(tail));
                }
                return i + 1;
            }
            pos += units;
        }
        self.segments.len()
    }

    /// Merge adjacent text runs and drop empty ones.
    fn normalize(&mut self) {
        let mut merged: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in self.segments.drain(..) {
            match segment {
                Segment::Text(text) if text.is_empty() => {}
                Segment::Text(text) => match merged.last_mut() {
                    Some(Segment::Text(prev)) => prev.push_str(&text),
                    _ => merged.push(Segment::Text(text)),
                },
                reference => merged.push(reference),
            }
        }
        self.segments = merged;
    }
}
