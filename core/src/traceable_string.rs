use crate::line_index::LineIndex;
use crate::{Error, Location, Origin, OriginSegment, Result, SourceId};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A string that knows, for every byte, the `(source, offset)` it came from.
///
/// Origins are kept as a run-length list of [`OriginSegment`]s that exactly
/// partitions `0..len()`: segments are contiguous, non-overlapping, non-empty
/// and sorted. Editing operations (slicing, concatenation, rewriting) produce
/// new values and keep the partition minimal by merging adjacent segments
/// that continue the same source run.
#[derive(Clone)]
pub struct TraceableString {
    content: String,
    segments: Vec<OriginSegment>,
    line_index: OnceCell<LineIndex>,
}

impl TraceableString {
    #[must_use]
    pub fn new() -> Self {
        Self {
            content: String::new(),
            segments: Vec::new(),
            line_index: OnceCell::new(),
        }
    }

    /// A traceable string whose every byte originated at `source`, starting
    /// at byte `offset` there.
    pub fn from_source(content: impl Into<String>, source: SourceId, offset: usize) -> Self {
        let content = content.into();
        let mut segments = Vec::new();
        if !content.is_empty() {
            segments.push(OriginSegment::new(0, content.len(), Some(source), offset));
        }
        Self {
            content,
            segments,
            line_index: OnceCell::new(),
        }
    }

    /// Text injected by a rule, with no authoring source.
    pub fn generated(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut segments = Vec::new();
        if !content.is_empty() {
            segments.push(OriginSegment::new(0, content.len(), None, 0));
        }
        Self {
            content,
            segments,
            line_index: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn segments(&self) -> &[OriginSegment] {
        &self.segments
    }

    pub fn byte(&self, index: usize) -> Result<u8> {
        self.content
            .as_bytes()
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.len(),
            })
    }

    /// The sub-string `range`, with the parent's segments clipped to the
    /// range and their offsets rebased.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        let Range { start, end } = range;
        if end > self.len() {
            return Err(Error::IndexOutOfRange {
                index: end,
                len: self.len(),
            });
        }
        if start > end {
            return Err(Error::IndexOutOfRange {
                index: start,
                len: self.len(),
            });
        }
        // rejects ranges that split a multi-byte character
        let content = self.content.get(start..end).ok_or(Error::IndexOutOfRange {
            index: start,
            len: self.len(),
        })?;
        let mut segments = Vec::new();
        for segment in &self.segments {
            if segment.end <= start {
                continue;
            }
            if segment.begin >= end {
                break;
            }
            let begin = segment.begin.max(start);
            let clipped_end = segment.end.min(end);
            segments.push(OriginSegment::new(
                begin - start,
                clipped_end - start,
                segment.source.clone(),
                segment.offset + (begin - segment.begin),
            ));
        }
        Ok(Self {
            content: content.to_owned(),
            segments,
            line_index: OnceCell::new(),
        })
    }

    /// Appends `other`, merging the segments at the seam when they continue
    /// the same source run.
    pub fn append(&mut self, other: &TraceableString) {
        if other.is_empty() {
            return;
        }
        let shift = self.content.len();
        self.content.push_str(&other.content);
        for segment in &other.segments {
            self.push_segment(OriginSegment::new(
                segment.begin + shift,
                segment.end + shift,
                segment.source.clone(),
                segment.offset,
            ));
        }
        self.line_index = OnceCell::new();
    }

    #[must_use]
    pub fn concat(&self, other: &TraceableString) -> Self {
        let mut result = self.clone();
        result.append(other);
        result
    }

    fn push_segment(&mut self, segment: OriginSegment) {
        debug_assert!(!segment.is_empty());
        if let Some(last) = self.segments.last_mut() {
            debug_assert_eq!(last.end, segment.begin);
            if last.abuts(&segment) {
                *last = OriginSegment::new(last.begin, segment.end, last.source.clone(), last.offset);
                return;
            }
        }
        self.segments.push(segment);
    }

    /// Where the byte at `index` came from.
    pub fn get_origin(&self, index: usize) -> Result<Origin> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let i = self.segments.partition_point(|segment| segment.end <= index);
        let segment = self.segments.get(i).ok_or(Error::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        Ok(Origin {
            source: segment.source.clone(),
            offset: segment.offset + (index - segment.begin),
        })
    }

    /// Where the byte at zero-based `(line, column)` of the flat text came
    /// from.
    pub fn get_origin_of_line(&self, line: usize, column: usize) -> Result<Origin> {
        let index = self
            .line_index()
            .offset(line, column)
            .ok_or(Error::IndexOutOfRange {
                index: self.len(),
                len: self.len(),
            })?;
        self.get_origin(index)
    }

    /// Zero-based `(line, column)` of a byte offset of the flat text. The
    /// end-of-text position is allowed.
    pub fn line_column(&self, offset: usize) -> Result<(usize, usize)> {
        if offset > self.len() {
            return Err(Error::IndexOutOfRange {
                index: offset,
                len: self.len(),
            });
        }
        Ok(self.line_index().line_column(offset))
    }

    /// Diagnostic position of a byte: originating source plus flat-text
    /// line/column.
    pub fn location(&self, offset: usize) -> Result<Location> {
        let origin = self.get_origin(offset)?;
        let (line, column) = self.line_column(offset)?;
        Ok(Location {
            source: origin.source,
            line,
            column,
        })
    }

    fn line_index(&self) -> &LineIndex {
        self.line_index
            .get_or_init(|| LineIndex::new(&self.content))
    }

    /// The JSON envelope: `content` plus the segment list, with the source
    /// named `origin` at the wire boundary.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let origins = self
            .segments
            .iter()
            .map(|segment| {
                serde_json::json!({
                    "begin": segment.begin,
                    "end": segment.end,
                    "origin": segment.source.as_ref().map(SourceId::as_str),
                    "offset": segment.offset,
                })
            })
            .collect::<Vec<_>>();
        serde_json::json!({
            "content": self.content,
            "origins": origins,
        })
    }

    /// Inverse of [`to_json`](Self::to_json). Zero-length segments are
    /// dropped and mergeable neighbors coalesced; anything else that violates
    /// the partition invariants is rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let envelope: Envelope = serde_json::from_value(value.clone())
            .map_err(|error| Error::MalformedEnvelope(error.to_string()))?;
        let mut result = Self {
            content: envelope.content,
            segments: Vec::new(),
            line_index: OnceCell::new(),
        };
        let mut covered = 0;
        for segment in envelope.origins {
            if segment.end < segment.begin {
                return Err(Error::MalformedEnvelope(format!(
                    "segment ends at {} before it begins at {}",
                    segment.end, segment.begin
                )));
            }
            if segment.begin == segment.end {
                continue;
            }
            if segment.begin != covered {
                return Err(Error::MalformedEnvelope(format!(
                    "segment begins at {} where {covered} was expected",
                    segment.begin
                )));
            }
            result.push_segment(OriginSegment::new(
                segment.begin,
                segment.end,
                segment.origin.map(SourceId::new),
                segment.offset,
            ));
            covered = segment.end;
        }
        if covered != result.content.len() {
            return Err(Error::MalformedEnvelope(format!(
                "segments cover {covered} of {} content bytes",
                result.content.len()
            )));
        }
        Ok(result)
    }
}

impl Default for TraceableString {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TraceableString {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content && self.segments == other.segments
    }
}

impl Eq for TraceableString {}

impl fmt::Display for TraceableString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl fmt::Debug for TraceableString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceableString")
            .field("content", &self.content)
            .field("segments", &self.segments)
            .finish()
    }
}

/// Wire form of the envelope. The source of a segment is called `origin` at
/// this boundary.
#[derive(Deserialize, Serialize)]
struct Envelope {
    content: String,
    origins: Vec<WireSegment>,
}

#[derive(Deserialize, Serialize)]
struct WireSegment {
    begin: usize,
    end: usize,
    origin: Option<String>,
    offset: usize,
}
