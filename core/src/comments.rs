//! LaTeX line-comment removal.
//!
//! Removes every maximal run from an un-escaped `%` up to, but not
//! including, the next newline. The newline stays: dropping it would change
//! how LaTeX tokenizes the neighboring lines. Realized as disjoint region
//! removals over the traceable string, so provenance of the surviving
//! characters is untouched.

use crate::rewriter::{apply_edits, Edit};
use crate::rules::Region;
use crate::{Result, TraceableString};

/// Comments beginning with this prefix are directives, not prose; they
/// survive comment removal so the expander still sees them.
pub const MARKER_PREFIX: &str = "%%FLACHTEX-";

pub fn remove_comments(ts: &TraceableString) -> Result<TraceableString> {
    let edits = comment_regions(ts.as_str())
        .into_iter()
        .map(|region| Edit {
            region,
            rule: "comments",
            replacement: TraceableString::new(),
        })
        .collect();
    apply_edits(ts, edits)
}

fn comment_regions(content: &str) -> Vec<Region> {
    let bytes = content.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' || is_escaped(bytes, i) {
            i += 1;
            continue;
        }
        let end = bytes[i..]
            .iter()
            .position(|&byte| byte == b'\n')
            .map_or(bytes.len(), |n| i + n);
        if !content[i..end].starts_with(MARKER_PREFIX) {
            regions.push(Region::new(i, end));
        }
        i = end + 1;
    }
    regions
}

/// Left-scan parity: a `%` is escaped iff an odd number of backslashes
/// immediately precedes it.
fn is_escaped(bytes: &[u8], index: usize) -> bool {
    let mut backslashes = 0;
    while backslashes < index && bytes[index - 1 - backslashes] == b'\\' {
        backslashes += 1;
    }
    backslashes % 2 == 1
}
