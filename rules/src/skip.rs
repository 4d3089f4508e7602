//! Skip blocks: regions the author wants the flattener to drop.

use flachtex_core::{Error, Region, Result, SkipMismatchKind, SkipRule};
use once_cell::sync::Lazy;
use regex::Regex;

pub const SKIP_START: &str = "%%FLACHTEX-SKIP-START";
pub const SKIP_STOP: &str = "%%FLACHTEX-SKIP-STOP";

static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?m)^[ \t]*%%FLACHTEX-SKIP-(?:START|STOP)").unwrap()
});

/// Removes every region between a start and a stop marker, markers included.
/// The newline after the stop marker survives. Blocks do not nest.
pub struct SkipBlocks;

impl SkipRule for SkipBlocks {
    fn name(&self) -> &'static str {
        "skip-blocks"
    }

    fn find(&self, content: &str) -> Result<Vec<Region>> {
        let mut regions = Vec::new();
        let mut open: Option<usize> = None;
        for marker in MARKER_RE.find_iter(content) {
            let is_start = marker.as_str().trim_start() == SKIP_START;
            match (is_start, open) {
                (true, None) => open = Some(marker.start()),
                (true, Some(_)) => {
                    return Err(Error::SkipMismatch {
                        kind: SkipMismatchKind::NestedStart,
                        offset: marker.start(),
                        location: None,
                    });
                }
                (false, Some(begin)) => {
                    regions.push(Region::new(begin, marker.end()));
                    open = None;
                }
                (false, None) => {
                    return Err(Error::SkipMismatch {
                        kind: SkipMismatchKind::StopWithoutStart,
                        offset: marker.start(),
                        location: None,
                    });
                }
            }
        }
        if let Some(begin) = open {
            return Err(Error::SkipMismatch {
                kind: SkipMismatchKind::StartWithoutStop,
                offset: begin,
                location: None,
            });
        }
        Ok(regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_start_and_stop() {
        let content = "X\n%%FLACHTEX-SKIP-START\nHIDE\n%%FLACHTEX-SKIP-STOP\nY";
        let regions = SkipBlocks.find(content).unwrap();
        assert_eq!(regions, vec![Region::new(2, 49)]);
        assert_eq!(&content[49..], "\nY");
    }

    #[test]
    fn markers_may_be_indented() {
        let content = "  %%FLACHTEX-SKIP-START\nx\n\t%%FLACHTEX-SKIP-STOP";
        let regions = SkipBlocks.find(content).unwrap();
        assert_eq!(regions, vec![Region::new(0, content.len())]);
    }

    #[test]
    fn mid_line_markers_are_ignored() {
        let content = "a %%FLACHTEX-SKIP-START b";
        assert_eq!(SkipBlocks.find(content).unwrap(), vec![]);
    }

    #[test]
    fn multiple_blocks() {
        let content = "%%FLACHTEX-SKIP-START\na\n%%FLACHTEX-SKIP-STOP\nkeep\n%%FLACHTEX-SKIP-START\nb\n%%FLACHTEX-SKIP-STOP\n";
        assert_eq!(SkipBlocks.find(content).unwrap().len(), 2);
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let result = SkipBlocks.find("%%FLACHTEX-SKIP-START\nx");
        assert!(matches!(
            result,
            Err(Error::SkipMismatch {
                kind: SkipMismatchKind::StartWithoutStop,
                offset: 0,
                ..
            })
        ));
    }

    #[test]
    fn stray_stop_is_an_error() {
        let result = SkipBlocks.find("x\n%%FLACHTEX-SKIP-STOP\n");
        assert!(matches!(
            result,
            Err(Error::SkipMismatch {
                kind: SkipMismatchKind::StopWithoutStart,
                ..
            })
        ));
    }

    #[test]
    fn nested_start_is_an_error() {
        let content = "%%FLACHTEX-SKIP-START\n%%FLACHTEX-SKIP-START\n%%FLACHTEX-SKIP-STOP\n";
        assert!(matches!(
            SkipBlocks.find(content),
            Err(Error::SkipMismatch {
                kind: SkipMismatchKind::NestedStart,
                ..
            })
        ));
    }
}
