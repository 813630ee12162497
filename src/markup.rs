//! Reply markup
//!
//! Replies use two conventions only: `**bold**` spans and `\n` line breaks.
//! An unpaired `**` is kept as literal text.

use serde::Serialize;

const BOLD_MARKER: &str = "**";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Line {
    pub segments: Vec<Segment>,
}

impl Line {
    /// Text with the markers removed
    pub fn plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

pub fn parse(text: &str) -> Vec<Line> {
    text.split('\n').map(parse_line).collect()
}

fn parse_line(line: &str) -> Line {
    let mut segments = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find(BOLD_MARKER) {
        let after_open = &rest[open + BOLD_MARKER.len()..];
        let Some(close) = after_open.find(BOLD_MARKER) else {
            break;
        };

        push_segment(&mut segments, &rest[..open], false);
        push_segment(&mut segments, &after_open[..close], true);
        rest = &after_open[close + BOLD_MARKER.len()..];
    }

    push_segment(&mut segments, rest, false);

    Line { segments }
}

fn push_segment(segments: &mut Vec<Segment>, text: &str, bold: bool) {
    if text.is_empty() {
        return;
    }
    segments.push(Segment {
        text: text.to_string(),
        bold,
    });
}
