use std::sync::LazyLock;

use regex::Regex;

use super::lrc_parser::parse_lrc;
use super::utils::timestamp_to_ms;
use crate::model::{LyricLine, LyricsData, Syllable};

static SYLLABLE_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(\d{1,3}):(\d{2})(?:[.:](\d{2,3}))?>")
        .expect("failed to compile SYLLABLE_MARKER_REGEX")
});

/// Parses enhanced LRC: standard parsing first, then every line whose
/// text carries inline `<mm:ss.xx>` markers is sliced into syllables.
/// Lines without markers pass through unchanged, so this is a strict
/// superset of [`parse_lrc`].
#[must_use]
pub fn parse_enhanced_lrc(content: &str) -> LyricsData {
    let mut data = parse_lrc(content);
    for line in &mut data.lines {
        slice_syllables(line);
    }
    data
}

struct Marker {
    absolute_ms: u64,
    tag_start: usize,
    tag_end: usize,
}

fn slice_syllables(line: &mut LyricLine) {
    let markers: Vec<Marker> = SYLLABLE_MARKER_REGEX
        .captures_iter(&line.text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let absolute_ms =
                timestamp_to_ms(&caps[1], &caps[2], caps.get(3).map(|m| m.as_str()))?;
            Some(Marker {
                absolute_ms,
                tag_start: whole.start(),
                tag_end: whole.end(),
            })
        })
        .collect();

    if markers.is_empty() {
        return;
    }

    let mut syllables = Vec::with_capacity(markers.len());
    for (i, marker) in markers.iter().enumerate() {
        let next = markers.get(i + 1);
        let text_end = next.map_or(line.text.len(), |n| n.tag_start);
        let text = line.text[marker.tag_end..text_end].to_string();
        // The final syllable's duration is unknown.
        let duration_ms = next.map_or(0, |n| n.absolute_ms.saturating_sub(marker.absolute_ms));

        syllables.push(Syllable {
            start_ms: marker.absolute_ms.saturating_sub(line.start_ms),
            duration_ms,
            text,
        });
    }

    line.text = syllables.iter().map(|s| s.text.as_str()).collect();
    line.syllables = syllables;
}
