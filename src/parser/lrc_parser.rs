use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::utils::{normalize_text_whitespace, parse_and_store_metadata, timestamp_to_ms};
use crate::model::LyricsData;
use crate::model::LyricLine;

static LRC_TIMESTAMP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{1,3}):(\d{2})(?:[.:](\d{2,3}))?\]")
        .expect("failed to compile LRC_TIMESTAMP_REGEX")
});

/// Lines whose timestamps are within this distance share a layer group.
const LAYER_GROUP_TOLERANCE_MS: u64 = 1;

struct TempLrcEntry {
    timestamp_ms: u64,
    text: String,
}

/// Parses standard LRC text into a [`LyricsData`].
///
/// `[key:value]` tags with an alphabetic key become metadata. Every
/// timestamp on a lyric line emits one entry carrying the tag-stripped
/// text, so `[00:10.00][01:10.00]chorus` repeats at both times. Entries
/// are sorted by time, and entries landing on the same instant are
/// stacked as layers 0, 1, …
///
/// Never fails: malformed lines are skipped with a warning.
#[must_use]
pub fn parse_lrc(content: &str) -> LyricsData {
    let mut entries: Vec<TempLrcEntry> = Vec::new();
    let mut metadata = HashMap::new();

    for (line_num, line_str) in content.lines().enumerate() {
        let line_str = line_str.trim();
        if line_str.is_empty() {
            continue;
        }

        let timestamps: Vec<u64> = LRC_TIMESTAMP_REGEX
            .captures_iter(line_str)
            .filter_map(|caps| {
                let ms = timestamp_to_ms(
                    &caps[1],
                    &caps[2],
                    caps.get(3).map(|m| m.as_str()),
                );
                if ms.is_none() {
                    tracing::warn!(line = line_num + 1, "invalid seconds in LRC timestamp");
                }
                ms
            })
            .collect();

        if timestamps.is_empty() {
            // No time tag on this line, so it may be a metadata tag.
            // Anything else is noise and is skipped.
            parse_and_store_metadata(line_str, &mut metadata);
            continue;
        }

        let text = normalize_text_whitespace(&LRC_TIMESTAMP_REGEX.replace_all(line_str, ""));
        for timestamp_ms in timestamps {
            entries.push(TempLrcEntry {
                timestamp_ms,
                text: text.clone(),
            });
        }
    }

    entries.sort_by_key(|e| e.timestamp_ms);

    LyricsData {
        lines: assign_layers(entries),
        metadata,
    }
}

/// Stacks entries sharing a timestamp (within 1 ms) as layers 0, 1, …
fn assign_layers(entries: Vec<TempLrcEntry>) -> Vec<LyricLine> {
    let mut lines: Vec<LyricLine> = Vec::with_capacity(entries.len());
    let mut group_start_ms = 0u64;
    let mut layer = 0u32;

    for (i, entry) in entries.into_iter().enumerate() {
        if i == 0 || entry.timestamp_ms - group_start_ms > LAYER_GROUP_TOLERANCE_MS {
            group_start_ms = entry.timestamp_ms;
            layer = 0;
        } else {
            layer += 1;
        }
        lines.push(LyricLine {
            start_ms: entry.timestamp_ms,
            text: entry.text,
            syllables: Vec::new(),
            layer,
        });
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_metadata_and_lines() {
        let data = parse_lrc("[ti:Test]\n[ar:T]\n[00:01.00]A\n[00:02.50]B");

        assert_eq!(data.metadata.get("ti").map(String::as_str), Some("Test"));
        assert_eq!(data.metadata.get("ar").map(String::as_str), Some("T"));
        assert_eq!(data.lines.len(), 2);
        assert_eq!(data.lines[0].start_ms, 1000);
        assert_eq!(data.lines[0].text, "A");
        assert_eq!(data.lines[0].layer, 0);
        assert_eq!(data.lines[1].start_ms, 2500);
        assert_eq!(data.lines[1].text, "B");
        assert_eq!(data.lines[1].layer, 0);
    }

    #[test]
    fn identical_timestamps_become_layers() {
        let data = parse_lrc("[00:01.00]O\n[00:01.00]T");

        assert_eq!(data.lines.len(), 2);
        assert_eq!(data.lines[0].start_ms, 1000);
        assert_eq!(data.lines[1].start_ms, 1000);
        assert_eq!(data.lines[0].layer, 0);
        assert_eq!(data.lines[1].layer, 1);
        assert_eq!(data.lines[0].text, "O");
        assert_eq!(data.lines[1].text, "T");
    }

    #[test]
    fn repeated_timestamps_duplicate_the_line() {
        let data = parse_lrc("[00:10.00][01:10.00]chorus\n[00:30.00]verse");

        let times: Vec<u64> = data.lines.iter().map(|l| l.start_ms).collect();
        assert_eq!(times, vec![10_000, 30_000, 70_000]);
        assert_eq!(data.lines[0].text, "chorus");
        assert_eq!(data.lines[2].text, "chorus");
    }

    #[test]
    fn output_is_sorted_by_start_time() {
        let data = parse_lrc("[00:30.00]late\n[00:01.00]early\n[00:15.00]middle");

        let times: Vec<u64> = data.lines.iter().map(|l| l.start_ms).collect();
        let mut sorted = times.clone();
        sorted.sort_unstable();
        assert_eq!(times, sorted);
    }

    #[test]
    fn layers_are_contiguous_from_zero() {
        let data = parse_lrc("[00:01.00]a\n[00:01.00]b\n[00:01.00]c\n[00:05.00]d");

        let layers: Vec<u32> = data.lines.iter().map(|l| l.layer).collect();
        assert_eq!(layers, vec![0, 1, 2, 0]);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let data = parse_lrc("not a lyric line\n[00:99.00]bad seconds\n[00:01.00]good");

        assert_eq!(data.lines.len(), 1);
        assert_eq!(data.lines[0].text, "good");
    }

    #[test]
    fn no_timestamps_yields_metadata_only() {
        let data = parse_lrc("[ti:Only Tags]\nplain text");

        assert!(data.lines.is_empty());
        assert_eq!(
            data.metadata.get("ti").map(String::as_str),
            Some("Only Tags")
        );
    }

    #[test]
    fn three_digit_fractions_and_colon_separator() {
        let data = parse_lrc("[00:01.500]a\n[00:02:25]b");

        assert_eq!(data.lines[0].start_ms, 1500);
        assert_eq!(data.lines[1].start_ms, 2250);
    }

    #[test]
    fn empty_text_entries_are_kept_as_end_markers() {
        let data = parse_lrc("[00:01.00]sung\n[00:05.00]");

        assert_eq!(data.lines.len(), 2);
        assert_eq!(data.lines[1].text, "");
    }
}
