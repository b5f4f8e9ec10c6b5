//! Pure time-to-line and time-to-progress queries against parsed
//! lyrics. Both operations rely on the parser's guarantee that lines
//! are sorted by `start_ms`.

use crate::model::{LyricLine, LyricsData};

/// Fallback window for the last line when nothing bounds its end.
const DEFAULT_LINE_DURATION_MS: u64 = 5000;

/// Index of the last line starting at or before `time_ms`, or `None`
/// when playback has not reached the first line yet. O(log N).
#[must_use]
pub fn find_line_index(data: &LyricsData, time_ms: u64) -> Option<usize> {
    let upper = data.lines.partition_point(|line| line.start_ms <= time_ms);
    upper.checked_sub(1)
}

/// Fraction of `line` elapsed at `time_ms`, in `[0.0, 1.0]`.
///
/// The line ends where the next line starts; without a next line, at the
/// end of its last timed syllable, or after a 5 s window. Returns 1.0
/// when the computed end does not lie after the line start.
#[must_use]
pub fn line_progress(line: &LyricLine, next_line: Option<&LyricLine>, time_ms: u64) -> f64 {
    let end_ms = next_line.map_or_else(
        || {
            line.syllables.last().map_or(
                line.start_ms + DEFAULT_LINE_DURATION_MS,
                |syllable| line.start_ms + syllable.start_ms + syllable.duration_ms,
            )
        },
        |next| next.start_ms,
    );

    if end_ms <= line.start_ms {
        return 1.0;
    }
    let elapsed = time_ms.saturating_sub(line.start_ms) as f64;
    (elapsed / (end_ms - line.start_ms) as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Syllable;

    fn data(times: &[u64]) -> LyricsData {
        LyricsData {
            lines: times
                .iter()
                .map(|&start_ms| LyricLine {
                    start_ms,
                    text: format!("line at {start_ms}"),
                    ..Default::default()
                })
                .collect(),
            metadata: std::collections::HashMap::new(),
        }
    }

    #[test]
    fn lookup_walks_the_boundaries() {
        let data = data(&[1000, 2000, 3000]);

        assert_eq!(find_line_index(&data, 0), None);
        assert_eq!(find_line_index(&data, 999), None);
        assert_eq!(find_line_index(&data, 1000), Some(0));
        assert_eq!(find_line_index(&data, 1500), Some(0));
        assert_eq!(find_line_index(&data, 2999), Some(1));
        assert_eq!(find_line_index(&data, 3000), Some(2));
        assert_eq!(find_line_index(&data, 5000), Some(2));
    }

    #[test]
    fn lookup_on_empty_lyrics_is_none() {
        assert_eq!(find_line_index(&data(&[]), 1000), None);
    }

    #[test]
    fn progress_between_lines() {
        let data = data(&[1000, 2000, 3000]);

        let progress = line_progress(&data.lines[0], Some(&data.lines[1]), 1500);
        assert!((progress - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn progress_clamps_outside_the_line() {
        let data = data(&[1000, 2000]);

        assert!(line_progress(&data.lines[0], Some(&data.lines[1]), 500).abs() < f64::EPSILON);
        assert!(
            (line_progress(&data.lines[0], Some(&data.lines[1]), 9999) - 1.0).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn last_line_uses_syllable_timing_when_present() {
        let line = LyricLine {
            start_ms: 1000,
            text: "Hello".to_string(),
            syllables: vec![
                Syllable {
                    start_ms: 0,
                    duration_ms: 500,
                    text: "He".to_string(),
                },
                Syllable {
                    start_ms: 500,
                    duration_ms: 500,
                    text: "llo".to_string(),
                },
            ],
            layer: 0,
        };

        // Line spans 1000..2000 via its syllables.
        assert!((line_progress(&line, None, 1500) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn last_line_without_syllables_gets_a_five_second_window() {
        let line = LyricLine {
            start_ms: 1000,
            text: "tail".to_string(),
            ..Default::default()
        };

        assert!((line_progress(&line, None, 3500) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_end_reports_complete() {
        let line = LyricLine {
            start_ms: 1000,
            ..Default::default()
        };
        let next = LyricLine {
            start_ms: 1000,
            ..Default::default()
        };

        assert!((line_progress(&line, Some(&next), 1000) - 1.0).abs() < f64::EPSILON);
    }
}
