use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static METADATA_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<key>[a-zA-Z]+):(?P<value>.*)\]$")
        .expect("failed to compile METADATA_TAG_REGEX")
});

/// Collapses interior whitespace runs and trims the ends.
#[must_use]
pub fn normalize_text_whitespace(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    trimmed.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Stores `[key:value]` tags whose key is purely alphabetic. Returns
/// whether the line was consumed as metadata. Repeated keys keep the
/// last value.
pub fn parse_and_store_metadata(line: &str, metadata: &mut HashMap<String, String>) -> bool {
    if let Some(caps) = METADATA_TAG_REGEX.captures(line)
        && let (Some(key), Some(value)) = (caps.name("key"), caps.name("value"))
    {
        metadata.insert(
            key.as_str().to_string(),
            normalize_text_whitespace(value.as_str()),
        );
        return true;
    }
    false
}

/// Converts the components of an `mm:ss.fff` tag to milliseconds.
/// The fraction is optional and may be 2 (centiseconds) or 3 digits.
/// Returns `None` for out-of-range seconds.
pub fn timestamp_to_ms(minutes: &str, seconds: &str, fraction: Option<&str>) -> Option<u64> {
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    let milliseconds = match fraction {
        Some(f) if f.len() == 2 => f.parse::<u64>().ok()? * 10,
        Some(f) => f.parse::<u64>().ok()?,
        None => 0,
    };
    Some((minutes * 60 + seconds) * 1000 + milliseconds)
}
