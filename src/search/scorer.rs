use std::collections::BTreeSet;

use super::similarity::similarity;
use crate::model::{LyricCandidate, SongInformation};

const TITLE_WEIGHT: f64 = 40.0;
const ARTIST_WEIGHT: f64 = 30.0;
const ALBUM_WEIGHT: f64 = 20.0;

/// Jaccard scores above this are trusted without the fuzzy fallback.
const JACCARD_FALLBACK_THRESHOLD: f64 = 0.5;

/// Composite relevance of a candidate for a target track.
///
/// Title, artist, and album contribute weighted similarity; the duration
/// delta adds a graduated bonus or penalty. The score is computed for
/// the target's own title/artists and for every alias pair attached by
/// the query resolver, and the best pairing wins.
#[must_use]
pub fn score_candidate(target: &SongInformation, candidate: &LyricCandidate) -> i32 {
    let mut best = pair_score(target, &target.title, &target.artists, candidate);

    if let Some(aliases) = &target.search_aliases {
        for title in &aliases.titles {
            best = best.max(pair_score(target, title, &target.artists, candidate));
        }
        for artist in &aliases.artists {
            let artist = std::slice::from_ref(artist);
            best = best.max(pair_score(target, &target.title, artist, candidate));
            for title in &aliases.titles {
                best = best.max(pair_score(target, title, artist, candidate));
            }
        }
    }

    best.round() as i32
}

fn pair_score(
    target: &SongInformation,
    title: &str,
    artists: &[String],
    candidate: &LyricCandidate,
) -> f64 {
    let mut score = similarity(title, &candidate.title) * TITLE_WEIGHT;
    score += artist_score(artists, &candidate.artist) * ARTIST_WEIGHT;

    if !target.album.is_empty() && !candidate.album.is_empty() {
        score += similarity(&target.album, &candidate.album) * ALBUM_WEIGHT;
    }
    if target.duration_ms > 0 && candidate.duration_ms > 0 {
        score += duration_score(target.duration_ms.abs_diff(candidate.duration_ms));
    }
    score
}

/// Graduated bonus/penalty for the absolute duration delta.
fn duration_score(delta_ms: u64) -> f64 {
    match delta_ms {
        0..=1000 => 10.0,
        1001..=3000 => 7.0,
        3001..=5000 => 4.0,
        5001..=10_000 => 0.0,
        10_001..=20_000 => -5.0,
        _ => -10.0,
    }
}

fn artist_tokens(text: &str) -> BTreeSet<String> {
    text.replace(['&', '/'], ",")
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::to_lowercase)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Compares the target artist list against a candidate's single artist
/// string. Token-set inclusion in either direction is a perfect match;
/// otherwise Jaccard overlap, falling back to fuzzy whole-string
/// similarity when the overlap is weak.
fn artist_score(target_artists: &[String], candidate_artist: &str) -> f64 {
    let target_joined = target_artists.join(" ");
    let target = artist_tokens(&target_joined);
    let candidate = artist_tokens(candidate_artist);

    if target.is_subset(&candidate) || candidate.is_subset(&target) {
        return 1.0;
    }

    let intersection = target.intersection(&candidate).count();
    let union = target.union(&candidate).count();
    let jaccard = intersection as f64 / union as f64;

    if jaccard <= JACCARD_FALLBACK_THRESHOLD {
        jaccard.max(similarity(&target_joined, candidate_artist))
    } else {
        jaccard
    }
}
