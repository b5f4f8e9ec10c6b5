use secular::lower_lay_string;

/// Folds away diacritics and case so that "Beyoncé" and "beyonce"
/// compare as identical.
fn fold(text: &str) -> String {
    lower_lay_string(text).to_lowercase()
}

/// Normalized Levenshtein similarity over diacritic-folded,
/// case-insensitive text. Returns a value in `[0.0, 1.0]`; two empty
/// strings are identical. Pure and deterministic.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = fold(a);
    let b = fold(b);
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    strsim::normalized_levenshtein(&a, &b)
}
