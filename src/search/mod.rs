//! Fuzzy text similarity and the composite candidate scorer.

mod scorer;
mod similarity;

pub use scorer::score_candidate;
pub use similarity::similarity;
