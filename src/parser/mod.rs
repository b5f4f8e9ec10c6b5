//! Parsers for the LRC family of time-coded lyric texts.
//!
//! [`parse_lrc`] handles standard line-timed LRC; [`parse_enhanced_lrc`]
//! additionally slices inline `<mm:ss.xx>` markers into per-syllable
//! timing and degrades to the standard behavior when no markers exist.
//! Both are fail-soft: malformed lines are skipped, never fatal.

mod enhanced_lrc_parser;
mod lrc_parser;
pub(crate) mod utils;

pub use enhanced_lrc_parser::parse_enhanced_lrc;
pub use lrc_parser::parse_lrc;
