//! farsisub - SRT Translation into Persian
//!
//! Parses SubRip subtitles, sends them in chunks to a text-generation API for
//! translation and rewrites every caption line so right-to-left text renders
//! correctly in common media players.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod translate;
pub mod subtitle;
pub mod prompt;
pub mod bidi;
pub mod error;
