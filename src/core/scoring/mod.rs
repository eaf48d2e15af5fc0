//! Provider-level scoring of EMR exports
//!
//! A score buckets the rows of one export by a field (typically the enrolled
//! provider). Two scores, e.g. patients meeting a measure over all enrolled
//! patients, are combined into per-provider ratios with [`summarize`].

pub mod score;
pub mod summary;

pub use score::{calc_score, Score};
pub use summary::{summarize, RatioLine};
