//! Ratio summaries between two scores

use super::score::Score;
use serde::Serialize;
use std::fmt;

/// Numerator over denominator for one key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioLine {
    /// Bucket key (lower-cased field value)
    pub key: String,

    /// Size of the numerator bucket, zero if absent
    pub numerator: usize,

    /// Size of the denominator bucket
    pub denominator: usize,

    /// `numerator / denominator`, `None` when the denominator is zero
    pub ratio: Option<f64>,
}

impl fmt::Display for RatioLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ratio {
            Some(ratio) => write!(
                f,
                "{} : {} / {} = {:.4}",
                self.key, self.numerator, self.denominator, ratio
            ),
            None => write!(
                f,
                "{} : {} / {} = n/a",
                self.key, self.numerator, self.denominator
            ),
        }
    }
}

/// One ratio line per denominator key, in key order
///
/// Count and grouped scores can be mixed; grouped buckets contribute their
/// length.
pub fn summarize(numerator: &Score, denominator: &Score) -> Vec<RatioLine> {
    denominator
        .keys()
        .into_iter()
        .map(|key| {
            let n = numerator.size(key);
            let d = denominator.size(key);
            RatioLine {
                key: key.to_string(),
                numerator: n,
                denominator: d,
                ratio: (d > 0).then(|| n as f64 / d as f64),
            }
        })
        .collect()
}
