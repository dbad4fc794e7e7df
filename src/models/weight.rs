//! Body weight samples.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One weigh-in, stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightSample {
    pub account_id: u64,
    pub weight_kg: f64,
    /// Calendar date ("YYYY-MM-DD")
    pub date: NaiveDate,
}

/// Most recent sample by date.
///
/// Samples sharing the latest date resolve to the last one in iteration
/// order (i.e. the last row found).
pub fn latest_sample<'a, I>(samples: I) -> Option<&'a WeightSample>
where
    I: IntoIterator<Item = &'a WeightSample>,
{
    samples.into_iter().fold(None, |best, sample| match best {
        Some(current) if current.date > sample.date => Some(current),
        _ => Some(sample),
    })
}
