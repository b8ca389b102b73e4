//! OHLC bucketing of fee samples

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::GasSample;

/// Default candle width used by consumers (15 minutes)
pub const DEFAULT_OHLC_INTERVAL_MS: u64 = 15 * 60 * 1000;

/// Open/high/low/close of total fee over one interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBucket {
    pub bucket_start: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub samples: usize,
}

impl OhlcBucket {
    fn open_with(bucket_start: u64, fee: f64) -> Self {
        Self {
            bucket_start,
            open: fee,
            high: fee,
            low: fee,
            close: fee,
            samples: 1,
        }
    }

    fn push(&mut self, fee: f64) {
        self.high = self.high.max(fee);
        self.low = self.low.min(fee);
        self.close = fee;
        self.samples += 1;
    }

    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Group samples into `interval_ms`-wide buckets.
///
/// Open and close follow position in `samples`, not timestamp order, and
/// buckets come out in the order their first sample appears. A zero interval
/// yields no buckets.
pub fn bucketize(samples: &[GasSample], interval_ms: u64) -> Vec<OhlcBucket> {
    if interval_ms == 0 {
        return Vec::new();
    }

    let mut buckets: Vec<OhlcBucket> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for sample in samples {
        let bucket_start = sample.timestamp() / interval_ms * interval_ms;
        let fee = sample.total_fee();

        match index.get(&bucket_start) {
            Some(&i) => buckets[i].push(fee),
            None => {
                index.insert(bucket_start, buckets.len());
                buckets.push(OhlcBucket::open_with(bucket_start, fee));
            }
        }
    }

    buckets
}
