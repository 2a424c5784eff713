//! Calendar-month time bucketing
//!
//! Feature values are aggregated per entity per calendar month. A bucket
//! covering month M is stamped at the first instant of month M+1: the
//! moment every event in the bucket is known. As-of joins against these
//! stamps therefore never see a bucket whose month is still open.

use chrono::{DateTime, Datelike, TimeZone, Utc};

/// Absolute month index of a timestamp (year * 12 + zero-based month)
pub fn month_index(ts: DateTime<Utc>) -> i32 {
    ts.year() * 12 + ts.month0() as i32
}

/// Timestamp a bucket's feature row carries: the first instant of the
/// month after the bucket.
pub fn bucket_stamp(index: i32) -> DateTime<Utc> {
    let next = index + 1;
    let year = next.div_euclid(12);
    let month = next.rem_euclid(12) as u32 + 1;
    // First day of a valid month is always a single, unambiguous instant
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .expect("first of month is a valid UTC instant")
}
