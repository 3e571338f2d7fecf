//! Timestamp and size parsing
//!
//! The storage service speaks integer UTC microseconds and plain byte
//! counts; users speak ISO-8601 and "100Gb". These helpers convert between
//! the two, failing with `Error::Parse` carrying the exact offending input.

use jiff::Timestamp;

use crate::error::{Error, Result};

/// Recognized size suffixes, decimal powers of 1000.
const UNITS: [(&str, u64); 4] = [
    ("Kb", 1_000),
    ("Mb", 1_000_000),
    ("Gb", 1_000_000_000),
    ("Tb", 1_000_000_000_000),
];

/// Parse an ISO-8601 timestamp into UTC microseconds since the epoch.
///
/// Fractional seconds are optional; the UTC offset is required, either
/// explicit (`+02:00`) or the `Z` designator. The result is always
/// normalized to UTC regardless of the input offset.
pub fn parse_timestamp(input: &str) -> Result<i64> {
    let ts: Timestamp = input
        .parse()
        .map_err(|_| Error::Parse(input.to_string()))?;
    Ok(ts.as_microsecond())
}

/// Parse a human-friendly size like `100Gb` or `1.5Mb` into bytes.
///
/// The magnitude may be an integer or a float; the suffix must be one of
/// `B`, `Kb`, `Mb`, `Gb`, `Tb` (decimal, not binary).
pub fn parse_size(input: &str) -> Result<u64> {
    let parse_magnitude = |s: &str| -> Result<f64> {
        let value: f64 = s.parse().map_err(|_| Error::Parse(input.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(Error::Parse(input.to_string()));
        }
        Ok(value)
    };

    for (suffix, multiplier) in UNITS {
        if let Some(magnitude) = input.strip_suffix(suffix) {
            let value = parse_magnitude(magnitude)?;
            return Ok((value * multiplier as f64).round() as u64);
        }
    }

    if let Some(magnitude) = input.strip_suffix('B') {
        let value = parse_magnitude(magnitude)?;
        return Ok(value.round() as u64);
    }

    Err(Error::Parse(input.to_string()))
}

/// Format UTC microseconds as `YYYY-MM-DDTHH:MM:SS` for display.
pub fn format_timestamp(micros: i64) -> String {
    match Timestamp::from_microsecond(micros) {
        Ok(ts) => ts.strftime("%Y-%m-%dT%H:%M:%S").to_string(),
        Err(_) => micros.to_string(),
    }
}

/// Format a byte count for display, decimal units.
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::DECIMAL)
}
