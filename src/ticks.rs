//! Tick arithmetic: 100ns units since `0001-01-01T00:00:00Z`.
//!
//! Matches the historical `DateTime.Ticks` convention of the time-series
//! platform this adapter feeds; keeping the same epoch means timestamps
//! round-trip through the downstream bus without translation.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub type Ticks = i64;

pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks between `0001-01-01T00:00:00Z` and the Unix epoch.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

pub fn now() -> Ticks {
    from_datetime(Utc::now())
}

pub fn from_datetime(dt: DateTime<Utc>) -> Ticks {
    let unix_ticks = dt.timestamp() * TICKS_PER_SECOND
        + (dt.timestamp_subsec_nanos() as i64) / 100;
    unix_ticks + UNIX_EPOCH_TICKS
}

pub fn to_datetime(ticks: Ticks) -> DateTime<Utc> {
    let unix_ticks = ticks - UNIX_EPOCH_TICKS;
    let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
    let rem_ticks = unix_ticks.rem_euclid(TICKS_PER_SECOND);
    Utc.timestamp_opt(secs, (rem_ticks * 100) as u32)
        .single()
        .unwrap_or_else(|| epoch())
}

fn epoch() -> DateTime<Utc> {
    Utc.from_utc_datetime(&NaiveDate::from_ymd_opt(1, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
}

/// Fixed, non-DST-aware standard-time offsets for the handful of zone
/// names this adapter's connection string is documented to carry. Full
/// IANA tz-database fidelity would need `chrono-tz`, which is not part of
/// this crate's dependency stack; see DESIGN.md.
pub fn zone_offset_seconds(zone: &str) -> i32 {
    match zone.to_ascii_uppercase().as_str() {
        "UTC" | "" => 0,
        "US/EASTERN" | "EASTERN" | "EST" => -5 * 3600,
        "US/CENTRAL" | "CENTRAL" | "CST" => -6 * 3600,
        "US/MOUNTAIN" | "MOUNTAIN" | "MST" => -7 * 3600,
        "US/PACIFIC" | "PACIFIC" | "PST" => -8 * 3600,
        _ => {
            log::warn!("unrecognized time zone '{zone}', treating as UTC");
            0
        }
    }
}

/// Converts a frame timestamp expressed in `zone` local time to UTC ticks.
pub fn to_utc(local_ticks: Ticks, zone: &str) -> Ticks {
    let offset_ticks = zone_offset_seconds(zone) as i64 * TICKS_PER_SECOND;
    local_ticks - offset_ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn round_trips_through_datetime() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ticks = from_datetime(dt);
        assert_eq!(to_datetime(ticks), dt);
    }

    #[test]
    fn eastern_offset_matches_scenario_s2() {
        let local = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let local_ticks = from_datetime(local);
        let utc_ticks = to_utc(local_ticks, "US/Eastern");
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap();
        assert_eq!(to_datetime(utc_ticks), expected);
    }

    #[test]
    fn unknown_zone_falls_back_to_utc() {
        assert_eq!(zone_offset_seconds("Mars/Olympus"), 0);
    }
}
