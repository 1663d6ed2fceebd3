use chrono::{DateTime, SecondsFormat, Utc};

/// Floors a possibly fractional epoch-seconds value. Non-finite input maps to 0.
pub fn floor_epoch_seconds(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let floored = value.floor();
    if floored >= i64::MAX as f64 {
        i64::MAX
    } else if floored <= i64::MIN as f64 {
        i64::MIN
    } else {
        floored as i64
    }
}

/// Renders epoch seconds as an ISO-8601 UTC string with millisecond precision,
/// e.g. `2021-01-01T00:00:00.000Z`. Out-of-range values render as the epoch.
pub fn format_timestamp(epoch_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch_seconds, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
