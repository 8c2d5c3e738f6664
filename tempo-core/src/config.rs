//! Configuration helpers shared by the driver option structs.
//!
//! Every option struct derives `serde::Deserialize` with `#[serde(default)]`,
//! so a partial document such as `{"stiffness": 0.3}` fills the remaining
//! fields from defaults. Durations are written as milliseconds: an integer
//! for whole milliseconds, a float when there is a sub-millisecond part.

use std::time::Duration;

use crate::error::{Error, Result};

/// Serde adapter storing a [`Duration`] as milliseconds.
///
/// Whole milliseconds are written as integers and anything finer as a float,
/// so sub-millisecond durations survive a round trip. Either form is read.
pub mod duration_ms {
    use std::time::Duration;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.subsec_nanos() % 1_000_000 == 0 {
            serializer.serialize_u64(value.as_millis() as u64)
        } else {
            serializer.serialize_f64(super::as_ms(*value))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = f64::deserialize(deserializer)?;
        if !ms.is_finite() || ms < 0.0 {
            return Err(D::Error::custom(format!(
                "duration must be finite and non-negative, got {ms}"
            )));
        }
        Ok(super::from_ms(ms))
    }
}

/// Convert a duration to host milliseconds.
pub(crate) fn as_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Convert host milliseconds to a duration, clamping negatives to zero.
pub(crate) fn from_ms(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_nanos((ms * 1_000_000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

/// Reject non-finite or non-positive values.
pub(crate) fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            reason: format!("must be finite and positive, got {value}"),
        })
    }
}

/// Reject non-finite or negative values.
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig {
            field,
            reason: format!("must be finite and non-negative, got {value}"),
        })
    }
}

/// Reject a zero-length period.
pub(crate) fn non_zero(field: &'static str, value: Duration) -> Result<()> {
    if value.is_zero() {
        Err(Error::InvalidConfig {
            field,
            reason: "must be longer than zero".into(),
        })
    } else {
        Ok(())
    }
}
