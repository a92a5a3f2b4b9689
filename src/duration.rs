use std::time::Duration;

use crate::error::DelayError;

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Anything a [`Delay`](crate::Delay) can be started with.
///
/// Plain integers are milliseconds. Strings take the form `<number><unit>`
/// where the unit is one of `s`, `m`, `h` or `d`.
pub trait IntoDelayDuration {
    fn into_delay_duration(self) -> Result<Duration, DelayError>;
}

impl IntoDelayDuration for u64 {
    fn into_delay_duration(self) -> Result<Duration, DelayError> {
        Ok(Duration::from_millis(self))
    }
}

impl IntoDelayDuration for u32 {
    fn into_delay_duration(self) -> Result<Duration, DelayError> {
        Ok(Duration::from_millis(self.into()))
    }
}

/// Negative counts fire on the next tick.
impl IntoDelayDuration for i32 {
    fn into_delay_duration(self) -> Result<Duration, DelayError> {
        i64::from(self).into_delay_duration()
    }
}

impl IntoDelayDuration for i64 {
    fn into_delay_duration(self) -> Result<Duration, DelayError> {
        Ok(Duration::from_millis(self.try_into().unwrap_or(0)))
    }
}

impl IntoDelayDuration for Duration {
    fn into_delay_duration(self) -> Result<Duration, DelayError> {
        Ok(self)
    }
}

impl IntoDelayDuration for &str {
    fn into_delay_duration(self) -> Result<Duration, DelayError> {
        parse_duration(self)
    }
}

impl IntoDelayDuration for &String {
    fn into_delay_duration(self) -> Result<Duration, DelayError> {
        parse_duration(self)
    }
}

impl IntoDelayDuration for String {
    fn into_delay_duration(self) -> Result<Duration, DelayError> {
        parse_duration(&self)
    }
}

/// Parses a duration string such as `"2s"`, `"1.5m"`, `"3h"` or `"1d"`.
///
/// The last character is the unit and everything before it the magnitude.
/// A magnitude that is not a non-negative number yields a zero duration, so the
/// delay fires on the next tick.
pub fn parse_duration(input: &str) -> Result<Duration, DelayError> {
    let Some(unit) = input.chars().next_back() else {
        return Err(DelayError::UnknownUnit(String::new()));
    };
    let unit_ms = match unit {
        's' => MS_PER_SECOND,
        'm' => MS_PER_MINUTE,
        'h' => MS_PER_HOUR,
        'd' => MS_PER_DAY,
        other => return Err(DelayError::UnknownUnit(other.to_string())),
    };
    let magnitude = input[..input.len() - unit.len_utf8()].trim();
    Ok(scale(magnitude, unit_ms))
}

fn scale(magnitude: &str, unit_ms: u64) -> Duration {
    if let Ok(value) = magnitude.parse::<u64>() {
        return value
            .checked_mul(unit_ms)
            .map(Duration::from_millis)
            .unwrap_or(Duration::MAX);
    }

    match magnitude.parse::<f64>() {
        Ok(value) if value == 0.0 => Duration::ZERO,
        Ok(value) if value > 0.0 => {
            let ms = value * unit_ms as f64;
            Duration::try_from_secs_f64(ms / MS_PER_SECOND as f64).unwrap_or(Duration::MAX)
        }
        _ => {
            tracing::warn!("Duration magnitude {:?} is not usable, firing immediately", magnitude);
            Duration::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_match_precomputed_millis() {
        assert_eq!(parse_duration("3s"), Ok(Duration::from_millis(3000)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_millis(120_000)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_millis(3_600_000)));
        assert_eq!(parse_duration("1d"), Ok(Duration::from_millis(86_400_000)));
    }

    #[test]
    fn fractional_magnitude() {
        assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1500)));
        assert_eq!(parse_duration("0.5m"), Ok(Duration::from_millis(30_000)));
    }

    #[test]
    fn unknown_unit_is_reported() {
        assert_eq!(
            parse_duration("5x"),
            Err(DelayError::UnknownUnit("x".to_string()))
        );
        assert_eq!(
            parse_duration("500"),
            Err(DelayError::UnknownUnit("0".to_string()))
        );
        assert_eq!(parse_duration(""), Err(DelayError::UnknownUnit(String::new())));
    }

    #[test]
    fn unusable_magnitude_is_zero() {
        assert_eq!(parse_duration("abcs"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("-5s"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("s"), Ok(Duration::ZERO));
    }

    #[test]
    fn overflow_saturates() {
        assert_eq!(parse_duration("18446744073709551615d"), Ok(Duration::MAX));
        assert_eq!(parse_duration("1e300d"), Ok(Duration::MAX));
    }

    fn millis<D: IntoDelayDuration>(duration: D) -> Result<Duration, DelayError> {
        duration.into_delay_duration()
    }

    #[test]
    fn signed_millis_clamp_at_zero() {
        assert_eq!(millis(3000), Ok(Duration::from_secs(3)));
        assert_eq!((-250i32).into_delay_duration(), Ok(Duration::ZERO));
        assert_eq!(i64::MIN.into_delay_duration(), Ok(Duration::ZERO));
        assert_eq!(7u32.into_delay_duration(), Ok(Duration::from_millis(7)));
    }

    #[test]
    fn millis_and_durations_pass_through() {
        assert_eq!(2000u64.into_delay_duration(), Ok(Duration::from_secs(2)));
        assert_eq!(
            Duration::from_millis(7).into_delay_duration(),
            Ok(Duration::from_millis(7))
        );
        assert_eq!(
            String::from("4s").into_delay_duration(),
            Ok(Duration::from_secs(4))
        );
    }
}
