//! Microsecond precision unix timestamps.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{MessageError, MessageResult};

/// A unix timestamp with microsecond precision.
///
/// The string form is the seconds followed by the zero padded six digit
/// microseconds, e.g. `1700000000123456`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Microtime {
    sec: i64,
    usec: u32,
}

impl Microtime {
    pub fn new(sec: i64, usec: u32) -> MessageResult<Self> {
        if sec < 0 || usec > 999_999 {
            return Err(MessageError::assertion(format!(
                "Microtime [{sec}.{usec}] is out of range"
            )));
        }
        Ok(Self { sec, usec })
    }

    pub fn now() -> Self {
        Self::from_datetime(&Utc::now())
    }

    pub fn from_datetime(datetime: &DateTime<Utc>) -> Self {
        Self {
            sec: datetime.timestamp().max(0),
            usec: datetime.timestamp_subsec_micros().min(999_999),
        }
    }

    pub fn from_string(value: &str) -> MessageResult<Self> {
        let value = value.trim();
        if value.len() < 7 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MessageError::assertion(format!(
                "Microtime [{value}] must be at least 7 digits"
            )));
        }
        let (sec, usec) = value.split_at(value.len() - 6);
        let sec = sec
            .parse::<i64>()
            .map_err(|e| MessageError::assertion(format!("Microtime [{value}] is invalid: {e}")))?;
        let usec = usec
            .parse::<u32>()
            .map_err(|e| MessageError::assertion(format!("Microtime [{value}] is invalid: {e}")))?;
        Self::new(sec, usec)
    }

    pub fn sec(&self) -> i64 {
        self.sec
    }

    pub fn usec(&self) -> u32 {
        self.usec
    }

    pub fn to_datetime(&self) -> MessageResult<DateTime<Utc>> {
        Utc.timestamp_opt(self.sec, self.usec * 1_000)
            .single()
            .ok_or_else(|| MessageError::assertion(format!("Microtime [{self}] is not a valid date")))
    }
}

impl fmt::Display for Microtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:06}", self.sec, self.usec)
    }
}

impl Serialize for Microtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_round_trip() {
        let m = Microtime::from_string("1700000000000042").unwrap();
        assert_eq!(m.sec(), 1_700_000_000);
        assert_eq!(m.usec(), 42);
        assert_eq!(m.to_string(), "1700000000000042");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Microtime::from_string("12ab").is_err());
        assert!(Microtime::from_string("123").is_err());
        assert!(Microtime::new(1, 1_000_000).is_err());
    }

    #[test]
    fn test_datetime_conversion() {
        let m = Microtime::new(1_600_000_000, 500_000).unwrap();
        let dt = m.to_datetime().unwrap();
        assert_eq!(Microtime::from_datetime(&dt), m);
    }
}
