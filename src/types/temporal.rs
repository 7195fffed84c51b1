use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{json, Value as JsonValue};

use super::numeric::{coerce_json_int, guard_safe_int};
use super::{decode_failed, encode_failed, trimmed_text, unexpected_kind, Type, TypeName};
use crate::error::MessageResult;
use crate::objects::Microtime;
use crate::schema::Field;
use crate::serializers::Codec;
use crate::value::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Unix seconds held as an int, never negative.
#[derive(Debug)]
pub struct TimestampType;

pub static TIMESTAMP: TimestampType = TimestampType;

impl Type for TimestampType {
    fn type_name(&self) -> TypeName {
        TypeName::Timestamp
    }

    fn is_numeric(&self) -> bool {
        true
    }

    fn get_default(&self) -> Option<Value> {
        Some(Value::Int(Utc::now().timestamp()))
    }

    fn get_min(&self) -> i64 {
        0
    }

    fn get_max(&self) -> i64 {
        super::MAX_SAFE_INTEGER
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        guard_safe_int(value, field, self).map(|_| ())
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::Int(n) => Ok(json!(n)),
            Value::DateTime(dt) => Ok(json!(dt.timestamp())),
            other => Err(encode_failed(field, other, "expected unix seconds")),
        }
    }

    fn decode(
        &self,
        value: &JsonValue,
        _field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(Value::Int(coerce_json_int(value))))
    }
}

#[derive(Debug)]
pub struct DateType;

pub static DATE: DateType = DateType;

impl Type for DateType {
    fn type_name(&self) -> TypeName {
        TypeName::Date
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        match value {
            Value::Date(_) => Ok(()),
            other => Err(unexpected_kind(field, "date", other)),
        }
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::Date(date) => Ok(json!(date.format(DATE_FORMAT).to_string())),
            other => Err(encode_failed(field, other, "expected a date")),
        }
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let Some(text) = trimmed_text(value) else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .or_else(|_| parse_date_time(&text).map(|dt| dt.date_naive()))
            .map(|date| Some(Value::Date(date)))
            .map_err(|e| decode_failed(field, value, e))
    }
}

/// Accepts RFC 3339, or a zone-less ISO 8601 form read as UTC.
fn parse_date_time(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
                .map(|naive| naive.and_utc())
        })
}

/// UTC date-time, wire form RFC 3339 with microseconds and `Z`.
#[derive(Debug)]
pub struct DateTimeType;

pub static DATE_TIME: DateTimeType = DateTimeType;

impl Type for DateTimeType {
    fn type_name(&self) -> TypeName {
        TypeName::DateTime
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        match value {
            Value::DateTime(_) => Ok(()),
            other => Err(unexpected_kind(field, "date-time", other)),
        }
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::DateTime(dt) => Ok(json!(dt.to_rfc3339_opts(SecondsFormat::Micros, true))),
            other => Err(encode_failed(field, other, "expected a date-time")),
        }
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let Some(text) = trimmed_text(value) else {
            return Ok(None);
        };
        parse_date_time(&text)
            .map(|dt| Some(Value::DateTime(dt)))
            .map_err(|e| decode_failed(field, value, e))
    }
}

#[derive(Debug)]
pub struct MicrotimeType;

pub static MICROTIME: MicrotimeType = MicrotimeType;

impl Type for MicrotimeType {
    fn type_name(&self) -> TypeName {
        TypeName::Microtime
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn is_numeric(&self) -> bool {
        true
    }

    fn get_default(&self) -> Option<Value> {
        Some(Value::Microtime(Microtime::now()))
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        match value {
            Value::Microtime(_) => Ok(()),
            other => Err(unexpected_kind(field, "microtime", other)),
        }
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        match value {
            Value::Microtime(m) => Ok(json!(m.to_string())),
            other => Err(encode_failed(field, other, "expected a microtime")),
        }
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let Some(text) = trimmed_text(value) else {
            return Ok(None);
        };
        Microtime::from_string(&text)
            .map(|m| Some(Value::Microtime(m)))
            .map_err(|e| decode_failed(field, value, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessageError;
    use crate::schema::FieldBuilder;
    use crate::serializers::ObjectSerializer;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_defaults_to_now_and_rejects_negative() {
        let field = FieldBuilder::new("at", TypeName::Timestamp).build().unwrap();
        let Some(Value::Int(now)) = TIMESTAMP.get_default() else {
            panic!("timestamp default must be an int");
        };
        assert!(now > 1_600_000_000);
        assert!(TIMESTAMP.guard(&Value::Int(now), &field).is_ok());
        assert!(TIMESTAMP.guard(&Value::Int(-1), &field).is_err());
    }

    #[test]
    fn test_date_wire_form() {
        let field = FieldBuilder::new("d", TypeName::Date).build().unwrap();
        let codec = ObjectSerializer::default();
        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let encoded = DATE.encode(&date, &field, &codec).unwrap();
        assert_eq!(encoded, json!("2024-02-29"));
        assert_eq!(DATE.decode(&encoded, &field, &codec).unwrap(), Some(date));
        assert!(matches!(
            DATE.decode(&json!("2023-02-30"), &field, &codec),
            Err(MessageError::DecodeValueFailed { .. })
        ));
    }

    #[test]
    fn test_date_time_keeps_microseconds() {
        let field = FieldBuilder::new("dt", TypeName::DateTime).build().unwrap();
        let codec = ObjectSerializer::default();
        let dt = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::microseconds(123_456);
        let encoded = DATE_TIME.encode(&Value::DateTime(dt), &field, &codec).unwrap();
        assert_eq!(encoded, json!("2020-01-02T03:04:05.123456Z"));
        assert_eq!(
            DATE_TIME.decode(&encoded, &field, &codec).unwrap(),
            Some(Value::DateTime(dt))
        );
        assert_eq!(
            DATE_TIME
                .decode(&json!("2020-01-02T05:04:05+02:00"), &field, &codec)
                .unwrap(),
            Some(Value::DateTime(Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()))
        );
    }

    #[test]
    fn test_microtime_wire_form() {
        let field = FieldBuilder::new("m", TypeName::Microtime).build().unwrap();
        let codec = ObjectSerializer::default();
        let decoded = MICROTIME
            .decode(&json!("1700000000123456"), &field, &codec)
            .unwrap()
            .unwrap();
        assert_eq!(
            MICROTIME.encode(&decoded, &field, &codec).unwrap(),
            json!("1700000000123456")
        );
        assert!(MICROTIME.decode(&json!("12"), &field, &codec).is_err());
    }
}
