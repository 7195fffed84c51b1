//! Integer, big number, float and decimal types.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use serde_json::{json, Number, Value as JsonValue};
use std::str::FromStr;

use super::{
    decode_failed, effective_range, encode_failed, guard_failed, unexpected_kind, Type, TypeName,
    MAX_SAFE_INTEGER,
};
use crate::error::MessageResult;
use crate::schema::Field;
use crate::serializers::Codec;
use crate::value::Value;

/// Bounded integer family. Trinary is an int limited to {0, 1, 2}.
#[derive(Debug)]
pub struct IntType {
    name: TypeName,
    min: i64,
    max: i64,
}

pub static TINY_INT: IntType = IntType { name: TypeName::TinyInt, min: 0, max: 255 };
pub static SMALL_INT: IntType = IntType { name: TypeName::SmallInt, min: 0, max: 65_535 };
pub static MEDIUM_INT: IntType = IntType { name: TypeName::MediumInt, min: 0, max: 16_777_215 };
pub static INT: IntType = IntType { name: TypeName::Int, min: 0, max: 4_294_967_295 };
pub static SIGNED_TINY_INT: IntType = IntType { name: TypeName::SignedTinyInt, min: -128, max: 127 };
pub static SIGNED_SMALL_INT: IntType = IntType {
    name: TypeName::SignedSmallInt,
    min: -32_768,
    max: 32_767,
};
pub static SIGNED_MEDIUM_INT: IntType = IntType {
    name: TypeName::SignedMediumInt,
    min: -8_388_608,
    max: 8_388_607,
};
pub static SIGNED_INT: IntType = IntType {
    name: TypeName::SignedInt,
    min: -2_147_483_648,
    max: 2_147_483_647,
};
pub static TRINARY: IntType = IntType { name: TypeName::Trinary, min: 0, max: 2 };

/// Coerces any wire value toward an integer. Anything non-numeric is 0.
pub(crate) fn coerce_json_int(value: &JsonValue) -> i64 {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(clamp_safe)
            .unwrap_or(0),
        JsonValue::String(s) => coerce_str_int(s),
        JsonValue::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn coerce_str_int(s: &str) -> i64 {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        .map(clamp_safe)
        .unwrap_or(0)
}

fn clamp_safe(n: i64) -> i64 {
    n.clamp(-MAX_SAFE_INTEGER, MAX_SAFE_INTEGER)
}

fn coerce_value_int(value: &Value) -> i64 {
    match value {
        Value::Int(n) => *n,
        Value::Bool(b) => i64::from(*b),
        Value::Float(f) if f.is_finite() => f.trunc() as i64,
        Value::BigNumber(b) => b.to_i64().unwrap_or(0),
        Value::Decimal(d) => d.to_i64().unwrap_or(0),
        Value::String(s) => coerce_str_int(s),
        _ => 0,
    }
}

pub(crate) fn guard_safe_int(value: &Value, field: &Field, ty: &dyn Type) -> MessageResult<i64> {
    let Value::Int(n) = value else {
        return Err(unexpected_kind(field, "safe integer", value));
    };
    if n.unsigned_abs() > MAX_SAFE_INTEGER.unsigned_abs() {
        return Err(guard_failed(field, format!("[{n}] is not a safe integer")));
    }
    let (min, max) = effective_range(field, ty);
    if *n < min || *n > max {
        return Err(guard_failed(field, format!("[{n}] must be between {min} and {max}")));
    }
    Ok(*n)
}

impl Type for IntType {
    fn type_name(&self) -> TypeName {
        self.name
    }

    fn is_numeric(&self) -> bool {
        true
    }

    fn get_default(&self) -> Option<Value> {
        Some(Value::Int(0))
    }

    fn get_min(&self) -> i64 {
        self.min
    }

    fn get_max(&self) -> i64 {
        self.max
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        guard_safe_int(value, field, self).map(|_| ())
    }

    fn encode(&self, value: &Value, _field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        Ok(json!(coerce_value_int(value)))
    }

    fn decode(
        &self,
        value: &JsonValue,
        _field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        Ok(Some(Value::Int(coerce_json_int(value))))
    }
}

/// Arbitrary precision integers with exact 64-bit range checks.
#[derive(Debug)]
pub struct BigIntType {
    name: TypeName,
    signed: bool,
}

pub static BIG_INT: BigIntType = BigIntType { name: TypeName::BigInt, signed: false };
pub static SIGNED_BIG_INT: BigIntType = BigIntType { name: TypeName::SignedBigInt, signed: true };

impl BigIntType {
    fn bounds(&self) -> (BigInt, BigInt) {
        if self.signed {
            (BigInt::from(i64::MIN), BigInt::from(i64::MAX))
        } else {
            (BigInt::zero(), BigInt::from(u64::MAX))
        }
    }
}

impl Type for BigIntType {
    fn type_name(&self) -> TypeName {
        self.name
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn is_numeric(&self) -> bool {
        true
    }

    fn get_default(&self) -> Option<Value> {
        Some(Value::BigNumber(BigInt::zero()))
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        let Value::BigNumber(n) = value else {
            return Err(unexpected_kind(field, "big number", value));
        };
        let (min, max) = self.bounds();
        if *n < min || *n > max {
            return Err(guard_failed(field, format!("[{n}] must be between {min} and {max}")));
        }
        Ok(())
    }

    fn encode(&self, value: &Value, _field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        Ok(JsonValue::String(value.to_text()))
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let text = match value {
            JsonValue::String(s) => s.trim().to_string(),
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            JsonValue::Null => return Ok(None),
            other => return Err(decode_failed(field, other, "expected an integer string")),
        };
        if text.is_empty() {
            return Ok(Some(Value::BigNumber(BigInt::zero())));
        }
        BigInt::from_str(&text)
            .map(|n| Some(Value::BigNumber(n)))
            .map_err(|e| decode_failed(field, value, e))
    }
}

#[derive(Debug)]
pub struct FloatType;

pub static FLOAT: FloatType = FloatType;

impl Type for FloatType {
    fn type_name(&self) -> TypeName {
        TypeName::Float
    }

    fn is_numeric(&self) -> bool {
        true
    }

    fn get_default(&self) -> Option<Value> {
        Some(Value::Float(0.0))
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        match value {
            Value::Float(f) if f.is_finite() => Ok(()),
            Value::Float(f) => Err(guard_failed(field, format!("[{f}] is not a finite number"))),
            other => Err(unexpected_kind(field, "float", other)),
        }
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        let number = match value {
            Value::Float(f) => *f,
            Value::Int(n) => *n as f64,
            other => return Err(encode_failed(field, other, "expected a float")),
        };
        Number::from_f64(number)
            .map(JsonValue::Number)
            .ok_or_else(|| encode_failed(field, value, "not a finite number"))
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let number = match value {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) if s.trim().is_empty() => Some(0.0),
            JsonValue::String(s) => s.trim().parse::<f64>().ok(),
            JsonValue::Null => return Ok(None),
            _ => None,
        };
        number
            .filter(|f| f.is_finite())
            .map(|f| Some(Value::Float(f)))
            .ok_or_else(|| decode_failed(field, value, "expected a finite number"))
    }
}

/// Fixed precision decimal. The wire form is a JSON number rounded to the field scale.
#[derive(Debug)]
pub struct DecimalType;

pub static DECIMAL: DecimalType = DecimalType;

impl Type for DecimalType {
    fn type_name(&self) -> TypeName {
        TypeName::Decimal
    }

    fn is_scalar(&self) -> bool {
        false
    }

    fn is_numeric(&self) -> bool {
        true
    }

    fn get_default(&self) -> Option<Value> {
        Some(Value::Decimal(BigDecimal::zero()))
    }

    fn guard(&self, value: &Value, field: &Field) -> MessageResult<()> {
        let Value::Decimal(d) = value else {
            return Err(unexpected_kind(field, "decimal", value));
        };
        let scaled = d.with_scale(i64::from(field.scale()));
        let digits = scaled.digits();
        if digits > u64::from(field.precision()) {
            return Err(guard_failed(
                field,
                format!(
                    "[{d}] does not fit decimal({}, {})",
                    field.precision(),
                    field.scale()
                ),
            ));
        }
        Ok(())
    }

    fn encode(&self, value: &Value, field: &Field, _codec: &dyn Codec) -> MessageResult<JsonValue> {
        let Value::Decimal(d) = value else {
            return Err(encode_failed(field, value, "expected a decimal"));
        };
        let rounded = d.round(i64::from(field.scale())).normalized();
        Number::from_str(&rounded.to_string())
            .map(JsonValue::Number)
            .map_err(|e| encode_failed(field, value, e))
    }

    fn decode(
        &self,
        value: &JsonValue,
        field: &Field,
        _codec: &dyn Codec,
    ) -> MessageResult<Option<Value>> {
        let text = match value {
            JsonValue::Number(n) => n.to_string(),
            JsonValue::String(s) if s.trim().is_empty() => "0".to_string(),
            JsonValue::String(s) => s.trim().to_string(),
            JsonValue::Null => return Ok(None),
            other => return Err(decode_failed(field, other, "expected a decimal")),
        };
        BigDecimal::from_str(&text)
            .map(|d| Some(Value::Decimal(d)))
            .map_err(|e| decode_failed(field, value, e))
    }
}
