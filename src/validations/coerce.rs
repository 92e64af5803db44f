//! Single coercion boundary for request payloads.
//!
//! The public API historically accepted numbers and booleans either as native
//! JSON values or as strings ("12", "3.5", "true", "0"). Every request DTO
//! funnels those fields through the deserializers below; anything outside the
//! recognized shapes is rejected with a deserialization error before a
//! handler ever sees the payload. The multipart variant reuses the same
//! parsing through the `parse_*_field` helpers.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInt {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBool {
    Bool(bool),
    Text(String),
}

pub fn flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawNumber::Number(n)) => Ok(Some(n)),
        Some(RawNumber::Text(s)) => parse_f64_field(&s).map(Some).map_err(de::Error::custom),
    }
}

pub fn flexible_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawInt>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawInt::Number(n)) => i32::try_from(n)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("{} is out of range", n))),
        Some(RawInt::Text(s)) => parse_i32_field(&s).map(Some).map_err(de::Error::custom),
    }
}

pub fn flexible_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawBool>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawBool::Bool(b)) => Ok(Some(b)),
        Some(RawBool::Text(s)) => parse_bool_field(&s).map(Some).map_err(de::Error::custom),
    }
}

pub fn parse_f64_field(s: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| format!("{} is not a valid number", s))
}

pub fn parse_i32_field(s: &str) -> Result<i32, String> {
    s.trim()
        .parse::<i32>()
        .map_err(|_| format!("{} is not a valid integer", s))
}

pub fn parse_bool_field(s: &str) -> Result<bool, String> {
    match s.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(format!("{} is not a valid boolean", other)),
    }
}
