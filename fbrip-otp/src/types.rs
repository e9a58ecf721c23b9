//! Response records returned by the OTP API
//!
//! The API answers with `{"ok": bool, "data": {"otp": string, "timeRemaining": int}}`.
//! Field names are matched without regard to case, so the body is first read
//! into a `serde_json::Value`, its object keys are folded to lowercase, and
//! only then mapped onto the typed records.

use crate::error::OtpError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Top-level API response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpResult {
    /// The API's own success flag, independent of the HTTP status
    #[serde(default)]
    pub ok: bool,

    /// Generated code, absent when the API did not return one
    #[serde(default)]
    pub data: Option<OtpData>,
}

/// Generated code and its remaining validity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub otp: String,

    /// Seconds until the code rotates
    #[serde(
        rename(serialize = "timeRemaining", deserialize = "timeremaining"),
        alias = "timeRemaining",
        default,
        deserialize_with = "null_as_default"
    )]
    pub time_remaining: i64,
}

impl OtpResult {
    /// The generated code, if the API reported success and returned one
    pub fn code(&self) -> Option<&str> {
        if !self.ok {
            return None;
        }
        self.data
            .as_ref()
            .map(|data| data.otp.as_str())
            .filter(|otp| !otp.is_empty())
    }
}

impl OtpData {
    pub fn new(otp: impl Into<String>, time_remaining: i64) -> Self {
        Self {
            otp: otp.into(),
            time_remaining,
        }
    }

    /// Remaining validity as a `Duration`; negative values clamp to zero
    pub fn valid_for(&self) -> Duration {
        Duration::from_secs(self.time_remaining.max(0) as u64)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a response body, matching field names case-insensitively
///
/// A body that is not JSON, or JSON of the wrong shape, is a parse error.
/// So is the literal `null`, which carries no value at all.
pub fn decode_response(body: &str) -> std::result::Result<OtpResult, OtpError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        OtpError::parse(format!("Response body is not valid JSON: {}", e), Some(e))
    })?;

    if value.is_null() {
        return Err(OtpError::parse("Failed to deserialize response", None));
    }

    serde_json::from_value(fold_keys(value)).map_err(|e| {
        OtpError::parse(format!("Unexpected response shape: {}", e), Some(e))
    })
}

// Keys that collide after folding keep the one that sorts last.
fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_lowercase(), fold_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_decode_canonical_body() {
        let result =
            decode_response(r#"{"ok":true,"data":{"otp":"654321","timeRemaining":15}}"#).unwrap();
        assert_eq!(
            result,
            OtpResult {
                ok: true,
                data: Some(OtpData::new("654321", 15)),
            }
        );
    }

    #[test]
    fn test_decode_ignores_key_case() {
        let upper =
            decode_response(r#"{"OK":true,"DATA":{"OTP":"111111","TIMEREMAINING":5}}"#).unwrap();
        let mixed =
            decode_response(r#"{"Ok":true,"Data":{"Otp":"111111","TimeRemaining":5}}"#).unwrap();
        assert_eq!(upper, mixed);
        assert_eq!(upper.code(), Some("111111"));
        assert_eq!(upper.data.unwrap().time_remaining, 5);
    }

    #[test]
    fn test_decode_missing_fields_default() {
        let result = decode_response(r#"{"ok":false}"#).unwrap();
        assert!(!result.ok);
        assert!(result.data.is_none());

        let result = decode_response(r#"{"ok":true,"data":{}}"#).unwrap();
        assert_eq!(result.data, Some(OtpData::default()));

        let result = decode_response(r#"{}"#).unwrap();
        assert_eq!(result, OtpResult::default());
    }

    #[test]
    fn test_decode_null_sub_fields_default() {
        let result = decode_response(r#"{"ok":true,"data":{"otp":null,"timeRemaining":null}}"#)
            .unwrap();
        assert_eq!(result.data, Some(OtpData::default()));
    }

    #[test]
    fn test_decode_null_data_is_absent() {
        let result = decode_response(r#"{"ok":true,"data":null}"#).unwrap();
        assert!(result.data.is_none());
        assert_eq!(result.code(), None);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let result = decode_response(
            r#"{"ok":true,"extra":[1,2],"data":{"otp":"123456","timeRemaining":23,"algo":"SHA1"}}"#,
        )
        .unwrap();
        assert_eq!(result.code(), Some("123456"));
    }

    #[test]
    fn test_decode_literal_null_fails() {
        let err = decode_response("null").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("Failed to deserialize response"));
    }

    #[test]
    fn test_decode_invalid_json_fails() {
        let err = decode_response("not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        for body in [r#"[1,2,3]"#, r#""text""#, r#"{"ok":"yes"}"#, r#"{"data":{"timeRemaining":"soon"}}"#] {
            let err = decode_response(body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "body: {}", body);
        }
    }

    #[test]
    fn test_code_requires_ok_flag() {
        let result = OtpResult {
            ok: false,
            data: Some(OtpData::new("123456", 10)),
        };
        assert_eq!(result.code(), None);
    }

    #[test]
    fn test_code_empty_otp_is_none() {
        let result = OtpResult {
            ok: true,
            data: Some(OtpData::new("", 10)),
        };
        assert_eq!(result.code(), None);
    }

    #[test]
    fn test_valid_for_clamps_negative() {
        assert_eq!(OtpData::new("1", 23).valid_for(), Duration::from_secs(23));
        assert_eq!(OtpData::new("1", -4).valid_for(), Duration::ZERO);
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let result = OtpResult {
            ok: true,
            data: Some(OtpData::new("123456", 23)),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ok": true, "data": {"otp": "123456", "timeRemaining": 23}})
        );
    }
}
