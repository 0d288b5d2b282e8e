//! Payload normalization shared by the poll and push paths.
//!
//! Both transports deliver the same JSON object shape, but key casing is not
//! stable (`Velocity`, `velocity`, `VELOCITY`, ...). [`normalize`] maps every
//! key to lower case so the rest of the engine can look fields up by their
//! canonical name. Field accessors on [`NormalizedPayload`] never fail: an
//! absent or wrong-typed field reads as `NaN` / `None` / `false`.

use serde_json::{Map, Value};

use crate::error::SpectrumError;
use crate::types::Channel;

/// A payload exactly as received (arbitrary key case).
pub type RawPayload = Map<String, Value>;

pub const FIELD_IS_ASCENDING: &str = "isascending";
pub const FIELD_STATUS_MESSAGE: &str = "statusmessage";
pub const FIELD_IS_ACTION_REQUIRED: &str = "isactionrequired";

/// A payload whose keys are all lower case.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedPayload(Map<String, Value>);

/// Return a copy of `raw` with every key lower-cased and values untouched.
///
/// If two keys collapse to the same lower-cased key, the later one in source
/// order wins.
pub fn normalize(raw: &RawPayload) -> NormalizedPayload {
    let mut out = Map::with_capacity(raw.len());
    for (key, value) in raw {
        out.insert(key.to_lowercase(), value.clone());
    }
    NormalizedPayload(out)
}

/// Deserialize a text frame into a [`RawPayload`].
///
/// This is the only failure point of the normalization path: anything that
/// is not a JSON object is rejected here.
pub fn parse_payload(text: &str) -> Result<RawPayload, SpectrumError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| SpectrumError::Parse(e.to_string()))?;
    payload_from_value(value)
}

/// Accept an already-decoded JSON value if it is an object.
pub fn payload_from_value(value: Value) -> Result<RawPayload, SpectrumError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SpectrumError::Parse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

impl NormalizedPayload {
    /// Look up a field by its lower-cased name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Reading for `channel`, or `NaN` when absent or not numeric.
    ///
    /// Numbers encoded as JSON strings (`"30.5"`) are accepted.
    pub fn channel_value(&self, channel: Channel) -> f64 {
        parse_str_f64(self.get(channel.field_name())).unwrap_or(f64::NAN)
    }

    pub fn is_ascending(&self) -> Option<bool> {
        self.get(FIELD_IS_ASCENDING).and_then(Value::as_bool)
    }

    pub fn status_message(&self) -> Option<String> {
        self.get(FIELD_STATUS_MESSAGE).and_then(Value::as_str).map(str::to_owned)
    }

    /// Truthiness of the flag, `None` when the key is absent. Agrees with
    /// [`is_action_required`](Self::is_action_required) whenever present.
    pub fn action_required_flag(&self) -> Option<bool> {
        self.get(FIELD_IS_ACTION_REQUIRED).map(is_truthy)
    }

    /// Whether the payload asks for operator action (truthy flag).
    pub fn is_action_required(&self) -> bool {
        self.get(FIELD_IS_ACTION_REQUIRED).is_some_and(is_truthy)
    }
}

/// Parse a JSON value (string or number) as `f64`.
#[inline]
pub fn parse_str_f64(v: Option<&Value>) -> Option<f64> {
    let v = v?;
    if let Some(s) = v.as_str() {
        fast_float2::parse(s.trim()).ok()
    } else {
        v.as_f64()
    }
}

/// Loose truthiness: `true`, non-zero numbers, non-empty strings, and any
/// array or object.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawPayload {
        payload_from_value(v).unwrap()
    }

    #[test]
    fn keys_are_lower_cased_values_untouched() {
        let input = raw(json!({
            "Velocity": 12.5,
            "ALTITUDE": 300,
            "temperature": -4.25,
            "IsAscending": true,
            "StatusMessage": "Nominal",
            "IsActionRequired": false
        }));
        let before = input.clone();

        let out = normalize(&input);

        let keys: Vec<_> = out.fields().keys().cloned().collect();
        let expected: Vec<_> = input.keys().map(|k| k.to_lowercase()).collect();
        assert_eq!(keys, expected);
        assert_eq!(out.get("velocity"), Some(&json!(12.5)));
        assert_eq!(out.get("statusmessage"), Some(&json!("Nominal")));
        assert_eq!(input, before, "input must not be mutated");
    }

    #[test]
    fn colliding_keys_last_wins() {
        let out = normalize(&raw(json!({"Velocity": 1, "VELOCITY": 2})));
        assert_eq!(out.fields().len(), 1);
        assert_eq!(out.channel_value(Channel::Velocity), 2.0);
    }

    #[test]
    fn field_accessors() {
        let out = normalize(&raw(json!({
            "velocity": "42.5",
            "altitude": "high",
            "isAscending": true,
            "statusMessage": "ok",
            "isActionRequired": 1
        })));
        assert_eq!(out.channel_value(Channel::Velocity), 42.5);
        assert!(out.channel_value(Channel::Altitude).is_nan());
        assert!(out.channel_value(Channel::Temperature).is_nan());
        assert_eq!(out.is_ascending(), Some(true));
        assert_eq!(out.status_message().as_deref(), Some("ok"));
        assert!(out.is_action_required());
        assert_eq!(out.action_required_flag(), Some(true));

        let quiet = normalize(&raw(json!({"IsActionRequired": 0})));
        assert!(!quiet.is_action_required());
        assert_eq!(quiet.action_required_flag(), Some(false));
        assert_eq!(normalize(&raw(json!({}))).action_required_flag(), None);
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(parse_payload(r#"{"velocity": 1}"#).is_ok());
        assert!(matches!(parse_payload("[1, 2]"), Err(SpectrumError::Parse(_))));
        assert!(matches!(parse_payload("not json"), Err(SpectrumError::Parse(_))));
    }
}
