use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Result recorded against a test case in a test run.
///
/// The service accepts further values than the four well-known ones;
/// anything else travels as [`ResultStatus::Other`] and the service decides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResultStatus {
    Passed,
    Failed,
    Blocked,
    NotRun,
    Other(String),
}

impl ResultStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResultStatus::Passed => "PASSED",
            ResultStatus::Failed => "FAILED",
            ResultStatus::Blocked => "BLOCKED",
            ResultStatus::NotRun => "NOTRUN",
            ResultStatus::Other(s) => s,
        }
    }

    fn from_upper(upper: String) -> Self {
        match upper.as_str() {
            "PASSED" => ResultStatus::Passed,
            "FAILED" => ResultStatus::Failed,
            "BLOCKED" => ResultStatus::Blocked,
            "NOTRUN" => ResultStatus::NotRun,
            _ => ResultStatus::Other(upper),
        }
    }
}

/// Maps a loosely-typed result value onto a [`ResultStatus`].
///
/// | input                                   | output   |
/// |-----------------------------------------|----------|
/// | `null`                                  | NOTRUN   |
/// | `false`, `0`                            | FAILED   |
/// | `true`, `1`                             | PASSED   |
/// | `"pass"`, `"success"`, `"ok"` (any case) | PASSED   |
/// | `"fail"`, `"failure"`, `"error"` (any case) | FAILED |
/// | anything else                           | upper-cased text |
///
/// Only the numbers `0` and `1` are special; the strings `"0"` and `"1"`
/// go through the text path and come back as `"0"` / `"1"`. Other values are
/// turned into text the way JavaScript's `String()` does (`[1,2]` becomes
/// `1,2`, objects become `[OBJECT OBJECT]`, `1e21` becomes `1E+21`).
pub fn normalize_status(value: &Value) -> ResultStatus {
    match value {
        Value::Null => ResultStatus::NotRun,
        Value::Bool(false) => ResultStatus::Failed,
        Value::Bool(true) => ResultStatus::Passed,
        Value::Number(n) if n.as_f64() == Some(0.0) => ResultStatus::Failed,
        Value::Number(n) if n.as_f64() == Some(1.0) => ResultStatus::Passed,
        other => normalize_text(&display_text(other)),
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if n.is_f64() => n.as_f64().map_or_else(|| n.to_string(), number_text),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip form, switching to exponent notation outside
/// `1e-6..1e21` with an explicit `+` on positive exponents.
fn number_text(f: f64) -> String {
    let abs = f.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        let exp = format!("{f:e}");
        match exp.split_once('e') {
            Some((mantissa, e)) if !e.starts_with('-') => format!("{mantissa}e+{e}"),
            _ => exp,
        }
    } else {
        // f64 Display prints `3.0` as `3`.
        f.to_string()
    }
}

fn normalize_text(text: &str) -> ResultStatus {
    let upper = text.to_uppercase();
    match upper.as_str() {
        "PASS" | "SUCCESS" | "OK" => ResultStatus::Passed,
        "FAIL" | "FAILURE" | "ERROR" => ResultStatus::Failed,
        _ => ResultStatus::from_upper(upper),
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&Value> for ResultStatus {
    fn from(value: &Value) -> Self {
        normalize_status(value)
    }
}

impl From<bool> for ResultStatus {
    fn from(value: bool) -> Self {
        normalize_status(&Value::Bool(value))
    }
}

impl From<i64> for ResultStatus {
    fn from(value: i64) -> Self {
        normalize_status(&Value::from(value))
    }
}

impl From<&str> for ResultStatus {
    fn from(value: &str) -> Self {
        normalize_text(value)
    }
}

impl From<String> for ResultStatus {
    fn from(value: String) -> Self {
        normalize_text(&value)
    }
}

impl<T: Into<ResultStatus>> From<Option<T>> for ResultStatus {
    fn from(value: Option<T>) -> Self {
        value.map_or(ResultStatus::NotRun, Into::into)
    }
}

impl Serialize for ResultStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResultStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ResultStatus::from_upper(s.to_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_is_not_run() {
        assert_eq!(normalize_status(&Value::Null), ResultStatus::NotRun);
        assert_eq!(ResultStatus::from(None::<bool>), ResultStatus::NotRun);
    }

    #[test]
    fn booleans_and_zero_one() {
        assert_eq!(normalize_status(&json!(false)), ResultStatus::Failed);
        assert_eq!(normalize_status(&json!(0)), ResultStatus::Failed);
        assert_eq!(normalize_status(&json!(0.0)), ResultStatus::Failed);
        assert_eq!(normalize_status(&json!(true)), ResultStatus::Passed);
        assert_eq!(normalize_status(&json!(1)), ResultStatus::Passed);
    }

    #[test]
    fn string_zero_falls_through_to_text() {
        assert_eq!(normalize_status(&json!("0")).as_str(), "0");
        assert_eq!(normalize_status(&json!("1")).as_str(), "1");
    }

    #[test]
    fn pass_and_fail_synonyms_ignore_case() {
        for s in ["pass", "Success", "OK", "ok"] {
            assert_eq!(normalize_status(&json!(s)), ResultStatus::Passed, "{s}");
        }
        for s in ["FAIL", "failure", "Error"] {
            assert_eq!(normalize_status(&json!(s)), ResultStatus::Failed, "{s}");
        }
    }

    #[test]
    fn other_text_is_uppercased_verbatim() {
        assert_eq!(normalize_status(&json!("blocked")), ResultStatus::Blocked);
        assert_eq!(normalize_status(&json!("NotRun")), ResultStatus::NotRun);
        assert_eq!(normalize_status(&json!("passed")), ResultStatus::Passed);
        assert_eq!(
            normalize_status(&json!("skipped")),
            ResultStatus::Other("SKIPPED".into())
        );
    }

    #[test]
    fn other_numbers_are_stringified() {
        assert_eq!(normalize_status(&json!(2)).as_str(), "2");
        assert_eq!(normalize_status(&json!(-1)).as_str(), "-1");
        assert_eq!(normalize_status(&json!(2.5)).as_str(), "2.5");
        assert_eq!(normalize_status(&json!(3.0)).as_str(), "3");
    }

    #[test]
    fn exponent_form_for_large_and_tiny_numbers() {
        assert_eq!(normalize_status(&json!(1e21)).as_str(), "1E+21");
        assert_eq!(normalize_status(&json!(1.5e-7)).as_str(), "1.5E-7");
        assert_eq!(normalize_status(&json!(1e20)).as_str(), "100000000000000000000");
        assert_eq!(normalize_status(&json!(1e-6)).as_str(), "0.000001");
    }

    #[test]
    fn arrays_and_objects_stringify_like_javascript() {
        assert_eq!(normalize_status(&json!([1, 2])).as_str(), "1,2");
        assert_eq!(normalize_status(&json!(["pass"])), ResultStatus::Passed);
        assert_eq!(normalize_status(&json!([null, "a"])).as_str(), ",A");
        assert_eq!(normalize_status(&json!({"a": 1})).as_str(), "[OBJECT OBJECT]");
    }

    #[test]
    fn typed_conversions_agree_with_json() {
        assert_eq!(ResultStatus::from(false), ResultStatus::Failed);
        assert_eq!(ResultStatus::from(1_i64), ResultStatus::Passed);
        assert_eq!(ResultStatus::from("Success"), ResultStatus::Passed);
        assert_eq!(ResultStatus::from(Some("blocked")), ResultStatus::Blocked);
    }

    #[test]
    fn serializes_as_plain_string() {
        assert_eq!(
            serde_json::to_value(ResultStatus::NotRun).unwrap(),
            json!("NOTRUN")
        );
        assert_eq!(
            serde_json::to_value(ResultStatus::Other("RETEST".into())).unwrap(),
            json!("RETEST")
        );
        let parsed: ResultStatus = serde_json::from_value(json!("blocked")).unwrap();
        assert_eq!(parsed, ResultStatus::Blocked);
    }
}
