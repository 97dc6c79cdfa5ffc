use std::collections::BTreeMap;
use std::fmt;

/// Form values keyed by field name, as collected from the UI.
pub type RawForm = BTreeMap<String, RawFormValue>;

/// A value as produced by a form control.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFormValue {
    /// Slider position or already-numeric value.
    Number(f64),
    /// Free text from a number input; may hold a string-encoded number.
    Text(String),
    /// Checkbox or switch state.
    Boolean(bool),
    /// Option chosen from a select control.
    Label(String),
}

impl RawFormValue {
    /// Empty text counts as "not filled".
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) | Self::Label(text) => text.trim().is_empty(),
            Self::Number(_) | Self::Boolean(_) => false,
        }
    }

    /// Numeric reading of the value: booleans become 1/0 and text is parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Boolean(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Self::Text(text) | Self::Label(text) => text.trim().parse::<f64>().ok(),
        }
    }

    /// Convert one entry of a JSON form document. Arrays, objects and null are rejected.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(flag) => Some(Self::Boolean(*flag)),
            serde_json::Value::Number(number) => number.as_f64().map(Self::Number),
            serde_json::Value::String(text) => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    /// Interpret a command-line value: `true`/`false` are booleans, anything else is text.
    pub fn parse_cli(value: &str) -> Self {
        match value.trim() {
            "true" => Self::Boolean(true),
            "false" => Self::Boolean(false),
            _ => Self::Text(value.to_string()),
        }
    }
}

impl fmt::Display for RawFormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Boolean(flag) => write!(f, "{flag}"),
            Self::Label(label) => write!(f, "label {label:?}"),
        }
    }
}

impl From<f64> for RawFormValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for RawFormValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for RawFormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawFormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Build a form from a JSON object, skipping entries that no control could produce.
pub fn form_from_json(document: &serde_json::Value) -> Option<RawForm> {
    let object = document.as_object()?;
    let mut form = RawForm::new();
    for (key, value) in object {
        match RawFormValue::from_json(value) {
            Some(raw) => {
                form.insert(key.clone(), raw);
            }
            None => tracing::warn!("Ignoring form entry {key}: unsupported JSON value {value}"),
        }
    }
    Some(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_reading_covers_every_variant() {
        assert_eq!(RawFormValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(RawFormValue::Boolean(true).as_number(), Some(1.0));
        assert_eq!(RawFormValue::Boolean(false).as_number(), Some(0.0));
        assert_eq!(RawFormValue::from(" 3.5 ").as_number(), Some(3.5));
        assert_eq!(RawFormValue::Label("Male".into()).as_number(), None);
    }

    #[test]
    fn blank_text_is_blank() {
        assert!(RawFormValue::from("  ").is_blank());
        assert!(RawFormValue::Label(String::new()).is_blank());
        assert!(!RawFormValue::Number(0.0).is_blank());
    }

    #[test]
    fn json_form_keeps_scalars_only() {
        let form = form_from_json(&json!({
            "CGPA": "3.5",
            "Academic Pressure": 4,
            "smoker": true,
            "nested": {"a": 1},
            "missing": null
        }))
        .unwrap();
        assert_eq!(form.len(), 3);
        assert_eq!(form["CGPA"], RawFormValue::Text("3.5".into()));
        assert_eq!(form["Academic Pressure"], RawFormValue::Number(4.0));
        assert_eq!(form["smoker"], RawFormValue::Boolean(true));
        assert!(form_from_json(&json!([1, 2])).is_none());
    }

    #[test]
    fn cli_values_recognize_booleans() {
        assert_eq!(RawFormValue::parse_cli("true"), RawFormValue::Boolean(true));
        assert_eq!(RawFormValue::parse_cli("Female"), RawFormValue::Text("Female".into()));
    }
}
