//! Validated event message and its wire encoding.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::detail::{validate_details, Details};
use crate::error::{ValidationError, ValidationResult};
use crate::severity::Severity;

/// One outbound event.
///
/// A `Message` can only be obtained through [`Message::new`], so every
/// instance has a PascalCase event type and JSON-representable details.
/// Encoding it cannot fail.
///
/// # Wire Format
///
/// ```text
/// {"event_type":"TestEvent","severity":"INFO","details":{"message":"hi"}}
/// ```
///
/// No delimiter or length prefix is appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    event_type: String,
    severity: Severity,
    details: Map<String, Value>,
}

impl Message {
    /// Builds and validates a message.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `event_type` is empty or not
    /// PascalCase, or if `details` holds a non-finite number.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bedger_protocol::{Details, Message, Severity};
    ///
    /// let mut details = Details::new();
    /// details.insert("message".to_string(), "hi".into());
    ///
    /// let message = Message::new("TestEvent", Severity::Info, details).unwrap();
    /// assert_eq!(
    ///     message.to_json(),
    ///     r#"{"event_type":"TestEvent","severity":"INFO","details":{"message":"hi"}}"#
    /// );
    /// ```
    pub fn new(
        event_type: impl Into<String>,
        severity: Severity,
        details: Details,
    ) -> ValidationResult<Self> {
        let event_type = event_type.into();
        validate_event_type(&event_type)?;
        let details = validate_details(details)?;

        Ok(Self {
            event_type,
            severity,
            details,
        })
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Validated details as a JSON object.
    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    /// Returns the message as a JSON value.
    ///
    /// Keys appear in wire order: `event_type`, `severity`, `details`.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(3);
        object.insert(
            "event_type".to_string(),
            Value::String(self.event_type.clone()),
        );
        object.insert(
            "severity".to_string(),
            Value::String(self.severity.as_str().to_string()),
        );
        object.insert("details".to_string(), Value::Object(self.details.clone()));
        Value::Object(object)
    }

    /// Encodes the message as a compact JSON document.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Encodes the message as UTF-8 bytes ready for the socket.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_json().into_bytes()
    }
}

/// Checks that an event type matches `^[A-Z][a-zA-Z0-9]*$`.
pub fn validate_event_type(event_type: &str) -> ValidationResult<()> {
    let mut chars = event_type.chars();
    let Some(first) = chars.next() else {
        return Err(ValidationError::EmptyEventType);
    };

    if first.is_ascii_uppercase() && chars.all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEventType {
            event_type: event_type.to_string(),
        })
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::detail::DetailValue;
    use proptest::prelude::*;

    /// Detail trees without non-finite numbers.
    ///
    /// Floats are multiples of 1/8 so their decimal form parses back exactly.
    fn detail_value() -> impl Strategy<Value = DetailValue> {
        let leaf = prop_oneof![
            Just(DetailValue::Null),
            any::<bool>().prop_map(DetailValue::Bool),
            any::<i64>().prop_map(DetailValue::Int),
            any::<u64>().prop_map(DetailValue::UInt),
            (-1_000_000i32..1_000_000).prop_map(|n| DetailValue::Float(f64::from(n) / 8.0)),
            "[a-zA-Z0-9 _.-]{0,12}".prop_map(DetailValue::String),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(DetailValue::List),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(DetailValue::Map),
            ]
        })
    }

    fn details() -> impl Strategy<Value = Details> {
        prop::collection::btree_map("[a-z]{1,8}", detail_value(), 0..5)
    }

    fn expected_json(value: &DetailValue) -> Value {
        match value {
            DetailValue::Null => Value::Null,
            DetailValue::Bool(b) => Value::Bool(*b),
            DetailValue::Int(n) => Value::from(*n),
            DetailValue::UInt(n) => Value::from(*n),
            DetailValue::Float(f) => Value::from(*f),
            DetailValue::String(s) => Value::String(s.clone()),
            DetailValue::List(items) => Value::Array(items.iter().map(expected_json).collect()),
            DetailValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), expected_json(item)))
                    .collect(),
            ),
        }
    }

    proptest! {
        #[test]
        fn pascal_case_event_types_are_accepted(event_type in "[A-Z][a-zA-Z0-9]{0,16}") {
            prop_assert!(Message::new(event_type, Severity::Info, Details::new()).is_ok());
        }

        #[test]
        fn lowercase_or_digit_start_is_rejected(event_type in "[a-z0-9][a-zA-Z0-9]{0,16}") {
            let err = Message::new(event_type, Severity::Info, Details::new()).unwrap_err();
            let is_invalid = matches!(err, ValidationError::InvalidEventType { .. });
            prop_assert!(is_invalid);
        }

        #[test]
        fn non_alphanumeric_character_is_rejected(
            event_type in "[A-Z][a-zA-Z0-9]{0,6}[-_ .!/:][a-zA-Z0-9]{0,6}"
        ) {
            let err = Message::new(event_type, Severity::Warning, Details::new()).unwrap_err();
            let is_invalid = matches!(err, ValidationError::InvalidEventType { .. });
            prop_assert!(is_invalid);
        }

        #[test]
        fn encoding_parses_back_to_same_structure(
            event_type in "[A-Z][a-zA-Z0-9]{0,16}",
            severity in prop::sample::select(Severity::ALL.to_vec()),
            details in details(),
        ) {
            let expected_details: serde_json::Map<String, Value> = details
                .iter()
                .map(|(key, value)| (key.clone(), expected_json(value)))
                .collect();

            let message = Message::new(event_type.clone(), severity, details).unwrap();
            let parsed: Value = serde_json::from_str(&message.to_json()).unwrap();

            let object = parsed.as_object().unwrap();
            let keys: Vec<&String> = object.keys().collect();
            prop_assert_eq!(keys, vec!["event_type", "severity", "details"]);
            prop_assert_eq!(&object["event_type"], &Value::String(event_type));
            prop_assert_eq!(&object["severity"], &Value::String(severity.as_str().to_string()));
            prop_assert_eq!(&object["details"], &Value::Object(expected_details));
        }
    }
}
