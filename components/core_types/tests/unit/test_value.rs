//! Unit tests for Value enum

use core_types::{JsError, Settlement, Thenable, Value};
use std::collections::BTreeMap;
use std::rc::Rc;

struct NeverSettles;

impl Thenable for NeverSettles {
    fn on_settled(&self, _callback: Box<dyn FnOnce(Settlement)>) {}
}

#[cfg(test)]
mod value_conversion_tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(7), Value::Smi(7));
        assert_eq!(Value::from(1.5), Value::Double(1.5));
        assert_eq!(Value::from("s"), Value::String("s".to_string()));
        assert_eq!(
            Value::from(vec![Value::Null]),
            Value::Array(vec![Value::Null])
        );
    }

    #[test]
    fn test_from_json_object() {
        let value = Value::from_json(serde_json::json!({
            "ok": true,
            "items": [1, "two", null],
            "nested": { "pi": 3.25 }
        }));

        let mut nested = BTreeMap::new();
        nested.insert("pi".to_string(), Value::Double(3.25));
        let mut expected = BTreeMap::new();
        expected.insert("ok".to_string(), Value::Boolean(true));
        expected.insert(
            "items".to_string(),
            Value::Array(vec![Value::Smi(1), Value::from("two"), Value::Null]),
        );
        expected.insert("nested".to_string(), Value::Object(nested));

        assert_eq!(value, Value::Object(expected));
    }

    #[test]
    fn test_as_str() {
        assert_eq!(Value::from("text").as_str(), Some("text"));
        assert_eq!(Value::Smi(1).as_str(), None);
    }
}

#[cfg(test)]
mod value_display_tests {
    use super::*;

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::Smi(-3).to_string(), "-3");
        assert_eq!(Value::Double(0.5).to_string(), "0.5");
        assert_eq!(Value::Double(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Double(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn test_display_objects() {
        assert_eq!(Value::Object(BTreeMap::new()).to_string(), "[object Object]");
        assert_eq!(
            Value::Thenable(Rc::new(NeverSettles)).to_string(),
            "[object Promise]"
        );
        assert_eq!(Value::Error(JsError::type_error("t")).to_string(), "TypeError: t");
    }

    #[test]
    fn test_debug_hides_thenable_internals() {
        let value = Value::Thenable(Rc::new(NeverSettles));
        assert_eq!(format!("{:?}", value), "Thenable(...)");
    }

    #[test]
    fn test_default_identity_is_shared_by_clones() {
        let thenable: Rc<dyn Thenable> = Rc::new(NeverSettles);
        let alias = thenable.clone();
        assert_eq!(thenable.identity(), alias.identity());
    }
}

#[cfg(test)]
mod value_semantics_tests {
    use super::*;

    #[test]
    fn test_falsy_values() {
        for value in [
            Value::Undefined,
            Value::Null,
            Value::Boolean(false),
            Value::Smi(0),
            Value::Double(0.0),
            Value::from(""),
        ] {
            assert!(!value.is_truthy(), "{:?} should be falsy", value);
        }
    }

    #[test]
    fn test_cross_variant_inequality() {
        assert_ne!(Value::Smi(1), Value::Double(1.0));
        assert_ne!(Value::Null, Value::Undefined);
    }
}
