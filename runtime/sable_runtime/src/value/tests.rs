use pretty_assertions::assert_eq;

use crate::list::ListRef;
use crate::value::Value;

#[test]
fn truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::number(0.0).is_truthy());
    assert!(!Value::text("").is_truthy());
    assert!(Value::number(-1.5).is_truthy());
    assert!(Value::text("a").is_truthy());
    assert!(Value::list(ListRef::new()).is_truthy());
}

#[test]
fn accessors_are_tag_strict() {
    let v = Value::number(3.0);
    assert_eq!(v.as_number(), Some(3.0));
    assert_eq!(v.as_text(), None);
    assert!(v.as_list().is_none());

    let v = Value::text("hi");
    assert_eq!(v.as_text(), Some("hi"));
    assert_eq!(v.as_number(), None);
}

#[test]
fn scalar_equality_is_structural() {
    assert_eq!(Value::Null, Value::Null);
    assert_eq!(Value::number(2.0), Value::number(2.0));
    assert_eq!(Value::text("x"), Value::text("x"));
    assert!(Value::number(2.0) != Value::text("2"));
    assert!(Value::Null != Value::number(0.0));
}

#[test]
fn list_equality_is_identity() {
    let a = ListRef::new();
    let b = ListRef::new();
    assert_eq!(Value::list(a.clone()), Value::list(a.clone()));
    assert!(Value::list(a) != Value::list(b));
}

#[test]
fn display_drops_trailing_zero_on_whole_numbers() {
    assert_eq!(Value::number(42.0).to_string(), "42");
    assert_eq!(Value::number(-3.0).to_string(), "-3");
    assert_eq!(Value::number(2.5).to_string(), "2.5");
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::text("blade").to_string(), "blade");
}

#[test]
fn kind_names() {
    assert_eq!(Value::Null.kind_name(), "null");
    assert_eq!(Value::number(1.0).kind_name(), "number");
    assert_eq!(Value::text("").kind_name(), "text");
    assert_eq!(Value::list(ListRef::new()).kind_name(), "list");
}
