use pretty_assertions::assert_eq;

use crate::list::{List, ListRef};
use crate::value::Value;

#[test]
fn append_and_index() {
    let mut list = List::new();
    assert!(list.is_empty());
    list.append(Value::number(1.0));
    list.append(Value::text("two"));
    assert_eq!(list.len(), 2);
    assert_eq!(list.get(0), Some(&Value::number(1.0)));
    assert_eq!(list.get(1), Some(&Value::text("two")));
    assert_eq!(list.get(2), None);
}

#[test]
fn assoc_set_inserts_absent_key_into_sequence() {
    let mut list = List::new();
    list.set_assoc(Value::text("strength"), Value::number(8.0));
    assert_eq!(list.len(), 1);
    assert_eq!(list.get(0), Some(&Value::text("strength")));
    assert_eq!(
        list.get_assoc(&Value::text("strength")),
        Some(&Value::number(8.0))
    );
}

#[test]
fn assoc_set_on_existing_key_does_not_duplicate() {
    let mut list = List::new();
    list.append(Value::text("strength"));
    list.set_assoc(Value::text("strength"), Value::number(8.0));
    list.set_assoc(Value::text("strength"), Value::number(9.0));
    assert_eq!(list.len(), 1);
    assert_eq!(
        list.get_assoc(&Value::text("strength")),
        Some(&Value::number(9.0))
    );
}

#[test]
fn get_assoc_misses_cleanly() {
    let list = List::new();
    assert_eq!(list.get_assoc(&Value::text("absent")), None);
}

#[test]
fn iteration_covers_assoc_keys() {
    let mut list = List::new();
    list.append(Value::number(1.0));
    list.set_assoc(Value::text("k"), Value::number(2.0));
    let items: Vec<Value> = list.iter().cloned().collect();
    assert_eq!(items, vec![Value::number(1.0), Value::text("k")]);
}

#[test]
fn ref_mutation_is_visible_through_clones() {
    let list = ListRef::new();
    let alias = list.clone();
    list.borrow_mut().append(Value::number(7.0));
    assert_eq!(alias.borrow().len(), 1);
    assert!(list.ptr_eq(&alias));
    assert!(!list.ptr_eq(&ListRef::new()));
}
