use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_new_rejects_unrooted() {
    assert_eq!(TypePath::new("datum"), None);
    assert_eq!(TypePath::new(""), None);
}

#[test]
fn test_new_rejects_trailing_slash() {
    assert_eq!(TypePath::new("/datum/"), None);
    assert!(TypePath::new("/").is_some());
}

#[test]
fn test_parent_chain() {
    let sword = match TypePath::new("/datum/weapon/sword") {
        Some(p) => p,
        None => panic!("valid path"),
    };
    let weapon = sword.parent();
    assert_eq!(weapon.as_ref().map(TypePath::as_str), Some("/datum/weapon"));
    let datum = weapon.and_then(|p| p.parent());
    assert_eq!(datum.as_ref().map(TypePath::as_str), Some("/datum"));
    let root = datum.and_then(|p| p.parent());
    assert_eq!(root, Some(TypePath::root()));
    assert_eq!(TypePath::root().parent(), None);
}

#[test]
fn test_element_name() {
    let sword = match TypePath::new("/datum/weapon/sword") {
        Some(p) => p,
        None => panic!("valid path"),
    };
    assert_eq!(sword.element_name(), "sword");
    assert_eq!(TypePath::root().element_name(), "");
}

#[test]
fn test_child_of_root() {
    let datum = TypePath::root().child("datum");
    assert_eq!(datum.as_str(), "/datum");
}
