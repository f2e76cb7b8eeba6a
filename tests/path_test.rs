//! Integration tests for Path.

use inquest::{Index, Path, PathError, PathFormat, Segment};
use proptest::prelude::*;

#[test]
fn test_path_construction_and_display() {
    // Root path
    assert_eq!(Path::root().to_string(), "");
    assert!(Path::root().is_root());

    // Simple name
    assert_eq!(Path::root().push_name("name").unwrap().to_string(), "name");

    // Complex nested path
    let path = Path::root()
        .push_name("users")
        .and_then(|p| p.push_index(0))
        .and_then(|p| p.push_name("address"))
        .and_then(|p| p.push_name("city"))
        .unwrap();
    assert_eq!(path.to_string(), "users[0].address.city");
    assert_eq!(path.len(), 4);
}

#[test]
fn test_consecutive_indexes_have_no_separator() {
    let path = Path::root()
        .append(Segment::name("a").unwrap())
        .and_then(|p| p.append(Segment::index(0)))
        .and_then(|p| p.append(Segment::index(1)))
        .unwrap();
    assert_eq!(path.join("."), "a[0][1]");
    assert_eq!(path.join("/"), "a[0][1]");
}

#[test]
fn test_index_cannot_start_a_path() {
    assert_eq!(
        Path::root().push_index(0).unwrap_err(),
        PathError::IndexAtRoot(Index::Numeric(0))
    );
    assert!(Path::root().append(Segment::key("k").unwrap()).is_err());

    // Any non-index segment is fine at the root.
    assert!(Path::root().append(Segment::name("a").unwrap()).is_ok());
    assert_eq!(Path::root().append(Segment::Empty).unwrap(), Path::root());
}

#[test]
fn test_path_is_immutable() {
    let base = Path::of(["items"]).unwrap();

    let first = base.push_index(0).unwrap();
    let second = base.push_index(1).unwrap();
    let count = base.push_name("count").unwrap();

    // Base path unchanged
    assert_eq!(base.to_string(), "items");
    assert_eq!(first.to_string(), "items[0]");
    assert_eq!(second.to_string(), "items[1]");
    assert_eq!(count.to_string(), "items.count");
    assert_eq!(first.parent(), Some(base.clone()));
    assert_eq!(count.parent(), second.parent());
}

#[test]
fn test_segments_root_first() {
    let path = Path::of(["data"])
        .and_then(|p| p.push_key("alice"))
        .and_then(|p| p.push_name("value"))
        .unwrap();

    assert_eq!(
        path.segments(),
        vec![
            Segment::Name("data".to_string()),
            Segment::Index(Index::Key("alice".to_string())),
            Segment::Name("value".to_string()),
        ]
    );
    assert_eq!(path.last(), Some(&Segment::Name("value".to_string())));
}

#[test]
fn test_custom_rendering() {
    let path = Path::of(["users"])
        .and_then(|p| p.push_index(3))
        .and_then(|p| p.push_name("tags"))
        .and_then(|p| p.push_index(1))
        .and_then(|p| p.push_index(2))
        .unwrap();

    let format = PathFormat::default().with_separator("/");
    assert_eq!(path.display_with(&format), "users[3]/tags[1][2]");
    assert_eq!(path.last_sub_path(), "tags[1][2]");

    let upper = path.join_with("::", |segment| segment.to_string().to_uppercase());
    assert_eq!(upper, "USERS[3]::TAGS[1][2]");

    assert_eq!(Path::root().display_with(&PathFormat::default()), "(root)");
    assert_eq!(
        Path::root().display_with(&PathFormat::default().with_root_token("$")),
        "$"
    );
}

#[test]
fn test_blank_segments_rejected() {
    assert_eq!(Path::of(["a", " "]).unwrap_err(), PathError::BlankName);
    assert_eq!(
        Path::of(["a"]).unwrap().push_key("").unwrap_err(),
        PathError::BlankKey
    );
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

proptest! {
    #[test]
    fn names_join_with_separator(names in prop::collection::vec(name_strategy(), 1..6)) {
        let path = Path::of(names.clone()).unwrap();
        prop_assert_eq!(path.join("."), names.join("."));
        prop_assert_eq!(path.len(), names.len());
    }

    #[test]
    fn structurally_equal_paths_are_equal(
        names in prop::collection::vec(name_strategy(), 1..6),
        idx in 0usize..100,
    ) {
        let left = Path::of(names.clone()).unwrap().push_index(idx).unwrap();
        let right = Path::of(names).unwrap().push_index(idx).unwrap();
        prop_assert_eq!(&left, &right);
        prop_assert_eq!(left.to_string(), right.to_string());
    }

    #[test]
    fn parent_undoes_append(
        names in prop::collection::vec(name_strategy(), 1..6),
        extra in name_strategy(),
    ) {
        let base = Path::of(names).unwrap();
        let extended = base.push_name(extra).unwrap();
        prop_assert_eq!(extended.parent(), Some(base));
    }
}
