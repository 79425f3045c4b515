//! # Reflective Path Resolver
//!
//! Generic dotted-path navigation over [`FieldValue`] trees.
//!
//! ## Path Syntax
//!
//! - Segments are separated by `.`; there is no escaping of literal dots.
//! - The empty path addresses the root.
//! - Inside a list, a segment that parses as an unsigned integer is an index
//!   (`items.2.name`). Inside a record every segment is a key, digits included.
//!
//! ## Failure Policy
//!
//! Every lookup returns `Option`. An absent intermediate, an out-of-range
//! index or a scalar in the middle of a path all resolve to `None`. Only
//! [`assign`] reports a [`PathError`], because a write with nowhere to go is
//! a caller bug rather than sparse data.

use crate::error::PathError;
use crate::value::FieldValue;

/// Split a path into its segments. The empty path has none.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(move |_| !path.is_empty())
}

/// Split off the last segment: `"a.b.c"` → `("a.b", "c")`, `"a"` → `("", "a")`.
pub fn split_last(path: &str) -> (&str, &str) {
    match path.rfind('.') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

/// Extend a base path by one key: `join("", "a") == "a"`, `join("a", "b") == "a.b"`.
pub fn join(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

/// Whether a segment addresses a list element.
pub fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn child<'a>(value: &'a FieldValue, segment: &str) -> Option<&'a FieldValue> {
    match value {
        FieldValue::Record(map) => map.get(segment),
        FieldValue::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut FieldValue, segment: &str) -> Option<&'a mut FieldValue> {
    match value {
        FieldValue::Record(map) => map.get_mut(segment),
        FieldValue::List(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// The value at `path`, or the root itself for the empty path.
pub fn resolve<'a>(root: &'a FieldValue, path: &str) -> Option<&'a FieldValue> {
    segments(path).try_fold(root, child)
}

/// Mutable twin of [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut FieldValue, path: &str) -> Option<&'a mut FieldValue> {
    segments(path).try_fold(root, child_mut)
}

/// The container holding the last segment of `path`.
///
/// For a single-segment path this is the root.
pub fn resolve_parent<'a>(root: &'a FieldValue, path: &str) -> Option<&'a FieldValue> {
    resolve(root, split_last(path).0)
}

/// Mutable twin of [`resolve_parent`].
pub fn resolve_parent_mut<'a>(root: &'a mut FieldValue, path: &str) -> Option<&'a mut FieldValue> {
    resolve_mut(root, split_last(path).0)
}

/// Store `value` at `path` through its parent container, returning the
/// previous value.
///
/// Records accept new keys; lists only accept in-range indices.
pub fn assign(
    root: &mut FieldValue,
    path: &str,
    value: FieldValue,
) -> Result<Option<FieldValue>, PathError> {
    if path.is_empty() {
        return Err(PathError::RootAssignment);
    }
    let (_, last) = split_last(path);
    let parent = resolve_parent_mut(root, path).ok_or_else(|| PathError::MissingParent {
        path: path.to_string(),
    })?;

    match parent {
        FieldValue::Record(map) => Ok(map.insert(last.to_string(), value)),
        FieldValue::List(items) => {
            let slot = last
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or_else(|| PathError::NotAssignable {
                    path: path.to_string(),
                    segment: last.to_string(),
                    container: "list".to_string(),
                })?;
            Ok(Some(std::mem::replace(slot, value)))
        }
        other => Err(PathError::NotAssignable {
            path: path.to_string(),
            segment: last.to_string(),
            container: other.kind_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> FieldValue {
        FieldValue::from(json!({
            "a": {"b": 5},
            "items": [{"name": "first"}, {"name": null}],
            "7": "seven"
        }))
    }

    #[test]
    fn resolves_nested_value() {
        assert_eq!(resolve(&data(), "a.b"), Some(&FieldValue::Number(5.0)));
    }

    #[test]
    fn empty_path_is_root() {
        let root = data();
        assert_eq!(resolve(&root, ""), Some(&root));
    }

    #[test]
    fn missing_intermediate_is_absent() {
        let root = FieldValue::from(json!({"a": {}}));
        assert_eq!(resolve(&root, "a.b.c"), None);
        assert_eq!(resolve(&root, "x.y"), None);
    }

    #[test]
    fn scalar_in_the_middle_is_absent() {
        assert_eq!(resolve(&data(), "a.b.c"), None);
    }

    #[test]
    fn indexes_into_lists() {
        let root = data();
        assert_eq!(resolve(&root, "items.0.name"), Some(&FieldValue::from("first")));
        assert_eq!(resolve(&root, "items.1.name"), Some(&FieldValue::Null));
        assert_eq!(resolve(&root, "items.5.name"), None);
        assert_eq!(resolve(&root, "items.first"), None);
    }

    #[test]
    fn numeric_keys_in_records_are_keys() {
        assert_eq!(resolve(&data(), "7"), Some(&FieldValue::from("seven")));
    }

    #[test]
    fn parent_of_single_segment_is_root() {
        let root = data();
        assert_eq!(resolve_parent(&root, "a"), Some(&root));
        assert_eq!(resolve_parent(&root, "a.b"), root.get("a"));
    }

    #[test]
    fn split_and_join() {
        assert_eq!(split_last("a.b.c"), ("a.b", "c"));
        assert_eq!(split_last("a"), ("", "a"));
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a.b", "c"), "a.b.c");
        assert_eq!(segments("").count(), 0);
        assert_eq!(segments("a.b").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn assign_replaces_and_returns_old() {
        let mut root = data();
        let old = assign(&mut root, "a.b", FieldValue::from(6.0)).unwrap();
        assert_eq!(old, Some(FieldValue::Number(5.0)));
        assert_eq!(resolve(&root, "a.b"), Some(&FieldValue::Number(6.0)));
    }

    #[test]
    fn assign_adds_new_record_keys() {
        let mut root = data();
        let old = assign(&mut root, "a.c", FieldValue::from("new")).unwrap();
        assert_eq!(old, None);
        assert_eq!(resolve(&root, "a.c"), Some(&FieldValue::from("new")));
    }

    #[test]
    fn assign_into_list_element() {
        let mut root = data();
        assign(&mut root, "items.1.name", FieldValue::from("second")).unwrap();
        assert_eq!(resolve(&root, "items.1.name"), Some(&FieldValue::from("second")));
    }

    #[test]
    fn assign_rejects_impossible_writes() {
        let mut root = data();
        assert_eq!(
            assign(&mut root, "", FieldValue::Null),
            Err(PathError::RootAssignment)
        );
        assert!(matches!(
            assign(&mut root, "missing.x", FieldValue::Null),
            Err(PathError::MissingParent { .. })
        ));
        assert!(matches!(
            assign(&mut root, "items.9", FieldValue::Null),
            Err(PathError::NotAssignable { .. })
        ));
        assert!(matches!(
            assign(&mut root, "a.b.c", FieldValue::Null),
            Err(PathError::NotAssignable { .. })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Resolution never panics, whatever the path.
            #[test]
            fn resolve_never_panics(path in "[a-z0-9.]{0,20}") {
                let root = data();
                let _ = resolve(&root, &path);
                let _ = resolve_parent(&root, &path);
            }

            /// Whatever is assigned to a record key can be read back.
            #[test]
            fn assign_then_resolve(key in "[a-z]{1,8}", n in -1.0e6f64..1.0e6) {
                let mut root = data();
                let path = join("a", &key);
                assign(&mut root, &path, FieldValue::from(n)).unwrap();
                prop_assert_eq!(resolve(&root, &path), Some(&FieldValue::Number(n)));
            }
        }
    }
}
