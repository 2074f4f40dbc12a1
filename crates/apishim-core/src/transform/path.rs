//! Dot-path lookup into JSON documents

use serde_json::Value;

/// Split a dot path into its non-empty segments
///
/// A leading `.` and empty segments (`a..b`) are tolerated.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_start_matches('.').split('.').filter(|s| !s.is_empty())
}

/// Follow `path` through nested objects
///
/// Returns `None` when a segment is missing or the value reached so far is
/// not an object. Never fails.
pub fn get_nested_value<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path_segments(path).try_fold(data, |current, key| match current {
        Value::Object(map) => map.get(key),
        _ => None,
    })
}
