//! Structural comparison of list snapshots.

use serde_json::Value as Json;

/// Whether `left` and `right` differ, ignoring object members whose name is
/// listed in `volatile` at any depth.
pub fn has_diff(left: &Json, right: &Json, volatile: &[String]) -> bool {
    match (left, right) {
        (Json::Object(l), Json::Object(r)) => {
            let relevant = |k: &String| !volatile.iter().any(|v| v == k);
            let lk = l.keys().filter(|k| relevant(*k));
            let rk = r.keys().filter(|k| relevant(*k));
            if lk.clone().count() != rk.count() {
                return true;
            }
            lk.into_iter().any(|k| match r.get(k) {
                Some(rv) => has_diff(&l[k], rv, volatile),
                None => true,
            })
        }
        (Json::Array(l), Json::Array(r)) => {
            l.len() != r.len() || l.iter().zip(r).any(|(a, b)| has_diff(a, b, volatile))
        }
        (l, r) => l != r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_structures() {
        let a = json!([{ "id": 1, "tags": ["x"] }, { "id": 2, "tags": [] }]);
        assert!(!has_diff(&a, &a.clone(), &[]));
    }

    #[test]
    fn test_detects_nested_change() {
        let a = json!([{ "id": 1, "tags": ["x"] }]);
        let b = json!([{ "id": 1, "tags": ["y"] }]);
        assert!(has_diff(&a, &b, &[]));
        assert!(has_diff(&a, &json!([]), &[]));
    }

    #[test]
    fn test_volatile_members_are_ignored() {
        let volatile = vec!["key".to_string()];
        let a = json!([{ "key": "r1", "name": "ada" }]);
        let b = json!([{ "key": "r9", "name": "ada" }]);
        let c = json!([{ "name": "ada" }]);
        assert!(!has_diff(&a, &b, &volatile));
        assert!(!has_diff(&a, &c, &volatile));
        assert!(has_diff(&a, &b, &[]));
    }
}
