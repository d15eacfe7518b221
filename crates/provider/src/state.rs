//! Login state carried through the provider round trip
//!
//! The adapter passes a `State` when building the authorization URL; the
//! provider library is responsible for encoding (and signing) it into the
//! OAuth `state` parameter and for checking it when the callback arrives.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered string map, serialized as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(BTreeMap<String, String>);

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// State holding a single entry, e.g. `State::pair("after", "success")`.
    pub fn pair(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new().with(key, value)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_builds_single_entry() {
        let state = State::pair("after", "success");
        assert_eq!(state.get("after"), Some("success"));
        assert_eq!(state.iter().count(), 1);
    }

    #[test]
    fn serializes_as_flat_object_in_key_order() {
        let state = State::new().with("b", "2").with("a", "1");
        assert_eq!(serde_json::to_string(&state).unwrap(), r#"{"a":"1","b":"2"}"#);
        let back: State = serde_json::from_str(r#"{"a":"1","b":"2"}"#).unwrap();
        assert_eq!(back, state);
    }
}
