//! Loosely-typed payload tree built before serialization
//!
//! A [`Payload`] is an insertion-ordered mapping. Keys may be declared without
//! a value; such keys must be filled in before the tree is sanitised, otherwise
//! [`Payload::sanitise`] fails with every unset key listed.

use crate::error::{AutoconfigError, Result};
use crate::utils::expand_placeholders;

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Dict(Payload),
    Array(Vec<Payload>),
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        PayloadValue::Bool(value)
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        PayloadValue::Int(value)
    }
}

impl From<u16> for PayloadValue {
    fn from(value: u16) -> Self {
        PayloadValue::Int(i64::from(value))
    }
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::Str(value.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::Str(value)
    }
}

impl From<Payload> for PayloadValue {
    fn from(value: Payload) -> Self {
        PayloadValue::Dict(value)
    }
}

impl From<Vec<Payload>> for PayloadValue {
    fn from(value: Vec<Payload>) -> Self {
        PayloadValue::Array(value)
    }
}

/// Ordered key/value tree; `None` marks a declared but unset key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, Option<PayloadValue>)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, keeping its position if it already exists
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PayloadValue>) {
        self.put(key.into(), Some(value.into()));
    }

    /// Declare `key` without a value
    pub fn unset(&mut self, key: impl Into<String>) {
        self.put(key.into(), None);
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PayloadValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_unset(mut self, key: impl Into<String>) -> Self {
        self.unset(key);
        self
    }

    fn put(&mut self, key: String, value: Option<PayloadValue>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value of `key`, `None` if absent or unset
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&PayloadValue>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Paths of all unset keys, e.g. `PayloadContent[0].EmailAccountName`
    pub fn missing_keys(&self) -> Vec<String> {
        let mut missing = Vec::new();
        self.collect_missing("", &mut missing);
        missing
    }

    fn collect_missing(&self, prefix: &str, missing: &mut Vec<String>) {
        for (key, value) in &self.entries {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };
            match value {
                None => missing.push(path),
                Some(PayloadValue::Dict(dict)) => dict.collect_missing(&path, missing),
                Some(PayloadValue::Array(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        item.collect_missing(&format!("{}[{}]", path, i), missing);
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Fail on unset keys, then expand placeholders in every string leaf
    pub fn sanitise(&mut self, local_part: &str, domain: &str) -> Result<()> {
        let missing = self.missing_keys();
        if !missing.is_empty() {
            return Err(AutoconfigError::PayloadIntegrity(missing));
        }
        self.expand(local_part, domain);
        Ok(())
    }

    fn expand(&mut self, local_part: &str, domain: &str) {
        for (_, value) in self.entries.iter_mut() {
            match value {
                Some(PayloadValue::Str(s)) => *s = expand_placeholders(s, local_part, domain),
                Some(PayloadValue::Dict(dict)) => dict.expand(local_part, domain),
                Some(PayloadValue::Array(items)) => {
                    for item in items.iter_mut() {
                        item.expand(local_part, domain);
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::placeholders::has_placeholders;

    fn strings(payload: &Payload, out: &mut Vec<String>) {
        for (_, value) in payload.entries() {
            match value {
                Some(PayloadValue::Str(s)) => out.push(s.clone()),
                Some(PayloadValue::Dict(d)) => strings(d, out),
                Some(PayloadValue::Array(items)) => items.iter().for_each(|i| strings(i, out)),
                _ => {}
            }
        }
    }

    #[test]
    fn test_set_keeps_insertion_order() {
        let mut payload = Payload::new().with("b", 1i64).with_unset("a").with("c", true);
        payload.set("a", "filled");

        assert_eq!(payload.entries().map(|(k, _)| k).collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(payload.get("a"), Some(&PayloadValue::Str("filled".to_string())));
    }

    #[test]
    fn test_get_unset_is_none() {
        let payload = Payload::new().with_unset("a");
        assert!(payload.entries().any(|(k, _)| k == "a"));
        assert_eq!(payload.get("a"), None);
        assert_eq!(payload.get("b"), None);
    }

    #[test]
    fn test_missing_keys_reports_nested_paths() {
        let inner = Payload::new().with_unset("Name").with("Port", 993u16);
        let payload = Payload::new()
            .with_unset("Top")
            .with("Content", vec![Payload::new(), inner])
            .with("Nested", Payload::new().with_unset("Deep"));

        assert_eq!(
            payload.missing_keys(),
            vec!["Top", "Content[1].Name", "Nested.Deep"]
        );
    }

    #[test]
    fn test_sanitise_fails_listing_every_unset_key() {
        let mut payload = Payload::new()
            .with_unset("EmailAccountName")
            .with("EmailAddress", "%EMAILADDRESS%")
            .with_unset("IncomingMailServerHostName");

        match payload.sanitise("alice", "example.com") {
            Err(AutoconfigError::PayloadIntegrity(keys)) => {
                assert_eq!(keys, vec!["EmailAccountName", "IncomingMailServerHostName"]);
            }
            other => panic!("expected payload integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_sanitise_expands_everywhere() {
        let account = Payload::new()
            .with("Username", "%EMAILLOCALPART%")
            .with("Address", "%EMAILADDRESS%");
        let mut payload = Payload::new()
            .with("Display", "Mail for %EMAILDOMAIN%")
            .with("Content", vec![account.clone(), account])
            .with("Nested", Payload::new().with("Host", "imap.%EMAILDOMAIN%"))
            .with("Port", 993u16)
            .with("Flag", false);

        payload.sanitise("alice", "example.com").unwrap();

        let mut values = Vec::new();
        strings(&payload, &mut values);
        assert_eq!(values.len(), 6);
        assert!(values.iter().all(|v| !has_placeholders(v)));
        assert_eq!(
            payload.get("Display"),
            Some(&PayloadValue::Str("Mail for example.com".to_string()))
        );
        assert_eq!(payload.get("Port"), Some(&PayloadValue::Int(993)));
        assert_eq!(payload.get("Flag"), Some(&PayloadValue::Bool(false)));
    }
}
