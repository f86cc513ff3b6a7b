//! Typed metadata values

/// A metadata value as written in a document's frontmatter.
///
/// Only `String` values are ever interpreted as links; every other shape of
/// a tracked key is treated as "no link".
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<PropertyValue>),
    Map(Properties),
}

impl PropertyValue {
    /// The string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert a parsed YAML value, keeping mapping order.
    pub(crate) fn from_yaml(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            Value::String(s) => Self::String(s),
            Value::Sequence(items) => Self::List(items.into_iter().map(Self::from_yaml).collect()),
            Value::Mapping(mapping) => Self::Map(Properties::from_yaml_mapping(mapping)),
            Value::Tagged(tagged) => Self::from_yaml(tagged.value),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Insertion-ordered property map.
///
/// Frontmatter key order is meaningful to users, so this is a list of
/// pairs rather than a hash map. Blocks are small; lookups are linear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, PropertyValue)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Set a key, replacing in place if it exists or appending otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Properties::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn from_yaml_mapping(mapping: serde_yaml::Mapping) -> Self {
        let mut properties = Self::new();
        for (key, value) in mapping {
            let key = match key {
                serde_yaml::Value::String(s) => s,
                other => match serde_yaml::to_string(&other) {
                    Ok(rendered) => rendered.trim().to_string(),
                    Err(_) => continue,
                },
            };
            properties.insert(key, PropertyValue::from_yaml(value));
        }
        properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut props = Properties::new()
            .with("title", "Plan")
            .with("status", "draft")
            .with("tags", "x");
        props.insert("status", "superseded".into());

        let keys: Vec<_> = props.keys().collect();
        assert_eq!(keys, vec!["title", "status", "tags"]);
        assert_eq!(props.get("status").and_then(|v| v.as_str()), Some("superseded"));
    }

    #[test]
    fn yaml_mapping_keeps_order() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("zeta: 1\nalpha: true\nmid: [a, b]\n").unwrap();
        let serde_yaml::Value::Mapping(mapping) = yaml else {
            panic!("expected mapping");
        };
        let props = Properties::from_yaml_mapping(mapping);

        let keys: Vec<_> = props.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(props.get("zeta"), Some(&PropertyValue::Number(1.0)));
        assert_eq!(props.get("alpha"), Some(&PropertyValue::Bool(true)));
        assert!(matches!(props.get("mid"), Some(PropertyValue::List(v)) if v.len() == 2));
    }

    #[test]
    fn only_strings_expose_as_str() {
        assert_eq!(PropertyValue::from("x").as_str(), Some("x"));
        assert_eq!(PropertyValue::Bool(true).as_str(), None);
        assert_eq!(PropertyValue::Null.as_str(), None);
    }
}
