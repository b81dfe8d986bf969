//! Ordered key/value tag lists attached to pages and items.

use crate::template::TagDescriptionList;
use serde::{Deserialize, Serialize};

/// A single key/value pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tags with unique keys, kept in ascending key order.
///
/// Lookups use binary search. Building a list from arbitrary input (including
/// deserialization) sorts it and keeps the last value for a duplicated key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Tag>", into = "Vec<Tag>")]
pub struct TagList(Vec<Tag>);

impl TagList {
    /// Create an empty tag list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Value stored under `key`, if any.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.position(key)
            .ok()
            .map(|idx| self.0[idx].value.as_str())
    }

    /// Insert or replace the value for `key`.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Ok(idx) => self.0[idx].value = value,
            Err(idx) => self.0.insert(idx, Tag { key, value }),
        }
    }

    /// Fill in the default of every described key that is missing or empty.
    pub fn default_to(&mut self, descriptions: &TagDescriptionList) {
        for desc in descriptions.iter() {
            let missing = self.tag(&desc.key).is_none_or(str::is_empty);
            if missing {
                self.set_tag(desc.key.clone(), desc.default_value.clone());
            }
        }
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        match self.position(key) {
            Ok(idx) => Some(self.0.remove(idx).value),
            Err(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn position(&self, key: &str) -> Result<usize, usize> {
        self.0.binary_search_by(|tag| tag.key.as_str().cmp(key))
    }
}

impl From<Vec<Tag>> for TagList {
    fn from(mut tags: Vec<Tag>) -> Self {
        // Stable sort so that among duplicates the last one given wins below.
        tags.sort_by(|a, b| a.key.cmp(&b.key));
        let mut out: Vec<Tag> = Vec::with_capacity(tags.len());
        for tag in tags {
            match out.last_mut() {
                Some(last) if last.key == tag.key => *last = tag,
                _ => out.push(tag),
            }
        }
        Self(out)
    }
}

impl From<TagList> for Vec<Tag> {
    fn from(list: TagList) -> Self {
        list.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| Tag::new(k, v))
            .collect::<Vec<_>>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TagDescription;

    fn keys(list: &TagList) -> Vec<&str> {
        list.iter().map(|t| t.key.as_str()).collect()
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let mut tags = TagList::new();
        tags.set_tag("color", "blue");
        assert_eq!(tags.tag("color"), Some("blue"));

        tags.set_tag("color", "red");
        assert_eq!(tags.tag("color"), Some("red"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_missing_key() {
        let tags: TagList = [("a", "1")].into_iter().collect();
        assert_eq!(tags.tag("b"), None);
    }

    #[test]
    fn test_stays_sorted_after_many_sets() {
        let mut tags = TagList::new();
        for key in ["m", "c", "x", "a", "q", "c", "b", "z", "a"] {
            tags.set_tag(key, format!("v-{key}"));
        }
        assert_eq!(keys(&tags), vec!["a", "b", "c", "m", "q", "x", "z"]);
        for key in ["a", "b", "c", "m", "q", "x", "z"] {
            assert_eq!(tags.tag(key), Some(format!("v-{key}").as_str()));
        }
    }

    #[test]
    fn test_from_unsorted_vec_keeps_last_duplicate() {
        let tags = TagList::from(vec![
            Tag::new("b", "1"),
            Tag::new("a", "2"),
            Tag::new("b", "3"),
        ]);
        assert_eq!(keys(&tags), vec!["a", "b"]);
        assert_eq!(tags.tag("b"), Some("3"));
    }

    #[test]
    fn test_deserialize_sorts() {
        let tags: TagList = serde_json::from_str(
            r#"[{"key":"z","value":"1"},{"key":"a","value":"2"}]"#,
        )
        .unwrap();
        assert_eq!(keys(&tags), vec!["a", "z"]);

        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"[{"key":"a","value":"2"},{"key":"z","value":"1"}]"#);
    }

    #[test]
    fn test_default_to_fills_missing_and_empty() {
        let mut tags: TagList = [("title", ""), ("color", "green")].into_iter().collect();
        let descriptions = TagDescriptionList::from(vec![
            TagDescription::new("title", "Untitled"),
            TagDescription::new("color", "black"),
            TagDescription::new("size", "large"),
        ]);

        tags.default_to(&descriptions);

        assert_eq!(tags.tag("title"), Some("Untitled"));
        assert_eq!(tags.tag("color"), Some("green"));
        assert_eq!(tags.tag("size"), Some("large"));
    }

    #[test]
    fn test_remove() {
        let mut tags: TagList = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(tags.remove("a"), Some("1".to_string()));
        assert_eq!(tags.remove("a"), None);
        assert_eq!(keys(&tags), vec!["b"]);
    }
}
