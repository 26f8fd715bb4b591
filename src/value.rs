//! Request input values.
//!
//! Everything a request carries arrives as [`Value`]: either a single piece
//! of text or an ordered map of named values. Maps nest, which is how
//! bracketed form fields (`user[name]`, `user[tags][]` and friends) survive
//! the trip through the gateway without flattening.
//!
//! Map iteration order is insertion order. The order keys arrived in is part
//! of what hosts observe, so it is preserved end to end.

use std::fmt;

use indexmap::IndexMap;

/// A single unit of request input.
///
/// # Examples
///
/// ```
/// use input_gateway::Value;
///
/// let mut profile = Value::map();
/// profile.insert("name", "Ada");
/// profile.insert("handle", "ada_l");
///
/// assert_eq!(profile.get("name").and_then(Value::as_text), Some("Ada"));
/// assert!(profile.get("missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Scalar text.
    Text(String),
    /// An ordered mapping of named values. Values may themselves be maps.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Builds a text value.
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    /// Builds an empty map value.
    pub fn map() -> Self {
        Value::Map(IndexMap::new())
    }

    /// Returns the text content, or `None` for maps.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Map(_) => None,
        }
    }

    /// Returns the underlying map, or `None` for text.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Text(_) => None,
            Value::Map(entries) => Some(entries),
        }
    }

    /// Looks up a direct child by key. Text values have no children.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|entries| entries.get(key))
    }

    /// True for empty text and for maps with no entries.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(text) => text.is_empty(),
            Value::Map(entries) => entries.is_empty(),
        }
    }

    /// Inserts a child entry, turning a text value into a map first.
    ///
    /// Later inserts under the same key replace the earlier entry while
    /// keeping its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        if let Value::Text(_) = self {
            *self = Value::map();
        }
        if let Value::Map(entries) = self {
            entries.insert(key.into(), value.into());
        }
    }

    /// Applies `f` to every text leaf, rebuilding maps around the results.
    ///
    /// Key names and entry order are untouched; only leaf text changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use input_gateway::Value;
    ///
    /// let mut tags = Value::map();
    /// tags.insert("first", "rust");
    /// let upper = tags.map_text(&|t| t.to_uppercase());
    /// assert_eq!(upper.get("first").and_then(Value::as_text), Some("RUST"));
    /// ```
    pub fn map_text<F>(self, f: &F) -> Value
    where
        F: Fn(&str) -> String,
    {
        match self {
            Value::Text(text) => Value::Text(f(&text)),
            Value::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.map_text(f)))
                    .collect(),
            ),
        }
    }
}

impl Default for Value {
    /// An empty map, matching what an absent input source looks like.
    fn default() -> Self {
        Value::map()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Map(entries) => write!(f, "<map of {} entries>", entries.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl<K, V> FromIterator<(K, V)> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
