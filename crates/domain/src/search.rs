//! Free-text search
//!
//! Searchable records expose their fields as borrowed [`Value`]s. A query matches a value if the
//! lower-cased query is a substring of the lower-cased textual form of any scalar reachable from
//! that value.

/// Borrowed view of a field of a searchable record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Text(&'a str),
    Integer(i64),
    Float(f32),
    Bool(bool),
    List(Vec<Value<'a>>),
    Record(Vec<(&'static str, Value<'a>)>),
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Text(value)
    }
}

impl From<u32> for Value<'_> {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f32> for Value<'_> {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

pub trait Searchable {
    /// Returns `None` for unknown field names.
    fn field(&self, name: &str) -> Option<Value<'_>>;
}

#[must_use]
pub fn search_in_value(value: &Value, query: &str) -> bool {
    contains_lowercase(value, &query.to_lowercase())
}

fn contains_lowercase(value: &Value, query: &str) -> bool {
    match value {
        Value::Null => false,
        Value::Text(text) => text.to_lowercase().contains(query),
        Value::Integer(number) => number.to_string().contains(query),
        Value::Float(number) => number.to_string().contains(query),
        Value::Bool(boolean) => boolean.to_string().contains(query),
        Value::List(items) => items.iter().any(|item| contains_lowercase(item, query)),
        Value::Record(fields) => fields
            .iter()
            .any(|(_, value)| contains_lowercase(value, query)),
    }
}

#[must_use]
pub fn search_in_object<T: Searchable + ?Sized>(item: &T, fields: &[&str], query: &str) -> bool {
    let query = query.to_lowercase();
    fields.iter().any(|name| {
        item.field(name)
            .is_some_and(|value| contains_lowercase(&value, &query))
    })
}

/// Search state of a list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Search {
    pub query: String,
    fields: &'static [&'static str],
}

impl Search {
    #[must_use]
    pub fn new(fields: &'static [&'static str]) -> Self {
        Self {
            query: String::new(),
            fields,
        }
    }

    #[must_use]
    pub fn items<'a, T: Searchable + 'a>(
        &self,
        items: impl IntoIterator<Item = &'a T>,
    ) -> Vec<&'a T> {
        let query = self.query.trim();
        if query.is_empty() {
            return items.into_iter().collect();
        }
        items
            .into_iter()
            .filter(|item| search_in_object(*item, self.fields, query))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.query.clear();
    }
}

/// Splits `text` into segments, flagging those that match `query` case-insensitively.
#[must_use]
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<(&'a str, bool)> {
    let needle = query.trim().chars().collect::<Vec<_>>();
    if needle.is_empty() {
        return vec![(text, false)];
    }

    let mut segments = vec![];
    let mut plain_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        if let Some(len) = match_len(&text[pos..], &needle) {
            if plain_start < pos {
                segments.push((&text[plain_start..pos], false));
            }
            segments.push((&text[pos..pos + len], true));
            pos += len;
            plain_start = pos;
        } else {
            pos += text[pos..].chars().next().map_or(1, char::len_utf8);
        }
    }

    if plain_start < text.len() {
        segments.push((&text[plain_start..], false));
    }

    segments
}

fn match_len(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut len = 0;
    let mut chars = haystack.chars();
    for n in needle {
        let c = chars.next()?;
        if !c.to_lowercase().eq(n.to_lowercase()) {
            return None;
        }
        len += c.len_utf8();
    }
    Some(len)
}
