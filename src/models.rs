use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use utoipa::{IntoParams, ToSchema};

/// A single query parameter value as received at the boundary.
///
/// Repeated keys (`?status=a&status=b`) arrive as [`ParamValue::Many`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// The scalar value, or the last one of a repeated key
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Many(values) => values.last().map(String::as_str),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

/// Caller-owned query parameter map.
///
/// Translation reads it and removes the keys it fully consumes (`sort`, `term`,
/// `searchFields`) so nothing downstream interprets them a second time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    entries: BTreeMap<String, ParamValue>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a URL query string (with or without the leading `?`).
    ///
    /// Keys that appear more than once are collected into [`ParamValue::Many`] in order of
    /// appearance.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.append(key.into_owned(), value.into_owned());
        }
        params
    }

    /// Add a value, turning an existing key into a repeated one.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(ParamValue::Single(value));
            }
            Entry::Occupied(mut slot) => {
                let previous = std::mem::replace(slot.get_mut(), ParamValue::Many(Vec::new()));
                *slot.get_mut() = match previous {
                    ParamValue::Single(first) => ParamValue::Many(vec![first, value]),
                    ParamValue::Many(mut values) => {
                        values.push(value);
                        ParamValue::Many(values)
                    }
                };
            }
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Scalar view of a key; repeated keys yield their last value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(ParamValue::last)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Reserved query parameters of a list endpoint.
///
/// Every other key is treated as a filter on a queryable field (`title=Boat`) or an
/// operator application (`not-status=sold`, `max-length=30`, `min-length=10`, `or-color=red`).
///
/// # Pagination
/// `limit` and `offset` are passed through untouched; the execution layer picks defaults.
///
/// # Projection
/// `fields` is a comma-separated list that replaces the default attribute set.
///
/// # Sorting
/// `sort` is a comma-separated list of `[+|-]path` tokens, e.g. `-name,+owner.email`.
///
/// # Search
/// `term` searches every queryable field (or only `searchFields`) for a substring.
///
/// # Embedding
/// `embed` is a comma-separated list of association paths, e.g. `owner,owner.boats`.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Maximum number of rows.
    ///
    /// Example: `20`
    #[param(example = "20")]
    pub limit: Option<String>,
    /// Number of rows to skip.
    ///
    /// Example: `40`
    #[param(example = "40")]
    pub offset: Option<String>,
    /// Comma-separated attribute names to return.
    ///
    /// Example: `title,length`
    #[param(example = "title,length")]
    pub fields: Option<String>,
    /// Comma-separated sort tokens.
    ///
    /// Example: `-length,+owner.email`
    #[param(example = "-length,+owner.email")]
    pub sort: Option<String>,
    /// Free-text search term.
    ///
    /// Example: `schooner`
    #[param(example = "schooner")]
    pub term: Option<String>,
    /// Comma-separated fields the `term` search is restricted to.
    ///
    /// Example: `title,description`
    #[param(example = "title,description")]
    pub search_fields: Option<String>,
    /// Comma-separated association paths to include.
    ///
    /// Example: `owner,owner.marina`
    #[param(example = "owner,owner.marina")]
    pub embed: Option<String>,
}

impl ListParams {
    /// Every key the predicate builder must not treat as a filter.
    pub const RESERVED: [&'static str; 7] = [
        "sort",
        "fields",
        "limit",
        "offset",
        "term",
        "searchFields",
        "embed",
    ];

    #[must_use]
    pub fn is_reserved(key: &str) -> bool {
        Self::RESERVED.contains(&key)
    }

    /// Read the reserved keys out of `params`.
    ///
    /// `sort`, `term` and `searchFields` are removed from the map; the others stay in place.
    pub fn extract(params: &mut QueryParams) -> Self {
        let take = |params: &mut QueryParams, key: &str| {
            params
                .remove(key)
                .and_then(|value| value.last().map(str::to_string))
        };
        let read = |params: &QueryParams, key: &str| params.get_str(key).map(str::to_string);

        Self {
            limit: read(params, "limit"),
            offset: read(params, "offset"),
            fields: read(params, "fields"),
            embed: read(params, "embed"),
            sort: take(params, "sort"),
            term: take(params, "term"),
            search_fields: take(params, "searchFields"),
        }
    }
}

/// Split a comma-separated parameter, dropping empty tokens.
pub(crate) fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|token| !token.is_empty())
}
