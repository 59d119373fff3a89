//! Generic search and list envelopes.

use serde::{Deserialize, Serialize};

/// A filtered, sorted, paginated search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub search: Vec<SearchFilter>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sort: Vec<SortCriteria>,
    pub limit: u32,
    pub offset: u32,
}

impl SearchRequest {
    /// Search request with one equality filter, sorted newest-first.
    pub fn eq_filter(name: &str, value: &str) -> Self {
        Self {
            search: vec![SearchFilter {
                name: name.to_owned(),
                operator: "eq".to_owned(),
                value: serde_json::Value::String(value.to_owned()),
            }],
            sort: vec![SortCriteria { name: "created".to_owned(), ascending: false }],
            limit: 100,
            offset: 0,
        }
    }

    /// Add another equality filter.
    pub fn and_eq(mut self, name: &str, value: &str) -> Self {
        self.search.push(SearchFilter {
            name: name.to_owned(),
            operator: "eq".to_owned(),
            value: serde_json::Value::String(value.to_owned()),
        });
        self
    }
}

/// A single filter clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFilter {
    pub name: String,
    pub operator: String,
    pub value: serde_json::Value,
}

/// A single sort clause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortCriteria {
    pub name: String,
    pub ascending: bool,
}

/// A paginated search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total_hits: u64,
}

/// A bare items envelope (non-paginated list endpoints).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}
