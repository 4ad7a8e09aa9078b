//! Filter and ordering for nade listings

use serde::{Deserialize, Serialize};

/// Listing order for nades
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first
    #[default]
    New,
    /// By map, then title
    Map,
    /// By title
    Title,
}

impl SortOrder {
    fn order_by(self) -> &'static str {
        match self {
            SortOrder::New => "ORDER BY julianday(createdAt) DESC, id DESC",
            SortOrder::Map => "ORDER BY map, title",
            SortOrder::Title => "ORDER BY title",
        }
    }

    /// Next order in the cycle, used by the browser
    pub fn next(self) -> Self {
        match self {
            SortOrder::New => SortOrder::Map,
            SortOrder::Map => SortOrder::Title,
            SortOrder::Title => SortOrder::New,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::New => write!(f, "new"),
            SortOrder::Map => write!(f, "map"),
            SortOrder::Title => write!(f, "title"),
        }
    }
}

/// Equality facets combined with AND, plus a substring search over
/// title, tags and description. Empty strings are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NadeFilters {
    pub map: Option<String>,
    pub side: Option<String>,
    pub start_position: Option<String>,
    pub nade_type: Option<String>,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl NadeFilters {
    /// Build the listing query and its positional parameters
    pub fn to_query(&self, columns: &str) -> (String, Vec<String>) {
        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        let facets = [
            ("map = ?", &self.map),
            ("side = ?", &self.side),
            ("startPosition = ?", &self.start_position),
            ("nadeType = ?", &self.nade_type),
        ];
        for (clause, value) in facets {
            if let Some(value) = non_empty(value) {
                clauses.push(clause);
                params.push(value.to_string());
            }
        }

        if let Some(search) = non_empty(&self.search) {
            clauses.push(
                "(title LIKE ? ESCAPE '\\' OR tags LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\')",
            );
            let pattern = format!("%{}%", escape_like(search));
            params.extend(std::iter::repeat(pattern).take(3));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM nades{} {}",
            columns,
            where_clause,
            self.sort.order_by()
        );
        (sql, params)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Escape LIKE wildcards so search text matches literally
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
