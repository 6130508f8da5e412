//! Contact listing filters.
//!
//! A `ContactFilter` turns the optional `search` and `tag` parameters into a
//! SQL WHERE clause. Both filters are case-insensitive substring matches and
//! compose as an intersection.

/// Optional search/tag parameters for the contact listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    search: Option<String>,
    tag: Option<String>,
}

impl ContactFilter {
    /// Build from raw request parameters; empty strings mean "no filter".
    pub fn new(search: Option<&str>, tag: Option<&str>) -> Self {
        Self {
            search: non_empty(search),
            tag: non_empty(tag),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.tag.is_none()
    }

    /// WHERE clause (without the keyword) and its bound LIKE patterns, in
    /// positional order. Returns `None` when nothing is filtered.
    pub fn where_clause(&self) -> Option<(String, Vec<String>)> {
        if self.is_empty() {
            return None;
        }

        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(search) = &self.search {
            params.push(like_pattern(search));
            let n = params.len();
            conditions.push(format!(
                "(name LIKE ?{0} ESCAPE '\\' OR email LIKE ?{0} ESCAPE '\\' OR tags LIKE ?{0} ESCAPE '\\')",
                n
            ));
        }

        if let Some(tag) = &self.tag {
            params.push(like_pattern(tag));
            conditions.push(format!("tags LIKE ?{} ESCAPE '\\'", params.len()));
        }

        Some((conditions.join(" AND "), params))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// `%needle%` with LIKE metacharacters escaped
fn like_pattern(needle: &str) -> String {
    format!("%{}%", escape_like(needle))
}

/// Escape LIKE metacharacters (% _ \)
fn escape_like(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' | '_' | '\\' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
