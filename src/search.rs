use crate::domain::TSError;

/// A user query, trimmed and guaranteed to be non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    text: String,
    folded: String,
}

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, TSError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(TSError::EmptyQuery);
        }
        Ok(Self {
            text: text.to_string(),
            folded: text.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Lower-cased form used for matching.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// True if the display string of a cell contains the query, ignoring case.
    pub fn matches(&self, cell: &str) -> bool {
        contains_ignore_case(cell, self.folded())
    }
}

fn contains_ignore_case(haystack: &str, folded_needle: &str) -> bool {
    if haystack.is_ascii() && folded_needle.is_ascii() {
        // Avoid allocating for the common case
        let needle = folded_needle.as_bytes();
        return haystack
            .as_bytes()
            .windows(needle.len())
            .any(|w| w.eq_ignore_ascii_case(needle));
    }
    haystack.to_lowercase().contains(folded_needle)
}

/// Dataset row indices matching a query, in original row order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultSet {
    query: SearchQuery,
    rows: Vec<usize>,
}

impl SearchResultSet {
    pub fn new(query: SearchQuery, rows: Vec<usize>) -> Self {
        Self { query, rows }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
