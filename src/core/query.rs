//! List query building and pagination
//!
//! Query-string parameters are untrusted: anything malformed is silently
//! replaced by its default instead of being rejected.
//!
//! ```text
//! GET /api/invoice/list?page=2&items=5
//! GET /api/invoice/list?sortBy=number&sortValue=1
//! GET /api/invoice/list?filter=paymentStatus&equal=paid
//! GET /api/client/list?fields=name,email&q=acme
//! ```
//!
//! Whatever the parameters, the `removed == false` predicate is always part of
//! the resulting [`Filter`]. Field names that are not plain document paths
//! (`$where`, `a..b`) are dropped like any other malformed parameter.

use crate::core::document::{Document, DocumentId, ID_KEY, REMOVED_KEY, compare_values};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Raw query-string parameters as received by the HTTP layer
pub type RawQuery = HashMap<String, String>;

/// Get a trimmed, non-empty parameter
pub fn param<'a>(raw: &'a RawQuery, key: &str) -> Option<&'a str> {
    raw.get(key).map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Whether `name` is a plain (possibly dotted) document path
///
/// Operator names such as `$where` and empty path segments are refused.
pub fn is_field_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .split('.')
            .all(|segment| !segment.is_empty() && !segment.starts_with('$'))
}

/// Get a parameter naming a document field, if it is a valid one
pub fn field_param<'a>(raw: &'a RawQuery, key: &str) -> Option<&'a str> {
    param(raw, key).filter(|name| is_field_name(name))
}

/// Split a comma-separated field list, dropping blanks and invalid names
pub fn split_fields(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|f| is_field_name(f))
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse a direction, falling back to descending on anything unrecognised
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("1") | Some("asc") | Some("ascending") => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    /// Numeric form used by document databases (`1` / `-1`)
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Compare two documents on the sort field
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ord = compare_values(a.get(&self.field), b.get(&self.field));
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// A single predicate over a document
#[derive(Debug, Clone)]
pub enum Condition {
    /// `removed` is not `true`
    NotRemoved,

    /// `_id` equals the given identifier
    IdIs(DocumentId),

    /// Field equals a raw query-string value, cast to the stored type
    Equals { field: String, value: String },

    /// Any of the fields contains the needle, case-insensitively
    Contains {
        fields: Vec<String>,
        needle: String,
        pattern: Option<Regex>,
    },
}

impl Condition {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Build a substring search; the needle is matched literally
    pub fn contains(fields: Vec<String>, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        let pattern = RegexBuilder::new(&regex::escape(&needle))
            .case_insensitive(true)
            .build()
            .ok();
        Condition::Contains {
            fields,
            needle,
            pattern,
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::NotRemoved => !doc
                .get(REMOVED_KEY)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            Condition::IdIs(id) => doc
                .get(ID_KEY)
                .and_then(Value::as_str)
                .is_some_and(|stored| stored == id.to_string()),
            Condition::Equals { field, value } => doc
                .get(field)
                .is_some_and(|stored| value_equals_raw(stored, value)),
            Condition::Contains {
                fields,
                needle,
                pattern,
            } => fields.iter().any(|field| {
                doc.get(field).and_then(Value::as_str).is_some_and(|s| match pattern {
                    Some(re) => re.is_match(s),
                    // Oversized needles fail to compile
                    None => s.to_lowercase().contains(&needle.to_lowercase()),
                })
            }),
        }
    }
}

/// Candidate typed values a raw query-string value may stand for
///
/// `"25"` may be the string `"25"` or the number `25`; `"true"` may be the
/// string or the boolean.
pub fn equal_candidates(raw: &str) -> Vec<Value> {
    let mut variants = vec![Value::String(raw.to_string())];
    match raw {
        "true" => variants.push(Value::Bool(true)),
        "false" => variants.push(Value::Bool(false)),
        _ => {
            if let Ok(i) = raw.parse::<i64>() {
                variants.push(Value::from(i));
            } else if let Ok(f) = raw.parse::<f64>()
                && f.is_finite()
            {
                variants.push(Value::from(f));
            }
        }
    }
    variants
}

fn value_equals_raw(stored: &Value, raw: &str) -> bool {
    match stored {
        Value::String(s) => s == raw,
        Value::Number(n) => match (n.as_f64(), raw.parse::<f64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => false,
        },
        Value::Bool(b) => raw.parse::<bool>().is_ok_and(|v| v == *b),
        // An array field matches when any element matches
        Value::Array(items) => items.iter().any(|item| value_equals_raw(item, raw)),
        Value::Null | Value::Object(_) => false,
    }
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// A filter that matches everything, removed documents included
    pub fn all() -> Self {
        Self::default()
    }

    /// Non-removed documents
    pub fn active() -> Self {
        Self::all().and(Condition::NotRemoved)
    }

    /// The document with this id, whether removed or not
    pub fn by_id(id: DocumentId) -> Self {
        Self::all().and(Condition::IdIs(id))
    }

    /// The non-removed document with this id
    pub fn active_by_id(id: DocumentId) -> Self {
        Self::by_id(id).and(Condition::NotRemoved)
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

/// Everything a store needs to fetch a window of documents
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub filter: Filter,
    /// `None` keeps insertion order
    pub sort: Option<SortSpec>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ---------------------------------------------------------------------------
// Paginated list parameters
// ---------------------------------------------------------------------------

/// Parameters of a paginated list request
#[derive(Debug, Clone)]
pub struct ListParams {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub items: usize,

    pub sort: Option<SortSpec>,

    /// Single-field equality filter (`filter` + `equal`)
    pub equal: Option<(String, String)>,

    /// Substring search (`fields` + `q`)
    pub search: Option<(Vec<String>, String)>,
}

impl ListParams {
    /// Parse the query string, defaulting anything missing or malformed
    ///
    /// `items` takes precedence over its alias `limit`.
    pub fn from_query(raw: &RawQuery, default_items: usize) -> Self {
        let default_items = default_items.max(1);

        let page = param(raw, "page")
            .and_then(|p| p.parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let items = param(raw, "items")
            .or_else(|| param(raw, "limit"))
            .and_then(|p| p.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(default_items);

        let sort = field_param(raw, "sortBy").map(|field| {
            SortSpec::new(field, SortDirection::parse_lenient(param(raw, "sortValue")))
        });

        let equal = match (field_param(raw, "filter"), param(raw, "equal")) {
            (Some(field), Some(value)) => Some((field.to_string(), value.to_string())),
            _ => None,
        };

        let search = match (param(raw, "fields"), param(raw, "q")) {
            (Some(fields), Some(q)) => {
                let fields = split_fields(fields);
                (!fields.is_empty()).then(|| (fields, q.to_string()))
            }
            _ => None,
        };

        Self {
            page,
            items,
            sort,
            equal,
            search,
        }
    }

    /// Number of documents to skip before the requested page
    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.items)
    }

    /// Build the filter shared by the count and the page fetch
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::active();
        if let Some((field, value)) = &self.equal {
            filter = filter.and(Condition::equals(field.clone(), value.clone()));
        }
        if let Some((fields, q)) = &self.search {
            filter = filter.and(Condition::contains(fields.clone(), q.clone()));
        }
        filter
    }

    pub fn find_options(&self) -> FindOptions {
        FindOptions::new(self.filter())
            .sort(self.sort.clone())
            .skip(self.skip())
            .limit(self.items)
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Total number of pages
    pub pages: usize,

    /// Total number of matching documents
    pub count: usize,
}

impl Pagination {
    pub fn new(page: usize, items: usize, count: usize) -> Self {
        // Guard against division by zero
        let items = items.max(1);
        Self {
            page,
            pages: count.div_ceil(items),
            count,
        }
    }
}
