//! List view over a cached collection: search, sort and paginate.
//!
//! Fields are addressed by their camelCase wire names on the record's JSON
//! projection, so one implementation serves every resource kind. All
//! operations are total: a field that is missing or not a scalar never
//! matches a search and sorts after every present value.
//!
//! Page numbers are one-based.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

/// Rows per page when a query does not say otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Oldest / smallest first
    #[default]
    Ascending,
    /// Newest / largest first
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Newest records first, by creation time.
    pub fn newest() -> Self {
        Self {
            field: "createdAt".to_string(),
            direction: SortDirection::Descending,
        }
    }

    /// Oldest records first, by creation time.
    pub fn oldest() -> Self {
        Self {
            field: "createdAt".to_string(),
            direction: SortDirection::Ascending,
        }
    }
}

/// What the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Free-text search, matched case-insensitively
    pub search: String,
    /// Fields the search looks at
    pub fields: Vec<String>,
    pub sort: Option<SortSpec>,
    /// One-based page number
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            fields: Vec::new(),
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn search(mut self, text: impl Into<String>, fields: &[&str]) -> Self {
        self.search = text.into();
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn sorted(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Filter, sort and paginate `records` according to `query`.
pub fn render<'a, T: Serialize>(records: &'a [T], query: &ListQuery) -> Page<&'a T> {
    let fields: Vec<&str> = query.fields.iter().map(String::as_str).collect();
    let mut rows: Vec<(Value, &T)> = project(records)
        .into_iter()
        .filter(|(value, _)| matches(value, &query.search, &fields))
        .collect();

    if let Some(sort) = &query.sort {
        rows.sort_by(|(a, _), (b, _)| compare_field(a, b, &sort.field, sort.direction));
    }

    let visible: Vec<&T> = rows.into_iter().map(|(_, record)| record).collect();
    paginate(&visible, query.page, query.page_size)
}

/// Records whose designated fields contain `search`, case-insensitively, in
/// input order. A blank search keeps every record.
pub fn filter<'a, T: Serialize>(records: &'a [T], search: &str, fields: &[&str]) -> Vec<&'a T> {
    project(records)
        .into_iter()
        .filter(|(value, _)| matches(value, search, fields))
        .map(|(_, record)| record)
        .collect()
}

/// Stable sort by one field.
pub fn sort_by_field<T: Serialize>(records: &mut [T], field: &str, direction: SortDirection) {
    let mut keyed: Vec<(Value, usize)> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (serde_json::to_value(r).unwrap_or(Value::Null), i))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_field(a, b, field, direction));

    let order: Vec<usize> = keyed.into_iter().map(|(_, i)| i).collect();
    apply_order(records, order);
}

/// Slice out one page. Page 0 is read as page 1 and a page size of 0 as 1;
/// pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}

fn project<T: Serialize>(records: &[T]) -> Vec<(Value, &T)> {
    records
        .iter()
        .map(|r| (serde_json::to_value(r).unwrap_or(Value::Null), r))
        .collect()
}

fn matches(value: &Value, search: &str, fields: &[&str]) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|field| {
        field_text(value, field).is_some_and(|text| text.to_lowercase().contains(&needle))
    })
}

fn field_text(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_field(a: &Value, b: &Value, field: &str, direction: SortDirection) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) if is_sortable(x) && is_sortable(y) => {
            let ordering = compare_values(x, y);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
        (Some(x), _) if is_sortable(x) => Ordering::Less,
        (_, Some(y)) if is_sortable(y) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn is_sortable(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        // Mixed scalar types: numbers, then strings, then booleans.
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        _ => 2,
    }
}

/// Permute `records` so position `i` holds the element previously at `order[i]`.
fn apply_order<T>(records: &mut [T], order: Vec<usize>) {
    let mut position: Vec<usize> = (0..records.len()).collect();
    let mut location: Vec<usize> = (0..records.len()).collect();

    for (target, &source) in order.iter().enumerate() {
        let current = location[source];
        if current != target {
            let displaced = position[target];
            records.swap(target, current);
            position.swap(target, current);
            location[displaced] = current;
            location[source] = target;
        }
    }
}
