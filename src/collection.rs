//! In-memory filtering, sorting and pagination shared by every list endpoint.
//!
//! Records are compared through their JSON form so a single implementation
//! serves every entity: search looks at every string leaf, sorting looks at a
//! named top-level field.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use utoipa::ToSchema;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query parameters accepted by list endpoints
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ListQuery {
    /// Case-insensitive substring matched against every text field
    pub search: Option<String>,
    /// Top-level field to sort by
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    /// 1-based page number
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// One page of a filtered, sorted collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollectionView {
    default_limit: u64,
    max_limit: u64,
}

impl Default for CollectionView {
    fn default() -> Self {
        Self::new(20, 200)
    }
}

impl CollectionView {
    pub fn new(default_limit: u64, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    pub fn effective_limit(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }

    /// Filters, sorts and paginates `records` according to `query`.
    pub fn apply<T: Serialize>(&self, records: Vec<T>, query: &ListQuery) -> Result<Page<T>, ServiceError> {
        let mut rows = records
            .into_iter()
            .map(|record| serde_json::to_value(&record).map(|json| (record, json)))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(needle) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let needle = needle.to_lowercase();
            rows.retain(|(_, json)| contains_text(json, &needle));
        }

        if let Some(field) = query.sort_by.as_deref().filter(|f| !f.is_empty()) {
            let order = query.sort_order.unwrap_or_default();
            rows.sort_by(|(_, a), (_, b)| compare_field(a.get(field), b.get(field), order));
        }

        let limit = self.effective_limit(query.limit);
        let page = query.page.unwrap_or(1).max(1);
        let total = rows.len() as u64;
        let total_pages = (total + limit - 1) / limit;
        let offset = (page - 1).saturating_mul(limit);

        let items = rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .map(|(record, _)| record)
            .collect();

        Ok(Page {
            items,
            total,
            page,
            limit,
            total_pages,
        })
    }
}

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|v| contains_text(v, needle)),
        Value::Object(map) => map.values().any(|v| contains_text(v, needle)),
        _ => false,
    }
}

/// Missing and null values sort last in both directions.
fn compare_field(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = compare_values(a, b);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Row {
        name: String,
        qty: i64,
        tag: Option<String>,
    }

    fn row(name: &str, qty: i64, tag: Option<&str>) -> Row {
        Row {
            name: name.into(),
            qty,
            tag: tag.map(str::to_string),
        }
    }

    fn names(page: &Page<Row>) -> Vec<&str> {
        page.items.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn search_is_case_insensitive_over_string_fields() {
        let view = CollectionView::default();
        let rows = vec![
            row("Pump seal", 3, None),
            row("Filter", 1, Some("PUMP room")),
            row("Valve", 9, None),
        ];
        let query = ListQuery {
            search: Some("pump".into()),
            ..Default::default()
        };
        let page = view.apply(rows, &query).unwrap();
        assert_eq!(names(&page), vec!["Pump seal", "Filter"]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn numbers_are_not_searched() {
        let view = CollectionView::default();
        let page = view
            .apply(
                vec![row("a", 42, None)],
                &ListQuery {
                    search: Some("42".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn sorts_numerically_and_puts_missing_last() {
        let view = CollectionView::default();
        let rows = vec![
            row("b", 10, Some("x")),
            row("a", 2, None),
            row("c", 33, Some("y")),
        ];

        let by_qty = view
            .apply(
                rows.clone(),
                &ListQuery {
                    sort_by: Some("qty".into()),
                    sort_order: Some(SortOrder::Desc),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(names(&by_qty), vec!["c", "b", "a"]);

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let by_tag = view
                .apply(
                    rows.clone(),
                    &ListQuery {
                        sort_by: Some("tag".into()),
                        sort_order: Some(order),
                        ..Default::default()
                    },
                )
                .unwrap();
            assert_eq!(by_tag.items.last().unwrap().name, "a");
        }
    }

    #[test]
    fn page_zero_is_first_page_and_limit_is_clamped() {
        let view = CollectionView::new(2, 3);
        let rows: Vec<Row> = (0..7).map(|i| row(&format!("r{}", i), i, None)).collect();

        let page = view
            .apply(
                rows.clone(),
                &ListQuery {
                    page: Some(0),
                    limit: Some(100),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 3);

        let beyond = view
            .apply(
                rows,
                &ListQuery {
                    page: Some(9),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 7);
    }

    #[test]
    fn mixed_types_do_not_panic() {
        let mut values = vec![json!({"v": "text"}), json!({"v": 3}), json!({"v": true}), json!({})];
        values.sort_by(|a, b| compare_field(a.get("v"), b.get("v"), SortOrder::Asc));
        assert_eq!(values.last().unwrap(), &json!({}));
    }

    proptest! {
        #[test]
        fn pages_partition_the_collection(len in 0usize..60, limit in 1u64..15) {
            let view = CollectionView::new(limit, 50);
            let rows: Vec<Row> = (0..len).map(|i| row(&format!("r{:03}", i), i as i64, None)).collect();

            let first = view.apply(rows.clone(), &ListQuery { limit: Some(limit), ..Default::default() }).unwrap();
            let expected_pages = (len as u64 + limit - 1) / limit;
            prop_assert_eq!(first.total_pages, expected_pages);

            let mut seen = Vec::new();
            for page in 1..=expected_pages.max(1) {
                let p = view.apply(rows.clone(), &ListQuery { page: Some(page), limit: Some(limit), ..Default::default() }).unwrap();
                prop_assert!(p.items.len() as u64 <= limit);
                seen.extend(p.items);
            }
            prop_assert_eq!(seen, rows);
        }
    }
}
