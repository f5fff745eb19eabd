//! Filter builder shared by the HTTP and in-memory backends.

use std::cmp::Ordering;

use super::Row;

/// Sort order for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Filters for a table operation: `eq` matches, one `order`, a `limit`.
///
/// Values are compared in their text form, as the REST surface does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<(String, String)>,
    order: Option<Order>,
    limit: Option<usize>,
}

impl Query {
    /// An unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows whose `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push((column.to_owned(), value.to_string()));
        self
    }

    /// Sort by `column`. Nulls sort last ascending and first descending.
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_owned(),
            ascending,
        });
        self
    }

    /// Return at most `n` rows.
    #[must_use]
    pub const fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Query-string pairs in REST form: `col=eq.v`, `order=col.asc`, `limit=n`.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|(column, value)| (column.clone(), format!("eq.{value}")))
            .collect();
        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_owned(), format!("{}.{direction}", order.column)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_owned(), limit.to_string()));
        }
        params
    }

    /// Whether `row` passes every `eq` filter.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|(column, value)| {
            row.get(column)
                .is_some_and(|field| text_value(field) == *value)
        })
    }

    /// Filter, sort and truncate `rows` the way the backend would.
    #[must_use]
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let mut rows: Vec<Row> = rows.into_iter().filter(|row| self.matches(row)).collect();
        if let Some(order) = &self.order {
            rows.sort_by(|a, b| {
                let ordering = compare_fields(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
        rows
    }
}

fn text_value(value: &Row) -> String {
    match value {
        Row::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_fields(a: Option<&Row>, b: Option<&Row>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Row::Number(x)), Some(Row::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Row::Bool(x)), Some(Row::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => text_value(x).cmp(&text_value(y)),
    }
}
