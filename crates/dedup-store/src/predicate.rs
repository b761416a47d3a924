//! Filter predicates scoping the nearest-neighbour search.

use dedup_types::{BatchRequest, FilterField, StoredRecord};

use crate::table::quote_ident;

/// `field = value` on a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub field: FilterField,
    pub value: String,
}

/// Conjunction of equality conditions. Empty matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    conditions: Vec<FilterCondition>,
}

impl FilterPredicate {
    /// Predicate for a batch.
    ///
    /// One condition per field in the resolved `filter_by` whose value on
    /// the request is non-empty, in `filter_by` order. Fields outside
    /// `filter_by` never constrain the search.
    pub fn for_request(request: &BatchRequest) -> Self {
        let conditions = request
            .resolved_filter_by()
            .into_iter()
            .filter_map(|field| {
                let value = field.request_value(request);
                (!value.is_empty()).then(|| FilterCondition {
                    field,
                    value: value.to_string(),
                })
            })
            .collect();
        Self { conditions }
    }

    /// Add a condition.
    pub fn and(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.conditions.push(FilterCondition {
            field,
            value: value.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether `record` satisfies every condition.
    pub fn matches(&self, record: &StoredRecord) -> bool {
        self.conditions
            .iter()
            .all(|c| c.field.matches(record, &c.value))
    }

    /// SQL `WHERE` clause with placeholders numbered from `first_param`,
    /// or an empty string when there are no conditions.
    pub fn where_clause(&self, first_param: usize) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self
            .conditions
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ${}", quote_ident(c.field.as_str()), first_param + i))
            .collect();
        format!("WHERE {}", parts.join(" AND "))
    }
}
