//! # Query Matching
//!
//! Evaluates document-style queries against in-memory records.
//!
//! A query maps field paths to conditions. A condition is either a literal
//! (equality) or an operator object such as `{"$gte": 3}`. Top-level `$and`
//! and `$or` combine sub-queries. Values are never coerced across types,
//! except that integers and floats with the same numeric value are equal.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use super::document::lookup_path;
use super::errors::{StoreError, StoreResult};

/// Field condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Exists,
    Regex,
}

impl FilterOperator {
    /// Parse an operator key such as `$gte`
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "$eq" => Some(FilterOperator::Eq),
            "$ne" => Some(FilterOperator::Ne),
            "$gt" => Some(FilterOperator::Gt),
            "$gte" => Some(FilterOperator::Gte),
            "$lt" => Some(FilterOperator::Lt),
            "$lte" => Some(FilterOperator::Lte),
            "$in" => Some(FilterOperator::In),
            "$nin" => Some(FilterOperator::Nin),
            "$exists" => Some(FilterOperator::Exists),
            "$regex" => Some(FilterOperator::Regex),
            _ => None,
        }
    }

    /// Get the operator key
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "$eq",
            FilterOperator::Ne => "$ne",
            FilterOperator::Gt => "$gt",
            FilterOperator::Gte => "$gte",
            FilterOperator::Lt => "$lt",
            FilterOperator::Lte => "$lte",
            FilterOperator::In => "$in",
            FilterOperator::Nin => "$nin",
            FilterOperator::Exists => "$exists",
            FilterOperator::Regex => "$regex",
        }
    }
}

/// A single condition on one field
#[derive(Debug, Clone)]
pub struct FilterExpr {
    /// Field path (dotted for nested fields)
    pub field: String,

    /// Comparison operator
    pub operator: FilterOperator,

    /// Operand
    pub value: Value,

    pattern: Option<Regex>,
}

impl FilterExpr {
    /// Create a new filter expression
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> StoreResult<Self> {
        let field = field.into();
        match operator {
            FilterOperator::In | FilterOperator::Nin if !value.is_array() => {
                return Err(StoreError::backend(format!(
                    "{} on '{}' needs an array",
                    operator.as_str(),
                    field
                )));
            }
            FilterOperator::Regex => {
                return Self::regex(field, &value, None);
            }
            _ => {}
        }

        Ok(Self {
            field,
            operator,
            value,
            pattern: None,
        })
    }

    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Eq,
            value,
            pattern: None,
        }
    }

    /// Create a pattern filter, `options` may contain `i` for case-insensitive
    pub fn regex(field: impl Into<String>, pattern: &Value, options: Option<&str>) -> StoreResult<Self> {
        let field = field.into();
        let source = pattern.as_str().ok_or_else(|| {
            StoreError::backend(format!("$regex on '{}' needs a string pattern", field))
        })?;
        let compiled = RegexBuilder::new(source)
            .case_insensitive(options.is_some_and(|o| o.contains('i')))
            .build()
            .map_err(|e| StoreError::backend(format!("invalid $regex on '{}': {}", field, e)))?;

        Ok(Self {
            field,
            operator: FilterOperator::Regex,
            value: pattern.clone(),
            pattern: Some(compiled),
        })
    }

    /// Check if a record matches this filter
    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        let field_value = lookup_path(doc, &self.field);

        match self.operator {
            FilterOperator::Eq => equals_or_contains(field_value, &self.value),
            FilterOperator::Ne => !equals_or_contains(field_value, &self.value),
            FilterOperator::Gt => self.compare(field_value, |o| o == Ordering::Greater),
            FilterOperator::Gte => self.compare(field_value, |o| o != Ordering::Less),
            FilterOperator::Lt => self.compare(field_value, |o| o == Ordering::Less),
            FilterOperator::Lte => self.compare(field_value, |o| o != Ordering::Greater),
            FilterOperator::In => self.in_list(field_value),
            FilterOperator::Nin => !self.in_list(field_value),
            FilterOperator::Exists => field_value.is_some() == is_truthy(&self.value),
            FilterOperator::Regex => match (&self.pattern, field_value) {
                (Some(re), Some(v)) => any_element(v, |e| e.as_str().is_some_and(|s| re.is_match(s))),
                _ => false,
            },
        }
    }

    fn compare(&self, field_value: Option<&Value>, accept: impl Fn(Ordering) -> bool) -> bool {
        match field_value {
            Some(v) => any_element(v, |e| compare_json_values(e, &self.value).is_some_and(&accept)),
            None => false,
        }
    }

    fn in_list(&self, field_value: Option<&Value>) -> bool {
        self.value
            .as_array()
            .is_some_and(|candidates| candidates.iter().any(|c| equals_or_contains(field_value, c)))
    }
}

/// A parsed query node
#[derive(Debug, Clone)]
pub enum QueryExpr {
    Field(FilterExpr),
    And(Vec<FilterSet>),
    Or(Vec<FilterSet>),
}

impl QueryExpr {
    fn matches(&self, doc: &Map<String, Value>) -> bool {
        match self {
            QueryExpr::Field(f) => f.matches(doc),
            QueryExpr::And(sets) => sets.iter().all(|s| s.matches(doc)),
            QueryExpr::Or(sets) => sets.iter().any(|s| s.matches(doc)),
        }
    }
}

/// A set of conditions combined with AND logic; empty matches everything
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub filters: Vec<QueryExpr>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, filter: FilterExpr) -> Self {
        self.filters.push(QueryExpr::Field(filter));
        self
    }

    /// Parse a query mapping
    pub fn parse(query: &Map<String, Value>) -> StoreResult<Self> {
        let mut set = FilterSet::new();

        for (key, condition) in query {
            match key.as_str() {
                "$and" => set.filters.push(QueryExpr::And(parse_clauses(key, condition)?)),
                "$or" => set.filters.push(QueryExpr::Or(parse_clauses(key, condition)?)),
                k if k.starts_with('$') => {
                    return Err(StoreError::backend(format!("unknown top-level operator: {}", k)));
                }
                field => parse_field_condition(field, condition, &mut set)?,
            }
        }

        Ok(set)
    }

    /// Check if a record matches all conditions
    pub fn matches(&self, doc: &Map<String, Value>) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}

fn parse_clauses(key: &str, condition: &Value) -> StoreResult<Vec<FilterSet>> {
    let clauses = condition
        .as_array()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| StoreError::backend(format!("{} needs a non-empty array", key)))?;

    clauses
        .iter()
        .map(|clause| match clause {
            Value::Object(sub) => FilterSet::parse(sub),
            _ => Err(StoreError::backend(format!("{} entries must be queries", key))),
        })
        .collect()
}

fn parse_field_condition(field: &str, condition: &Value, set: &mut FilterSet) -> StoreResult<()> {
    let operators = match condition {
        Value::Object(obj) if !obj.is_empty() && obj.keys().any(|k| k.starts_with('$')) => obj,
        literal => {
            set.filters
                .push(QueryExpr::Field(FilterExpr::eq(field, literal.clone())));
            return Ok(());
        }
    };

    let regex_options = operators.get("$options").and_then(Value::as_str);
    if operators.contains_key("$options") && !operators.contains_key("$regex") {
        return Err(StoreError::backend(format!("$options on '{}' without $regex", field)));
    }

    for (key, operand) in operators {
        if key == "$options" {
            continue;
        }
        let operator = FilterOperator::parse(key).ok_or_else(|| {
            StoreError::backend(format!("unknown operator {} on '{}'", key, field))
        })?;
        let expr = match operator {
            FilterOperator::Regex => FilterExpr::regex(field, operand, regex_options)?,
            other => FilterExpr::new(field, other, operand.clone())?,
        };
        set.filters.push(QueryExpr::Field(expr));
    }

    Ok(())
}

/// Equality as the database sees it: a missing field equals null, and an
/// array field matches when it equals the operand or contains it.
fn equals_or_contains(field_value: Option<&Value>, operand: &Value) -> bool {
    match field_value {
        None => operand.is_null(),
        Some(v) if values_equal(v, operand) => true,
        Some(Value::Array(items)) => items.iter().any(|item| values_equal(item, operand)),
        Some(_) => false,
    }
}

fn any_element(value: &Value, pred: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => items.iter().any(&pred),
        other => pred(other),
    }
}

/// Structural equality where numbers compare by numeric value
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => a == b,
    }
}

/// Order two values of the same kind; mixed kinds are incomparable
fn compare_json_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Null => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn query(value: Value) -> FilterSet {
        FilterSet::parse(&record(value)).unwrap()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let set = query(json!({}));
        assert!(set.matches(&record(json!({"name": "Lucy"}))));
        assert!(set.matches(&Map::new()));
    }

    #[test]
    fn test_literal_equality() {
        let set = query(json!({"animal_type": "Dog", "name": "Lucy"}));
        assert!(set.matches(&record(json!({"animal_type": "Dog", "name": "Lucy", "age": 2}))));
        assert!(!set.matches(&record(json!({"animal_type": "Cat", "name": "Lucy"}))));
    }

    #[test]
    fn test_no_type_coercion() {
        let set = query(json!({"age_upon_outcome_in_weeks": 52}));
        assert!(!set.matches(&record(json!({"age_upon_outcome_in_weeks": "52"}))));
        assert!(set.matches(&record(json!({"age_upon_outcome_in_weeks": 52.0}))));
    }

    #[test]
    fn test_range_operators() {
        let set = query(json!({"age": {"$gte": 26, "$lt": 156}}));
        assert!(set.matches(&record(json!({"age": 26}))));
        assert!(set.matches(&record(json!({"age": 100.5}))));
        assert!(!set.matches(&record(json!({"age": 156}))));
        assert!(!set.matches(&record(json!({"age": "100"}))));
        assert!(!set.matches(&record(json!({}))));
    }

    #[test]
    fn test_in_and_nin() {
        let set = query(json!({"breed": {"$in": ["Labrador Retriever Mix", "Newfoundland"]}}));
        assert!(set.matches(&record(json!({"breed": "Newfoundland"}))));
        assert!(!set.matches(&record(json!({"breed": "Beagle"}))));

        let set = query(json!({"breed": {"$nin": ["Beagle"]}}));
        assert!(set.matches(&record(json!({"breed": "Newfoundland"}))));
        assert!(!set.matches(&record(json!({"breed": "Beagle"}))));
    }

    #[test]
    fn test_in_requires_array() {
        let q = record(json!({"breed": {"$in": "Beagle"}}));
        assert!(FilterSet::parse(&q).is_err());
    }

    #[test]
    fn test_missing_field_equals_null() {
        let set = query(json!({"outcome_subtype": null}));
        assert!(set.matches(&record(json!({"name": "Rex"}))));
        assert!(!set.matches(&record(json!({"outcome_subtype": "Partner"}))));
    }

    #[test]
    fn test_exists() {
        let set = query(json!({"location_lat": {"$exists": true}}));
        assert!(set.matches(&record(json!({"location_lat": 30.1}))));
        assert!(!set.matches(&record(json!({}))));

        let set = query(json!({"location_lat": {"$exists": false}}));
        assert!(set.matches(&record(json!({}))));
    }

    #[test]
    fn test_regex_with_options() {
        let set = query(json!({"breed": {"$regex": "^lab", "$options": "i"}}));
        assert!(set.matches(&record(json!({"breed": "Labrador Retriever Mix"}))));
        assert!(!set.matches(&record(json!({"breed": "Chesapeake Bay Retriever"}))));
    }

    #[test]
    fn test_array_field_contains() {
        let set = query(json!({"tags": "senior"}));
        assert!(set.matches(&record(json!({"tags": ["senior", "calm"]}))));
        assert!(!set.matches(&record(json!({"tags": ["puppy"]}))));
    }

    #[test]
    fn test_and_or() {
        let set = query(json!({
            "animal_type": "Dog",
            "$or": [{"breed": "Bloodhound"}, {"breed": "Rottweiler"}]
        }));
        assert!(set.matches(&record(json!({"animal_type": "Dog", "breed": "Rottweiler"}))));
        assert!(!set.matches(&record(json!({"animal_type": "Dog", "breed": "Pug"}))));

        let set = query(json!({"$and": [{"sex_upon_outcome": "Intact Male"}, {"age": {"$lte": 2}}]}));
        assert!(set.matches(&record(json!({"sex_upon_outcome": "Intact Male", "age": 1}))));
    }

    #[test]
    fn test_nested_path() {
        let set = query(json!({"outcome.type": "Adoption"}));
        assert!(set.matches(&record(json!({"outcome": {"type": "Adoption"}}))));
        assert!(!set.matches(&record(json!({"outcome": "Adoption"}))));
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        assert!(FilterSet::parse(&record(json!({"age": {"$near": 1}}))).is_err());
        assert!(FilterSet::parse(&record(json!({"$where": "1"}))).is_err());
    }
}
