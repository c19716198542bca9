//! Row evaluation
//!
//! Evaluates filters, orderings and aggregates over JSON rows with the same
//! semantics PostgreSQL applies: three-valued logic for NULL, LIKE patterns,
//! NULLs sorting as larger than any value unless told otherwise.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::query_builder::aggregation::{AggregateFunction, SelectField, SelectSource};
use crate::query_builder::filter::{
    LogicalOperator, QueryCondition, QueryFilter, QueryOperator, ValueKind,
};
use crate::query_builder::ordering::{OrderSpec, SortOrder};

/// A row keyed by qualified column name (`items.price`) or select key
pub type Row = Map<String, Value>;

static NULL: Value = Value::Null;

/// SQL truth value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }

    pub fn and(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, Truth::True) => Truth::True,
            _ => Truth::Unknown,
        }
    }

    pub fn or(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::True, _) | (_, Truth::True) => Truth::True,
            (Truth::False, Truth::False) => Truth::False,
            _ => Truth::Unknown,
        }
    }

    pub fn not(self) -> Truth {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }

    /// WHERE and HAVING keep a row only when the predicate is TRUE
    pub fn is_true(self) -> bool {
        self == Truth::True
    }
}

/// Column value, NULL when the row has no such column
pub fn lookup<'a>(row: &'a Row, field: &str) -> &'a Value {
    row.get(field).unwrap_or(&NULL)
}

fn as_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text).ok()
}

/// SQL comparison; `None` when either side is NULL or the types differ
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => match (as_timestamp(a), as_timestamp(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Row value against a condition operand. Text compares as text unless the
/// condition names an instant.
fn compare_operand(actual: &Value, operand: &Value, kind: ValueKind) -> Option<Ordering> {
    match (kind, actual, operand) {
        (ValueKind::Timestamp, Value::String(a), Value::String(b)) => {
            Some(as_timestamp(a)?.cmp(&as_timestamp(b)?))
        }
        (ValueKind::Plain, Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => compare_values(actual, operand),
    }
}

fn compare_to(
    left: &Value,
    right: &Value,
    kind: ValueKind,
    accept: fn(Ordering) -> bool,
) -> Truth {
    match compare_operand(left, right, kind) {
        Some(ordering) => Truth::from_bool(accept(ordering)),
        None => Truth::Unknown,
    }
}

/// Evaluate a filter against a row
pub fn evaluate(filter: &QueryFilter, row: &Row) -> Truth {
    match filter {
        QueryFilter::Condition(condition) => evaluate_condition(condition, row),
        QueryFilter::Group { operator, filters } => match operator {
            LogicalOperator::And => filters
                .iter()
                .fold(Truth::True, |acc, f| acc.and(evaluate(f, row))),
            LogicalOperator::Or => filters
                .iter()
                .fold(Truth::False, |acc, f| acc.or(evaluate(f, row))),
        },
        QueryFilter::Not(inner) => evaluate(inner, row).not(),
    }
}

/// True when every filter evaluates to TRUE
pub fn matches_all(filters: &[QueryFilter], row: &Row) -> bool {
    filters
        .iter()
        .fold(Truth::True, |acc, f| acc.and(evaluate(f, row)))
        .is_true()
}

fn evaluate_condition(condition: &QueryCondition, row: &Row) -> Truth {
    let actual = lookup(row, &condition.field);

    let operand = match (&condition.operator, &condition.value) {
        (QueryOperator::IsNull, _) => return Truth::from_bool(actual.is_null()),
        (QueryOperator::IsNotNull, _) => return Truth::from_bool(!actual.is_null()),
        (QueryOperator::Eq, None) => return Truth::from_bool(actual.is_null()),
        (QueryOperator::Ne, None) => return Truth::from_bool(!actual.is_null()),
        (_, None) => return Truth::False,
        (_, Some(value)) => value,
    };
    let kind = condition.kind;

    match condition.operator {
        QueryOperator::Eq => compare_to(actual, operand, kind, |o| o == Ordering::Equal),
        QueryOperator::Ne => compare_to(actual, operand, kind, |o| o != Ordering::Equal),
        QueryOperator::Gt => compare_to(actual, operand, kind, |o| o == Ordering::Greater),
        QueryOperator::Gte => compare_to(actual, operand, kind, |o| o != Ordering::Less),
        QueryOperator::Lt => compare_to(actual, operand, kind, |o| o == Ordering::Less),
        QueryOperator::Lte => compare_to(actual, operand, kind, |o| o != Ordering::Greater),
        QueryOperator::Between => match operand {
            Value::Array(bounds) if bounds.len() == 2 => {
                compare_to(actual, &bounds[0], kind, |o| o != Ordering::Less)
                    .and(compare_to(actual, &bounds[1], kind, |o| o != Ordering::Greater))
            }
            _ => Truth::False,
        },
        QueryOperator::Like | QueryOperator::ILike => match (actual, operand) {
            (Value::Null, _) => Truth::Unknown,
            (Value::String(text), Value::String(pattern)) => Truth::from_bool(like_matches(
                text,
                pattern,
                condition.operator == QueryOperator::ILike,
            )),
            _ => Truth::False,
        },
        QueryOperator::In => evaluate_in(actual, operand, kind),
        QueryOperator::NotIn => evaluate_in(actual, operand, kind).not(),
        QueryOperator::IsNull | QueryOperator::IsNotNull => Truth::Unknown,
    }
}

fn evaluate_in(actual: &Value, operand: &Value, kind: ValueKind) -> Truth {
    let candidates = match operand {
        Value::Array(values) => values,
        _ => return Truth::False,
    };
    if candidates.is_empty() {
        return Truth::False;
    }
    candidates.iter().fold(Truth::False, |acc, candidate| {
        acc.or(compare_to(actual, candidate, kind, |o| o == Ordering::Equal))
    })
}

enum PatternToken {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn tokenize(pattern: &str, case_insensitive: bool) -> Vec<PatternToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        let token = match c {
            '%' => PatternToken::AnyRun,
            '_' => PatternToken::AnyOne,
            '\\' => PatternToken::Literal(chars.next().unwrap_or('\\')),
            other => PatternToken::Literal(other),
        };
        tokens.push(match token {
            PatternToken::Literal(c) if case_insensitive => {
                PatternToken::Literal(c.to_lowercase().next().unwrap_or(c))
            }
            token => token,
        });
    }
    tokens
}

/// SQL LIKE: `%` any run, `_` one character, `\` escapes the next one
pub fn like_matches(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let text: Vec<char> = if case_insensitive {
        text.to_lowercase().chars().collect()
    } else {
        text.chars().collect()
    };
    let tokens = tokenize(pattern, case_insensitive);

    // matched[j]: first i tokens match the first j characters
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;
    for token in &tokens {
        let mut next = vec![false; text.len() + 1];
        match token {
            PatternToken::AnyRun => {
                let mut reachable = false;
                for j in 0..=text.len() {
                    reachable |= matched[j];
                    next[j] = reachable;
                }
            }
            PatternToken::AnyOne => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1];
                }
            }
            PatternToken::Literal(c) => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1] && text[j - 1] == *c;
                }
            }
        }
        matched = next;
    }
    matched[text.len()]
}

/// Compare two rows by a list of order specs, first key first
pub fn compare_rows(left: &Row, right: &Row, order_by: &[OrderSpec]) -> Ordering {
    for spec in order_by {
        let a = lookup(left, &spec.field);
        let b = lookup(right, &spec.field);

        let ordering = match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) if spec.nulls_come_first() => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, true) if spec.nulls_come_first() => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let natural = compare_values(a, b).unwrap_or(Ordering::Equal);
                match spec.order {
                    SortOrder::Asc => natural,
                    SortOrder::Desc => natural.reverse(),
                }
            }
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn non_null<'a>(rows: &'a [&'a Row], field: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
    rows.iter()
        .map(move |row| lookup(row, field))
        .filter(|value| !value.is_null())
}

/// Aggregate over a group of rows. NULL inputs are ignored; SUM, AVG, MIN
/// and MAX of no values are NULL.
pub fn aggregate(function: AggregateFunction, field: Option<&str>, rows: &[&Row]) -> Value {
    let field = match (function, field) {
        (AggregateFunction::Count, None) => return Value::from(rows.len()),
        (_, None) => return Value::Null,
        (_, Some(field)) => field,
    };

    match function {
        AggregateFunction::Count => Value::from(non_null(rows, field).count()),
        AggregateFunction::CountDistinct => {
            let distinct: HashSet<String> = non_null(rows, field).map(Value::to_string).collect();
            Value::from(distinct.len())
        }
        AggregateFunction::Sum => {
            let values: Vec<&Value> = non_null(rows, field).collect();
            if values.is_empty() {
                return Value::Null;
            }
            let integers: Option<Vec<i64>> = values.iter().map(|v| v.as_i64()).collect();
            match integers.and_then(|ints| ints.into_iter().try_fold(0_i64, i64::checked_add)) {
                Some(total) => Value::from(total),
                None => Value::from(values.iter().filter_map(|v| v.as_f64()).sum::<f64>()),
            }
        }
        AggregateFunction::Avg => {
            let values: Vec<f64> = non_null(rows, field).filter_map(Value::as_f64).collect();
            if values.is_empty() {
                return Value::Null;
            }
            Value::from(values.iter().sum::<f64>() / values.len() as f64)
        }
        AggregateFunction::Min | AggregateFunction::Max => {
            let wanted = if function == AggregateFunction::Min {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            non_null(rows, field)
                .fold(None::<&Value>, |best, value| match best {
                    Some(current) if compare_values(value, current) != Some(wanted) => {
                        Some(current)
                    }
                    _ => Some(value),
                })
                .cloned()
                .unwrap_or(Value::Null)
        }
    }
}

/// Value of a select field over a group. Plain columns read the first row.
pub fn select_value(field: &SelectField, rows: &[&Row]) -> Value {
    match &field.source {
        SelectSource::Aggregate { function, argument } => {
            aggregate(*function, argument.as_deref(), rows)
        }
        SelectSource::Column(column) => rows
            .first()
            .map(|row| lookup(row, column).clone())
            .unwrap_or(Value::Null),
    }
}

/// Parse an aggregate expression such as `COUNT(*)`, `AVG(items.price)` or
/// `COUNT(DISTINCT items.shop_id)`
pub fn parse_aggregate(expression: &str) -> Option<SelectField> {
    let expression = expression.trim();
    let open = expression.find('(')?;
    let argument = expression.strip_suffix(')')?[open + 1..].trim();
    let name = expression[..open].trim().to_ascii_uppercase();

    let field = match name.as_str() {
        "COUNT" if argument == "*" => SelectField::count_all(),
        "COUNT" => match argument.strip_prefix("DISTINCT ") {
            Some(column) => SelectField::count_distinct(column.trim()),
            None => SelectField::count(argument),
        },
        "SUM" => SelectField::sum(argument),
        "AVG" => SelectField::avg(argument),
        "MIN" => SelectField::min(argument),
        "MAX" => SelectField::max(argument),
        _ => return None,
    };
    Some(field)
}

/// Every field name a filter reads
pub fn referenced_fields(filter: &QueryFilter, out: &mut Vec<String>) {
    match filter {
        QueryFilter::Condition(condition) => {
            if !out.contains(&condition.field) {
                out.push(condition.field.clone());
            }
        }
        QueryFilter::Group { filters, .. } => {
            for f in filters {
                referenced_fields(f, out);
            }
        }
        QueryFilter::Not(inner) => referenced_fields(inner, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_null_comparison_is_unknown() {
        let unnamed = row(json!({"items.name": null, "items.price": 7500}));

        let eq = QueryFilter::eq("items.name", json!("itemA"));
        assert_eq!(evaluate(&eq, &unnamed), Truth::Unknown);
        assert_eq!(evaluate(&!eq.clone(), &unnamed), Truth::Unknown);
        assert!(!matches_all(&[eq], &unnamed));

        let either = QueryFilter::eq("items.name", json!("itemA"))
            .or(QueryFilter::gte("items.price", json!(7000)));
        assert_eq!(evaluate(&either, &unnamed), Truth::True);
    }

    #[test]
    fn test_is_null_and_missing_columns() {
        let unowned = row(json!({"items.shop_id": null}));
        assert!(matches_all(&[QueryFilter::is_null("items.shop_id")], &unowned));
        assert!(matches_all(&[QueryFilter::is_null("shops.name")], &unowned));
        assert!(!matches_all(&[QueryFilter::is_not_null("items.shop_id")], &unowned));
    }

    #[test]
    fn test_between_is_inclusive() {
        let filter = QueryFilter::between("items.price", json!(5000), json!(8000));
        for (price, expected) in [(4999, false), (5000, true), (8000, true), (8001, false)] {
            let r = row(json!({ "items.price": price }));
            assert_eq!(matches_all(&[filter.clone()], &r), expected, "price {}", price);
        }
    }

    #[test]
    fn test_in_with_null_candidate() {
        let r = row(json!({"items.stock": 30}));
        assert_eq!(
            evaluate(&QueryFilter::in_values("items.stock", vec![json!(20), json!(30)]), &r),
            Truth::True
        );
        assert_eq!(
            evaluate(&QueryFilter::in_values("items.stock", vec![json!(20), Value::Null]), &r),
            Truth::Unknown
        );
        assert_eq!(
            evaluate(&QueryFilter::not_in_values("items.stock", vec![]), &r),
            Truth::True
        );
    }

    #[test]
    fn test_like_patterns() {
        assert!(like_matches("itemA", "item%", false));
        assert!(like_matches("itemA", "%A", false));
        assert!(like_matches("itemA", "i_emA", false));
        assert!(like_matches("itemA", "%", false));
        assert!(!like_matches("itemA", "item", false));
        assert!(!like_matches("itemA", "ITEM%", false));
        assert!(like_matches("itemA", "ITEM%", true));
        assert!(like_matches("50%", "50\\%", false));
        assert!(!like_matches("500", "50\\%", false));
        assert!(like_matches("", "%", false));
    }

    #[test]
    fn test_timestamps_compare_as_instants() {
        let earlier = json!("2024-01-01T10:00:00+00:00");
        let later = json!("2024-01-01T09:30:00.5-01:00");
        assert_eq!(compare_values(&earlier, &later), Some(Ordering::Less));
    }

    #[test]
    fn test_condition_kind_decides_text_or_instant() {
        let stored = row(json!({
            "items.name": "2024-01-01T00:00:00Z",
            "items.created_at": "2024-01-01T00:00:00Z",
        }));
        let same_instant = json!("2024-01-01T00:00:00+00:00");

        let by_name = QueryFilter::eq("items.name", same_instant.clone());
        assert_eq!(evaluate(&by_name, &stored), Truth::False);

        let by_time =
            QueryFilter::eq("items.created_at", same_instant).with_kind(ValueKind::Timestamp);
        assert_eq!(evaluate(&by_time, &stored), Truth::True);

        let unparsable =
            QueryFilter::gte("items.created_at", json!("yesterday")).with_kind(ValueKind::Timestamp);
        assert_eq!(evaluate(&unparsable, &stored), Truth::Unknown);
    }

    #[test]
    fn test_mixed_integer_and_float_compare() {
        assert_eq!(compare_values(&json!(7000), &json!(7000.0)), Some(Ordering::Equal));
        assert_eq!(compare_values(&json!(5500.5), &json!(6000)), Some(Ordering::Less));
        assert_eq!(compare_values(&json!(1), &json!("1")), None);
    }

    #[test]
    fn test_default_nulls_sort_as_largest() {
        let named = row(json!({"items.name": "itemA"}));
        let unnamed = row(json!({"items.name": null}));

        let asc = [OrderSpec::asc("items.name")];
        assert_eq!(compare_rows(&unnamed, &named, &asc), Ordering::Greater);

        let desc = [OrderSpec::desc("items.name")];
        assert_eq!(compare_rows(&unnamed, &named, &desc), Ordering::Less);

        let asc_first = [OrderSpec::asc("items.name").nulls_first()];
        assert_eq!(compare_rows(&unnamed, &named, &asc_first), Ordering::Less);

        let desc_last = [OrderSpec::desc("items.name").nulls_last()];
        assert_eq!(compare_rows(&unnamed, &named, &desc_last), Ordering::Greater);
    }

    #[test]
    fn test_multi_key_ordering_falls_through() {
        let a = row(json!({"items.price": 6000, "items.stock": 30}));
        let b = row(json!({"items.price": 6000, "items.stock": 40}));
        let order = [OrderSpec::asc("items.price"), OrderSpec::desc("items.stock")];
        assert_eq!(compare_rows(&a, &b, &order), Ordering::Greater);
        assert_eq!(compare_rows(&a, &a, &order), Ordering::Equal);
    }

    #[test]
    fn test_aggregates_skip_nulls() {
        let rows = [
            row(json!({"items.price": 5000, "items.shop_id": 1})),
            row(json!({"items.price": 6000, "items.shop_id": 1})),
            row(json!({"items.price": 10000, "items.shop_id": null})),
        ];
        let refs: Vec<&Row> = rows.iter().collect();

        assert_eq!(aggregate(AggregateFunction::Count, None, &refs), json!(3));
        assert_eq!(aggregate(AggregateFunction::Count, Some("items.shop_id"), &refs), json!(2));
        assert_eq!(
            aggregate(AggregateFunction::CountDistinct, Some("items.shop_id"), &refs),
            json!(1)
        );
        assert_eq!(aggregate(AggregateFunction::Sum, Some("items.price"), &refs), json!(21000));
        assert_eq!(aggregate(AggregateFunction::Avg, Some("items.price"), &refs), json!(7000.0));
        assert_eq!(aggregate(AggregateFunction::Min, Some("items.price"), &refs), json!(5000));
        assert_eq!(aggregate(AggregateFunction::Max, Some("items.price"), &refs), json!(10000));
        assert_eq!(aggregate(AggregateFunction::Sum, Some("items.missing"), &refs), Value::Null);
        assert_eq!(aggregate(AggregateFunction::Count, None, &[]), json!(0));
    }

    #[test]
    fn test_parse_aggregate_expressions() {
        assert_eq!(parse_aggregate("COUNT(*)"), Some(SelectField::count_all()));
        assert_eq!(parse_aggregate("avg(items.price)"), Some(SelectField::avg("items.price")));
        assert_eq!(
            parse_aggregate("COUNT(DISTINCT items.shop_id)"),
            Some(SelectField::count_distinct("items.shop_id"))
        );
        assert_eq!(parse_aggregate("items.price"), None);
        assert_eq!(parse_aggregate("LOWER(items.name)"), None);
    }
}
