//! Query execution over snapshots of the in-memory tables

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::MemoryDatabase;
use crate::errors::StoreError;
use crate::query_builder::evaluation::{
    compare_values, compare_rows, lookup, matches_all, parse_aggregate, referenced_fields,
    select_value, Row,
};
use crate::query_builder::projection::Tuple;
use crate::query_builder::{JoinClause, JoinCondition, QueryBuilder};

/// Prefix every key with `table_ref.`
fn qualify(table_ref: &str, row: Row) -> Row {
    row.into_iter()
        .map(|(key, value)| (format!("{}.{}", table_ref, key), value))
        .collect()
}

/// The columns of `table_ref`, unqualified
fn unqualify(table_ref: &str, row: &Row) -> Row {
    let prefix = format!("{}.", table_ref);
    row.iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(&prefix)
                .map(|column| (column.to_string(), value.clone()))
        })
        .collect()
}

/// Rebuild the entity of `table_ref` from a joined row. `None` when the
/// row has no such entity (outer join padding).
pub(super) fn extract<T: DeserializeOwned>(table_ref: &str, row: &Row) -> Result<Option<T>, StoreError> {
    let columns = unqualify(table_ref, row);
    match columns.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(_) => Ok(Some(serde_json::from_value(Value::Object(columns))?)),
    }
}

fn merge(left: &Row, right: &Row) -> Row {
    let mut merged = left.clone();
    merged.extend(right.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

fn same_value(left: &Value, right: &Value) -> bool {
    compare_values(left, right) == Some(Ordering::Equal)
}

fn join_matches(join: &JoinClause, left: &Row, right: &Row, merged: &Row) -> bool {
    match &join.condition {
        JoinCondition::On {
            left_field,
            right_field,
        } => same_value(lookup(merged, left_field), lookup(merged, right_field)),
        JoinCondition::Using(columns) => columns.iter().all(|column| {
            let right_value = lookup(right, &format!("{}.{}", join.table_ref(), column));
            left.iter()
                .find(|(key, _)| key.rsplit_once('.').map(|(_, c)| c) == Some(column.as_str()))
                .is_some_and(|(_, left_value)| same_value(left_value, right_value))
        }),
        JoinCondition::None => true,
    }
}

fn apply_join(left: Vec<Row>, right: Vec<Row>, join: &JoinClause) -> Vec<Row> {
    let mut right_matched = vec![false; right.len()];
    let mut joined = Vec::new();

    for left_row in left {
        let mut matched = false;
        for (index, right_row) in right.iter().enumerate() {
            let merged = merge(&left_row, right_row);
            if join_matches(join, &left_row, right_row, &merged) {
                matched = true;
                right_matched[index] = true;
                joined.push(merged);
            }
        }
        // Missing right-hand columns read as NULL
        if !matched && join.join_type.keeps_unmatched_left() {
            joined.push(left_row);
        }
    }

    if join.join_type.keeps_unmatched_right() {
        joined.extend(
            right
                .into_iter()
                .zip(right_matched)
                .filter(|(_, matched)| !matched)
                .map(|(row, _)| row),
        );
    }

    joined
}

/// FROM, JOIN and WHERE: the filtered relation, unordered
pub(super) async fn relation(
    db: &MemoryDatabase,
    table: &str,
    query: &QueryBuilder,
) -> Result<Vec<Row>, StoreError> {
    let mut rows: Vec<Row> = db
        .snapshot(table)
        .await?
        .into_iter()
        .map(|row| qualify(table, row))
        .collect();

    for join in query.joins() {
        let right: Vec<Row> = db
            .snapshot(&join.table)
            .await?
            .into_iter()
            .map(|row| qualify(join.table_ref(), row))
            .collect();
        rows = apply_join(rows, right, join);
    }

    rows.retain(|row| matches_all(query.conditions(), row));
    crate::trace_log!("[MEMORY] {} rows after WHERE on {}", rows.len(), table);
    Ok(rows)
}

/// OFFSET then LIMIT
pub(super) fn paginate<T>(rows: Vec<T>, query: &QueryBuilder) -> Vec<T> {
    let offset = query.offset_value().unwrap_or(0).max(0) as usize;
    let limit = query
        .limit_value()
        .map(|limit| limit.max(0) as usize)
        .unwrap_or(usize::MAX);
    rows.into_iter().skip(offset).take(limit).collect()
}

pub(super) fn sort(rows: &mut [Row], query: &QueryBuilder) {
    if !query.order_by.is_empty() {
        rows.sort_by(|a, b| compare_rows(a, b, &query.order_by));
    }
}

/// Ordered, paged rows that carry an entity of `table`
pub(super) async fn select_rows(
    db: &MemoryDatabase,
    table: &str,
    query: &QueryBuilder,
) -> Result<Vec<Row>, StoreError> {
    let id_key = format!("{}.id", table);
    let mut rows = relation(db, table, query).await?;
    rows.retain(|row| !lookup(row, &id_key).is_null());
    sort(&mut rows, query);
    Ok(paginate(rows, query))
}

pub(super) async fn select_entities<T: DeserializeOwned>(
    db: &MemoryDatabase,
    table: &str,
    query: &QueryBuilder,
) -> Result<Vec<T>, StoreError> {
    let rows = select_rows(db, table, query).await?;
    let mut entities = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(entity) = extract(table, row)? {
            entities.push(entity);
        }
    }
    Ok(entities)
}

fn is_grouped(query: &QueryBuilder) -> bool {
    query.group_by.is_some() || query.select.iter().any(|field| field.is_aggregate())
}

/// One value per group for every name the select list, HAVING and ORDER BY use
fn group_view(query: &QueryBuilder, key: &[(String, Value)], members: &[&Row]) -> Row {
    let mut view: Row = key.iter().cloned().collect();

    for field in &query.select {
        let value = select_value(field, members);
        view.insert(field.expression(), value.clone());
        view.insert(field.key(), value);
    }

    let mut wanted = Vec::new();
    if let Some(group_by) = &query.group_by {
        for condition in &group_by.having {
            referenced_fields(condition, &mut wanted);
        }
    }
    wanted.extend(query.order_by.iter().map(|spec| spec.field.clone()));

    for name in wanted {
        if view.contains_key(&name) {
            continue;
        }
        let value = match parse_aggregate(&name) {
            Some(aggregate) => select_value(&aggregate, members),
            None => members
                .first()
                .map(|row| lookup(row, &name).clone())
                .unwrap_or(Value::Null),
        };
        view.insert(name, value);
    }

    view
}

fn grouped_rows(rows: &[Row], query: &QueryBuilder) -> Vec<Row> {
    let fields: Vec<String> = query
        .group_by
        .as_ref()
        .map(|group_by| group_by.fields.clone())
        .unwrap_or_default();

    let mut groups: Vec<(Vec<(String, Value)>, Vec<&Row>)> = Vec::new();
    for row in rows {
        let key: Vec<(String, Value)> = fields
            .iter()
            .map(|field| (field.clone(), lookup(row, field).clone()))
            .collect();
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(row),
            None => groups.push((key, vec![row])),
        }
    }

    // Aggregates without GROUP BY yield one row even over no input
    if fields.is_empty() && groups.is_empty() {
        groups.push((Vec::new(), Vec::new()));
    }

    let having = query
        .group_by
        .as_ref()
        .map(|group_by| group_by.having.as_slice())
        .unwrap_or(&[]);

    groups
        .iter()
        .map(|(key, members)| group_view(query, key, members))
        .filter(|view| matches_all(having, view))
        .collect()
}

fn project(query: &QueryBuilder, table: &str, row: &Row) -> Tuple {
    if query.select.is_empty() {
        return Tuple::from_object(unqualify(table, row));
    }
    let object: Map<String, Value> = query
        .select
        .iter()
        .map(|field| (field.key(), select_value(field, &[row])))
        .collect();
    Tuple::from_selection(&query.select, object)
}

pub(super) async fn select_tuples(
    db: &MemoryDatabase,
    table: &str,
    query: &QueryBuilder,
) -> Result<Vec<Tuple>, StoreError> {
    let rows = relation(db, table, query).await?;

    if is_grouped(query) {
        let mut views = grouped_rows(&rows, query);
        sort(&mut views, query);
        return Ok(paginate(views, query)
            .into_iter()
            .map(|view| Tuple::from_selection(&query.select, view))
            .collect());
    }

    let mut rows = rows;
    sort(&mut rows, query);
    Ok(paginate(rows, query)
        .iter()
        .map(|row| project(query, table, row))
        .collect())
}
