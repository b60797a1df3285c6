use std::collections::BTreeMap;

use serde_json::Value;

use crate::journal::Record;

/// A homogeneous result table: every row has one cell per column, in column
/// order. Both report modes produce this shape so the serializer stays
/// generic over them.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// `all` mode: one row per record, projected onto `fields` in order.
///
/// Never fails: unrequested fields are ignored, requested-but-absent fields
/// render as empty strings.
pub fn all_report(records: &[Record], fields: &[String]) -> Table {
    let rows = records
        .iter()
        .map(|record| {
            fields
                .iter()
                .map(|field| {
                    record
                        .get(field)
                        .map_or_else(|| Value::String(String::new()), |v| v.to_json())
                })
                .collect()
        })
        .collect();

    Table {
        columns: fields.to_vec(),
        rows,
    }
}

/// Per-activity accumulator for the `activity` fold.
#[derive(Debug, Default)]
struct ActivitySummary {
    count: u64,
    // stat field → observed value → count
    breakdowns: BTreeMap<String, BTreeMap<String, u64>>,
}

/// `activity` mode: group records by their `activity` field, count them,
/// and tabulate value frequencies for each of `stat_fields`.
///
/// The fold is commutative, so the output is made deterministic by sorting:
/// rows by activity name, breakdown columns by `field=value`. The column set
/// is the union of pairs observed anywhere, giving every row the same
/// schema; an activity that never saw a pair gets count 0. Records with no
/// `activity` field group under the empty string.
pub fn activity_report(records: &[Record], stat_fields: &[String]) -> Table {
    let mut summaries: BTreeMap<String, ActivitySummary> = BTreeMap::new();

    for record in records {
        let summary = summaries.entry(record.activity().to_string()).or_default();
        summary.count += 1;
        for field in stat_fields {
            let Some(value) = record.get(field) else {
                continue;
            };
            *summary
                .breakdowns
                .entry(field.clone())
                .or_default()
                .entry(value.render())
                .or_insert(0) += 1;
        }
    }

    // Union of observed (field, value) pairs, in stat_fields order then by value.
    let mut pair_columns: Vec<(String, String)> = Vec::new();
    for field in stat_fields {
        let mut values: Vec<&String> = summaries
            .values()
            .filter_map(|s| s.breakdowns.get(field))
            .flat_map(BTreeMap::keys)
            .collect();
        values.sort();
        values.dedup();
        for value in values {
            pair_columns.push((field.clone(), value.clone()));
        }
    }

    let mut columns = vec!["activity".to_string(), "count".to_string()];
    columns.extend(
        pair_columns
            .iter()
            .map(|(field, value)| format!("{field}={value}")),
    );

    let rows = summaries
        .iter()
        .map(|(activity, summary)| {
            let mut row = vec![
                Value::String(activity.clone()),
                Value::from(summary.count),
            ];
            for (field, value) in &pair_columns {
                let count = summary
                    .breakdowns
                    .get(field)
                    .and_then(|counts| counts.get(value))
                    .copied()
                    .unwrap_or(0);
                row.push(Value::from(count));
            }
            row
        })
        .collect();

    Table { columns, rows }
}
