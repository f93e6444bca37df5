//! WHERE-clause compiler: turns the tree's OR-list of AND-groups into
//! parameterized SQL, pushing bound values in placeholder order.

use crate::{
    criteria::{Criterion, CriteriaTree, Group},
    value::Value,
};

/// Compile the tree's groups into WHERE content (no `WHERE` keyword),
/// appending the not-deleted predicate when present.
///
/// Returns `None` when neither criteria content nor a predicate exists.
/// Each valid AND-group is parenthesized; groups are OR-joined; the
/// not-deleted predicate is AND-appended after the caller's content so
/// `a OR b` cannot escape the live-row filter.
pub(crate) fn criteria_where(
    tree: &CriteriaTree,
    not_deleted: Option<&str>,
    params: &mut Vec<Value>,
) -> Option<String> {
    let mut parts = Vec::new();
    for group in &tree.groups {
        if let Some(sql) = group_sql(group, params) {
            parts.push(format!("({sql})"));
        }
    }

    let multiple = parts.len() > 1;
    let content = if parts.is_empty() {
        None
    } else {
        Some(parts.join(" OR "))
    };

    match (content, not_deleted) {
        // Re-parenthesize an OR-list so it cannot escape the predicate.
        (Some(content), Some(pred)) if multiple => Some(format!("({content}) AND {pred}")),
        (Some(content), Some(pred)) => Some(format!("{content} AND {pred}")),
        (Some(content), None) => Some(content),
        (None, Some(pred)) => Some(pred.to_string()),
        (None, None) => None,
    }
}

/// AND-join a group's criteria. `None` when nothing renders (an empty
/// group, or one holding only empty or-groups).
pub(crate) fn group_sql(group: &Group, params: &mut Vec<Value>) -> Option<String> {
    let mut parts = Vec::new();
    for criterion in group.iter() {
        if let Some(sql) = criterion_sql(criterion, params) {
            parts.push(sql);
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

fn criterion_sql(criterion: &Criterion, params: &mut Vec<Value>) -> Option<String> {
    match criterion {
        Criterion::Raw { condition } => Some(condition.clone()),

        Criterion::Single { column, op, value } => {
            params.push(value.clone());
            Some(format!("{column} {} ?", op.as_sql()))
        }

        Criterion::Range {
            column,
            op,
            low,
            high,
        } => {
            params.push(low.clone());
            params.push(high.clone());
            Some(format!("{column} {} ? AND ?", op.as_sql()))
        }

        // One placeholder per element, input order preserved.
        Criterion::List { column, op, values } => {
            let placeholders = vec!["?"; values.len()].join(", ");
            params.extend(values.iter().cloned());
            Some(format!("{column} {} ({placeholders})", op.as_sql()))
        }

        // Each valid alternative parenthesized, OR-joined, the whole
        // wrapped once more so it binds as a single criterion.
        Criterion::OrGroup { groups } => {
            let mut branches = Vec::new();
            for group in groups {
                if let Some(sql) = group_sql(group, params) {
                    branches.push(format!("({sql})"));
                }
            }

            if branches.is_empty() {
                None
            } else {
                Some(format!("({})", branches.join(" OR ")))
            }
        }
    }
}
