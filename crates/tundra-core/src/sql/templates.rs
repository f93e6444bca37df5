//! Template builder: derives one operation's statement shape from table
//! metadata. Runs once per (entity, operation); rendered output is the
//! cache's concern.

use crate::{
    model::Table,
    sql::{
        OperationKind, TemplateError,
        node::{ColumnEmit, ColumnView, Fragment, RawSlot, SqlTemplate, Test},
        soft_delete,
    },
};
use std::sync::Arc;

/// Build the statement template for one operation.
///
/// Attaches the table's soft-delete overlay on first use; with the
/// overlay present, deletes rewrite to flag-writing updates and every
/// emitted WHERE carries the not-deleted predicate. Key-addressed
/// operations require at least one id column here, so id-less tables
/// fail at the first such call rather than at metadata build.
pub fn build(table: &Arc<Table>, op: OperationKind) -> Result<SqlTemplate, TemplateError> {
    soft_delete::ensure_attached(table)?;
    let overlay = soft_delete::overlay_for(table.path());

    let not_deleted = match op {
        OperationKind::Insert | OperationKind::InsertSelective => None,
        _ => overlay.as_ref().map(|o| o.not_deleted_sql()),
    };

    let name = table.table_name();
    let selective = op.is_selective();

    let fragments = match op {
        OperationKind::Insert | OperationKind::InsertSelective => vec![
            Fragment::Text(format!("INSERT INTO {name} (")),
            Fragment::EachColumn {
                view: ColumnView::Insert,
                emit: ColumnEmit::Name,
                selective,
            },
            Fragment::Text(") VALUES (".to_string()),
            Fragment::EachColumn {
                view: ColumnView::Insert,
                emit: ColumnEmit::Placeholder,
                selective,
            },
            Fragment::Text(")".to_string()),
        ],

        OperationKind::UpdateByKey | OperationKind::UpdateByKeySelective => {
            table.require_id_columns()?;
            vec![
                Fragment::Text(format!("UPDATE {name} SET ")),
                Fragment::EachColumn {
                    view: ColumnView::Update,
                    emit: ColumnEmit::SetPair,
                    selective,
                },
                Fragment::KeyWhere,
            ]
        }

        OperationKind::UpdateByCriteria | OperationKind::UpdateByCriteriaSelective => vec![
            Fragment::Text(format!("UPDATE {name} SET ")),
            Fragment::Choose {
                arms: vec![(Test::AssignmentsPresent, vec![Fragment::AssignmentSet])],
                otherwise: vec![Fragment::EachColumn {
                    view: ColumnView::Update,
                    emit: ColumnEmit::SetPair,
                    selective,
                }],
            },
            Fragment::CriteriaWhere,
        ],

        OperationKind::DeleteByKey => {
            table.require_id_columns()?;
            vec![delete_head(name, overlay.as_deref()), Fragment::KeyWhere]
        }

        OperationKind::DeleteByCriteria => vec![
            delete_head(name, overlay.as_deref()),
            Fragment::CriteriaWhere,
        ],

        OperationKind::DeleteByEntity => {
            vec![delete_head(name, overlay.as_deref()), Fragment::EntityWhere]
        }

        OperationKind::SelectByKey => {
            table.require_id_columns()?;
            vec![
                Fragment::Text("SELECT ".to_string()),
                Fragment::SelectList,
                Fragment::Text(format!(" FROM {name}")),
                Fragment::KeyWhere,
            ]
        }

        OperationKind::SelectByCriteria | OperationKind::SelectOneByCriteria => {
            let mut root = vec![
                Fragment::If {
                    test: Test::PrefixPresent,
                    body: vec![
                        Fragment::RawSql(RawSlot::Prefix),
                        Fragment::Text(" ".to_string()),
                    ],
                },
                Fragment::Text("SELECT ".to_string()),
                Fragment::SelectList,
                Fragment::Text(format!(" FROM {name}")),
                Fragment::CriteriaWhere,
            ];
            root.extend(grouping(table));
            root.push(Fragment::Choose {
                arms: vec![(Test::OrderPresent, vec![Fragment::RuntimeOrder])],
                otherwise: default_order(table),
            });
            root.push(Fragment::If {
                test: Test::SuffixPresent,
                body: vec![
                    Fragment::Text(" ".to_string()),
                    Fragment::RawSql(RawSlot::Suffix),
                ],
            });
            root
        }

        OperationKind::SelectByEntity => {
            let mut root = vec![
                Fragment::Text("SELECT ".to_string()),
                Fragment::SelectList,
                Fragment::Text(format!(" FROM {name}")),
                Fragment::EntityWhere,
            ];
            root.extend(grouping(table));
            root.extend(default_order(table));
            root
        }

        OperationKind::CountByCriteria => vec![
            Fragment::Text(format!("SELECT COUNT(*) FROM {name}")),
            Fragment::CriteriaWhere,
        ],

        OperationKind::CountByEntity => vec![
            Fragment::Text(format!("SELECT COUNT(*) FROM {name}")),
            Fragment::EntityWhere,
        ],
    };

    Ok(SqlTemplate {
        op,
        table: table.clone(),
        fragments,
        not_deleted,
    })
}

/// Head of a delete statement: a plain `DELETE FROM`, or the flag-writing
/// `UPDATE` rewrite when the table carries the soft-delete overlay.
fn delete_head(name: &str, overlay: Option<&soft_delete::Overlay>) -> Fragment {
    match overlay {
        Some(overlay) => Fragment::Text(format!("UPDATE {name} SET {}", overlay.delete_set_sql())),
        None => Fragment::Text(format!("DELETE FROM {name}")),
    }
}

/// Metadata-contributed GROUP BY / HAVING clauses, fixed at build time.
fn grouping(table: &Table) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    if let Some(group_by) = table.group_by() {
        fragments.push(Fragment::Text(format!(" GROUP BY {group_by}")));
    }
    if let Some(having) = table.having() {
        fragments.push(Fragment::Text(format!(" HAVING {having}")));
    }

    fragments
}

/// Metadata-declared default ordering, fixed at build time.
fn default_order(table: &Table) -> Vec<Fragment> {
    let terms: Vec<String> = table
        .select_columns()
        .iter()
        .filter_map(|c| {
            c.order_by
                .map(|direction| format!("{} {}", c.name, direction.as_sql()))
        })
        .collect();

    if terms.is_empty() {
        Vec::new()
    } else {
        vec![Fragment::Text(format!(" ORDER BY {}", terms.join(", ")))]
    }
}
