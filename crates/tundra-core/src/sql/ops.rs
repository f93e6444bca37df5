//! Operation entry points: per-operation statement assembly over the
//! shared template cache.

use crate::{
    criteria::CriteriaTree,
    model::metadata_for,
    sql::{
        BindInput, OperationKind, SqlStatement, TemplateError,
        cache::{self, TemplateKey},
        node::SqlTemplate,
        render, templates,
    },
    traits::Record,
    value::Value,
};
use std::sync::Arc;

/// The cached statement template for one (entity, operation) pair,
/// building and publishing it on first use.
pub fn template_for<E: Record>(op: OperationKind) -> Result<Arc<SqlTemplate>, TemplateError> {
    let key = TemplateKey::new(E::path(), op);

    if let Some(template) = cache::get(&key) {
        cache::record_hit();
        return Ok(template);
    }
    cache::record_miss();

    let table = metadata_for::<E>()?;
    let template = Arc::new(templates::build(&table, op)?);
    cache::insert(key, template.clone());

    Ok(template)
}

fn assemble<E: Record>(
    op: OperationKind,
    input: &BindInput<'_>,
) -> Result<SqlStatement, TemplateError> {
    let template = template_for::<E>(op)?;
    render(&template, input)
}

// ----------------------------------------------------------------------
// Inserts
// ----------------------------------------------------------------------

/// `INSERT` binding every insertable column; absent fields bind NULL.
pub fn insert<E: Record>(record: &E) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::Insert, &BindInput::for_record(record))
}

/// `INSERT` binding only the columns whose field value is present.
pub fn insert_selective<E: Record>(record: &E) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(
        OperationKind::InsertSelective,
        &BindInput::for_record(record),
    )
}

// ----------------------------------------------------------------------
// Updates
// ----------------------------------------------------------------------

/// `UPDATE` by primary key, setting every updatable column.
pub fn update_by_key<E: Record>(record: &E, key: &[Value]) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(
        OperationKind::UpdateByKey,
        &BindInput::for_record_and_key(record, key),
    )
}

/// `UPDATE` by primary key, setting only present fields.
pub fn update_by_key_selective<E: Record>(
    record: &E,
    key: &[Value],
) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(
        OperationKind::UpdateByKeySelective,
        &BindInput::for_record_and_key(record, key),
    )
}

/// Criteria-driven `UPDATE` with the SET clause taken from the record.
pub fn update_by_criteria<E: Record>(
    record: &E,
    tree: &CriteriaTree,
) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(
        OperationKind::UpdateByCriteria,
        &BindInput::for_record_and_tree(record, tree),
    )
}

/// Criteria-driven `UPDATE` setting only present record fields.
pub fn update_by_criteria_selective<E: Record>(
    record: &E,
    tree: &CriteriaTree,
) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(
        OperationKind::UpdateByCriteriaSelective,
        &BindInput::for_record_and_tree(record, tree),
    )
}

/// Criteria-driven `UPDATE` with the SET clause taken from the tree's
/// assignment list (`set` / `set_raw`); no record involved.
pub fn update<E: Record>(tree: &CriteriaTree) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::UpdateByCriteria, &BindInput::for_tree(tree))
}

// ----------------------------------------------------------------------
// Deletes
// ----------------------------------------------------------------------

/// `DELETE` by primary key; soft-delete tables rewrite to a flag update.
pub fn delete_by_key<E: Record>(key: &[Value]) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::DeleteByKey, &BindInput::for_key(key))
}

/// Criteria-driven `DELETE`; soft-delete tables rewrite to a flag update.
pub fn delete_by_criteria<E: Record>(tree: &CriteriaTree) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::DeleteByCriteria, &BindInput::for_tree(tree))
}

/// `DELETE` matching the record's present non-id fields.
pub fn delete_by_entity<E: Record>(record: &E) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::DeleteByEntity, &BindInput::for_record(record))
}

// ----------------------------------------------------------------------
// Selects
// ----------------------------------------------------------------------

/// `SELECT` by primary key.
pub fn select_by_key<E: Record>(key: &[Value]) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::SelectByKey, &BindInput::for_key(key))
}

/// Criteria-driven `SELECT`.
pub fn select_by_criteria<E: Record>(tree: &CriteriaTree) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::SelectByCriteria, &BindInput::for_tree(tree))
}

/// Criteria-driven `SELECT` whose caller expects at most one row; the
/// cardinality check itself happens at the execution boundary.
pub fn select_one_by_criteria<E: Record>(
    tree: &CriteriaTree,
) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(
        OperationKind::SelectOneByCriteria,
        &BindInput::for_tree(tree),
    )
}

/// `SELECT` matching the record's present non-id fields.
pub fn select_by_entity<E: Record>(record: &E) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::SelectByEntity, &BindInput::for_record(record))
}

/// `SELECT COUNT(*)` under the same WHERE semantics as the selects.
pub fn count_by_criteria<E: Record>(tree: &CriteriaTree) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::CountByCriteria, &BindInput::for_tree(tree))
}

/// `SELECT COUNT(*)` matching the record's present non-id fields.
pub fn count_by_entity<E: Record>(record: &E) -> Result<SqlStatement, TemplateError> {
    assemble::<E>(OperationKind::CountByEntity, &BindInput::for_record(record))
}
