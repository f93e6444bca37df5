use crate::model::{
    MetaError,
    column::{Column, DeleteFlag},
};
use std::{collections::BTreeMap, sync::Arc};

/// Property key: permit an empty criteria tree on bulk update/delete.
/// Defaults to "true" (permissive) when absent; set to "false" per table to
/// refuse accidental full-table writes.
pub const PROP_ALLOW_EMPTY_CRITERIA: &str = "allow_empty_criteria";

/// Property key: verbatim GROUP BY column list appended to select
/// templates.
pub const PROP_GROUP_BY: &str = "group_by";

/// Property key: verbatim HAVING condition appended to select templates.
pub const PROP_HAVING: &str = "having";

/// Property key: declare that this table participates in the soft-delete
/// overlay. Detection also triggers implicitly when a column carries the
/// deletion flag; the explicit property turns a missing flag column into a
/// build-time error instead of a silent physical delete.
pub const PROP_SOFT_DELETE: &str = "soft_delete";

///
/// Table
///
/// Fully-derived, immutable table metadata. Built once per entity type by
/// the factory pipeline, published through the registry, never mutated
/// afterwards. The filtered column views are precomputed here so template
/// assembly never re-scans the column list.
///

#[derive(Debug)]
pub struct Table {
    path: &'static str,
    entity_name: &'static str,
    table_name: String,
    columns: Vec<Arc<Column>>,
    id_columns: Vec<Arc<Column>>,
    insert_columns: Vec<Arc<Column>>,
    update_columns: Vec<Arc<Column>>,
    select_columns: Vec<Arc<Column>>,
    where_columns: Vec<Arc<Column>>,
    props: BTreeMap<String, String>,
}

impl Table {
    pub(crate) fn new(
        path: &'static str,
        entity_name: &'static str,
        table_name: String,
        columns: Vec<Arc<Column>>,
        props: BTreeMap<String, String>,
    ) -> Result<Self, MetaError> {
        if columns.is_empty() {
            return Err(MetaError::NoColumns {
                table: table_name.clone(),
            });
        }

        let filtered = |pred: fn(&Column) -> bool| -> Vec<Arc<Column>> {
            columns.iter().filter(|c| pred(c)).cloned().collect()
        };

        Ok(Self {
            path,
            entity_name,
            table_name,
            id_columns: filtered(|c| c.is_id),
            insert_columns: filtered(|c| c.insertable),
            update_columns: filtered(|c| c.updatable && !c.is_id),
            select_columns: filtered(|c| c.selectable),
            where_columns: filtered(|c| !c.is_id),
            columns,
            props,
        })
    }

    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    #[must_use]
    pub const fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[must_use]
    pub fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    #[must_use]
    pub fn id_columns(&self) -> &[Arc<Column>] {
        &self.id_columns
    }

    #[must_use]
    pub fn insert_columns(&self) -> &[Arc<Column>] {
        &self.insert_columns
    }

    /// Updatable, non-id columns forming the default SET clause.
    #[must_use]
    pub fn update_columns(&self) -> &[Arc<Column>] {
        &self.update_columns
    }

    #[must_use]
    pub fn select_columns(&self) -> &[Arc<Column>] {
        &self.select_columns
    }

    /// Non-id columns eligible for entity-driven WHERE predicates.
    #[must_use]
    pub fn where_columns(&self) -> &[Arc<Column>] {
        &self.where_columns
    }

    /// Require at least one id column, naming the table otherwise.
    ///
    /// Id-less tables build successfully; the failure is deferred to the
    /// first key-addressed operation.
    pub fn require_id_columns(&self) -> Result<&[Arc<Column>], MetaError> {
        if self.id_columns.is_empty() {
            return Err(MetaError::NoIdColumn {
                table: self.table_name.clone(),
            });
        }
        Ok(&self.id_columns)
    }

    #[must_use]
    pub fn prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    /// Whether an empty criteria tree may drive a bulk mutation.
    pub fn allows_empty_criteria(&self) -> Result<bool, MetaError> {
        self.bool_prop(PROP_ALLOW_EMPTY_CRITERIA, true)
    }

    /// Metadata-contributed GROUP BY column list for select templates.
    #[must_use]
    pub fn group_by(&self) -> Option<&str> {
        self.prop(PROP_GROUP_BY)
    }

    /// Metadata-contributed HAVING condition for select templates.
    #[must_use]
    pub fn having(&self) -> Option<&str> {
        self.prop(PROP_HAVING)
    }

    /// Whether this table explicitly declares the soft-delete overlay.
    pub fn declares_soft_delete(&self) -> Result<bool, MetaError> {
        self.bool_prop(PROP_SOFT_DELETE, false)
    }

    /// Locate the deletion-flag column, enforcing the exactly-one invariant.
    ///
    /// Returns `Ok(None)` for tables without the overlay. Errors when two
    /// columns carry the flag, or when the table declares the overlay via
    /// property but no column carries it.
    pub fn delete_flag(&self) -> Result<Option<(&Arc<Column>, &DeleteFlag)>, MetaError> {
        let mut found: Option<(&Arc<Column>, &DeleteFlag)> = None;

        for column in &self.columns {
            if let Some(flag) = &column.delete_flag {
                if let Some((first, _)) = found {
                    return Err(MetaError::DuplicateDeleteFlag {
                        table: self.table_name.clone(),
                        first: first.name.clone(),
                        second: column.name.clone(),
                    });
                }
                found = Some((column, flag));
            }
        }

        if found.is_none() && self.declares_soft_delete()? {
            return Err(MetaError::MissingDeleteFlag {
                table: self.table_name.clone(),
            });
        }

        Ok(found)
    }

    /// Resolve a column by case-sensitive property, then by
    /// case-insensitive physical name.
    #[must_use]
    pub fn find_column(&self, field: &str) -> Option<&Arc<Column>> {
        self.columns
            .iter()
            .find(|c| c.property == field)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(field))
            })
    }

    fn bool_prop(&self, key: &str, default: bool) -> Result<bool, MetaError> {
        match self.props.get(key).map(String::as_str) {
            None => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(MetaError::InvalidProperty {
                table: self.table_name.clone(),
                key: key.to_string(),
                value: other.to_string(),
            }),
        }
    }
}
