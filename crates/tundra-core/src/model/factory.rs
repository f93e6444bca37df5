use crate::model::{
    MetaError,
    column::{Column, DeleteFlag, DeleteMode, OrderDirection},
    spec::{DeleteFlagSpec, TableSpec},
    table::Table,
};
use convert_case::{Case, Casing};
use std::{
    collections::BTreeMap,
    sync::{Arc, OnceLock, RwLock},
};

///
/// MetaLayer
///
/// One stage of the metadata derivation pipeline. Layers run in order,
/// innermost first; a later layer overrides an earlier one only for
/// attributes it actually sets on the draft. Layers may annotate columns
/// but must never remove or rename existing drafts.
///
/// The built-in pipeline is convention defaults followed by the entity's
/// own declarations; extension layers registered via [`register_layer`]
/// run last and therefore take priority.
///

pub trait MetaLayer: Send + Sync {
    fn apply(&self, spec: &TableSpec, draft: &mut TableDraft);
}

///
/// TableDraft
///
/// Mutable intermediate passed through the layer pipeline. Attribute
/// `Option`s record "was explicitly set"; finalization fills remaining
/// holes with permissive defaults.
///

#[derive(Debug, Default)]
pub struct TableDraft {
    pub table_name: Option<String>,
    pub columns: Vec<ColumnDraft>,
    pub props: BTreeMap<String, String>,
}

///
/// ColumnDraft
///

#[derive(Debug, Default)]
pub struct ColumnDraft {
    pub property: String,
    pub name: Option<String>,
    pub is_id: Option<bool>,
    pub selectable: Option<bool>,
    pub insertable: Option<bool>,
    pub updatable: Option<bool>,
    pub order_by: Option<OrderDirection>,
    pub delete_flag: Option<DeleteFlag>,
    /// Marked non-persisted; dropped at finalization.
    pub excluded: bool,
}

impl TableDraft {
    fn seeded_from(spec: &TableSpec) -> Self {
        Self {
            table_name: None,
            columns: spec
                .fields
                .iter()
                .map(|field| ColumnDraft {
                    property: field.name.to_string(),
                    ..ColumnDraft::default()
                })
                .collect(),
            props: BTreeMap::new(),
        }
    }
}

///
/// ConventionLayer
///
/// Innermost defaults: snake_case table name from the type identifier,
/// snake_case column name from the field name, everything selectable,
/// insertable, and updatable, `id` property as the key.
///

struct ConventionLayer;

impl MetaLayer for ConventionLayer {
    fn apply(&self, spec: &TableSpec, draft: &mut TableDraft) {
        draft.table_name = Some(spec.ident.to_case(Case::Snake));

        for column in &mut draft.columns {
            column.name = Some(column.property.to_case(Case::Snake));
            column.is_id = Some(column.property == "id");
            column.selectable = Some(true);
            column.insertable = Some(true);
            column.updatable = Some(true);
        }
    }
}

///
/// DeclarationLayer
///
/// The entity's own `FieldSpec`/`TableSpec` attributes. Only explicitly
/// set attributes override the convention defaults.
///

struct DeclarationLayer;

impl MetaLayer for DeclarationLayer {
    fn apply(&self, spec: &TableSpec, draft: &mut TableDraft) {
        if let Some(table) = spec.table {
            draft.table_name = Some(table.to_string());
        }

        for (key, value) in spec.props {
            draft
                .props
                .insert((*key).to_string(), (*value).to_string());
        }

        for (field, column) in spec.fields.iter().zip(&mut draft.columns) {
            if let Some(name) = field.column {
                column.name = Some(name.to_string());
            }
            if field.id {
                column.is_id = Some(true);
            }
            if field.ignored {
                column.excluded = true;
            }
            if let Some(flag) = field.selectable {
                column.selectable = Some(flag);
            }
            if let Some(flag) = field.insertable {
                column.insertable = Some(flag);
            }
            if let Some(flag) = field.updatable {
                column.updatable = Some(flag);
            }
            if let Some(direction) = field.order_by {
                column.order_by = Some(direction);
            }
            if let Some(spec) = &field.delete_flag {
                column.delete_flag = Some(DeleteFlag {
                    mode: match spec {
                        DeleteFlagSpec::Literal(value) => DeleteMode::Literal(value.to_value()),
                        DeleteFlagSpec::CurrentTimestamp => DeleteMode::CurrentTimestamp,
                    },
                });
            }
        }
    }
}

// Extension layers registered by integrations (extended attributes,
// alternate declaration schemes). Registration after a table has been
// built does not retroactively rebuild it; register before first use.
static EXTENSION_LAYERS: OnceLock<RwLock<Vec<Arc<dyn MetaLayer>>>> = OnceLock::new();

fn extension_layers() -> &'static RwLock<Vec<Arc<dyn MetaLayer>>> {
    EXTENSION_LAYERS.get_or_init(|| RwLock::new(Vec::new()))
}

/// Append an extension layer to the pipeline. Outermost priority: layers
/// registered later run later and override earlier layers for attributes
/// they set.
pub fn register_layer(layer: Arc<dyn MetaLayer>) {
    extension_layers()
        .write()
        .expect("metadata layer registry lock poisoned")
        .push(layer);
}

/// Derive a full [`Table`] from a const descriptor through the layer
/// pipeline. Pure with respect to the descriptor and the registered
/// layers; duplicate concurrent derivations are equivalent and the
/// registry keeps whichever publishes first.
pub(crate) fn build_table(spec: &'static TableSpec) -> Result<Table, MetaError> {
    let mut draft = TableDraft::seeded_from(spec);

    ConventionLayer.apply(spec, &mut draft);
    DeclarationLayer.apply(spec, &mut draft);

    let layers = extension_layers()
        .read()
        .expect("metadata layer registry lock poisoned")
        .clone();
    for layer in layers {
        layer.apply(spec, &mut draft);
    }

    finalize(spec, draft)
}

fn finalize(spec: &'static TableSpec, draft: TableDraft) -> Result<Table, MetaError> {
    let table_name = draft
        .table_name
        .unwrap_or_else(|| spec.ident.to_case(Case::Snake));

    let mut columns = Vec::with_capacity(draft.columns.len());
    for column in draft.columns {
        if column.excluded {
            continue;
        }

        let name = column.name.unwrap_or_default();
        if name.is_empty() && column.property.is_empty() {
            return Err(MetaError::UnnamedColumn {
                table: table_name.clone(),
                column: "<unnamed>".to_string(),
            });
        }

        columns.push(Arc::new(Column {
            // A missing physical name falls back to the property, and
            // vice versa; both empty was rejected above.
            name: if name.is_empty() {
                column.property.clone()
            } else {
                name
            },
            property: column.property,
            is_id: column.is_id.unwrap_or(false),
            selectable: column.selectable.unwrap_or(true),
            insertable: column.insertable.unwrap_or(true),
            updatable: column.updatable.unwrap_or(true),
            order_by: column.order_by,
            delete_flag: column.delete_flag,
        }));
    }

    Table::new(spec.path, spec.ident, table_name, columns, draft.props)
}
