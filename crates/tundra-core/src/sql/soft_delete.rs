use crate::model::{DeleteMode, MetaError, Table};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, OnceLock},
};

///
/// Overlay
///
/// The derived soft-delete behavior for one table: the flag column, how
/// a deletion writes it, and how live-row filtering tests it. Attached
/// once per table on first template build and immutable afterwards.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub table: String,
    pub flag_column: String,
    pub mode: DeleteMode,
}

impl Overlay {
    /// Predicate selecting live rows, e.g. `status != 0` or
    /// `deleted_at IS NULL`. The literal side comes from trusted column
    /// metadata and is inlined rather than bound.
    #[must_use]
    pub fn not_deleted_sql(&self) -> String {
        match &self.mode {
            DeleteMode::Literal(sentinel) => {
                format!("{} != {}", self.flag_column, sentinel.sql_literal())
            }
            DeleteMode::CurrentTimestamp => format!("{} IS NULL", self.flag_column),
        }
    }

    /// SET fragment a rewritten delete writes, e.g. `status = 0` or
    /// `deleted_at = CURRENT_TIMESTAMP`.
    #[must_use]
    pub fn delete_set_sql(&self) -> String {
        match &self.mode {
            DeleteMode::Literal(sentinel) => {
                format!("{} = {}", self.flag_column, sentinel.sql_literal())
            }
            DeleteMode::CurrentTimestamp => format!("{} = CURRENT_TIMESTAMP", self.flag_column),
        }
    }
}

// ----------------------------------------------------------------------
// Overlay registry
//
// Keyed by entity path. Attachment runs under a per-table lock so two
// threads racing the first template build observe one overlay; the
// registered entry never changes afterwards.
// ----------------------------------------------------------------------

static OVERLAYS: OnceLock<Mutex<BTreeMap<&'static str, Arc<Overlay>>>> = OnceLock::new();
static ATTACH_LOCKS: OnceLock<Mutex<BTreeMap<&'static str, Arc<Mutex<()>>>>> = OnceLock::new();

fn overlays() -> &'static Mutex<BTreeMap<&'static str, Arc<Overlay>>> {
    OVERLAYS.get_or_init(|| Mutex::new(BTreeMap::new()))
}

fn attach_lock(path: &'static str) -> Arc<Mutex<()>> {
    let locks = ATTACH_LOCKS.get_or_init(|| Mutex::new(BTreeMap::new()));
    let mut guard = locks.lock().expect("attach lock registry poisoned");

    guard.entry(path).or_default().clone()
}

/// The attached overlay for an entity path, if the table carries one.
#[must_use]
pub fn overlay_for(path: &str) -> Option<Arc<Overlay>> {
    overlays()
        .lock()
        .expect("overlay registry poisoned")
        .get(path)
        .cloned()
}

/// Derive and register the table's overlay, exactly once per table.
///
/// Enforces the exactly-one flag invariant and the declared-but-missing
/// check via [`Table::delete_flag`]. Tables without the overlay register
/// nothing.
pub fn ensure_attached(table: &Table) -> Result<(), MetaError> {
    let Some((column, flag)) = table.delete_flag()? else {
        return Ok(());
    };

    let overlay = Overlay {
        table: table.table_name().to_string(),
        flag_column: column.name.clone(),
        mode: flag.mode.clone(),
    };

    let lock = attach_lock(table.path());
    let _guard = lock.lock().expect("attach section poisoned");

    let mut registry = overlays().lock().expect("overlay registry poisoned");
    registry.entry(table.path()).or_insert_with(|| Arc::new(overlay));

    Ok(())
}
