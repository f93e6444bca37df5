//! Process-lifetime table registry; private beyond `metadata_for`.

use crate::{
    model::{MetaError, factory::build_table, table::Table},
    traits::Record,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, OnceLock, RwLock},
};

// Derivation is a pure function of the const descriptor plus the layer
// registry, so the discipline is compute-outside-lock with a single
// atomic publish; a concurrent duplicate derivation is wasted work, not
// a correctness hazard. First insert wins so every caller observes the
// same Arc.
static TABLES: OnceLock<RwLock<BTreeMap<&'static str, Arc<Table>>>> = OnceLock::new();

fn tables() -> &'static RwLock<BTreeMap<&'static str, Arc<Table>>> {
    TABLES.get_or_init(|| RwLock::new(BTreeMap::new()))
}

/// Return the cached [`Table`] for `E`, deriving it on first access.
///
/// Idempotent: repeated calls return the same published instance with an
/// identical column set and ordering.
pub fn metadata_for<E: Record>() -> Result<Arc<Table>, MetaError> {
    let key = E::path();

    if let Some(table) = tables()
        .read()
        .expect("table registry lock poisoned")
        .get(key)
    {
        return Ok(table.clone());
    }

    let built = Arc::new(build_table(E::SPEC)?);

    let mut guard = tables().write().expect("table registry lock poisoned");
    Ok(guard.entry(key).or_insert(built).clone())
}

#[cfg(test)]
#[allow(dead_code)]
pub(crate) fn reset() {
    if let Some(lock) = TABLES.get()
        && let Ok(mut guard) = lock.write()
    {
        guard.clear();
    }
}
