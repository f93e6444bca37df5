//! Process-lifetime store for assembled statement templates, keyed by
//! entity path and operation. Private to the assembly boundary; callers
//! go through `template_for`.

use crate::sql::{OperationKind, node::SqlTemplate};
use std::{
    cell::Cell,
    collections::BTreeMap,
    sync::{
        Arc, Mutex, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

///
/// TemplateKey
///
/// Entity path plus operation kind. Independent of runtime argument
/// values, so a key maps to exactly one statement shape for the life of
/// the process.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct TemplateKey {
    pub path: &'static str,
    pub op: OperationKind,
}

impl TemplateKey {
    #[must_use]
    pub const fn new(path: &'static str, op: OperationKind) -> Self {
        Self { path, op }
    }
}

type TemplateMap = BTreeMap<TemplateKey, Arc<SqlTemplate>>;

static TEMPLATES: OnceLock<Mutex<TemplateMap>> = OnceLock::new();
static HITS: AtomicUsize = AtomicUsize::new(0);
static MISSES: AtomicUsize = AtomicUsize::new(0);

// Tests default to uncached so each one exercises a fresh build.
const DEFAULT_CACHE_DISABLED: bool = cfg!(test) || !cfg!(feature = "template-cache");

// Per-thread toggle; flipping it never disturbs other threads.
thread_local! {
    static CACHE_DISABLED: Cell<bool> = const { Cell::new(DEFAULT_CACHE_DISABLED) };
}

fn templates() -> &'static Mutex<TemplateMap> {
    TEMPLATES.get_or_init(|| Mutex::new(TemplateMap::new()))
}

fn cache_disabled() -> bool {
    CACHE_DISABLED.with(Cell::get)
}

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
}

pub fn get(key: &TemplateKey) -> Option<Arc<SqlTemplate>> {
    if cache_disabled() {
        return None;
    }

    templates()
        .lock()
        .expect("template cache lock poisoned")
        .get(key)
        .cloned()
}

/// Publish a freshly built template. Only successful builds reach this
/// point; a build error leaves no entry behind.
pub fn insert(key: TemplateKey, template: Arc<SqlTemplate>) {
    if cache_disabled() {
        return;
    }

    templates()
        .lock()
        .expect("template cache lock poisoned")
        .insert(key, template);
}

// Counters are advisory; relaxed ordering.
pub fn record_hit() {
    if cache_disabled() {
        return;
    }
    HITS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_miss() {
    if cache_disabled() {
        return;
    }
    MISSES.fetch_add(1, Ordering::Relaxed);
}

#[must_use]
pub fn stats() -> CacheStats {
    let size = TEMPLATES
        .get()
        .and_then(|map| map.lock().ok())
        .map_or(0, |map| map.len());

    CacheStats {
        hits: HITS.load(Ordering::Relaxed),
        misses: MISSES.load(Ordering::Relaxed),
        size,
    }
}

#[allow(dead_code)]
pub fn reset() {
    if let Some(map) = TEMPLATES.get()
        && let Ok(mut guard) = map.lock()
    {
        guard.clear();
    }
    HITS.store(0, Ordering::Relaxed);
    MISSES.store(0, Ordering::Relaxed);
}

/// Run `f` with caching off on the current thread, restoring the prior
/// setting afterwards.
#[allow(dead_code)]
pub fn with_cache_disabled<R>(f: impl FnOnce() -> R) -> R {
    with_flag(true, f)
}

/// Run `f` with caching on for the current thread, restoring the prior
/// setting afterwards.
#[allow(dead_code)]
pub fn with_cache_enabled<R>(f: impl FnOnce() -> R) -> R {
    with_flag(false, f)
}

fn with_flag<R>(disabled: bool, f: impl FnOnce() -> R) -> R {
    CACHE_DISABLED.with(|flag| {
        let prev = flag.replace(disabled);
        let out = f();
        flag.set(prev);
        out
    })
}
