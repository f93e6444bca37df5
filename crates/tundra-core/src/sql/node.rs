use crate::{model::Table, sql::OperationKind};
use std::sync::Arc;

///
/// ColumnView
///
/// Which precomputed column view of the table a fragment iterates.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnView {
    Insert,
    Update,
}

///
/// ColumnEmit
///
/// What a column-iterating fragment emits per column.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnEmit {
    /// `name, name, …`
    Name,
    /// `?, ?, …` with one bound value per column.
    Placeholder,
    /// `name = ?, name = ?, …` with one bound value per column.
    SetPair,
}

///
/// RawSlot
///
/// Which caller-supplied raw SQL string of the tree a fragment emits.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RawSlot {
    Prefix,
    Suffix,
}

///
/// Test
///
/// Conditions evaluated against the runtime criteria tree. Structure
/// tests only; value content never changes the SQL shape beyond these.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Test {
    OrderPresent,
    AssignmentsPresent,
    PrefixPresent,
    SuffixPresent,
}

///
/// Fragment
///
/// One node of a prepared statement template. Structural decisions
/// (which columns, which conditional branches exist) are fixed at build
/// time; only value binding and tree-dependent sections are resolved per
/// render.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Fragment {
    /// Literal SQL text, emitted verbatim.
    Text(String),

    /// `WHERE id = ? [AND id2 = ?]` over the id columns, plus the
    /// not-deleted predicate when the template carries one.
    KeyWhere,

    /// Comma-joined emission over a column view. Selective templates
    /// skip columns whose runtime value is absent.
    EachColumn {
        view: ColumnView,
        emit: ColumnEmit,
        selective: bool,
    },

    /// SET clause driven by the tree's assignment list.
    AssignmentSet,

    /// Select-column list: the tree's override verbatim when present,
    /// otherwise the selectable view; honors `distinct`.
    SelectList,

    /// WHERE clause compiled from the tree's OR-list of AND-groups,
    /// with the not-deleted predicate appended.
    CriteriaWhere,

    /// WHERE clause built from the record's present non-id fields,
    /// AND-joined, with the not-deleted predicate appended.
    EntityWhere,

    /// `ORDER BY` from the tree's accumulated ordering string.
    RuntimeOrder,

    /// Caller-supplied raw SQL slot, emitted verbatim.
    RawSql(RawSlot),

    /// Conditional body, included when the test passes at render time.
    If { test: Test, body: Vec<Fragment> },

    /// First-match selection; `otherwise` renders when no arm passes.
    Choose {
        arms: Vec<(Test, Vec<Fragment>)>,
        otherwise: Vec<Fragment>,
    },
}

///
/// SqlTemplate
///
/// The cached unit: one operation's statement shape for one table.
/// Built once, shared via `Arc`, rendered many times.
///

#[derive(Debug)]
pub struct SqlTemplate {
    pub op: OperationKind,
    pub table: Arc<Table>,
    pub fragments: Vec<Fragment>,
    /// Precomputed not-deleted predicate for soft-delete tables,
    /// appended to every WHERE this template emits.
    pub not_deleted: Option<String>,
}
