use crate::{
    criteria::{CriteriaError, criterion::Group},
    value::Value,
};

///
/// Assignment
///
/// One SET-clause unit for criteria-driven updates. Duplicate columns are
/// kept in call order; the renderer emits the first pair per column
/// (first-truthy-wins), preserved source behavior — see `Wrapper::set`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Assignment {
    Pair { column: String, value: Value },
    Raw(String),
}

///
/// CriteriaTree
///
/// Immutable snapshot handed from a builder flavor to the assembler. The
/// builder owns its accumulated state exclusively until the terminal
/// build/snapshot call; the tree itself is pure data and never mutated.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CriteriaTree {
    /// Top-level OR-list of AND-groups.
    pub groups: Vec<Group>,
    /// SET list for criteria-driven updates.
    pub assignments: Vec<Assignment>,
    /// Select-column override (verbatim column list).
    pub select: Option<String>,
    pub distinct: bool,
    /// Accumulated ORDER BY clause; explicit reset only.
    pub order_by: Option<String>,
    /// Raw SQL prepended before / appended after the statement.
    pub prefix_sql: Option<String>,
    pub suffix_sql: Option<String>,
    /// Permit null SET values on criteria-driven updates; off by default,
    /// a null pair is then a guard violation rather than a silent NULL.
    pub allow_nullable_update: bool,
    /// First guard violation recorded during construction; surfaced at
    /// assembly so builder chains stay infallible.
    pub(crate) fault: Option<CriteriaError>,
}

impl CriteriaTree {
    /// An unconditioned tree (matches every row, subject to the per-table
    /// empty-criteria guard).
    #[must_use]
    pub fn unconditioned() -> Self {
        Self::default()
    }

    /// True iff every AND-group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.groups.iter().any(Group::is_valid)
    }

    #[must_use]
    pub fn has_assignments(&self) -> bool {
        !self.assignments.is_empty()
    }

    /// Surface any construction-time guard violation.
    pub(crate) fn ensure_sound(&self) -> Result<(), CriteriaError> {
        match &self.fault {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn fault(&self) -> Option<&CriteriaError> {
        self.fault.as_ref()
    }
}
