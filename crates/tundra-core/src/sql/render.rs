use crate::{
    criteria::{Assignment, CriteriaError, CriteriaTree},
    model::Column,
    sql::{
        OperationKind, SqlStatement, TemplateError,
        node::{ColumnEmit, ColumnView, Fragment, RawSlot, SqlTemplate, Test},
        where_clause,
    },
    traits::FieldValues,
    value::Value,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

///
/// BindInput
///
/// Runtime arguments rendered against a template. Each operation reads
/// the parts it needs; missing parts are reported as template errors,
/// never panics.
///

#[derive(Clone, Copy, Default)]
pub struct BindInput<'a> {
    pub record: Option<&'a dyn FieldValues>,
    pub key: Option<&'a [Value]>,
    pub tree: Option<&'a CriteriaTree>,
}

impl<'a> BindInput<'a> {
    #[must_use]
    pub fn for_record(record: &'a dyn FieldValues) -> Self {
        Self {
            record: Some(record),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_key(key: &'a [Value]) -> Self {
        Self {
            key: Some(key),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_tree(tree: &'a CriteriaTree) -> Self {
        Self {
            tree: Some(tree),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_record_and_key(record: &'a dyn FieldValues, key: &'a [Value]) -> Self {
        Self {
            record: Some(record),
            key: Some(key),
            tree: None,
        }
    }

    #[must_use]
    pub fn for_record_and_tree(record: &'a dyn FieldValues, tree: &'a CriteriaTree) -> Self {
        Self {
            record: Some(record),
            key: None,
            tree: Some(tree),
        }
    }
}

/// Render a template against runtime input.
///
/// Guard order: any latched construction fault in the tree surfaces
/// first; then the empty-criteria guard for criteria-driven mutations;
/// then fragment rendering, which validates key arity and record
/// presence as each fragment needs them.
pub fn render(template: &SqlTemplate, input: &BindInput<'_>) -> Result<SqlStatement, TemplateError> {
    if let Some(tree) = input.tree {
        tree.ensure_sound()?;

        if template.op.is_criteria_mutation()
            && tree.is_empty()
            && !template.table.allows_empty_criteria()?
        {
            return Err(CriteriaError::EmptyCriteriaForbidden {
                table: template.table.table_name().to_string(),
                operation: template.op.as_str().to_string(),
            }
            .into());
        }
    }

    let mut renderer = Renderer {
        template,
        input,
        sql: String::new(),
        params: Vec::new(),
    };
    renderer.fragments(&template.fragments)?;

    Ok(SqlStatement {
        sql: renderer.sql,
        params: renderer.params,
    })
}

struct Renderer<'a> {
    template: &'a SqlTemplate,
    input: &'a BindInput<'a>,
    sql: String,
    params: Vec<Value>,
}

impl<'a> Renderer<'a> {
    fn fragments(&mut self, fragments: &[Fragment]) -> Result<(), TemplateError> {
        for fragment in fragments {
            self.fragment(fragment)?;
        }
        Ok(())
    }

    fn fragment(&mut self, fragment: &Fragment) -> Result<(), TemplateError> {
        match fragment {
            Fragment::Text(text) => self.sql.push_str(text),

            Fragment::KeyWhere => self.key_where()?,

            Fragment::EachColumn {
                view,
                emit,
                selective,
            } => self.each_column(*view, *emit, *selective)?,

            Fragment::AssignmentSet => self.assignment_set()?,

            Fragment::SelectList => self.select_list(),

            Fragment::CriteriaWhere => self.criteria_where()?,

            Fragment::EntityWhere => self.entity_where()?,

            Fragment::RuntimeOrder => {
                if let Some(order) = self.tree().and_then(|t| t.order_by.as_deref()) {
                    self.sql.push_str(" ORDER BY ");
                    self.sql.push_str(order);
                }
            }

            Fragment::RawSql(slot) => {
                let raw = self.tree().and_then(|t| match slot {
                    RawSlot::Prefix => t.prefix_sql.as_deref(),
                    RawSlot::Suffix => t.suffix_sql.as_deref(),
                });
                if let Some(raw) = raw {
                    self.sql.push_str(raw);
                }
            }

            Fragment::If { test, body } => {
                if self.test(*test) {
                    self.fragments(body)?;
                }
            }

            Fragment::Choose { arms, otherwise } => {
                for (test, body) in arms {
                    if self.test(*test) {
                        return self.fragments(body);
                    }
                }
                self.fragments(otherwise)?;
            }
        }

        Ok(())
    }

    fn test(&self, test: Test) -> bool {
        let tree = self.tree();
        match test {
            Test::OrderPresent => tree.is_some_and(|t| t.order_by.is_some()),
            Test::AssignmentsPresent => tree.is_some_and(CriteriaTree::has_assignments),
            Test::PrefixPresent => tree.is_some_and(|t| t.prefix_sql.is_some()),
            Test::SuffixPresent => tree.is_some_and(|t| t.suffix_sql.is_some()),
        }
    }

    // The reference lives in the bind input, not in the renderer, so
    // holding it must not freeze `self`.
    const fn tree(&self) -> Option<&'a CriteriaTree> {
        self.input.tree
    }

    fn operation(&self) -> String {
        self.template.op.as_str().to_string()
    }

    // `WHERE id = ? [AND …]` plus the not-deleted predicate.
    fn key_where(&mut self) -> Result<(), TemplateError> {
        let ids = self.template.table.require_id_columns()?;
        let key = self.input.key.ok_or_else(|| TemplateError::MissingKey {
            operation: self.operation(),
        })?;

        if key.len() != ids.len() {
            return Err(TemplateError::KeyArity {
                operation: self.operation(),
                expected: ids.len(),
                found: key.len(),
            });
        }

        let pairs: Vec<String> = ids.iter().map(|c| format!("{} = ?", c.name)).collect();
        self.sql.push_str(" WHERE ");
        self.sql.push_str(&pairs.join(" AND "));
        self.params.extend(key.iter().cloned());

        if let Some(pred) = &self.template.not_deleted {
            self.sql.push_str(" AND ");
            self.sql.push_str(pred);
        }

        Ok(())
    }

    fn each_column(
        &mut self,
        view: ColumnView,
        emit: ColumnEmit,
        selective: bool,
    ) -> Result<(), TemplateError> {
        let record = self
            .input
            .record
            .ok_or_else(|| TemplateError::MissingRecord {
                operation: self.operation(),
            })?;

        let columns: &[Arc<Column>] = match view {
            ColumnView::Insert => self.template.table.insert_columns(),
            ColumnView::Update => self.template.table.update_columns(),
        };

        // Selective inclusion depends only on the record, so paired
        // fragments (insert names and placeholders) agree on the set.
        let mut included = Vec::new();
        for column in columns {
            let value = record.value(&column.property).unwrap_or(Value::Null);
            if selective && !value.is_present() {
                continue;
            }
            included.push((column, value));
        }

        if included.is_empty() {
            return Err(TemplateError::EmptyWriteSet {
                table: self.template.table.table_name().to_string(),
                operation: self.operation(),
            });
        }

        let parts: Vec<String> = included
            .iter()
            .map(|(column, _)| match emit {
                ColumnEmit::Name => column.name.clone(),
                ColumnEmit::Placeholder => "?".to_string(),
                ColumnEmit::SetPair => format!("{} = ?", column.name),
            })
            .collect();
        self.sql.push_str(&parts.join(", "));

        if matches!(emit, ColumnEmit::Placeholder | ColumnEmit::SetPair) {
            self.params.extend(included.into_iter().map(|(_, v)| v));
        }

        Ok(())
    }

    // SET clause from the tree's assignment list. Duplicate columns
    // resolve first-truthy-wins: the first present pair for a column is
    // the one that binds, a null pair only stands when no later pair is
    // present. Raw fragments render in call order; each column renders
    // at its first occurrence.
    fn assignment_set(&mut self) -> Result<(), TemplateError> {
        let tree = self.input.tree.ok_or_else(|| TemplateError::MissingCriteria {
            operation: self.operation(),
        })?;

        let mut winners: BTreeMap<&str, &Value> = BTreeMap::new();
        for assignment in &tree.assignments {
            if let Assignment::Pair { column, value } = assignment {
                match winners.get(column.as_str()) {
                    Some(held) if held.is_present() => {}
                    Some(_) if value.is_present() => {
                        winners.insert(column, value);
                    }
                    Some(_) => {}
                    None => {
                        winners.insert(column, value);
                    }
                }
            }
        }

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut parts = Vec::new();
        for assignment in &tree.assignments {
            match assignment {
                Assignment::Pair { column, .. } => {
                    if !seen.insert(column.as_str()) {
                        continue;
                    }
                    let value = winners[column.as_str()];
                    if value.is_null() && !tree.allow_nullable_update {
                        return Err(CriteriaError::NullValue {
                            column: column.clone(),
                            operator: "SET".to_string(),
                        }
                        .into());
                    }
                    parts.push(format!("{column} = ?"));
                    self.params.push(value.clone());
                }
                Assignment::Raw(sql) => parts.push(sql.clone()),
            }
        }

        if parts.is_empty() {
            return Err(TemplateError::EmptyWriteSet {
                table: self.template.table.table_name().to_string(),
                operation: self.operation(),
            });
        }

        self.sql.push_str(&parts.join(", "));
        Ok(())
    }

    fn select_list(&mut self) {
        let tree = self.tree();

        if tree.is_some_and(|t| t.distinct) {
            self.sql.push_str("DISTINCT ");
        }

        if let Some(columns) = tree.and_then(|t| t.select.as_deref()) {
            self.sql.push_str(columns);
            return;
        }

        let names: Vec<&str> = self
            .template
            .table
            .select_columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        self.sql.push_str(&names.join(", "));
    }

    // WHERE from the record's present non-id fields, AND-joined. The
    // soft-delete flag column is left to the overlay predicate.
    fn entity_where(&mut self) -> Result<(), TemplateError> {
        let record = self
            .input
            .record
            .ok_or_else(|| TemplateError::MissingRecord {
                operation: self.operation(),
            })?;
        let columns: &'a [Arc<Column>] = self.template.table.where_columns();

        let mut parts = Vec::new();
        for column in columns {
            if column.delete_flag.is_some() {
                continue;
            }
            let Some(value) = record.value(&column.property) else {
                continue;
            };
            if !value.is_present() {
                continue;
            }
            parts.push(format!("{} = ?", column.name));
            self.params.push(value);
        }

        if parts.is_empty()
            && self.template.op == OperationKind::DeleteByEntity
            && !self.template.table.allows_empty_criteria()?
        {
            return Err(CriteriaError::EmptyCriteriaForbidden {
                table: self.template.table.table_name().to_string(),
                operation: self.operation(),
            }
            .into());
        }

        match (parts.is_empty(), &self.template.not_deleted) {
            (false, Some(pred)) => {
                self.sql.push_str(" WHERE ");
                self.sql.push_str(&parts.join(" AND "));
                self.sql.push_str(" AND ");
                self.sql.push_str(pred);
            }
            (false, None) => {
                self.sql.push_str(" WHERE ");
                self.sql.push_str(&parts.join(" AND "));
            }
            (true, Some(pred)) => {
                self.sql.push_str(" WHERE ");
                self.sql.push_str(pred);
            }
            (true, None) => {}
        }

        Ok(())
    }

    fn criteria_where(&mut self) -> Result<(), TemplateError> {
        let tree = self.input.tree.ok_or_else(|| TemplateError::MissingCriteria {
            operation: self.operation(),
        })?;

        if let Some(content) =
            where_clause::criteria_where(tree, self.template.not_deleted.as_deref(), &mut self.params)
        {
            self.sql.push_str(" WHERE ");
            self.sql.push_str(&content);
        }

        Ok(())
    }
}
