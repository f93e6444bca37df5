use std::marker::PhantomData;
use tundra_core::{
    criteria::CriteriaTree,
    error::AccessError,
    executor::{ExecuteError, StatementExecutor},
    sql::{OperationKind, SqlStatement, ops},
    traits::Record,
    value::Value,
};

///
/// Mapper
///
/// Per-entity operation surface: assembles statements through the core
/// and drives them through a backend executor. Row decoding stays on
/// the executor's side of the seam; reads hand back driver rows.
///

pub struct Mapper<E: Record, X: StatementExecutor> {
    executor: X,
    _marker: PhantomData<E>,
}

impl<E: Record, X: StatementExecutor> Mapper<E, X> {
    pub const fn new(executor: X) -> Self {
        Self {
            executor,
            _marker: PhantomData,
        }
    }

    /// Hand the executor back, consuming the mapper.
    pub fn into_executor(self) -> X {
        self.executor
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn insert(&mut self, record: &E) -> Result<u64, AccessError> {
        let stmt = ops::insert(record)?;
        Ok(self.executor.execute(&stmt)?)
    }

    pub fn insert_selective(&mut self, record: &E) -> Result<u64, AccessError> {
        let stmt = ops::insert_selective(record)?;
        Ok(self.executor.execute(&stmt)?)
    }

    pub fn update_by_key(&mut self, record: &E, key: &[Value]) -> Result<u64, AccessError> {
        let stmt = ops::update_by_key(record, key)?;
        Ok(self.executor.execute(&stmt)?)
    }

    pub fn update_by_key_selective(
        &mut self,
        record: &E,
        key: &[Value],
    ) -> Result<u64, AccessError> {
        let stmt = ops::update_by_key_selective(record, key)?;
        Ok(self.executor.execute(&stmt)?)
    }

    pub fn update_by_criteria(
        &mut self,
        record: &E,
        tree: &CriteriaTree,
    ) -> Result<u64, AccessError> {
        let stmt = ops::update_by_criteria(record, tree)?;
        Ok(self.executor.execute(&stmt)?)
    }

    pub fn update_by_criteria_selective(
        &mut self,
        record: &E,
        tree: &CriteriaTree,
    ) -> Result<u64, AccessError> {
        let stmt = ops::update_by_criteria_selective(record, tree)?;
        Ok(self.executor.execute(&stmt)?)
    }

    /// Criteria-driven update with the SET clause taken from the tree's
    /// assignment list; no record involved.
    pub fn update(&mut self, tree: &CriteriaTree) -> Result<u64, AccessError> {
        let stmt = ops::update::<E>(tree)?;
        Ok(self.executor.execute(&stmt)?)
    }

    pub fn delete_by_key(&mut self, key: &[Value]) -> Result<u64, AccessError> {
        let stmt = ops::delete_by_key::<E>(key)?;
        Ok(self.executor.execute(&stmt)?)
    }

    pub fn delete_by_criteria(&mut self, tree: &CriteriaTree) -> Result<u64, AccessError> {
        let stmt = ops::delete_by_criteria::<E>(tree)?;
        Ok(self.executor.execute(&stmt)?)
    }

    /// Delete rows matching the record's present non-id fields.
    pub fn delete_by_entity(&mut self, record: &E) -> Result<u64, AccessError> {
        let stmt = ops::delete_by_entity(record)?;
        Ok(self.executor.execute(&stmt)?)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn select_by_key(&mut self, key: &[Value]) -> Result<Option<X::Row>, AccessError> {
        let stmt = ops::select_by_key::<E>(key)?;
        let rows = self.executor.query(&stmt)?;

        Self::at_most_one(OperationKind::SelectByKey, rows)
    }

    pub fn select_by_criteria(&mut self, tree: &CriteriaTree) -> Result<Vec<X::Row>, AccessError> {
        let stmt = ops::select_by_criteria::<E>(tree)?;
        Ok(self.executor.query(&stmt)?)
    }

    /// Select expecting at most one row; more than one is an error, not
    /// a silent truncation.
    pub fn select_one(&mut self, tree: &CriteriaTree) -> Result<Option<X::Row>, AccessError> {
        let stmt = ops::select_one_by_criteria::<E>(tree)?;
        let rows = self.executor.query(&stmt)?;

        Self::at_most_one(OperationKind::SelectOneByCriteria, rows)
    }

    /// Select rows matching the record's present non-id fields.
    pub fn select_by_entity(&mut self, record: &E) -> Result<Vec<X::Row>, AccessError> {
        let stmt = ops::select_by_entity(record)?;
        Ok(self.executor.query(&stmt)?)
    }

    /// Count rows matching the record's present non-id fields; the
    /// single result row is handed back for the driver to decode.
    pub fn count_by_entity(&mut self, record: &E) -> Result<X::Row, AccessError> {
        let stmt = ops::count_by_entity(record)?;
        self.one_row(OperationKind::CountByEntity, &stmt)
    }

    /// Count under the same WHERE semantics as the selects; the single
    /// result row is handed back for the driver to decode.
    pub fn count(&mut self, tree: &CriteriaTree) -> Result<X::Row, AccessError> {
        let stmt = ops::count_by_criteria::<E>(tree)?;
        self.one_row(OperationKind::CountByCriteria, &stmt)
    }

    fn one_row(&mut self, op: OperationKind, stmt: &SqlStatement) -> Result<X::Row, AccessError> {
        let mut rows = self.executor.query(stmt)?;

        match rows.len() {
            1 => Ok(rows.remove(0)),
            0 => Err(ExecuteError::Backend("count returned no rows".to_string()).into()),
            found => Err(ExecuteError::TooManyRows {
                operation: op.as_str().to_string(),
                found,
            }
            .into()),
        }
    }

    fn at_most_one(
        op: OperationKind,
        mut rows: Vec<X::Row>,
    ) -> Result<Option<X::Row>, AccessError> {
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(rows.remove(0))),
            found => Err(ExecuteError::TooManyRows {
                operation: op.as_str().to_string(),
                found,
            }
            .into()),
        }
    }
}
