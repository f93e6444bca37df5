use crate::{model::column::OrderDirection, value::Value};

///
/// TableSpec
///
/// Const, declaration-time table descriptor carried by [`crate::traits::Record`].
/// Hand-written or emitted by a code generator; either way it is the sole
/// authority on the entity's declared shape.
///

pub struct TableSpec {
    /// Fully-qualified type path (cache key and diagnostics).
    pub path: &'static str,
    /// Type identifier, used by the convention layer to derive a table name.
    pub ident: &'static str,
    /// Explicit physical table name; `None` defers to the convention layer.
    pub table: Option<&'static str>,
    /// Ordered field list (order is preserved into column metadata).
    pub fields: &'static [FieldSpec],
    /// Free-form behavior properties (see `table::PROP_*`).
    pub props: &'static [(&'static str, &'static str)],
}

impl TableSpec {
    #[must_use]
    pub const fn new(path: &'static str, ident: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self {
            path,
            ident,
            table: None,
            fields,
            props: &[],
        }
    }

    #[must_use]
    pub const fn table(mut self, name: &'static str) -> Self {
        self.table = Some(name);
        self
    }

    #[must_use]
    pub const fn props(mut self, props: &'static [(&'static str, &'static str)]) -> Self {
        self.props = props;
        self
    }
}

///
/// FieldSpec
///
/// Const per-field declaration. Attributes are `Option` so the derivation
/// pipeline can distinguish "explicitly set" from "defer to an inner
/// layer"; an unset attribute never overrides a convention default.
///

pub struct FieldSpec {
    pub name: &'static str,
    /// Explicit physical column name; `None` defers to the convention layer.
    pub column: Option<&'static str>,
    pub id: bool,
    /// Not a persisted field; excluded from metadata entirely.
    pub ignored: bool,
    pub selectable: Option<bool>,
    pub insertable: Option<bool>,
    pub updatable: Option<bool>,
    pub order_by: Option<OrderDirection>,
    pub delete_flag: Option<DeleteFlagSpec>,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            id: false,
            ignored: false,
            selectable: None,
            insertable: None,
            updatable: None,
            order_by: None,
            delete_flag: None,
        }
    }

    #[must_use]
    pub const fn id(mut self) -> Self {
        self.id = true;
        self
    }

    #[must_use]
    pub const fn column(mut self, name: &'static str) -> Self {
        self.column = Some(name);
        self
    }

    #[must_use]
    pub const fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    #[must_use]
    pub const fn selectable(mut self, flag: bool) -> Self {
        self.selectable = Some(flag);
        self
    }

    #[must_use]
    pub const fn insertable(mut self, flag: bool) -> Self {
        self.insertable = Some(flag);
        self
    }

    #[must_use]
    pub const fn updatable(mut self, flag: bool) -> Self {
        self.updatable = Some(flag);
        self
    }

    #[must_use]
    pub const fn order_by(mut self, direction: OrderDirection) -> Self {
        self.order_by = Some(direction);
        self
    }

    #[must_use]
    pub const fn delete_flag(mut self, spec: DeleteFlagSpec) -> Self {
        self.delete_flag = Some(spec);
        self
    }
}

///
/// DeleteFlagSpec
///
/// Field-level soft-delete marker: the sentinel written on delete, either
/// a fixed literal or the current timestamp.
///

pub enum DeleteFlagSpec {
    Literal(SpecValue),
    CurrentTimestamp,
}

///
/// SpecValue
///
/// Const-constructible scalar for descriptor attributes. Lossless
/// projection into [`Value`] at metadata-build time.
///

pub enum SpecValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Text(&'static str),
}

impl SpecValue {
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::Int(*n),
            Self::Uint(n) => Value::Uint(*n),
            Self::Text(s) => Value::Text((*s).to_string()),
        }
    }
}
