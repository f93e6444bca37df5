//! Shared test entities. Descriptors are hand-written consts in the same
//! shape a code generator would emit.

use crate::{
    model::{DeleteFlagSpec, FieldSpec, SpecValue, TableSpec},
    traits::{FieldValues, Record},
    value::{FieldValue, Value},
};

///
/// Customer
///
/// Plain entity: conventional id key, one column-name override, one
/// non-persisted field.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct Customer {
    pub id: u64,
    pub name: String,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub created_at: Option<i64>,
    /// Not persisted; present to prove ignored fields never leak into SQL.
    #[allow(dead_code)]
    pub scratch: Option<String>,
}

const CUSTOMER_FIELDS: [FieldSpec; 6] = [
    FieldSpec::new("id"),
    FieldSpec::new("name"),
    FieldSpec::new("age"),
    FieldSpec::new("email").column("email_addr"),
    FieldSpec::new("created_at").updatable(false),
    FieldSpec::new("scratch").ignored(),
];

const CUSTOMER_SPEC: TableSpec =
    TableSpec::new("fixtures::Customer", "Customer", &CUSTOMER_FIELDS);

impl FieldValues for Customer {
    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.to_value()),
            "age" => Some(self.age.to_value()),
            "email" => Some(self.email.to_value()),
            "created_at" => Some(self.created_at.to_value()),
            _ => None,
        }
    }
}

impl Record for Customer {
    const SPEC: &'static TableSpec = &CUSTOMER_SPEC;
}

///
/// SoftOrder
///
/// Soft-deleted entity with a literal sentinel: status 0 means deleted.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct SoftOrder {
    pub id: u64,
    pub name: String,
    pub status: i64,
}

const SOFT_ORDER_FIELDS: [FieldSpec; 3] = [
    FieldSpec::new("id"),
    FieldSpec::new("name"),
    FieldSpec::new("status").delete_flag(DeleteFlagSpec::Literal(SpecValue::Int(0))),
];

const SOFT_ORDER_SPEC: TableSpec =
    TableSpec::new("fixtures::SoftOrder", "SoftOrder", &SOFT_ORDER_FIELDS)
        .props(&[("soft_delete", "true")]);

impl FieldValues for SoftOrder {
    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.to_value()),
            "status" => Some(self.status.to_value()),
            _ => None,
        }
    }
}

impl Record for SoftOrder {
    const SPEC: &'static TableSpec = &SOFT_ORDER_SPEC;
}

///
/// StampedNote
///
/// Soft-deleted entity in timestamp mode: a null deleted_at means live.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct StampedNote {
    pub id: u64,
    pub title: String,
    pub deleted_at: Option<i64>,
}

const STAMPED_NOTE_FIELDS: [FieldSpec; 3] = [
    FieldSpec::new("id"),
    FieldSpec::new("title"),
    FieldSpec::new("deleted_at").delete_flag(DeleteFlagSpec::CurrentTimestamp),
];

const STAMPED_NOTE_SPEC: TableSpec =
    TableSpec::new("fixtures::StampedNote", "StampedNote", &STAMPED_NOTE_FIELDS);

impl FieldValues for StampedNote {
    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "title" => Some(self.title.to_value()),
            "deleted_at" => Some(self.deleted_at.to_value()),
            _ => None,
        }
    }
}

impl Record for StampedNote {
    const SPEC: &'static TableSpec = &STAMPED_NOTE_SPEC;
}

///
/// EventLog
///
/// Id-less entity: legal to build, key-addressed operations must fail at
/// call time.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct EventLog {
    pub seq: u64,
    pub message: String,
}

const EVENT_LOG_FIELDS: [FieldSpec; 2] = [FieldSpec::new("seq"), FieldSpec::new("message")];

const EVENT_LOG_SPEC: TableSpec =
    TableSpec::new("fixtures::EventLog", "EventLog", &EVENT_LOG_FIELDS);

impl FieldValues for EventLog {
    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "seq" => Some(self.seq.to_value()),
            "message" => Some(self.message.to_value()),
            _ => None,
        }
    }
}

impl Record for EventLog {
    const SPEC: &'static TableSpec = &EVENT_LOG_SPEC;
}

///
/// GuardedAccount
///
/// Opts out of empty-criteria bulk mutations.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct GuardedAccount {
    pub id: u64,
    pub balance: i64,
}

const GUARDED_ACCOUNT_FIELDS: [FieldSpec; 2] =
    [FieldSpec::new("id"), FieldSpec::new("balance")];

const GUARDED_ACCOUNT_SPEC: TableSpec = TableSpec::new(
    "fixtures::GuardedAccount",
    "GuardedAccount",
    &GUARDED_ACCOUNT_FIELDS,
)
.props(&[("allow_empty_criteria", "false")]);

impl FieldValues for GuardedAccount {
    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "balance" => Some(self.balance.to_value()),
            _ => None,
        }
    }
}

impl Record for GuardedAccount {
    const SPEC: &'static TableSpec = &GUARDED_ACCOUNT_SPEC;
}

///
/// GuardedLedger
///
/// Entity whose every non-id field is optional, with empty-criteria bulk
/// mutations disallowed.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct GuardedLedger {
    pub id: u64,
    pub note: Option<String>,
}

const GUARDED_LEDGER_FIELDS: [FieldSpec; 2] = [FieldSpec::new("id"), FieldSpec::new("note")];

const GUARDED_LEDGER_SPEC: TableSpec = TableSpec::new(
    "fixtures::GuardedLedger",
    "GuardedLedger",
    &GUARDED_LEDGER_FIELDS,
)
.props(&[("allow_empty_criteria", "false")]);

impl FieldValues for GuardedLedger {
    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "note" => Some(self.note.to_value()),
            _ => None,
        }
    }
}

impl Record for GuardedLedger {
    const SPEC: &'static TableSpec = &GUARDED_LEDGER_SPEC;
}

///
/// RegionSale
///
/// Aggregating view: metadata contributes fixed GROUP BY and HAVING
/// clauses to its select templates.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct RegionSale {
    pub region: String,
    pub total: i64,
}

const REGION_SALE_FIELDS: [FieldSpec; 2] = [FieldSpec::new("region"), FieldSpec::new("total")];

const REGION_SALE_SPEC: TableSpec =
    TableSpec::new("fixtures::RegionSale", "RegionSale", &REGION_SALE_FIELDS)
        .props(&[("group_by", "region"), ("having", "SUM(total) > 0")]);

impl FieldValues for RegionSale {
    fn value(&self, field: &str) -> Option<Value> {
        match field {
            "region" => Some(self.region.to_value()),
            "total" => Some(self.total.to_value()),
            _ => None,
        }
    }
}

impl Record for RegionSale {
    const SPEC: &'static TableSpec = &REGION_SALE_SPEC;
}
