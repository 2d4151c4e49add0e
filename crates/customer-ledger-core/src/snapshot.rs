use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Customer, CustomerId, CustomerNote, CustomerProfile, LedgerError};

/// A full export from the persistence gateway: customers plus their notes and profiles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub notes: Vec<CustomerNote>,
    #[serde(default)]
    pub profiles: Vec<CustomerProfile>,
}

impl LedgerSnapshot {
    /// Decode and validate an export. A bare JSON array is read as the customer list.
    ///
    /// # Errors
    /// Returns [`LedgerError::Malformed`] when the document does not have the export
    /// shape (including a `null` customer collection), or [`LedgerError::Validation`]
    /// when a record violates the snapshot invariants.
    pub fn from_json_str(raw: &str) -> Result<Self, LedgerError> {
        let document: Value = serde_json::from_str(raw)
            .map_err(|err| LedgerError::Malformed(format!("snapshot is not JSON: {err}")))?;

        let snapshot = match document {
            Value::Array(_) => {
                let customers = serde_json::from_value::<Vec<Customer>>(document).map_err(|err| {
                    LedgerError::Malformed(format!("customer list has an invalid shape: {err}"))
                })?;
                Self { customers, ..Self::default() }
            }
            Value::Object(_) => serde_json::from_value::<Self>(document).map_err(|err| {
                LedgerError::Malformed(format!("snapshot has an invalid shape: {err}"))
            })?,
            other => {
                return Err(LedgerError::Malformed(format!(
                    "snapshot MUST be an object or an array, got {}",
                    json_kind(&other)
                )))
            }
        };

        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check cross-record invariants of the export.
    ///
    /// # Errors
    /// Returns [`LedgerError::Validation`] for the first violated invariant: an invalid
    /// customer, a duplicate customer id, a note or profile for an unknown customer, an
    /// empty note body, or a second profile for the same customer.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let mut customer_ids = BTreeSet::new();
        for customer in &self.customers {
            customer.validate()?;
            if !customer_ids.insert(&customer.id) {
                return Err(LedgerError::Validation(format!(
                    "customer id {} MUST be unique",
                    customer.id
                )));
            }
        }

        for note in &self.notes {
            if !customer_ids.contains(&note.customer_id) {
                return Err(LedgerError::Validation(format!(
                    "note {} references unknown customer {}",
                    note.id, note.customer_id
                )));
            }
            if note.body.trim().is_empty() {
                return Err(LedgerError::Validation(format!("note {} MUST have a body", note.id)));
            }
        }

        let mut profiled = BTreeSet::new();
        for profile in &self.profiles {
            if !customer_ids.contains(&profile.customer_id) {
                return Err(LedgerError::Validation(format!(
                    "profile {} references unknown customer {}",
                    profile.id, profile.customer_id
                )));
            }
            if !profiled.insert(&profile.customer_id) {
                return Err(LedgerError::Validation(format!(
                    "customer {} MUST have at most one profile",
                    profile.customer_id
                )));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn customer(&self, customer_id: &CustomerId) -> Option<&Customer> {
        self.customers.iter().find(|customer| &customer.id == customer_id)
    }

    /// Notes of one customer, most recently updated first.
    #[must_use]
    pub fn notes_for(&self, customer_id: &CustomerId) -> Vec<&CustomerNote> {
        let mut notes = self
            .notes
            .iter()
            .filter(|note| &note.customer_id == customer_id)
            .collect::<Vec<_>>();
        notes.sort_by(|lhs, rhs| rhs.updated_at.cmp(&lhs.updated_at));
        notes
    }

    #[must_use]
    pub fn profile_for(&self, customer_id: &CustomerId) -> Option<&CustomerProfile> {
        self.profiles.iter().find(|profile| &profile.customer_id == customer_id)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
