//! In-memory query engine behind the customer list view.
//!
//! The engine is a set of pure passes over a caller-owned customer collection:
//! [`extract_facets`] derives the selectable filter values, [`FilterState::apply_filters`]
//! narrows by year, date range and the multi-select facets, [`search_customers`] applies
//! the free-text query and [`sort_customers`] orders the survivors. None of them mutate
//! their input; every pass returns a new sequence of borrowed customers.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

mod collate;
mod facets;
mod filter;
mod search;
mod snapshot;
mod sort;
mod view;

#[cfg(test)]
mod fixtures;

pub use collate::{compare_display_names, CollationKey};
pub use facets::{extract_facets, FacetOptions};
pub use filter::{DateFilterMode, FilterStage, FilterState, YearFilter};
pub use search::{customer_matches_search, search_customers};
pub use snapshot::LedgerSnapshot;
pub use sort::{sort_customers, SortKey};
pub use view::{CustomerListView, ListPage, ListQuery};

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum LedgerError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("malformed input: {0}")]
    Malformed(String),
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Document id of a customer account.
    CustomerId
);
string_id!(ProductId);
string_id!(PartnerId);
string_id!(
    /// Id of an internal contact, including account executives.
    ContactId
);
string_id!(NoteId);
string_id!(ProfileId);

/// Tri-state flag for the loosely typed yes/no fields of the document store.
///
/// Deserializes from booleans, `null`, or any case of `yes`, `no`, `y`, `n`, `true`,
/// `false`. Anything else is [`Flag::Unknown`].
#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Flag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Self::Yes,
            "no" | "n" | "false" => Self::No,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Yes => Some(true),
            Self::No => Some(false),
            Self::Unknown => None,
        }
    }
}

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawFlag {
            Bool(bool),
            Text(String),
        }

        Ok(match Option::<RawFlag>::deserialize(deserializer)? {
            None => Self::Unknown,
            Some(RawFlag::Bool(true)) => Self::Yes,
            Some(RawFlag::Bool(false)) => Self::No,
            Some(RawFlag::Text(text)) => Self::parse(&text),
        })
    }
}

/// Nested records that act as filter facets and search targets.
pub trait Relation {
    type Id: Ord + Clone;

    fn id(&self) -> &Self::Id;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct InternalContact {
    pub id: ContactId,
    pub name: String,
}

impl Relation for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Relation for Partner {
    type Id = PartnerId;

    fn id(&self) -> &PartnerId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Relation for InternalContact {
    type Id = ContactId;

    fn id(&self) -> &ContactId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub partners: Vec<Partner>,
    #[serde(default)]
    pub internal_contacts: Vec<InternalContact>,
    #[serde(default)]
    pub account_executive: Option<InternalContact>,
    #[serde(default)]
    pub key_account: Flag,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Customer {
    /// Check one customer record handed over by the persistence gateway.
    ///
    /// # Errors
    /// Returns [`LedgerError::Validation`] when the id or name is blank, a nested relation
    /// has a blank id, or `updated_at` precedes `created_at`.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.id.is_blank() {
            return Err(LedgerError::Validation("customer id MUST be non-empty".to_string()));
        }

        if self.name.trim().is_empty() {
            return Err(LedgerError::Validation(format!(
                "customer {} MUST have a display name",
                self.id
            )));
        }

        let blank_relation = self.products.iter().any(|product| product.id.is_blank())
            || self.partners.iter().any(|partner| partner.id.is_blank())
            || self.internal_contacts.iter().any(|contact| contact.id.is_blank())
            || self.account_executive.as_ref().is_some_and(|executive| executive.id.is_blank());
        if blank_relation {
            return Err(LedgerError::Validation(format!(
                "customer {} has a relation with an empty id",
                self.id
            )));
        }

        if self.updated_at < self.created_at {
            return Err(LedgerError::Validation(format!(
                "customer {} updatedAt MUST NOT precede createdAt",
                self.id
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNote {
    pub id: NoteId,
    pub customer_id: CustomerId,
    pub author: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: ProfileId,
    pub customer_id: CustomerId,
    pub summary: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
