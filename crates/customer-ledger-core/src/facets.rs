use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::collate::sort_by_display_name;
use crate::{Customer, InternalContact, Partner, Product, Relation};

/// Selectable filter values present in one customer collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FacetOptions {
    /// Newest first.
    pub years: Vec<i32>,
    pub products: Vec<Product>,
    pub partners: Vec<Partner>,
    pub account_executives: Vec<InternalContact>,
}

impl FacetOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
            && self.products.is_empty()
            && self.partners.is_empty()
            && self.account_executives.is_empty()
    }
}

/// Derive the facet options of a collection in a single scan.
///
/// Years are the union of the `created_at` and `updated_at` calendar years. Relations
/// are deduplicated by id, the last one seen for an id wins, and ordered by display
/// name. Only account executives feed the executive facet, not other contacts.
#[must_use]
pub fn extract_facets<'a, I>(customers: I) -> FacetOptions
where
    I: IntoIterator<Item = &'a Customer>,
{
    let mut years = BTreeSet::new();
    let mut products = BTreeMap::new();
    let mut partners = BTreeMap::new();
    let mut account_executives = BTreeMap::new();
    let mut scanned = 0_usize;

    for customer in customers {
        scanned += 1;
        years.insert(customer.created_at.year());
        years.insert(customer.updated_at.year());
        collect_by_id(&mut products, &customer.products);
        collect_by_id(&mut partners, &customer.partners);
        if let Some(executive) = &customer.account_executive {
            account_executives.insert(executive.id.clone(), executive.clone());
        }
    }

    let facets = FacetOptions {
        years: years.into_iter().rev().collect(),
        products: sort_by_display_name(products.into_values().collect(), |product| {
            product.name.as_str()
        }),
        partners: sort_by_display_name(partners.into_values().collect(), |partner| {
            partner.name.as_str()
        }),
        account_executives: sort_by_display_name(
            account_executives.into_values().collect(),
            |executive| executive.name.as_str(),
        ),
    };

    tracing::debug!(
        customers = scanned,
        years = facets.years.len(),
        products = facets.products.len(),
        partners = facets.partners.len(),
        account_executives = facets.account_executives.len(),
        "extracted facet options"
    );

    facets
}

fn collect_by_id<R>(into: &mut BTreeMap<R::Id, R>, relations: &[R])
where
    R: Relation + Clone,
{
    for relation in relations {
        into.insert(relation.id().clone(), relation.clone());
    }
}
