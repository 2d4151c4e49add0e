use crate::{Customer, Relation};

/// Case-insensitive substring match of `query` against the searchable fields of one
/// customer: name, website, product names, internal contact names, the account
/// executive's name and partner names. The empty query matches everyone.
#[must_use]
pub fn customer_matches_search(customer: &Customer, query: &str) -> bool {
    query.is_empty() || matches_needle(customer, &query.to_lowercase())
}

/// Keep the candidates matching `query`, in input order.
#[must_use]
pub fn search_customers<'a, I>(query: &str, candidates: I) -> Vec<&'a Customer>
where
    I: IntoIterator<Item = &'a Customer>,
{
    let candidates = candidates.into_iter();
    if query.is_empty() {
        return candidates.collect();
    }

    let needle = query.to_lowercase();
    let matched =
        candidates.filter(|customer| matches_needle(customer, &needle)).collect::<Vec<_>>();
    tracing::debug!(query, matched = matched.len(), "applied search");
    matched
}

fn matches_needle(customer: &Customer, needle: &str) -> bool {
    contains_folded(&customer.name, needle)
        || customer.website.as_deref().is_some_and(|website| contains_folded(website, needle))
        || any_name_matches(&customer.products, needle)
        || any_name_matches(&customer.internal_contacts, needle)
        || customer
            .account_executive
            .as_ref()
            .is_some_and(|executive| contains_folded(&executive.name, needle))
        || any_name_matches(&customer.partners, needle)
}

fn any_name_matches<R: Relation>(relations: &[R], needle: &str) -> bool {
    relations.iter().any(|relation| contains_folded(relation.name(), needle))
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
