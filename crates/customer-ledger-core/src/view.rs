use serde::{Deserialize, Serialize};

use crate::{extract_facets, search_customers, sort_customers, Customer, FacetOptions, FilterState, SortKey};

/// Everything the list view asks of the engine on one interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub filters: FilterState,
    pub search: String,
    pub sort: SortKey,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<'a> {
    pub total: usize,
    pub matched: usize,
    pub active_filters_count: usize,
    pub customers: Vec<&'a Customer>,
}

/// One loaded customer collection together with its facet options.
///
/// Facets are recomputed wholesale whenever the collection is replaced.
#[derive(Debug, Clone, Default)]
pub struct CustomerListView {
    customers: Vec<Customer>,
    facets: FacetOptions,
}

impl CustomerListView {
    #[must_use]
    pub fn new(customers: Vec<Customer>) -> Self {
        let facets = extract_facets(&customers);
        Self { customers, facets }
    }

    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    #[must_use]
    pub fn facets(&self) -> &FacetOptions {
        &self.facets
    }

    /// Swap in a refreshed collection, returning the previous one.
    pub fn replace_customers(&mut self, customers: Vec<Customer>) -> Vec<Customer> {
        self.facets = extract_facets(&customers);
        std::mem::replace(&mut self.customers, customers)
    }

    /// Filter, then search, then sort the full collection.
    #[must_use]
    pub fn query(&self, query: &ListQuery) -> ListPage<'_> {
        let filtered = query.filters.apply_filters(&self.customers);
        let searched = search_customers(&query.search, filtered);
        let customers = sort_customers(query.sort, searched);

        tracing::debug!(
            total = self.customers.len(),
            matched = customers.len(),
            sort = query.sort.as_str(),
            "ran list query"
        );

        ListPage {
            total: self.customers.len(),
            matched: customers.len(),
            active_filters_count: query.filters.active_filters_count(),
            customers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, customer, ids, product, sample_book};
    use crate::DateFilterMode;

    #[test]
    fn default_query_returns_everyone_sorted_by_name() {
        let view = CustomerListView::new(sample_book());

        let page = view.query(&ListQuery::default());

        assert_eq!(page.total, 5);
        assert_eq!(page.matched, 5);
        assert_eq!(page.active_filters_count, 0);
        assert_eq!(
            ids(&page.customers),
            vec!["cus_allica", "cus_barclays", "cus_monzo", "cus_starling", "cus_zopa"]
        );
    }

    #[test]
    fn query_composes_filters_search_and_sort() {
        let view = CustomerListView::new(sample_book());
        let query = ListQuery {
            filters: FilterState::default().toggle_product("prd_cards"),
            search: "dana".to_string(),
            sort: SortKey::Created,
        };

        let page = view.query(&query);

        assert_eq!(ids(&page.customers), vec!["cus_zopa", "cus_barclays"]);
        assert_eq!(page.active_filters_count, 1);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn date_mode_all_keeps_everyone_but_counts_the_range() {
        let view = CustomerListView::new(sample_book());
        let query = ListQuery {
            filters: FilterState::default()
                .with_date_filter(DateFilterMode::All)
                .with_start_date("2020-01-01")
                .with_end_date("2020-12-31"),
            ..ListQuery::default()
        };

        let page = view.query(&query);

        assert_eq!(page.matched, 5);
        assert_eq!(page.active_filters_count, 1);
    }

    #[test]
    fn replacing_customers_recomputes_facets() {
        let mut view = CustomerListView::new(sample_book());
        assert_eq!(view.facets().years, vec![2024, 2023, 2022, 2021]);

        let mut fresh = customer("cus_new", "Newco");
        fresh.created_at = at(2025, 1, 1);
        fresh.updated_at = at(2025, 2, 1);
        fresh.products = vec![product("prd_new", "Treasury")];
        let previous = view.replace_customers(vec![fresh]);

        assert_eq!(previous.len(), 5);
        assert_eq!(view.facets().years, vec![2025]);
        assert_eq!(view.facets().products, vec![product("prd_new", "Treasury")]);
        assert!(view.facets().partners.is_empty());
        assert_eq!(view.customers().len(), 1);
    }

    #[test]
    fn list_query_accepts_partial_json() {
        let query: ListQuery = match serde_json::from_str(r#"{ "search": "monzo", "sort": "updated" }"#) {
            Ok(query) => query,
            Err(err) => panic!("list query should deserialize: {err}"),
        };

        assert_eq!(query.sort, SortKey::Updated);
        assert_eq!(query.filters, FilterState::default());
    }

    #[test]
    fn page_serializes_borrowed_customers() {
        let view = CustomerListView::new(sample_book());
        let page = view.query(&ListQuery { search: "zopa".to_string(), ..ListQuery::default() });

        let value = match serde_json::to_value(&page) {
            Ok(value) => value,
            Err(err) => panic!("page should serialize: {err}"),
        };

        assert_eq!(value.get("matched").and_then(serde_json::Value::as_u64), Some(1));
        assert_eq!(value.get("activeFiltersCount").and_then(serde_json::Value::as_u64), Some(0));
    }
}
