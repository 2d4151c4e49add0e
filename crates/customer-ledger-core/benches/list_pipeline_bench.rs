use criterion::{criterion_group, criterion_main, Criterion};
use customer_ledger_core::{
    extract_facets, ContactId, Customer, CustomerId, CustomerListView, DateFilterMode, FilterState,
    Flag, InternalContact, ListQuery, Partner, PartnerId, Product, ProductId, SortKey,
};
use time::{Duration, OffsetDateTime};

fn mk_customer(index: usize) -> Customer {
    let created_at = OffsetDateTime::UNIX_EPOCH
        + Duration::days(19_000 + i64::try_from(index % 1_500).unwrap_or(0));
    let products = (0..index % 5)
        .map(|offset| Product {
            id: ProductId(format!("prd_{}", (index + offset) % 40)),
            name: format!("Product {}", (index + offset) % 40),
        })
        .collect();
    let partners = (0..index % 3)
        .map(|offset| Partner {
            id: PartnerId(format!("ptn_{}", (index + offset) % 12)),
            name: format!("Partner {}", (index + offset) % 12),
        })
        .collect();
    let account_executive = (index % 4 != 0).then(|| InternalContact {
        id: ContactId(format!("ae_{}", index % 9)),
        name: format!("Executive {}", index % 9),
    });

    Customer {
        id: CustomerId(format!("cus_{index}")),
        name: format!("Account {index:05}"),
        website: (index % 2 == 0).then(|| format!("https://account-{index}.example")),
        products,
        partners,
        internal_contacts: vec![InternalContact {
            id: ContactId(format!("ct_{}", index % 25)),
            name: format!("Contact {}", index % 25),
        }],
        account_executive,
        key_account: Flag::Unknown,
        created_at,
        updated_at: created_at + Duration::days(30),
    }
}

fn bench_facets(c: &mut Criterion) {
    let customers = (0..2_000).map(mk_customer).collect::<Vec<_>>();

    c.bench_function("extract_facets_2000_customers", |b| {
        b.iter(|| extract_facets(&customers));
    });
}

fn bench_list_query(c: &mut Criterion) {
    let view = CustomerListView::new((0..2_000).map(mk_customer).collect());
    let query = ListQuery {
        filters: FilterState::default()
            .toggle_product("prd_3")
            .toggle_product("prd_7")
            .toggle_account_executive("ae_2")
            .with_date_filter(DateFilterMode::Created)
            .with_start_date("2022-01-01")
            .with_end_date("2024-12-31"),
        search: "account 0".to_string(),
        sort: SortKey::Updated,
    };

    c.bench_function("list_query_2000_customers", |b| {
        b.iter(|| {
            let page = view.query(&query);
            assert!(page.matched <= page.total, "list query matched more customers than it was given");
        });
    });
}

criterion_group!(list_pipeline_benches, bench_facets, bench_list_query);
criterion_main!(list_pipeline_benches);
