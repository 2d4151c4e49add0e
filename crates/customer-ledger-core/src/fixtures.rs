use time::{Date, Month, OffsetDateTime};

use crate::{ContactId, Customer, CustomerId, Flag, InternalContact, Partner, PartnerId, Product, ProductId};

pub(crate) fn at(year: i32, month: u8, day: u8) -> OffsetDateTime {
    let month = match Month::try_from(month) {
        Ok(month) => month,
        Err(err) => panic!("invalid fixture month {month}: {err}"),
    };
    match Date::from_calendar_date(year, month, day) {
        Ok(date) => date.midnight().assume_utc(),
        Err(err) => panic!("invalid fixture date {year}-{month}-{day}: {err}"),
    }
}

pub(crate) fn product(id: &str, name: &str) -> Product {
    Product { id: ProductId::from(id), name: name.to_string() }
}

pub(crate) fn partner(id: &str, name: &str) -> Partner {
    Partner { id: PartnerId::from(id), name: name.to_string() }
}

pub(crate) fn contact(id: &str, name: &str) -> InternalContact {
    InternalContact { id: ContactId::from(id), name: name.to_string() }
}

pub(crate) fn customer(id: &str, name: &str) -> Customer {
    Customer {
        id: CustomerId::from(id),
        name: name.to_string(),
        website: None,
        products: Vec::new(),
        partners: Vec::new(),
        internal_contacts: Vec::new(),
        account_executive: None,
        key_account: Flag::Unknown,
        created_at: at(2023, 1, 1),
        updated_at: at(2023, 1, 1),
    }
}

pub(crate) fn ids(customers: &[&Customer]) -> Vec<String> {
    customers.iter().map(|customer| customer.id.as_str().to_string()).collect()
}

pub(crate) fn seeded_permutation(customers: &[Customer], seed: u64) -> Vec<Customer> {
    fn splitmix64(mut value: u64) -> u64 {
        value = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
        value = (value ^ (value >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        value = (value ^ (value >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        value ^ (value >> 31)
    }

    let mut keyed = customers
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, customer)| {
            let index_u64 = u64::try_from(index).unwrap_or(u64::MAX);
            (splitmix64(seed ^ index_u64), customer)
        })
        .collect::<Vec<_>>();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, customer)| customer).collect()
}

/// Five accounts covering every relation shape the engine branches on.
pub(crate) fn sample_book() -> Vec<Customer> {
    let mut barclays = customer("cus_barclays", "Barclays");
    barclays.website = Some("https://www.barclays.co.uk".to_string());
    barclays.products = vec![product("prd_cards", "Card Issuing"), product("prd_fx", "FX Hedging")];
    barclays.partners = vec![partner("ptn_accenture", "Accenture")];
    barclays.internal_contacts = vec![contact("ct_sam", "Sam Okafor")];
    barclays.account_executive = Some(contact("ae_dana", "Dana Reyes"));
    barclays.created_at = at(2022, 3, 14);
    barclays.updated_at = at(2023, 9, 2);

    let mut monzo = customer("cus_monzo", "Monzo");
    monzo.products = vec![product("prd_cards", "Card Issuing")];
    monzo.account_executive = Some(contact("ae_lee", "Lee Marsh"));
    monzo.created_at = at(2023, 2, 1);
    monzo.updated_at = at(2024, 1, 20);

    let mut allica = customer("cus_allica", "allica bank");
    allica.website = Some("allica.bank".to_string());
    allica.partners = vec![partner("ptn_deloitte", "Deloitte")];
    allica.created_at = at(2021, 7, 7);
    allica.updated_at = at(2021, 12, 31);

    let mut zopa = customer("cus_zopa", "Zopa");
    zopa.products = vec![
        product("prd_ledger", "Core Ledger"),
        product("prd_fx", "FX Hedging"),
        product("prd_cards", "Card Issuing"),
    ];
    zopa.partners = vec![partner("ptn_accenture", "Accenture"), partner("ptn_deloitte", "Deloitte")];
    zopa.account_executive = Some(contact("ae_dana", "Dana Reyes"));
    zopa.created_at = at(2024, 4, 5);
    zopa.updated_at = at(2024, 6, 30);

    let mut starling = customer("cus_starling", "Starling");
    starling.internal_contacts = vec![contact("ct_ivy", "Ivy Chen")];
    starling.created_at = at(2023, 11, 11);
    starling.updated_at = at(2023, 11, 12);

    vec![barclays, monzo, allica, zopa, starling]
}
