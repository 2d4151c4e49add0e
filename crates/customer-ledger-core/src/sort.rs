use serde::{Deserialize, Serialize};

use crate::collate::sort_by_display_name;
use crate::Customer;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Created,
    Updated,
    Products,
}

impl SortKey {
    pub const ALL: [Self; 4] = [Self::Name, Self::Created, Self::Updated, Self::Products];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Products => "products",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "products" => Some(Self::Products),
            _ => None,
        }
    }
}

/// Order `candidates` by `key` into a new sequence.
///
/// `name` ascends in locale order; `created`, `updated` and `products` descend (newest
/// or largest first). The sort is stable, so ties keep their input order.
#[must_use]
pub fn sort_customers<'a, I>(key: SortKey, candidates: I) -> Vec<&'a Customer>
where
    I: IntoIterator<Item = &'a Customer>,
{
    let mut ordered: Vec<&'a Customer> = candidates.into_iter().collect();
    match key {
        SortKey::Name => return sort_by_display_name(ordered, |customer| customer.name.as_str()),
        SortKey::Created => ordered.sort_by(|lhs, rhs| rhs.created_at.cmp(&lhs.created_at)),
        SortKey::Updated => ordered.sort_by(|lhs, rhs| rhs.updated_at.cmp(&lhs.updated_at)),
        SortKey::Products => {
            ordered.sort_by(|lhs, rhs| rhs.products.len().cmp(&lhs.products.len()));
        }
    }
    ordered
}
