use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime};

use crate::{ContactId, Customer, PartnerId, ProductId, Relation};

/// Selected year: `"all"` or a year string compared against timestamp years.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum YearFilter {
    #[default]
    All,
    Only(String),
}

impl YearFilter {
    pub const ALL: &'static str = "all";

    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == Self::ALL {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL,
            Self::Only(year) => year,
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    fn admits_year(&self, year: i32) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => year.to_string() == *selected,
        }
    }
}

impl Serialize for YearFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for YearFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Which timestamp the date-range filter compares.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateFilterMode {
    /// No timestamp is chosen, so a set range lets every customer through.
    #[default]
    All,
    Created,
    Updated,
}

impl DateFilterMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            _ => None,
        }
    }

    fn timestamp(self, customer: &Customer) -> Option<OffsetDateTime> {
        match self {
            Self::All => None,
            Self::Created => Some(customer.created_at),
            Self::Updated => Some(customer.updated_at),
        }
    }
}

/// One category of the filter pipeline, in evaluation order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FilterStage {
    Year,
    DateRange,
    Products,
    Partners,
    AccountExecutive,
}

impl FilterStage {
    pub const PIPELINE: [Self; 5] =
        [Self::Year, Self::DateRange, Self::Products, Self::Partners, Self::AccountExecutive];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::DateRange => "date_range",
            Self::Products => "products",
            Self::Partners => "partners",
            Self::AccountExecutive => "account_executive",
        }
    }
}

/// Filter selections of the customer list view.
///
/// A value object: every toggle and setter returns a new state and leaves the receiver
/// untouched, so callers replace the state they hold rather than mutate it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    year: YearFilter,
    products: BTreeSet<ProductId>,
    partners: BTreeSet<PartnerId>,
    account_executives: BTreeSet<ContactId>,
    date_filter: DateFilterMode,
    start_date: String,
    end_date: String,
}

impl FilterState {
    #[must_use]
    pub fn year(&self) -> &YearFilter {
        &self.year
    }

    #[must_use]
    pub fn products(&self) -> &BTreeSet<ProductId> {
        &self.products
    }

    #[must_use]
    pub fn partners(&self) -> &BTreeSet<PartnerId> {
        &self.partners
    }

    #[must_use]
    pub fn account_executives(&self) -> &BTreeSet<ContactId> {
        &self.account_executives
    }

    #[must_use]
    pub fn date_filter(&self) -> DateFilterMode {
        self.date_filter
    }

    #[must_use]
    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> &str {
        &self.end_date
    }

    #[must_use]
    pub fn toggle_product(&self, id: impl Into<ProductId>) -> Self {
        let mut next = self.clone();
        toggle(&mut next.products, id.into());
        next
    }

    #[must_use]
    pub fn toggle_partner(&self, id: impl Into<PartnerId>) -> Self {
        let mut next = self.clone();
        toggle(&mut next.partners, id.into());
        next
    }

    #[must_use]
    pub fn toggle_account_executive(&self, id: impl Into<ContactId>) -> Self {
        let mut next = self.clone();
        toggle(&mut next.account_executives, id.into());
        next
    }

    #[must_use]
    pub fn with_year(&self, year: &str) -> Self {
        Self { year: YearFilter::parse(year), ..self.clone() }
    }

    #[must_use]
    pub fn with_date_filter(&self, mode: DateFilterMode) -> Self {
        Self { date_filter: mode, ..self.clone() }
    }

    /// Dates are kept verbatim; an unparseable bound makes the range match nothing.
    #[must_use]
    pub fn with_start_date(&self, start_date: &str) -> Self {
        Self { start_date: start_date.to_string(), ..self.clone() }
    }

    #[must_use]
    pub fn with_end_date(&self, end_date: &str) -> Self {
        Self { end_date: end_date.to_string(), ..self.clone() }
    }

    /// The state with every field back at its default.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn clear_all_filters(&self) -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_date_range(&self) -> bool {
        !self.start_date.is_empty() && !self.end_date.is_empty()
    }

    /// Badge count for the filter toolbar. The date mode on its own is not counted.
    #[must_use]
    pub fn active_filters_count(&self) -> usize {
        usize::from(!self.year.is_all())
            + self.products.len()
            + self.partners.len()
            + self.account_executives.len()
            + usize::from(self.has_date_range())
    }

    #[must_use]
    pub fn is_stage_active(&self, stage: FilterStage) -> bool {
        match stage {
            FilterStage::Year => !self.year.is_all(),
            FilterStage::DateRange => self.has_date_range(),
            FilterStage::Products => !self.products.is_empty(),
            FilterStage::Partners => !self.partners.is_empty(),
            FilterStage::AccountExecutive => !self.account_executives.is_empty(),
        }
    }

    /// Whether `customer` survives one stage. Inactive stages admit everyone.
    #[must_use]
    pub fn admits(&self, stage: FilterStage, customer: &Customer) -> bool {
        if !self.is_stage_active(stage) {
            return true;
        }

        match stage {
            FilterStage::Year => {
                self.year.admits_year(customer.created_at.year())
                    || self.year.admits_year(customer.updated_at.year())
            }
            FilterStage::DateRange => self.date_window().admits(customer),
            FilterStage::Products => any_selected(&customer.products, &self.products),
            FilterStage::Partners => any_selected(&customer.partners, &self.partners),
            FilterStage::AccountExecutive => customer
                .account_executive
                .as_ref()
                .is_some_and(|executive| self.account_executives.contains(&executive.id)),
        }
    }

    /// Run a single stage over `candidates`, preserving their order.
    #[must_use]
    pub fn apply_stage<'a, I>(&self, stage: FilterStage, candidates: I) -> Vec<&'a Customer>
    where
        I: IntoIterator<Item = &'a Customer>,
    {
        let candidates = candidates.into_iter();
        if stage == FilterStage::DateRange && self.is_stage_active(stage) {
            let window = self.date_window();
            return candidates.filter(|customer| window.admits(customer)).collect();
        }

        candidates.filter(|customer| self.admits(stage, customer)).collect()
    }

    /// Narrow `candidates` through every active stage: AND across stages, OR within the
    /// selected ids of one stage. The input order is preserved.
    #[must_use]
    pub fn apply_filters<'a, I>(&self, candidates: I) -> Vec<&'a Customer>
    where
        I: IntoIterator<Item = &'a Customer>,
    {
        let mut remaining: Vec<&'a Customer> = candidates.into_iter().collect();
        for stage in FilterStage::PIPELINE {
            if !self.is_stage_active(stage) {
                continue;
            }

            let before = remaining.len();
            remaining = self.apply_stage(stage, remaining);
            tracing::debug!(
                stage = stage.as_str(),
                before,
                after = remaining.len(),
                "applied filter stage"
            );
        }
        remaining
    }

    fn date_window(&self) -> DateWindow {
        DateWindow {
            mode: self.date_filter,
            start: parse_date_bound(&self.start_date),
            end: parse_date_bound(&self.end_date),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DateWindow {
    mode: DateFilterMode,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
}

impl DateWindow {
    fn admits(&self, customer: &Customer) -> bool {
        let Some(timestamp) = self.mode.timestamp(customer) else {
            return true;
        };

        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= timestamp && timestamp <= end,
            _ => false,
        }
    }
}

fn toggle<T: Ord>(selected: &mut BTreeSet<T>, id: T) {
    if !selected.remove(&id) {
        selected.insert(id);
    }
}

fn any_selected<R: Relation>(relations: &[R], selected: &BTreeSet<R::Id>) -> bool {
    relations.iter().any(|relation| selected.contains(relation.id()))
}

/// Parse a range bound: RFC 3339, or a bare `YYYY-MM-DD` taken as midnight UTC.
fn parse_date_bound(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(instant) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(instant);
    }

    let mut parts = value.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u8>().ok()?;
    let day = parts.next()?.parse::<u8>().ok()?;
    let month = Month::try_from(month).ok()?;
    let date = Date::from_calendar_date(year, month, day).ok()?;
    Some(date.midnight().assume_utc())
}
