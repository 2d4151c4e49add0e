use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Precomputed sort key for locale-aware ordering of display names.
///
/// Levels compare in field order: base letters ignoring case and accents, then accents,
/// then case (lower before upper), then raw code points so the order is total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollationKey {
    base: String,
    accented: String,
    case: Vec<u8>,
    raw: String,
}

impl CollationKey {
    #[must_use]
    pub fn new(value: &str) -> Self {
        let base =
            value.nfkd().filter(|ch| !is_combining_mark(*ch)).flat_map(char::to_lowercase).collect();
        let accented = value.nfkd().flat_map(char::to_lowercase).collect();
        let case = value.nfkd().map(|ch| u8::from(ch.is_uppercase())).collect();

        Self { base, accented, case, raw: value.to_string() }
    }
}

#[must_use]
pub fn compare_display_names(lhs: &str, rhs: &str) -> Ordering {
    CollationKey::new(lhs).cmp(&CollationKey::new(rhs))
}

/// Stable sort of `items` by the collation key of the name `name_of` extracts.
pub(crate) fn sort_by_display_name<T, F>(items: Vec<T>, name_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut keyed =
        items.into_iter().map(|item| (CollationKey::new(name_of(&item)), item)).collect::<Vec<_>>();
    keyed.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0));
    keyed.into_iter().map(|(_, item)| item).collect()
}
