//! Prefixed entry identifiers (`td-3`, `pr-12`, ...).
//!
//! Counters are always seeded from the largest number found along the
//! current parent chain, so sibling branches may mint the same ids.

pub const THREAT_PREFIX: &str = "th";
pub const CONSTRAINT_PREFIX: &str = "cn";
pub const THREAD_PREFIX: &str = "td";
pub const INVENTORY_PREFIX: &str = "inv";
pub const HEALTH_PREFIX: &str = "hp";
pub const CHARACTER_STATE_PREFIX: &str = "cs";
pub const PROMISE_PREFIX: &str = "pr";

pub fn format_id(prefix: &str, number: u32) -> String {
    format!("{}-{}", prefix, number)
}

/// Parse the numeric suffix of `<prefix>-<digits>`. Anything else, including
/// signs, whitespace and overflowing numbers, yields `None`.
pub fn parse_id_number(id: &str, prefix: &str) -> Option<u32> {
    let digits = id.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Largest id number carried by `ids` under `prefix`, or 0 when none match.
pub fn get_max_id_number<'a, I>(ids: I, prefix: &str) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter()
        .filter_map(|id| parse_id_number(id, prefix))
        .max()
        .unwrap_or(0)
}

/// Mint up to `count` consecutive ids following `max_existing`. Minting
/// stops once the counter would pass `u32::MAX`.
pub fn mint_ids(
    prefix: &str,
    max_existing: u32,
    count: usize,
) -> impl Iterator<Item = String> + '_ {
    (1..=count).map_while(move |offset| {
        let number = u32::try_from(offset)
            .ok()
            .and_then(|offset| max_existing.checked_add(offset))?;
        Some(format_id(prefix, number))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_only_exact_prefix_and_digits() {
        assert_eq!(parse_id_number("td-12", THREAD_PREFIX), Some(12));
        assert_eq!(parse_id_number("td-0", THREAD_PREFIX), Some(0));
        assert_eq!(parse_id_number("td-", THREAD_PREFIX), None);
        assert_eq!(parse_id_number("td-1a", THREAD_PREFIX), None);
        assert_eq!(parse_id_number("td--1", THREAD_PREFIX), None);
        assert_eq!(parse_id_number("td-+1", THREAD_PREFIX), None);
        assert_eq!(parse_id_number(" td-1", THREAD_PREFIX), None);
        assert_eq!(parse_id_number("pr-1", THREAD_PREFIX), None);
        assert_eq!(parse_id_number("td-99999999999", THREAD_PREFIX), None);
    }

    #[test]
    fn max_ignores_foreign_and_malformed_ids() {
        let ids = ["td-2", "th-9", "bogus", "td-7", "td-x"];
        assert_eq!(get_max_id_number(ids, THREAD_PREFIX), 7);
        assert_eq!(get_max_id_number(["bogus"], THREAD_PREFIX), 0);
        assert_eq!(get_max_id_number(Vec::<&str>::new(), THREAD_PREFIX), 0);
    }

    #[test]
    fn mint_continues_after_max() {
        let ids: Vec<String> = mint_ids(INVENTORY_PREFIX, 4, 3).collect();
        assert_eq!(ids, vec!["inv-5", "inv-6", "inv-7"]);
        assert_eq!(mint_ids(HEALTH_PREFIX, 0, 0).count(), 0);
    }

    #[test]
    fn mint_stops_at_counter_limit() {
        let ids: Vec<String> = mint_ids(PROMISE_PREFIX, u32::MAX - 1, 3).collect();
        assert_eq!(ids, vec![format!("pr-{}", u32::MAX)]);
        assert_eq!(mint_ids(PROMISE_PREFIX, u32::MAX, 2).count(), 0);
    }
}
