//! Sequential order identifiers.

/// Prefix of every order identifier.
pub const ORDER_ID_PREFIX: &str = "ORD-";

/// Suffixes at or below this value are never issued.
pub const ORDER_ID_FLOOR: u64 = 1233;

/// Next identifier after the highest numeric suffix among `existing`.
///
/// Identifiers without a numeric suffix are ignored. Suffixes below `floor`
/// never pull the sequence down, so an empty history starts at `floor + 1`.
///
/// ```
/// use dynasty_admin::order_id::{next_order_id, ORDER_ID_FLOOR};
///
/// let next = next_order_id(["ORD-1234", "ORD-1240", "ORD-999"], ORDER_ID_FLOOR);
/// assert_eq!(next, "ORD-1241");
/// ```
pub fn next_order_id<'a, I>(existing: I, floor: u64) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(numeric_suffix)
        .fold(floor, u64::max);

    format!("{}{}", ORDER_ID_PREFIX, highest.saturating_add(1))
}

/// Trailing run of digits, e.g. `1240` for `"ORD-1240"`.
fn numeric_suffix(id: &str) -> Option<u64> {
    let digits_start = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    id[digits_start..].parse().ok()
}
