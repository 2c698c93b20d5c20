//! Membership flag literals.

/// Spellings accepted as "station is on this line".
pub const TRUE_LITERALS: [&str; 6] = ["1", "t", "T", "true", "True", "TRUE"];

/// Spellings accepted as "station is not on this line".
pub const FALSE_LITERALS: [&str; 6] = ["0", "f", "F", "false", "False", "FALSE"];

/// Parse a flag cell. Returns `None` for anything outside the fixed literal set;
/// no trimming, no other casings.
pub fn parse_flag(value: &str) -> Option<bool> {
    if TRUE_LITERALS.contains(&value) {
        Some(true)
    } else if FALSE_LITERALS.contains(&value) {
        Some(false)
    } else {
        None
    }
}
