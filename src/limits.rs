//! Grammar limit constants.
//!
//! These limits keep pathological inputs from causing unbounded
//! recursion or big-integer parsing.

/// Default maximum nesting depth for block containers (lists, block quotes).
///
/// At the last permitted level the container rule is removed from the
/// child scope's rule list, so deeper markers stay literal text instead
/// of recursing.
pub const DEFAULT_MAX_NESTED_LEVEL: usize = 6;

/// Maximum digits in an ordered list marker (prevents big-integer parsing)
pub const MAX_LIST_MARKER_DIGITS: usize = 9;

/// Maximum length of a link reference label in characters
pub const MAX_LINK_LABEL_LEN: usize = 500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_reasonable() {
        // Ensure limits are within expected ranges
        const { assert!(DEFAULT_MAX_NESTED_LEVEL >= 2) };
        const { assert!(DEFAULT_MAX_NESTED_LEVEL <= 64) };
        const { assert!(MAX_LIST_MARKER_DIGITS <= 9) };
        const { assert!(MAX_LINK_LABEL_LEN >= 100) };
    }
}
