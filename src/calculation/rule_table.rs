//! Static lookup tables.
//!
//! Contextual adjustments are expressed as ordered rows of
//! `(bound, value, label)`. The first row whose bound contains the keyed
//! value wins.

use rust_decimal::Decimal;

/// A predicate over one decimal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// `v > x`
    Above(Decimal),
    /// `v >= x`
    AtLeast(Decimal),
    /// `v < x`
    Below(Decimal),
    /// `lo <= v <= hi`
    Between(Decimal, Decimal),
    /// `lo <= v < hi`
    Range(Decimal, Decimal),
    /// `lo < v <= hi`
    AboveUpTo(Decimal, Decimal),
    /// Always matches.
    Any,
}

impl Bound {
    /// Tests a value against this bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use reimbursement_engine::calculation::Bound;
    /// use rust_decimal::Decimal;
    ///
    /// let bound = Bound::Range(Decimal::new(100, 0), Decimal::new(300, 0));
    /// assert!(bound.contains(Decimal::new(100, 0)));
    /// assert!(!bound.contains(Decimal::new(300, 0)));
    /// ```
    pub fn contains(&self, value: Decimal) -> bool {
        match *self {
            Bound::Above(x) => value > x,
            Bound::AtLeast(x) => value >= x,
            Bound::Below(x) => value < x,
            Bound::Between(lo, hi) => lo <= value && value <= hi,
            Bound::Range(lo, hi) => lo <= value && value < hi,
            Bound::AboveUpTo(lo, hi) => lo < value && value <= hi,
            Bound::Any => true,
        }
    }
}

/// One row of a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleRow {
    /// Condition on the keyed value.
    pub bound: Bound,
    /// Factor or amount produced by the row.
    pub value: Decimal,
    /// Short description used in audit output.
    pub label: &'static str,
}

/// Returns the first row whose bound contains `value`.
pub fn lookup(rows: &'static [RuleRow], value: Decimal) -> Option<&'static RuleRow> {
    rows.iter().find(|row| row.bound.contains(value))
}

pub(crate) const fn dec(units: u32, scale: u32) -> Decimal {
    Decimal::from_parts(units, 0, 0, false, scale)
}

pub(crate) const fn row(bound: Bound, value: Decimal, label: &'static str) -> RuleRow {
    RuleRow {
        bound,
        value,
        label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TABLE: &[RuleRow] = &[
        row(Bound::Above(dec(400, 0)), dec(110, 2), "high"),
        row(Bound::Above(dec(300, 0)), dec(90, 2), "elevated"),
        row(Bound::Any, dec(1, 0), "neutral"),
    ];

    #[test]
    fn test_bounds() {
        let ten = dec(10, 0);
        let twenty = dec(20, 0);

        assert!(Bound::Above(ten).contains(dec(11, 0)));
        assert!(!Bound::Above(ten).contains(ten));
        assert!(Bound::AtLeast(ten).contains(ten));
        assert!(Bound::Below(ten).contains(dec(9, 0)));
        assert!(!Bound::Below(ten).contains(ten));
        assert!(Bound::Between(ten, twenty).contains(twenty));
        assert!(!Bound::Range(ten, twenty).contains(twenty));
        assert!(!Bound::AboveUpTo(ten, twenty).contains(ten));
        assert!(Bound::AboveUpTo(ten, twenty).contains(twenty));
        assert!(Bound::Any.contains(Decimal::ZERO));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(lookup(TABLE, dec(500, 0)).unwrap().label, "high");
        assert_eq!(lookup(TABLE, dec(400, 0)).unwrap().label, "elevated");
        assert_eq!(lookup(TABLE, dec(300, 0)).unwrap().label, "neutral");
    }

    #[test]
    fn test_no_match() {
        static EMPTY: &[RuleRow] = &[];
        assert!(lookup(EMPTY, dec(1, 0)).is_none());
    }

    #[test]
    fn test_const_decimal_scale() {
        assert_eq!(dec(125, 2).to_string(), "1.25");
    }
}
