//! The fixed month axis shared by every time-series table.

/// Number of periods on the forecast horizon.
pub const MONTH_COUNT: usize = 9;

/// Period identifiers in forecast order. These are also the CSV column headers.
pub const MONTHS: [&str; MONTH_COUNT] = [
    "Apr-25", "May-25", "Jun-25", "Jul-25", "Aug-25", "Sep-25", "Oct-25", "Nov-25", "Dec-25",
];

/// One value per month, in [`MONTHS`] order.
pub type MonthlyValues<T> = [T; MONTH_COUNT];

/// Returns the position of `label` on the month axis.
pub fn month_index(label: &str) -> Option<usize> {
    MONTHS.iter().position(|m| *m == label)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn month_index_finds_first_and_last() {
        assert_eq!(month_index("Apr-25"), Some(0));
        assert_eq!(month_index("Sep-25"), Some(5));
        assert_eq!(month_index("Dec-25"), Some(8));
    }

    #[test]
    fn month_index_is_case_sensitive() {
        assert_eq!(month_index("apr-25"), None);
        assert_eq!(month_index("Jan-26"), None);
    }
}
