//! Keyed access into the drivers table.
//!
//! Lookups are linear scans; the table holds tens of rows. When two rows share
//! a key the first one wins.

use rust_decimal::Decimal;

use crate::calculations::common::coerce;
use crate::models::{CellValue, Driver};

/// Finds the driver keyed by `(category, name)`.
pub fn find_driver<'a>(
    drivers: &'a [Driver],
    category: &str,
    name: &str,
) -> Option<&'a Driver> {
    drivers.iter().find(|d| d.matches(category, name))
}

/// Mutable variant of [`find_driver`].
pub fn find_driver_mut<'a>(
    drivers: &'a mut [Driver],
    category: &str,
    name: &str,
) -> Option<&'a mut Driver> {
    drivers.iter_mut().find(|d| d.matches(category, name))
}

/// The coerced value of a driver for one month, or zero when the driver is
/// absent.
pub fn driver_value(
    drivers: &[Driver],
    category: &str,
    name: &str,
    month: usize,
) -> Decimal {
    find_driver(drivers, category, name)
        .and_then(|d| d.values.get(month))
        .map(coerce)
        .unwrap_or(Decimal::ZERO)
}

/// Raw cell of a driver for one month.
pub fn driver_cell<'a>(
    drivers: &'a [Driver],
    category: &str,
    name: &str,
    month: usize,
) -> Option<&'a CellValue> {
    find_driver(drivers, category, name).and_then(|d| d.values.get(month))
}
