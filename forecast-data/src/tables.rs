//! CSV codec for the six forecast tables.
//!
//! ## CSV Format
//!
//! Every table has a header row. Headers are matched by name and are
//! case-sensitive; column order does not matter. Values are trimmed.
//!
//! | Table        | Required columns               | Other known columns                                        |
//! |--------------|--------------------------------|------------------------------------------------------------|
//! | Drivers      | `Category`, `Driver`           | months, `Notes`                                            |
//! | Revenue      | `Revenue_Stream`               | `Formula`, months, `Notes`                                 |
//! | Cost         | `Expense_Category`             | `Type`, `Formula`, months, `Notes`                         |
//! | Forecast     | `Metric`                       | `Formula`, months, `Notes`                                 |
//! | Scenarios    | `Parameter`                    | `Base_Case`, `Optimistic`, `Conservative`, `Current`, `Notes` |
//! | Targets      | `Metric`                       | `Target`, `Warning_Threshold`, `Critical_Threshold`, `Notes` |
//!
//! "months" are the nine columns `Apr-25` through `Dec-25`. A missing month
//! column reads as empty cells. Columns not listed above are kept per row, in
//! the order first seen, and written back after the known columns.
//!
//! ### Minimal example
//!
//! ```csv
//! Category,Driver,Apr-25,May-25,Jun-25,Jul-25,Aug-25,Sep-25,Oct-25,Nov-25,Dec-25,Notes
//! BVI Program,Seats_Forecast,0,0,0,0,0,10,0,0,0,Cohort size
//! ```

use csv::StringRecord;
use rust_decimal::Decimal;
use tracing::warn;

use forecast_core::calculations::common::coerce;
use forecast_core::{
    CellValue, Driver, ExpenseLine, ExpenseType, ExtraColumns, ForecastMetric, MONTHS,
    MonthlyValues, RevenueLine, ScenarioParameter, Target,
};

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while reading or writing a table.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The CSV text is structurally invalid.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A column needed to key the rows is absent from the header.
    #[error("{table}: missing required column '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    /// Encoding the table failed.
    #[error("CSV write error: {0}")]
    Write(String),
}

// ---------------------------------------------------------------------------
// Row access
// ---------------------------------------------------------------------------

/// One data row viewed through the header.
pub struct Row<'a> {
    headers: &'a StringRecord,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Cell text for `column`; empty when the column or cell is absent.
    pub fn get(
        &self,
        column: &str,
    ) -> &'a str {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.record.get(i))
            .unwrap_or("")
    }

    pub fn cell(
        &self,
        column: &str,
    ) -> CellValue {
        CellValue::from_raw(self.get(column))
    }

    pub fn string(
        &self,
        column: &str,
    ) -> String {
        self.get(column).to_string()
    }

    /// The month columns as raw cells.
    pub fn month_cells(&self) -> MonthlyValues<CellValue> {
        MONTHS.map(|month| self.cell(month))
    }

    /// The month columns coerced to numbers.
    pub fn month_numbers(&self) -> MonthlyValues<Decimal> {
        MONTHS.map(|month| coerce(&self.cell(month)))
    }
}

// ---------------------------------------------------------------------------
// Table trait
// ---------------------------------------------------------------------------

/// A record type with a fixed CSV layout.
pub trait CsvTable: Sized {
    /// Table name for error messages.
    const TABLE: &'static str;

    /// Columns that must be present in the header.
    const KEY_COLUMNS: &'static [&'static str];

    /// Known columns, in write order.
    fn columns() -> Vec<&'static str>;

    fn from_row(row: &Row<'_>) -> Self;

    /// Known column values, aligned with [`CsvTable::columns`].
    fn fields(&self) -> Vec<String>;

    fn extra(&self) -> &ExtraColumns;

    fn extra_mut(&mut self) -> &mut ExtraColumns;
}

fn with_months(
    before: &[&'static str],
    after: &[&'static str],
) -> Vec<&'static str> {
    before
        .iter()
        .copied()
        .chain(MONTHS)
        .chain(after.iter().copied())
        .collect()
}

fn cells_to_fields(cells: &MonthlyValues<CellValue>) -> impl Iterator<Item = String> + '_ {
    cells.iter().map(ToString::to_string)
}

fn numbers_to_fields(values: &MonthlyValues<Decimal>) -> impl Iterator<Item = String> + '_ {
    values.iter().map(|v| v.normalize().to_string())
}

impl CsvTable for Driver {
    const TABLE: &'static str = "drivers";
    const KEY_COLUMNS: &'static [&'static str] = &["Category", "Driver"];

    fn columns() -> Vec<&'static str> {
        with_months(&["Category", "Driver"], &["Notes"])
    }

    fn from_row(row: &Row<'_>) -> Self {
        Driver {
            category: row.string("Category"),
            name: row.string("Driver"),
            values: row.month_cells(),
            notes: row.string("Notes"),
            extra: ExtraColumns::new(),
        }
    }

    fn fields(&self) -> Vec<String> {
        [self.category.clone(), self.name.clone()]
            .into_iter()
            .chain(cells_to_fields(&self.values))
            .chain([self.notes.clone()])
            .collect()
    }

    fn extra(&self) -> &ExtraColumns {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut ExtraColumns {
        &mut self.extra
    }
}

impl CsvTable for RevenueLine {
    const TABLE: &'static str = "revenue model";
    const KEY_COLUMNS: &'static [&'static str] = &["Revenue_Stream"];

    fn columns() -> Vec<&'static str> {
        with_months(&["Revenue_Stream", "Formula"], &["Notes"])
    }

    fn from_row(row: &Row<'_>) -> Self {
        RevenueLine {
            stream: row.string("Revenue_Stream"),
            formula: row.string("Formula"),
            values: row.month_numbers(),
            notes: row.string("Notes"),
            extra: ExtraColumns::new(),
        }
    }

    fn fields(&self) -> Vec<String> {
        [self.stream.clone(), self.formula.clone()]
            .into_iter()
            .chain(numbers_to_fields(&self.values))
            .chain([self.notes.clone()])
            .collect()
    }

    fn extra(&self) -> &ExtraColumns {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut ExtraColumns {
        &mut self.extra
    }
}

impl CsvTable for ExpenseLine {
    const TABLE: &'static str = "cost model";
    const KEY_COLUMNS: &'static [&'static str] = &["Expense_Category"];

    fn columns() -> Vec<&'static str> {
        with_months(&["Expense_Category", "Type", "Formula"], &["Notes"])
    }

    fn from_row(row: &Row<'_>) -> Self {
        let category = row.string("Expense_Category");
        let type_text = row.get("Type");
        let mut formula = row.string("Formula");

        // Files without a Formula column carry the total's formula in Type.
        let expense_type = if type_text.starts_with('=') && formula.is_empty() {
            formula = type_text.to_string();
            None
        } else if type_text.is_empty() {
            None
        } else {
            let parsed = ExpenseType::parse(type_text);
            if parsed.is_none() {
                warn!(category = %category, expense_type = type_text, "unknown expense type");
            }
            parsed
        };

        ExpenseLine {
            category,
            expense_type,
            formula,
            values: row.month_numbers(),
            notes: row.string("Notes"),
            extra: ExtraColumns::new(),
        }
    }

    fn fields(&self) -> Vec<String> {
        let expense_type = self
            .expense_type
            .map(|t| t.as_str().to_string())
            .unwrap_or_default();

        [self.category.clone(), expense_type, self.formula.clone()]
            .into_iter()
            .chain(numbers_to_fields(&self.values))
            .chain([self.notes.clone()])
            .collect()
    }

    fn extra(&self) -> &ExtraColumns {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut ExtraColumns {
        &mut self.extra
    }
}

impl CsvTable for ForecastMetric {
    const TABLE: &'static str = "forecast";
    const KEY_COLUMNS: &'static [&'static str] = &["Metric"];

    fn columns() -> Vec<&'static str> {
        with_months(&["Metric", "Formula"], &["Notes"])
    }

    fn from_row(row: &Row<'_>) -> Self {
        ForecastMetric {
            metric: row.string("Metric"),
            formula: row.string("Formula"),
            values: row.month_numbers(),
            notes: row.string("Notes"),
            extra: ExtraColumns::new(),
        }
    }

    fn fields(&self) -> Vec<String> {
        [self.metric.clone(), self.formula.clone()]
            .into_iter()
            .chain(numbers_to_fields(&self.values))
            .chain([self.notes.clone()])
            .collect()
    }

    fn extra(&self) -> &ExtraColumns {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut ExtraColumns {
        &mut self.extra
    }
}

impl CsvTable for ScenarioParameter {
    const TABLE: &'static str = "scenarios";
    const KEY_COLUMNS: &'static [&'static str] = &["Parameter"];

    fn columns() -> Vec<&'static str> {
        vec![
            "Parameter",
            "Base_Case",
            "Optimistic",
            "Conservative",
            "Current",
            "Notes",
        ]
    }

    fn from_row(row: &Row<'_>) -> Self {
        ScenarioParameter {
            name: row.string("Parameter"),
            base_case: row.cell("Base_Case"),
            optimistic: row.cell("Optimistic"),
            conservative: row.cell("Conservative"),
            current: row.cell("Current"),
            notes: row.string("Notes"),
            extra: ExtraColumns::new(),
        }
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.base_case.to_string(),
            self.optimistic.to_string(),
            self.conservative.to_string(),
            self.current.to_string(),
            self.notes.clone(),
        ]
    }

    fn extra(&self) -> &ExtraColumns {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut ExtraColumns {
        &mut self.extra
    }
}

impl CsvTable for Target {
    const TABLE: &'static str = "targets";
    const KEY_COLUMNS: &'static [&'static str] = &["Metric"];

    fn columns() -> Vec<&'static str> {
        vec![
            "Metric",
            "Target",
            "Warning_Threshold",
            "Critical_Threshold",
            "Notes",
        ]
    }

    fn from_row(row: &Row<'_>) -> Self {
        Target {
            metric: row.string("Metric"),
            target: row.cell("Target"),
            warning_threshold: row.cell("Warning_Threshold"),
            critical_threshold: row.cell("Critical_Threshold"),
            notes: row.string("Notes"),
            extra: ExtraColumns::new(),
        }
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.metric.clone(),
            self.target.to_string(),
            self.warning_threshold.to_string(),
            self.critical_threshold.to_string(),
            self.notes.clone(),
        ]
    }

    fn extra(&self) -> &ExtraColumns {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut ExtraColumns {
        &mut self.extra
    }
}

// ---------------------------------------------------------------------------
// Reading and writing
// ---------------------------------------------------------------------------

/// Parse CSV text into rows of `T`, in file order.
///
/// Blank input is an empty table.
///
/// # Errors
///
/// * [`CsvLoadError::Parse`] if the CSV is structurally invalid.
/// * [`CsvLoadError::MissingColumn`] if a key column is absent.
pub fn read_table<T: CsvTable>(input: &str) -> Result<Vec<T>, CsvLoadError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true) // short rows read as empty cells
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    if let Some(column) = T::KEY_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(CsvLoadError::MissingColumn {
            table: T::TABLE,
            column: *column,
        });
    }

    let known = T::columns();
    let extra_columns: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.is_empty() && !known.iter().any(|k| k == h))
        .collect();

    reader
        .records()
        .map(|result| {
            let record = result?;
            let row = Row {
                headers: &headers,
                record: &record,
            };
            let mut item = T::from_row(&row);
            for (index, column) in &extra_columns {
                item.extra_mut()
                    .insert(*column, record.get(*index).unwrap_or(""));
            }
            Ok(item)
        })
        .collect()
}

/// Encode rows as CSV text with a header row.
///
/// Extra columns from any row are appended after the known columns; rows
/// lacking one get an empty cell.
///
/// # Errors
///
/// Returns [`CsvLoadError`] if the writer fails.
pub fn write_table<T: CsvTable>(rows: &[T]) -> Result<String, CsvLoadError> {
    let mut extra_columns: Vec<&str> = Vec::new();
    for row in rows {
        for column in row.extra().keys() {
            if !extra_columns.contains(&column) {
                extra_columns.push(column);
            }
        }
    }

    let mut header: Vec<&str> = T::columns();
    header.extend(extra_columns.iter().copied());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;

    for row in rows {
        let extra = row.extra();
        let record = row.fields().into_iter().chain(
            extra_columns
                .iter()
                .map(|column| extra.get(column).unwrap_or("").to_string()),
        );
        writer.write_record(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvLoadError::Write(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvLoadError::Write(e.to_string()))
}
