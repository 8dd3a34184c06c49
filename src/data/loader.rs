use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Days, NaiveDate};
use encoding_rs::WINDOWS_1252;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Dimension, Record};
use crate::error::DataLoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one order line per row, UTF-8 or Windows-1252
/// * `.xlsx`    – first worksheet, header in the first row (also xls/xlsb/ods)
/// * `.json`    – `[{ "Order Date": "...", "Region": "...", ... }, ...]`
/// * `.parquet` – flat columns, dates as Date32/Date64/Timestamp or text
pub fn load_file(path: &Path) -> Result<Dataset, DataLoadError> {
    if !path.is_file() {
        return Err(DataLoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => load_workbook(path),
        other => return Err(DataLoadError::UnsupportedFormat(other.to_string())),
    };

    loaded.map_err(|err| match err.downcast::<DataLoadError>() {
        Ok(typed) => typed,
        Err(other) => DataLoadError::Unreadable {
            path: path.to_path_buf(),
            reason: format!("{other:#}"),
        },
    })
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Columns understood by the loader, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    OrderId,
    OrderDate,
    Region,
    State,
    Category,
    SubCategory,
    Product,
    Customer,
    Sales,
    Profit,
    Quantity,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::OrderId,
        Column::OrderDate,
        Column::Region,
        Column::State,
        Column::Category,
        Column::SubCategory,
        Column::Product,
        Column::Customer,
        Column::Sales,
        Column::Profit,
        Column::Quantity,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::OrderId => "Order ID",
            Column::OrderDate => "Order Date",
            Column::Region => Dimension::Region.column_name(),
            Column::State => Dimension::State.column_name(),
            Column::Category => Dimension::Category.column_name(),
            Column::SubCategory => Dimension::SubCategory.column_name(),
            Column::Product => Dimension::Product.column_name(),
            Column::Customer => Dimension::Customer.column_name(),
            Column::Sales => "Sales",
            Column::Profit => "Profit",
            Column::Quantity => "Quantity",
        }
    }

    fn is_required(self) -> bool {
        !matches!(self, Column::OrderId | Column::Product | Column::Customer)
    }

    fn is_numeric(self) -> bool {
        matches!(self, Column::Sales | Column::Profit | Column::Quantity)
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// "Sub-Category", "sub_category" and "SubCategory" all compare equal.
fn normalize_header(h: &str) -> String {
    h.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Position of every known column inside a source header row.
#[derive(Debug, Clone)]
struct Layout {
    positions: [Option<usize>; Column::ALL.len()],
}

impl Layout {
    fn resolve<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, DataLoadError> {
        let normalized: Vec<String> = headers.into_iter().map(normalize_header).collect();

        let mut positions = [None; Column::ALL.len()];
        for col in Column::ALL {
            let wanted = normalize_header(col.header());
            positions[col.slot()] = normalized.iter().position(|h| *h == wanted);
        }
        let layout = Layout { positions };

        let mut missing: Vec<String> = Column::ALL
            .iter()
            .filter(|c| c.is_required() && layout.get(**c).is_none())
            .map(|c| c.header().to_string())
            .collect();
        if layout.get(Column::Product).is_none() && layout.get(Column::Customer).is_none() {
            missing.push(format!(
                "{} or {}",
                Column::Product.header(),
                Column::Customer.header()
            ));
        }
        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns(missing));
        }
        Ok(layout)
    }

    fn get(&self, col: Column) -> Option<usize> {
        self.positions[col.slot()]
    }
}

// ---------------------------------------------------------------------------
// Cell conversion shared by all formats
// ---------------------------------------------------------------------------

/// One source cell before it is coerced into a [`Record`] field.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Null,
}

fn parse_error(row: usize, col: Column, message: impl Into<String>) -> DataLoadError {
    DataLoadError::Parse {
        row,
        column: col.header().to_string(),
        message: message.into(),
    }
}

fn cell_text(cell: Cell) -> String {
    match cell {
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        Cell::Number(n) => n.to_string(),
        Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        Cell::Null => String::new(),
    }
}

/// Missing measures count as zero, the same way a column sum skips them.
fn cell_number(cell: Cell, row: usize, col: Column) -> Result<f64, DataLoadError> {
    match cell {
        Cell::Number(n) => Ok(n),
        Cell::Null => Ok(0.0),
        Cell::Text(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '$').collect();
            if cleaned.is_empty() {
                return Ok(0.0);
            }
            cleaned
                .parse::<f64>()
                .map_err(|_| parse_error(row, col, format!("'{s}' is not a number")))
        }
        Cell::Date(d) => Err(parse_error(row, col, format!("expected a number, got date {d}"))),
    }
}

fn cell_integer(cell: Cell, row: usize, col: Column) -> Result<i64, DataLoadError> {
    let value = cell_number(cell, row, col)?;
    if value.fract() != 0.0 {
        return Err(parse_error(row, col, format!("{value} is not a whole number")));
    }
    Ok(value as i64)
}

fn cell_date(cell: Cell, row: usize, col: Column) -> Result<NaiveDate, DataLoadError> {
    match cell {
        Cell::Date(d) => Ok(d),
        Cell::Text(s) => parse_date(&s)
            .ok_or_else(|| parse_error(row, col, format!("'{s}' is not a recognised date"))),
        Cell::Number(n) => Err(parse_error(row, col, format!("expected a date, got {n}"))),
        Cell::Null => Err(parse_error(row, col, "missing date")),
    }
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Parse a calendar date, ignoring any time-of-day suffix.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    let day_part = text.split(['T', ' ']).next().unwrap_or(text);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day_part, fmt).ok())
}

/// Build one record from a row, `cell` yields the raw cell at a source position.
fn build_record(
    row: usize,
    layout: &Layout,
    mut cell: impl FnMut(usize) -> Cell,
) -> Result<Record, DataLoadError> {
    let mut take = |col: Column| layout.get(col).map(&mut cell).unwrap_or(Cell::Null);

    let order_id = match cell_text(take(Column::OrderId)) {
        id if id.is_empty() => row.to_string(),
        id => id,
    };

    Ok(Record {
        order_id,
        order_date: cell_date(take(Column::OrderDate), row, Column::OrderDate)?,
        region: cell_text(take(Column::Region)),
        state: cell_text(take(Column::State)),
        category: cell_text(take(Column::Category)),
        sub_category: cell_text(take(Column::SubCategory)),
        product_name: cell_text(take(Column::Product)),
        customer_name: cell_text(take(Column::Customer)),
        sales: cell_number(take(Column::Sales), row, Column::Sales)?,
        profit: cell_number(take(Column::Profit), row, Column::Profit)?,
        quantity: cell_integer(take(Column::Quantity), row, Column::Quantity)?,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one order line per row.
/// Extra columns (Ship Mode, Segment, ...) are ignored.
///
/// Fields are read as bytes; anything that is not valid UTF-8 is decoded as
/// Windows-1252, the encoding spreadsheet tools use for "Save as CSV".
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .byte_headers()
        .context("reading CSV headers")?
        .iter()
        .map(decode_field)
        .collect();
    let layout = Layout::resolve(headers.iter().map(String::as_str))?;

    let mut records = Vec::new();
    for (i, result) in reader.byte_records().enumerate() {
        let row = i + 1;
        let line = result.with_context(|| format!("CSV row {row}"))?;
        let record = build_record(row, &layout, |idx| match line.get(idx).map(decode_field) {
            Some(s) if !s.trim().is_empty() => Cell::Text(s),
            _ => Cell::Null,
        })?;
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of a workbook; row 1 holds the column names.
fn load_workbook(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook contains no sheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("reading sheet '{sheet}'"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|c| cell_text(sheet_cell(c))).collect())
        .unwrap_or_default();
    let layout = Layout::resolve(headers.iter().map(String::as_str))?;

    let mut records = Vec::new();
    for (i, cells) in rows.enumerate() {
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let record = build_record(i + 1, &layout, |idx| {
            cells.get(idx).map(sheet_cell).unwrap_or(Cell::Null)
        })?;
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

fn sheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Null,
        Data::String(s) if s.trim().is_empty() => Cell::Null,
        Data::String(s) | Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(dt) => excel_serial_date(dt.as_f64())
            .map(Cell::Date)
            .unwrap_or(Cell::Null),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e:?}")),
    }
}

/// Day part of an Excel serial date (1900 system, day 0 = 1899-12-30).
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.floor() as u64))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Order ID": "CA-2016-152156", "Order Date": "2016-11-08",
///     "Region": "South", "State": "Kentucky", "Sales": 261.96, ... },
///   ...
/// ]
/// ```
///
/// The first object determines the column layout; an empty array is
/// rejected with [`DataLoadError::MissingColumns`].
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let objects = root.as_array().context("Expected top-level JSON array")?;
    // An empty array has no keys, so it fails the column check like a bare CSV header.
    let keys: Vec<String> = match objects.first() {
        Some(first) => first
            .as_object()
            .context("Row 1 is not a JSON object")?
            .keys()
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    let layout = Layout::resolve(keys.iter().map(String::as_str))?;

    let mut records = Vec::with_capacity(objects.len());
    for (i, value) in objects.iter().enumerate() {
        let row = i + 1;
        let obj = value
            .as_object()
            .with_context(|| format!("Row {row} is not a JSON object"))?;
        let record = build_record(row, &layout, |idx| {
            obj.get(&keys[idx]).map(json_to_cell).unwrap_or(Cell::Null)
        })?;
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) if s.trim().is_empty() => Cell::Null,
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n
            .as_f64()
            .map(Cell::Number)
            .unwrap_or_else(|| Cell::Text(n.to_string())),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Text columns may be Utf8 or LargeUtf8, measures any integer or float
/// type, and the order date Date32, Date64, Timestamp or text.
/// Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let layout = {
        let schema = builder.schema();
        Layout::resolve(schema.fields().iter().map(|f| f.name().as_str()))?
    };
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        // Cast every used column once per batch so row access is uniform.
        let mut columns: Vec<Option<TypedColumn>> = vec![None; batch.num_columns()];
        for col in Column::ALL {
            if let Some(idx) = layout.get(col) {
                let typed = TypedColumn::from_array(batch.column(idx), col)
                    .with_context(|| format!("column '{}'", col.header()))?;
                columns[idx] = Some(typed);
            }
        }

        for row in 0..batch.num_rows() {
            let row_no = records.len() + 1;
            let record = build_record(row_no, &layout, |idx| {
                columns[idx]
                    .as_ref()
                    .map(|c| c.cell(row))
                    .unwrap_or(Cell::Null)
            })?;
            records.push(record);
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

/// An Arrow column normalised to one of three shapes.
#[derive(Clone)]
enum TypedColumn {
    Text(ArrayRef),
    Number(ArrayRef),
    Date(ArrayRef),
}

impl TypedColumn {
    fn from_array(array: &ArrayRef, col: Column) -> Result<Self> {
        let is_text = matches!(array.data_type(), DataType::Utf8 | DataType::LargeUtf8);

        if col == Column::OrderDate {
            return match array.data_type() {
                _ if is_text => Ok(TypedColumn::Text(cast(array, &DataType::Utf8)?)),
                DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
                    Ok(TypedColumn::Date(cast(array, &DataType::Date32)?))
                }
                other => bail!("expected a date column, got {other:?}"),
            };
        }

        if col.is_numeric() && !is_text {
            return Ok(TypedColumn::Number(cast(array, &DataType::Float64)?));
        }

        Ok(TypedColumn::Text(cast(array, &DataType::Utf8)?))
    }

    fn cell(&self, row: usize) -> Cell {
        match self {
            TypedColumn::Text(a) if a.is_valid(row) => {
                Cell::Text(a.as_string::<i32>().value(row).to_string())
            }
            TypedColumn::Number(a) if a.is_valid(row) => {
                Cell::Number(a.as_primitive::<Float64Type>().value(row))
            }
            TypedColumn::Date(a) if a.is_valid(row) => a
                .as_primitive::<Date32Type>()
                .value_as_date(row)
                .map(Cell::Date)
                .unwrap_or(Cell::Null),
            _ => Cell::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use super::*;
    use crate::data::model::fixtures::date;

    const HEADER: &str =
        "Row ID,Order ID,Order Date,Region,State,Category,Sub-Category,Product Name,Customer Name,Sales,Profit,Quantity";

    fn write(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_superstore_csv() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "orders.csv",
            &format!(
                "{HEADER}\n\
                 1,CA-1,11/8/2016,South,Kentucky,Furniture,Bookcases,\"Bush Somerset, Collection\",Claire Gute,261.96,41.9136,2\n\
                 2,CA-2,2016-11-09,West,California,Office Supplies,Labels,Address Labels,Darrin Van Huff,14.62,6.8714,2\n"
            ),
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.order_date, date(2016, 11, 8));
        assert_eq!(first.product_name, "Bush Somerset, Collection");
        assert_eq!(first.quantity, 2);
        assert!((first.profit - 41.9136).abs() < 1e-9);
        assert_eq!(ds.records[1].order_date, date(2016, 11, 9));
    }

    #[test]
    fn windows_1252_csv_fields_are_decoded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut body = format!("{HEADER}\n").into_bytes();
        body.extend_from_slice(b"1,CA-1,2023-01-01,East,Ohio,Furniture,Chairs,Caf\xe9 Chair,Ren\xe9e,10,1,1\n");
        body.extend_from_slice("2,CA-2,2023-01-02,East,Ohio,Furniture,Chairs,Café Table,Zoë,20,2,1\n".as_bytes());
        fs::write(&path, body).unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].product_name, "Café Chair");
        assert_eq!(ds.records[0].customer_name, "Renée");
        assert_eq!(ds.records[1].customer_name, "Zoë");
    }

    #[test]
    fn loads_first_worksheet_of_xlsx() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Sample - Superstore.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Orders").unwrap();
        for (col, name) in HEADER.split(',').enumerate() {
            sheet.write_string(0, col as u16, name).unwrap();
        }
        let date_format = Format::new().set_num_format("m/d/yyyy");
        let order_date = ExcelDateTime::from_ymd(2016, 11, 8).unwrap();
        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_string(1, 1, "CA-2016-152156").unwrap();
        sheet.write_datetime_with_format(1, 2, &order_date, &date_format).unwrap();
        for (col, text) in ["South", "Kentucky", "Furniture", "Bookcases", "Bush Somerset", "Claire Gute"]
            .iter()
            .enumerate()
        {
            sheet.write_string(1, 3 + col as u16, *text).unwrap();
        }
        sheet.write_number(1, 9, 261.96).unwrap();
        sheet.write_number(1, 10, 41.9136).unwrap();
        sheet.write_number(1, 11, 2.0).unwrap();
        // Text dates are accepted too.
        sheet.write_number(2, 0, 2.0).unwrap();
        sheet.write_string(2, 1, "CA-2016-138688").unwrap();
        sheet.write_string(2, 2, "2016-06-12").unwrap();
        for (col, text) in ["West", "California", "Office Supplies", "Labels", "Address Labels", "Darrin Van Huff"]
            .iter()
            .enumerate()
        {
            sheet.write_string(2, 3 + col as u16, *text).unwrap();
        }
        sheet.write_number(2, 9, 14.62).unwrap();
        sheet.write_number(2, 10, 6.8714).unwrap();
        sheet.write_number(2, 11, 2.0).unwrap();
        workbook.save(&path).unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.order_id, "CA-2016-152156");
        assert_eq!(first.order_date, date(2016, 11, 8));
        assert_eq!(first.state, "Kentucky");
        assert_eq!(first.quantity, 2);
        assert!((first.sales - 261.96).abs() < 1e-9);
        assert_eq!(ds.records[1].order_date, date(2016, 6, 12));
        assert_eq!(ds.records[1].region, "West");
    }

    #[test]
    fn excel_serials_map_to_calendar_days() {
        assert_eq!(excel_serial_date(42682.0), Some(date(2016, 11, 8)));
        assert_eq!(excel_serial_date(42682.75), Some(date(2016, 11, 8)));
        assert_eq!(excel_serial_date(-1.0), None);
    }

    #[test]
    fn empty_json_array_reports_missing_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.json", "[]");
        assert!(matches!(load_file(&path), Err(DataLoadError::MissingColumns(_))));
    }

    #[test]
    fn header_matching_ignores_case_and_punctuation() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "snake.csv",
            "order_date,region,state,category,sub_category,customer_name,sales,profit,quantity\n\
             2023-01-01,East,Ohio,Technology,Phones,Ann,10,1,1\n",
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.records[0].sub_category, "Phones");
        // No Order ID column: falls back to the row number.
        assert_eq!(ds.records[0].order_id, "1");
        assert_eq!(ds.records[0].product_name, "");
    }

    #[test]
    fn missing_columns_are_reported() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.csv", "Order Date,Region,Sales\n2023-01-01,East,1\n");
        match load_file(&path) {
            Err(DataLoadError::MissingColumns(cols)) => {
                assert!(cols.contains(&"State".to_string()));
                assert!(cols.contains(&"Quantity".to_string()));
                assert!(cols.iter().any(|c| c.contains("Customer Name")));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_and_unknown_extension() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_file(&dir.path().join("nope.csv")),
            Err(DataLoadError::NotFound(_))
        ));
        let path = write(&dir, "orders.txt", "");
        assert!(matches!(
            load_file(&path),
            Err(DataLoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn bad_date_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "dates.csv",
            "Order Date,Region,State,Category,Sub-Category,Customer Name,Sales,Profit,Quantity\n\
             someday,East,Ohio,Technology,Phones,Ann,10,1,1\n",
        );
        match load_file(&path) {
            Err(DataLoadError::Parse { row, column, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "Order Date");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn loads_json_records() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "orders.json",
            r#"[
                {"Order ID": "A", "Order Date": "2023-01-01T00:00:00", "Region": "East",
                 "State": "Ohio", "Category": "Technology", "Sub-Category": "Phones",
                 "Customer Name": "Ann", "Sales": 100.5, "Profit": 10, "Quantity": 2},
                {"Order ID": "B", "Order Date": "2023-01-02", "Region": null,
                 "State": "Ohio", "Category": "Technology", "Sub-Category": "Phones",
                 "Customer Name": "Bob", "Sales": 1, "Profit": 0, "Quantity": 1}
            ]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].order_date, date(2023, 1, 1));
        assert_eq!(ds.records[0].sales, 100.5);
        assert_eq!(ds.records[1].region, "");
    }

    #[test]
    fn loads_parquet_with_date32_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.parquet");

        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let day = (date(2023, 1, 2) - epoch).num_days() as i32;
        let text = |v: &str| Arc::new(StringArray::from(vec![v])) as ArrayRef;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Order Date", DataType::Date32, false),
            Field::new("Region", DataType::Utf8, false),
            Field::new("State", DataType::Utf8, false),
            Field::new("Category", DataType::Utf8, false),
            Field::new("Sub-Category", DataType::Utf8, false),
            Field::new("Customer Name", DataType::Utf8, false),
            Field::new("Sales", DataType::Float64, false),
            Field::new("Profit", DataType::Float64, false),
            Field::new("Quantity", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![day])),
                text("West"),
                text("Oregon"),
                text("Furniture"),
                text("Chairs"),
                text("Bob"),
                Arc::new(Float64Array::from(vec![200.0])),
                Arc::new(Float64Array::from(vec![-20.0])),
                Arc::new(Int64Array::from(vec![3])),
            ],
        )
        .unwrap();
        let file = fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        let r = &ds.records[0];
        assert_eq!(r.order_date, date(2023, 1, 2));
        assert_eq!(r.state, "Oregon");
        assert_eq!(r.quantity, 3);
        assert_eq!(r.profit, -20.0);
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("2023-01-05"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("1/5/2023"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("05-01-2023"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("2023-01-05 13:45:00"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("not a date"), None);
    }
}
