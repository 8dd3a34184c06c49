use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::filter::FilteredView;
use super::loader::Column;
use super::model::Record;
use crate::error::ExportError;

// ---------------------------------------------------------------------------
// CSV export of the filtered view
// ---------------------------------------------------------------------------

/// Write one row per record, with the same header names the loader reads.
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(view: FilteredView<'_>, writer: W) -> Result<usize, ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(Column::ALL.iter().map(|c| c.header()))?;

    for record in view.iter() {
        out.write_record(Column::ALL.iter().map(|c| field(record, *c)))?;
    }
    out.flush()?;
    Ok(view.len())
}

pub fn export_csv(view: FilteredView<'_>, path: &Path) -> Result<usize, ExportError> {
    if view.is_empty() {
        log::warn!("Exporting an empty selection to {}", path.display());
    }
    let file = File::create(path)?;
    let rows = write_csv(view, BufWriter::new(file))?;
    log::info!("Exported {rows} rows to {}", path.display());
    Ok(rows)
}

fn field(record: &Record, col: Column) -> String {
    match col {
        Column::OrderId => record.order_id.clone(),
        Column::OrderDate => record.order_date.format("%Y-%m-%d").to_string(),
        Column::Region => record.region.clone(),
        Column::State => record.state.clone(),
        Column::Category => record.category.clone(),
        Column::SubCategory => record.sub_category.clone(),
        Column::Product => record.product_name.clone(),
        Column::Customer => record.customer_name.clone(),
        Column::Sales => record.sales.to_string(),
        Column::Profit => record.profit.to_string(),
        Column::Quantity => record.quantity.to_string(),
    }
}
