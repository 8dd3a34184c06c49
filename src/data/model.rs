use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Dimension – a categorical column that can be filtered or grouped on
// ---------------------------------------------------------------------------

/// Categorical columns of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Region,
    State,
    Category,
    SubCategory,
    Product,
    Customer,
}

impl Dimension {
    /// Dimensions offered in the sidebar, in cascade order.
    pub const FILTERS: [Dimension; 4] = [
        Dimension::Region,
        Dimension::State,
        Dimension::Category,
        Dimension::SubCategory,
    ];

    /// Columns that identify an entity for rankings.
    pub const ENTITIES: [Dimension; 2] = [Dimension::Customer, Dimension::Product];

    /// Column header used by the loader and the CSV export.
    pub fn column_name(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::State => "State",
            Dimension::Category => "Category",
            Dimension::SubCategory => "Sub-Category",
            Dimension::Product => "Product Name",
            Dimension::Customer => "Customer Name",
        }
    }

    /// The record's value for this column, `None` when the cell was empty.
    pub fn value(self, record: &Record) -> Option<&str> {
        let raw = match self {
            Dimension::Region => &record.region,
            Dimension::State => &record.state,
            Dimension::Category => &record.category,
            Dimension::SubCategory => &record.sub_category,
            Dimension::Product => &record.product_name,
            Dimension::Customer => &record.customer_name,
        };
        if raw.is_empty() {
            None
        } else {
            Some(raw.as_str())
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// Measure – a numeric quantity summed by the aggregation engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Sales,
    Profit,
    Quantity,
    /// Derived: profit / sales.
    Margin,
}

impl Measure {
    pub const ALL: [Measure; 4] = [
        Measure::Sales,
        Measure::Profit,
        Measure::Quantity,
        Measure::Margin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Measure::Sales => "Sales",
            Measure::Profit => "Profit",
            Measure::Quantity => "Quantity",
            Measure::Margin => "Margin",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the sales export
// ---------------------------------------------------------------------------

/// A single order line. Empty strings stand for missing categorical cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub region: String,
    pub state: String,
    pub category: String,
    pub sub_category: String,
    pub product_name: String,
    pub customer_name: String,
    pub sales: f64,
    pub profit: f64,
    pub quantity: i64,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// All records of one source file, read-only after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest order date, `None` for an empty dataset.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.order_date;
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.order_date), hi.max(r.order_date))
        }))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record(
        order_id: &str,
        order_date: NaiveDate,
        region: &str,
        state: &str,
        category: &str,
        sub_category: &str,
        customer: &str,
        sales: f64,
        profit: f64,
        quantity: i64,
    ) -> Record {
        Record {
            order_id: order_id.to_string(),
            order_date,
            region: region.to_string(),
            state: state.to_string(),
            category: category.to_string(),
            sub_category: sub_category.to_string(),
            product_name: format!("{sub_category} item"),
            customer_name: customer.to_string(),
            sales,
            profit,
            quantity,
        }
    }

    /// Small mixed table used across the data-layer tests.
    pub fn sample() -> Vec<Record> {
        vec![
            record("CA-1", date(2023, 1, 1), "East", "New York", "Technology", "Phones", "Ann", 100.0, 10.0, 2),
            record("CA-2", date(2023, 1, 2), "West", "California", "Furniture", "Chairs", "Bob", 200.0, -20.0, 1),
            record("CA-3", date(2023, 1, 2), "East", "Ohio", "Furniture", "Tables", "Cid", 50.0, 5.0, 3),
            record("CA-3", date(2023, 2, 3), "East", "New York", "Office Supplies", "Paper", "Ann", 30.0, 12.0, 6),
            record("CA-4", date(2023, 2, 4), "West", "Oregon", "Technology", "Phones", "Dee", 80.0, 8.0, 1),
            record("CA-5", date(2023, 3, 5), "Central", "Texas", "Technology", "Machines", "", 0.0, -4.0, 1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn empty_cells_have_no_value() {
        let records = sample();
        assert_eq!(Dimension::Customer.value(&records[5]), None);
        assert_eq!(Dimension::Customer.value(&records[0]), Some("Ann"));
        assert_eq!(Dimension::Product.value(&records[0]), Some("Phones item"));
    }

    #[test]
    fn date_span_covers_all_records() {
        let ds = Dataset::from_records(sample());
        assert_eq!(ds.date_span(), Some((date(2023, 1, 1), date(2023, 3, 5))));
        assert_eq!(Dataset::default().date_span(), None);
    }
}
