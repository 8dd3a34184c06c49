use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (splitmix64)
struct SimpleRng(u64);

impl SimpleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const REGIONS: [(&str, &[&str]); 4] = [
    ("East", &["New York", "Pennsylvania", "Ohio", "Massachusetts"]),
    ("West", &["California", "Washington", "Oregon", "Arizona"]),
    ("Central", &["Texas", "Illinois", "Michigan", "Indiana"]),
    ("South", &["Florida", "Georgia", "Virginia", "Kentucky"]),
];

const CATEGORIES: [(&str, &[&str], f64); 3] = [
    ("Furniture", &["Chairs", "Tables", "Bookcases", "Furnishings"], 0.04),
    ("Office Supplies", &["Paper", "Binders", "Storage", "Labels"], 0.15),
    ("Technology", &["Phones", "Machines", "Accessories", "Copiers"], 0.18),
];

const CUSTOMERS: [&str; 12] = [
    "Claire Gute", "Darrin Van Huff", "Sean O'Donnell", "Brosina Hoffman",
    "Andrew Allen", "Irene Maddox", "Harold Pawlan", "Pete Kriz",
    "Alejandro Grove", "Zuschuss Donatelli", "Ken Black", "Sandra Flanagan",
];

struct Row {
    order_id: String,
    date: NaiveDate,
    region: &'static str,
    state: &'static str,
    category: &'static str,
    sub_category: &'static str,
    product: String,
    customer: &'static str,
    sales: f64,
    profit: f64,
    quantity: i64,
}

fn generate(n_orders: usize, rng: &mut SimpleRng) -> Vec<Row> {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).expect("valid start date");
    let mut rows = Vec::new();

    for order in 0..n_orders {
        let date = start + Duration::days((rng.next_u64() % (4 * 365)) as i64);
        let (region, states) = REGIONS[(rng.next_u64() % REGIONS.len() as u64) as usize];
        let state = rng.pick(states);
        let customer = rng.pick(&CUSTOMERS);
        let order_id = format!("US-{}-{:06}", date.format("%Y"), 100_000 + order);

        // 1–4 lines per order
        for _ in 0..1 + rng.next_u64() % 4 {
            let (category, subs, base_margin) =
                CATEGORIES[(rng.next_u64() % CATEGORIES.len() as u64) as usize];
            let sub_category = rng.pick(subs);
            let quantity = 1 + (rng.next_u64() % 9) as i64;
            let unit_price = 5.0 + rng.next_f64() * 400.0;
            let sales = (unit_price * quantity as f64 * 100.0).round() / 100.0;
            // Discounts push some lines into a loss.
            let margin = base_margin - rng.next_f64() * 0.35;
            let profit = (sales * margin * 10_000.0).round() / 10_000.0;

            rows.push(Row {
                order_id: order_id.clone(),
                date,
                region,
                state,
                category,
                sub_category,
                product: format!("{sub_category} model {}", rng.next_u64() % 20),
                customer,
                sales,
                profit,
                quantity,
            });
        }
    }
    rows.sort_by_key(|r| r.date);
    rows
}

fn write_parquet(rows: &[Row], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");
    let text = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("Order ID", DataType::Utf8, false),
        Field::new("Order Date", DataType::Date32, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("State", DataType::Utf8, false),
        Field::new("Category", DataType::Utf8, false),
        Field::new("Sub-Category", DataType::Utf8, false),
        Field::new("Product Name", DataType::Utf8, false),
        Field::new("Customer Name", DataType::Utf8, false),
        Field::new("Sales", DataType::Float64, false),
        Field::new("Profit", DataType::Float64, false),
        Field::new("Quantity", DataType::Int64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        text(|r| &r.order_id),
        Arc::new(Date32Array::from(
            rows.iter()
                .map(|r| (r.date - epoch).num_days() as i32)
                .collect::<Vec<_>>(),
        )),
        text(|r| r.region),
        text(|r| r.state),
        text(|r| r.category),
        text(|r| r.sub_category),
        text(|r| &r.product),
        text(|r| r.customer),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.sales).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.profit).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.quantity).collect::<Vec<_>>())),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(rows: &[Row], path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = csv::Writer::from_path(path)?;
    out.write_record([
        "Order ID", "Order Date", "Region", "State", "Category", "Sub-Category",
        "Product Name", "Customer Name", "Sales", "Profit", "Quantity",
    ])?;
    for r in rows {
        out.write_record([
            r.order_id.clone(),
            r.date.format("%m/%d/%Y").to_string(),
            r.region.to_string(),
            r.state.to_string(),
            r.category.to_string(),
            r.sub_category.to_string(),
            r.product.clone(),
            r.customer.to_string(),
            r.sales.to_string(),
            r.profit.to_string(),
            r.quantity.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = SimpleRng(42);
    let rows = generate(2_000, &mut rng);

    write_parquet(&rows, "sample_superstore.parquet")?;
    write_csv(&rows, "sample_superstore.csv")?;

    println!(
        "Wrote {} order lines to sample_superstore.parquet and sample_superstore.csv",
        rows.len()
    );
    Ok(())
}
