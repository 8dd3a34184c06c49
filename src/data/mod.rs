/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────────┐
///   │ loader/cache  │  parse file once → Arc<Dataset>
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  cascading selections → indices
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ date_range  │  inclusive [from, to] → indices
///   └────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  time series, rankings, breakdowns
///   └───────────┘      (export writes the same view as CSV)
/// ```

pub mod aggregate;
pub mod cache;
pub mod date_range;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
