/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate rows → UsageTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ UsageTable │  Vec<UsageRecord>, distinct years
///   └────────────┘
///        │  year
///        ▼
///   ┌───────────┐
///   │ aggregate │  monthly / season / working day / time period
///   └───────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
