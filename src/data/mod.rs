/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet  (local file or remote store)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + localize → History   (memoized by content)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range + artist set → visible indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  group/reduce → small tables  (memoized in cache)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod duration;
pub mod filter;
pub mod loader;
pub mod model;
