/// Data layer: the table, the cut registry, filtering and loading.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv / .txt
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ registry  │  X/Y axes + up to five cut dimensions with bounds
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  conjunctive range predicates → filtered row indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod registry;
pub mod table;
