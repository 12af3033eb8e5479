/// Data layer: forecast document types, loading, and the blending rule.
///
/// Architecture:
/// ```text
///  forecast.json / data.js
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ForecastDataset, DatasetReport
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ ForecastDataset │  Vec<Station>, each with Vec<Forecast>
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  fusion   │  model/baseline blend, consistency checks
///   └──────────┘
/// ```

pub mod fusion;
pub mod loader;
pub mod model;
