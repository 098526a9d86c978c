//! Data layer: core types, decoding, transforms, and encoding.
//!
//! Architecture:
//! ```text
//!  .csv / .xlsx / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  reader   │  decode bytes → Dataset (dispatch on Format)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ transform │  dedup → fill → project (each optional)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  writer   │  encode Dataset → bytes + MIME + filename
//!   └──────────┘
//! ```

pub mod error;
pub mod format;
pub mod model;
pub mod reader;
pub mod transform;
pub mod writer;
