//! `locsync-core` — shared primitives for the sheet sync engine.
//!
//! Cell values with string coercion, plus A1-style addressing helpers
//! (bijective column letters, cell references, ranges).

pub mod address;
pub mod value;

pub use address::{column_letter, column_number, A1Range, ParseRangeError};
pub use value::stringify;
