//! Export core modules shared by the CLI and the review session.

pub mod csv_core;
pub mod json_core;

pub use csv_core::{to_csv, CSV_HEADER, ITEM_DELIMITER};
pub use json_core::to_json;
