//! Export core modules shared by the CLI report writer.

#[cfg(feature = "excel")]
pub mod excel_core;
