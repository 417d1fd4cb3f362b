pub mod excel;

pub use excel::{validate_output_path, write_report, REPORT_EXTENSION};
