//! File input and CSV output for the command-line front end

pub mod export;
pub mod input;

pub use export::{export_csv, write_results};
pub use input::{parse_csv_rows, parse_url_list, read_csv_rows, read_url_list};
