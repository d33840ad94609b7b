//! Export module for crawl results
//!
//! This module handles:
//! - Writing collected page records to CSV
//! - Building safe, timestamped output file names
//! - Formatting end-of-run statistics

mod csv_output;
pub mod stats;

pub use csv_output::{
    export_csv, safe_file_stem, timestamped_filename, timestamped_filename_at, CSV_HEADER,
};
pub use stats::{format_duration, format_statistics, print_statistics};
