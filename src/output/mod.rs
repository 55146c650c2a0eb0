//! Output module for scraped page files
//!
//! This module handles:
//! - Formatting a scraped page into the plain text file layout
//! - Deriving safe, timestamped filenames
//! - Writing files into the output directory

mod record;
mod writer;

pub use record::{
    format_timestamp, safe_filename, ImageText, PageRecord, MAX_FILENAME_BYTES, MAX_FILENAME_LEN,
    TIMESTAMP_FORMAT,
};
pub use writer::OutputWriter;
