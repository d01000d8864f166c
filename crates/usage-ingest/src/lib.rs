//! Usage export ingestion.
//!
//! Reads exported sheets as generic labeled tables ([`RawSheet`]) and
//! discovers which sheet files belong to which export batch. Spreadsheet
//! parsing itself is out of scope; sheets arrive as delimited text, one
//! file per sheet.

pub mod discovery;
pub mod error;
pub mod sheet;

pub use discovery::{classify_sheet_file, list_batch_dirs, list_sheet_files};
pub use error::IngestError;
pub use sheet::{RawSheet, read_sheet};
