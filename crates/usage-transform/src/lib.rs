//! Core transformations for the usage pipeline.
//!
//! The pipeline stages, in dependency order:
//!
//! 1. **Reshape** ([`reshape`]): one wide export sheet → long, date-keyed
//!    tables, one per device × category.
//! 2. **Filter** ([`filter`]): drop low-signal entity columns below an
//!    activity threshold.
//! 3. **Merge** ([`merge`]): outer-union same-category tables from
//!    different export batches, zero-filling absent cells.
//! 4. **Gap fill** ([`gapfill`]): resample to strict daily cadence and
//!    repair missing days per category policy.
//!
//! All stages are pure functions over [`CategoryFrame`]s; nothing here
//! touches the filesystem.

pub mod date;
pub mod duration;
pub mod error;
pub mod filter;
pub mod frame;
pub mod gapfill;
pub mod key;
pub mod merge;
pub mod numeric;
pub mod reshape;

pub use date::{format_date, parse_export_date};
pub use duration::parse_duration_minutes;
pub use error::{GapFillError, MalformedSheetError, MergeError, ReshapeError};
pub use filter::filter_columns;
pub use frame::{CategoryFrame, DATE_COLUMN};
pub use gapfill::{GapFillOptions, fill_date_gaps};
pub use key::{category_key, device_token, sheet_token};
pub use merge::{concat_unlock_frames, merge_frames};
pub use numeric::round2;
pub use reshape::{ReshapeOptions, reshape_sheet};
