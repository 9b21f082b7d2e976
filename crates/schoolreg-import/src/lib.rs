//! Spreadsheet-facing import and export for the school directory.
//!
//! Decoding CSV or XLSX is left to the caller: an import source hands over
//! header names and cells (or ready [`RawRow`](schoolreg_core::row::RawRow)s),
//! and an export is produced as headers plus rendered string cells.
//!
//! # Quick start
//!
//! ```no_run
//! # async fn demo(store: impl schoolreg_core::store::SchoolStore + 'static) {
//! use std::sync::Arc;
//!
//! use schoolreg_import::{ColumnMap, ImportOptions, Importer, run_import};
//!
//! let map = ColumnMap::guess(&["School No", "Name", "Type", "Category"]);
//! let row = map.row(vec!["sch 001".into(), "central college".into(), "1ab".into(), "National".into()]).unwrap();
//! let report = run_import(Arc::new(Importer::new(store)), vec![row], ImportOptions::default())
//!   .await
//!   .unwrap();
//! println!("{}", report.summary);
//! # }
//! ```

pub mod columns;
pub mod error;
pub mod exporter;
pub mod importer;

pub use columns::{ColumnMap, IMPORT_COLUMNS, ImportColumn};
pub use error::{Error, Result};
pub use exporter::{EXPORT_COLUMNS, Export, ExportColumn, export};
pub use importer::{ImportOptions, ImportReport, Importer, RowFailure, run_import};
