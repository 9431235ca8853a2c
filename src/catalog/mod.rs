//! Hardware catalog validation, storage and browsing.
//!
//! A [`CatalogModel`](store::CatalogModel) is an immutable, validated snapshot
//! of hardware records. It is only obtainable through
//! [`validate_catalog`](store::validate_catalog) (directly or via the JSON
//! loaders), which reports every violation at once.
//!
//! ## Embedded Catalog
//!
//! A sample registry of operando cells is compiled into the binary; custom
//! catalogs can be loaded from JSON files, either as the versioned envelope
//! written by `to_json` or as a bare array of records.
//!
//! ## Example
//!
//! ```rust,no_run
//! use operando_match::CatalogModel;
//! use operando_match::core::types::RecordId;
//! use std::path::Path;
//!
//! let catalog = CatalogModel::load_embedded().unwrap();
//! for record in &catalog {
//!     println!("{} (TRL {})", record.id, record.trl);
//! }
//!
//! let custom = CatalogModel::load_from_file(Path::new("my_cells.json")).unwrap();
//! let cell = custom.get(&RecordId::new("coin_cell_xrd"));
//! ```

pub mod filter;
pub mod matrix;
pub mod store;
