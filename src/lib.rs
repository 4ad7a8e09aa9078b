pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod schema;
pub mod store;
pub mod ui;

pub use cli::{Cli, Commands};
pub use commands::{CommandFacade, LinkOpener, SystemOpener};
pub use error::{CatalogError, Result};
pub use models::{CatalogExport, Map, Nade, NadeInput};
pub use store::{CatalogStore, NadeFilters, SortOrder};
