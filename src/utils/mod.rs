pub mod errors;
pub mod page;
pub mod table;

pub use errors::{extract_clean_error, LedgerError};
pub use page::Page;
pub use table::Table;
