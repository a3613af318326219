//! CLI command handlers, one per file.

mod checksum;
mod fetch;
mod list;
mod path;

pub use checksum::run_checksum;
pub use fetch::run_fetch;
pub use list::run_list;
pub use path::run_path;
