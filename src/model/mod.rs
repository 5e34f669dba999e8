// Aggregates the split model files
pub mod entry;
pub mod parser;

pub use entry::Entry;
pub use parser::{format_header_date, parse_date_input};
