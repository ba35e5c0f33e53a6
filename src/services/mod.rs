pub mod extraction_client;
pub mod sheet_writer;
pub mod sheets_client;

pub use extraction_client::*;
pub use sheet_writer::*;
pub use sheets_client::*;
