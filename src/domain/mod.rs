pub mod extraction_record;
pub mod forwarded_date;
pub mod market;

pub use extraction_record::*;
pub use forwarded_date::*;
pub use market::*;
