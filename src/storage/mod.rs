pub mod csv;
pub mod report;

pub use self::csv::{read_products, CsvStorage};
pub use report::{RunReport, SourceReport, SourceStatus};
