pub mod table_csv;

pub use table_csv::{read_table_csv, read_table_csv_with_delimiter};
