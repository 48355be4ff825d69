pub mod console;
pub mod excel_write;
pub mod retrieval;
