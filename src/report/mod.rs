//! Report output: the single XLSX timeline workbook.

pub mod xlsx;
