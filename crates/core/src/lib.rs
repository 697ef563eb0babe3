//! Grading domain for the SQL contest: query screening, result comparison,
//! and the storage ports the server implements.

pub mod domain;
