//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and the conversions to and from the core domain types.

pub mod form;
