//! Read-only graph queries.

pub mod inspect;
