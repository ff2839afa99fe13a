//! Implementation of the `#[derive(Record)]` macro.
//!
//! This module provides derive macro support for sift records,
//! generating member lookups and field constants from struct annotations.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
