//! Proc macros for sift.
//!
//! This crate provides the derive macro that turns plain structs into
//! records readable by sift criteria. Use it through the `sift` crate's
//! `derive` feature rather than depending on it directly.
//!
//! # Available Macros
//!
//! - [`Record`] - Generate `sift::Record` member lookups and field constants
//!
//! # Examples
//!
//! For working examples, see `sift/tests/derive.rs`.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Record` trait for structs with named fields.
///
/// This macro generates an implementation of `sift::Record`, making the
/// struct's fields readable by criteria and field paths.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | *(none)* | `pub` fields are exposed under their own name; other fields are hidden |
/// | `field` | Expose a non-`pub` field |
/// | `skip` | Never expose this field |
/// | `rename = "..."` | Expose under a custom name (implies `field`) |
/// | `nested` | The field's type implements `Record`; dotted paths descend into it (implies `field`) |
///
/// Field values are converted with `sift::ToValue`.
///
/// # Container Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `methods(a, b, ...)` | Expose zero-argument methods; their return type must implement `ToValue` |
///
/// A method shadows a field of the same name. Getter-style names such as
/// `get_total` or `is_active` are found when criteria refer to `total` or
/// `active`.
///
/// # Generated Code
///
/// The macro generates:
///
/// 1. Name constants for every exposed member (e.g., `Task::NAME`, `Task::GET_TOTAL`)
/// 2. `Record::member()` resolving those names
/// 3. `Record::snapshot()` returning every exposed field as a `Value::Map`
///
/// # Example
///
/// ```ignore
/// use sift::{Collection, Criteria, Record, Selectable};
///
/// #[derive(Clone, Record)]
/// #[record(methods(is_urgent))]
/// struct Task {
///     pub name: String,
///     #[record(field)]
///     priority: u8,
///     #[record(nested)]
///     pub owner: Person,
///     #[record(skip)]
///     pub cache: Vec<u8>,
/// }
///
/// impl Task {
///     fn is_urgent(&self) -> bool {
///         self.priority > 3
///     }
/// }
///
/// #[derive(Clone, Record)]
/// struct Person {
///     pub name: String,
/// }
///
/// let eb = Criteria::expr();
/// let criteria = Criteria::create()
///     .where_(eb.eq("urgent", true))
///     .and_where(eb.eq("owner.name", "ada"));
///
/// let tasks: Collection<usize, Task> = Collection::new();
/// let urgent = tasks.matching(&criteria)?;
/// assert_eq!(Task::PRIORITY, "priority");
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
