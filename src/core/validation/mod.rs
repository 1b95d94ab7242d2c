//! Field validators and value filters
//!
//! Validators check a value and report a message; filters transform a value
//! (casting, trimming, rounding) before it is validated and stored. Both are
//! plain closures so that model schemas can compose them per field.

pub mod filters;
pub mod validators;
