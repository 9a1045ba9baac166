//! Helper functions shared by the content layer and the templates

mod date;

pub use date::*;
