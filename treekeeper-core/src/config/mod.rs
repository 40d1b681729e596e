//! Layered configuration (§2.1, §3.1): `defaults()` → optional TOML file →
//! CLI flag overrides, producing a compiled [`crate::filter::FilterConfig`],
//! a [`BoardsConfig`], and [`RunSettings`].

include!("schema.rs");
include!("defaults.rs");
include!("merge.rs");
include!("load.rs");
include!("validate.rs");
