//! Configuration access port trait.
//!
//! Typed lookups over a `[section] key = value` store. Absent string keys
//! surface as `None`; numeric lookups fall back to the supplied default.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
}
