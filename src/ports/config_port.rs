//! Configuration access port trait.
//!
//! Numeric keys are read as strings and parsed by the caller, so a malformed
//! value is reported instead of silently replaced by its default.

pub trait ConfigPort {
    /// Raw value of `section.key`, or None when either is absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Accepts true/false, yes/no, on/off, 1/0; anything else yields `default`.
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
