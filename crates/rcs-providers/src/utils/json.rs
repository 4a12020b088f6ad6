//! JSON Value Extension
//!
//! Accessors for loosely-typed JSON documents such as error bodies and
//! bulk-operation reports.

use serde_json::{Map, Value};

/// Extension trait for JSON objects with default fallbacks
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use rcs_providers::utils::JsonExt;
///
/// let report = json!({"Number Deleted": 2, "Response Status": "200 OK"});
/// assert_eq!(report.u64_or("Number Deleted", 0), 2);
/// assert_eq!(report.str_or("Response Body", ""), "");
/// ```
pub trait JsonExt {
    /// Get string value or default
    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str;

    /// Get u64 value or default
    fn u64_or(&self, key: &str, default: u64) -> u64;

    /// Get optional string
    fn opt_str(&self, key: &str) -> Option<&str>;

    /// Get optional array
    fn opt_array(&self, key: &str) -> Option<&Vec<Value>>;
}

trait JsonContainer {
    fn get_value(&self, key: &str) -> Option<&Value>;
}

impl JsonContainer for Value {
    #[inline]
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl JsonContainer for Map<String, Value> {
    #[inline]
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

macro_rules! impl_json_ext {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl JsonExt for $ty {
                #[inline]
                fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
                    self.get_value(key).and_then(Value::as_str).unwrap_or(default)
                }

                #[inline]
                fn u64_or(&self, key: &str, default: u64) -> u64 {
                    self.get_value(key).and_then(Value::as_u64).unwrap_or(default)
                }

                #[inline]
                fn opt_str(&self, key: &str) -> Option<&str> {
                    self.get_value(key).and_then(Value::as_str)
                }

                #[inline]
                fn opt_array(&self, key: &str) -> Option<&Vec<Value>> {
                    self.get_value(key).and_then(Value::as_array)
                }
            }
        )+
    };
}

impl_json_ext!(Value, Map<String, Value>);
