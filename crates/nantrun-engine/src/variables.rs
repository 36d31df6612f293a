//! Build variable substitution (`$NAME` and `${NAME}`)

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([A-Za-z0-9_]+|\{[A-Za-z0-9_.]+\})").expect("variable pattern is valid")
});

/// Values of the job's build variables (parameters), by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableResolver {
    values: HashMap<String, String>,
}

impl VariableResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for VariableResolver
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Replace `$NAME` and `${NAME}` with values from `resolver`.
///
/// References to unknown variables are left as written.
#[must_use]
pub fn replace_macro(input: &str, resolver: &VariableResolver) -> String {
    VARIABLE
        .replace_all(input, |caps: &Captures<'_>| {
            let name = caps[1].trim_start_matches('{').trim_end_matches('}');
            match resolver.resolve(name) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
