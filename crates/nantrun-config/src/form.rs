//! Installation list import from parallel name/home arrays

use tracing::debug;

use crate::installation::Installation;

/// Pair up `names[i]` with `homes[i]`.
///
/// Only the first `min(names.len(), homes.len())` pairs are considered, and
/// pairs with an empty name or an empty home are dropped.
#[must_use]
pub fn installations_from_form(names: &[String], homes: &[String]) -> Vec<Installation> {
    names
        .iter()
        .zip(homes)
        .filter_map(|(name, home)| {
            if name.is_empty() || home.is_empty() {
                debug!(name = %name, home = %home, "Skipping incomplete installation entry");
                None
            } else {
                Some(Installation::new(name.clone(), home.clone()))
            }
        })
        .collect()
}
