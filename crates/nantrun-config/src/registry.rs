//! Installation registry with whole-list replacement

use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::form::installations_from_form;
use crate::installation::Installation;

/// Immutable snapshot of the configured installations.
///
/// Cloning is cheap; a snapshot never changes after it is taken, so an
/// invocation holding one is unaffected by a concurrent configuration save.
#[derive(Debug, Clone, Default)]
pub struct Installations(Arc<[Installation]>);

impl Installations {
    #[must_use]
    pub fn new(installations: Vec<Installation>) -> Self {
        Self(installations.into())
    }

    /// Find the installation called `name`. The first match wins on duplicates.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Installation> {
        self.0.iter().find(|installation| installation.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Installation> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Installation>> for Installations {
    fn from(installations: Vec<Installation>) -> Self {
        Self::new(installations)
    }
}

/// Holder of the current installation list.
///
/// Readers take [`snapshot`](Self::snapshot)s; writers swap the whole list
/// with [`replace_all`](Self::replace_all). No reader ever sees a partially
/// updated list.
#[derive(Debug, Default)]
pub struct InstallationRegistry {
    current: RwLock<Installations>,
}

impl InstallationRegistry {
    #[must_use]
    pub fn new(installations: Vec<Installation>) -> Self {
        Self {
            current: RwLock::new(Installations::new(installations)),
        }
    }

    /// The list as it is right now.
    #[must_use]
    pub fn snapshot(&self) -> Installations {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new list, as done on every configuration save.
    pub fn replace_all(&self, installations: Vec<Installation>) {
        let next = Installations::new(installations);
        debug!(count = next.len(), "Replacing installation list");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Resolve `name` against the current list.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Installation> {
        self.snapshot().resolve(name).cloned()
    }

    /// Replace the list from parallel name/home arrays as submitted by a
    /// configuration form. Returns how many installations were kept.
    pub fn configure_from_form(&self, names: &[String], homes: &[String]) -> usize {
        let installations = installations_from_form(names, homes);
        let count = installations.len();
        self.replace_all(installations);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_resolve_in_empty_registry() {
        let registry = InstallationRegistry::default();
        assert!(registry.resolve("nant-0.92").is_none());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_resolve_non_matching_name() {
        let registry = InstallationRegistry::new(vec![Installation::new("nant-0.85", "/opt/a")]);
        assert!(registry.resolve("nant-0.92").is_none());
        assert!(registry.resolve("NAnt-0.85").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn test_resolve_exact_match() {
        let registry = InstallationRegistry::new(vec![
            Installation::new("nant-0.85", "/opt/a"),
            Installation::new("nant-0.92", "/opt/b"),
        ]);
        let found = registry.resolve("nant-0.92").unwrap();
        assert_eq!(found.home, std::path::PathBuf::from("/opt/b"));
    }

    #[test]
    fn test_duplicate_names_first_match_wins() {
        let snapshot = Installations::new(vec![
            Installation::new("nant", "/opt/first"),
            Installation::new("nant", "/opt/second"),
        ]);
        assert_eq!(
            snapshot.resolve("nant").unwrap().home,
            std::path::PathBuf::from("/opt/first")
        );
    }

    #[test]
    fn test_snapshot_unaffected_by_replace_all() {
        let registry = InstallationRegistry::new(vec![Installation::new("old", "/opt/old")]);
        let before = registry.snapshot();

        registry.replace_all(vec![
            Installation::new("new-a", "/opt/a"),
            Installation::new("new-b", "/opt/b"),
        ]);

        assert_eq!(before.len(), 1);
        assert!(before.resolve("old").is_some());
        let after = registry.snapshot();
        assert_eq!(after.len(), 2);
        assert!(after.resolve("old").is_none());
    }

    #[test]
    fn test_concurrent_readers_never_see_mixed_lists() {
        let registry = Arc::new(InstallationRegistry::new(vec![
            Installation::new("a", "/a"),
            Installation::new("a", "/a"),
        ]));

        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..200 {
                    let name = if i % 2 == 0 { "b" } else { "a" };
                    registry.replace_all(vec![
                        Installation::new(name, format!("/{name}")),
                        Installation::new(name, format!("/{name}")),
                    ]);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = registry.snapshot();
                        let names: Vec<_> = snapshot.iter().map(|i| i.name.clone()).collect();
                        assert_eq!(names.len(), 2);
                        assert_eq!(names[0], names[1], "torn list: {names:?}");
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_configure_from_form_replaces_list() {
        let registry = InstallationRegistry::new(vec![Installation::new("old", "/opt/old")]);
        let kept = registry.configure_from_form(
            &["nant-0.92".to_string()],
            &["/opt/nant-0.92".to_string()],
        );
        assert_eq!(kept, 1);
        assert!(registry.resolve("old").is_none());
        assert!(registry.resolve("nant-0.92").is_some());
    }
}
