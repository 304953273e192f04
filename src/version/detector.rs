//! Change detection against the previously stored version

#[cfg(test)]
use mockall::automock;

use tracing::{debug, info};

use crate::version::error::PersistenceError;

/// Single-value storage for the last reported version
#[cfg_attr(test, automock)]
pub trait StateStore {
    /// Previously stored value, `None` when nothing was recorded yet
    fn load(&self) -> Result<Option<String>, PersistenceError>;

    /// Replace the stored value
    fn save(&self, version: &str) -> Result<(), PersistenceError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSignal {
    NewVersion {
        previous: Option<String>,
        current: String,
    },
    Unchanged {
        current: String,
    },
}

impl ChangeSignal {
    pub fn is_new(&self) -> bool {
        matches!(self, ChangeSignal::NewVersion { .. })
    }

    pub fn current(&self) -> &str {
        match self {
            ChangeSignal::NewVersion { current, .. } | ChangeSignal::Unchanged { current } => {
                current
            }
        }
    }
}

/// Compare `selected` with the stored value and persist it when it differs.
///
/// Comparison is textual; callers pass the canonical rendering so the stored
/// value never drifts between `11.1` and `11.01`.
pub fn detect_change<S: StateStore + ?Sized>(
    store: &S,
    selected: &str,
) -> Result<ChangeSignal, PersistenceError> {
    let previous = store.load()?;

    if previous.as_deref() == Some(selected) {
        debug!("Stored version {} is current", selected);
        return Ok(ChangeSignal::Unchanged {
            current: selected.to_string(),
        });
    }

    store.save(selected)?;
    info!("Stored version updated: {:?} -> {}", previous, selected);

    Ok(ChangeSignal::NewVersion {
        previous,
        current: selected.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    #[test]
    fn detect_change_saves_newer_value() {
        let mut store = MockStateStore::new();
        store
            .expect_load()
            .times(1)
            .returning(|| Ok(Some("10.90".to_string())));
        store
            .expect_save()
            .with(eq("11.01"))
            .times(1)
            .returning(|_| Ok(()));

        let signal = detect_change(&store, "11.01").unwrap();

        assert_eq!(
            signal,
            ChangeSignal::NewVersion {
                previous: Some("10.90".to_string()),
                current: "11.01".to_string(),
            }
        );
    }

    #[test]
    fn detect_change_leaves_identical_value_untouched() {
        let mut store = MockStateStore::new();
        store
            .expect_load()
            .times(1)
            .returning(|| Ok(Some("11.01".to_string())));
        store.expect_save().never();

        let signal = detect_change(&store, "11.01").unwrap();

        assert!(!signal.is_new());
        assert_eq!(signal.current(), "11.01");
    }

    #[test]
    fn detect_change_treats_missing_state_as_new() {
        let mut store = MockStateStore::new();
        store.expect_load().times(1).returning(|| Ok(None));
        store.expect_save().times(1).returning(|_| Ok(()));

        let signal = detect_change(&store, "11.01").unwrap();

        assert_eq!(
            signal,
            ChangeSignal::NewVersion {
                previous: None,
                current: "11.01".to_string(),
            }
        );
    }

    #[test]
    fn detect_change_compares_text_not_keys() {
        let mut store = MockStateStore::new();
        store
            .expect_load()
            .returning(|| Ok(Some("11.1".to_string())));
        store.expect_save().times(1).returning(|_| Ok(()));

        assert!(detect_change(&store, "11.01").unwrap().is_new());
    }

    #[test]
    fn detect_change_surfaces_write_failures() {
        let mut store = MockStateStore::new();
        store.expect_load().returning(|| Ok(None));
        store.expect_save().returning(|_| {
            Err(PersistenceError::Write {
                path: PathBuf::from("latest_oneview.txt"),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        });

        let result = detect_change(&store, "11.01");

        assert!(matches!(result, Err(PersistenceError::Write { .. })));
    }
}
