use crate::constants::BUILTIN_FALLBACKS;
use crate::errors::ResolveError;
use crate::model::Address;
use std::path::Path;

/// Ordered history of addresses that answered before, most recently confirmed first
///
/// Entries are distinct and never exceed the cap. On disk the list is a JSON
/// array of address strings, the same literal sequence the host-side tool edits.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackList {
    entries: Vec<Address>,
    cap: usize,
}

impl FallbackList {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cap: cap.max(1),
        }
    }

    /// Build from an ordered sequence, dropping duplicates and trimming to the cap
    pub fn with_entries<I>(entries: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = Address>,
    {
        let mut list = Self::new(cap);
        for address in entries {
            if !list.entries.contains(&address) {
                list.entries.push(address);
            }
        }
        list.entries.truncate(list.cap);
        list
    }

    pub fn builtin(cap: usize) -> Self {
        Self::with_entries(BUILTIN_FALLBACKS.iter().filter_map(|a| a.parse().ok()), cap)
    }

    /// Read the list from `path`
    pub fn load(path: &Path, cap: usize) -> Result<Self, ResolveError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<Address> = serde_json::from_str(&raw)?;
        Ok(Self::with_entries(entries, cap))
    }

    /// Read the list from `path`, using the built-in list if that fails
    pub fn load_or_builtin(path: &Path, cap: usize) -> Self {
        Self::load(path, cap).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "using built-in fallback list");
            Self::builtin(cap)
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ResolveError> {
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    pub fn list(&self) -> &[Address] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move `address` to the front, inserting it if absent, then trim to the cap
    pub fn record_success(&mut self, address: Address) {
        self.entries.retain(|existing| existing != &address);
        self.entries.insert(0, address);
        self.entries.truncate(self.cap);
    }
}
