//! Option scopes.
//!
//! Options are name/value pairs sent with every command. Names are
//! normalized so `gui_mode` and `gui-mode` address the same option.
//!
//! An [`OptionStack`] keeps one snapshot per active scope. Pushing a scope
//! copies the top snapshot and applies [`OptionOverrides`] to the copy;
//! popping restores the previous snapshot. An override with no value removes
//! the option rather than sending it empty.
//!
//! # Example
//!
//! ```
//! use xcli_client::session::{OptionOverrides, OptionStack};
//!
//! let mut stack = OptionStack::with_defaults();
//! stack.push(&OptionOverrides::new().set("user", "bob").unset("print_header"));
//! assert_eq!(stack.get("user"), Some("bob"));
//! assert_eq!(stack.get("print-header"), None);
//!
//! stack.pop();
//! assert_eq!(stack.get("user"), None);
//! assert_eq!(stack.get("print-header"), Some("no"));
//! ```

use crate::codec::OptionMap;
use crate::protocol::wire_format::DEFAULT_OPTIONS;

/// Normalize an option name (`_` becomes `-`).
pub fn normalize(name: &str) -> String {
    name.replace('_', "-")
}

/// Ordered option changes; `None` removes the option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    entries: Vec<(String, Option<String>)>,
}

impl OptionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, Some(value.into()));
        self
    }

    pub fn unset(mut self, name: &str) -> Self {
        self.insert(name, None);
        self
    }

    /// Record a change, replacing an earlier change to the same option.
    pub fn insert(&mut self, name: &str, value: Option<String>) {
        let name = normalize(name);
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Fold `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &OptionOverrides) {
        for (name, value) in &other.entries {
            self.insert(name, value.clone());
        }
    }

    /// Look up a change: `Some(None)` means the option is removed.
    pub fn lookup(&self, name: &str) -> Option<Option<&str>> {
        let name = normalize(name);
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_deref())
    }

    pub fn apply(&self, options: &mut OptionMap) {
        for (name, value) in &self.entries {
            match value {
                Some(value) => {
                    options.insert(name.clone(), value.clone());
                }
                None => {
                    options.remove(name);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for OptionOverrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = OptionOverrides::new();
        for (name, value) in iter {
            overrides.insert(name.as_ref(), Some(value.into()));
        }
        overrides
    }
}

/// Stack of option snapshots; the top is active. The bottom snapshot is
/// never popped.
#[derive(Debug, Clone)]
pub struct OptionStack {
    stack: Vec<OptionMap>,
}

impl OptionStack {
    pub fn new(base: OptionMap) -> Self {
        Self { stack: vec![base] }
    }

    /// Stack whose base holds the session defaults.
    pub fn with_defaults() -> Self {
        Self::new(
            DEFAULT_OPTIONS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }

    pub fn top(&self) -> &OptionMap {
        // The base snapshot is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut OptionMap {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.top().get(&normalize(name)).map(String::as_str)
    }

    /// Change the active snapshot in place.
    pub fn set(&mut self, overrides: &OptionOverrides) {
        overrides.apply(self.top_mut());
    }

    pub fn push(&mut self, overrides: &OptionOverrides) {
        let mut next = self.top().clone();
        overrides.apply(&mut next);
        self.stack.push(next);
    }

    pub fn pop(&mut self) -> Option<OptionMap> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Pop back down to `depth` snapshots (at least one).
    pub fn truncate(&mut self, depth: usize) {
        self.stack.truncate(depth.max(1));
    }
}

impl Default for OptionStack {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let stack = OptionStack::with_defaults();
        assert_eq!(stack.get("i-am-sure"), Some("yes"));
        assert_eq!(stack.get("gui_mode"), Some("yes"));
        assert_eq!(stack.get("compress-output"), Some("base64"));
        assert_eq!(stack.top().len(), 5);
    }

    #[test]
    fn test_normalized_names() {
        let overrides = OptionOverrides::new().set("force_output", "no");
        assert_eq!(overrides.lookup("force-output"), Some(Some("no")));
        assert_eq!(overrides.iter().next(), Some(("force-output", Some("no"))));
    }

    #[test]
    fn test_unset_removes_key() {
        let mut stack = OptionStack::with_defaults();
        stack.set(&OptionOverrides::new().unset("compress_output"));
        assert!(!stack.top().contains_key("compress-output"));
    }

    #[test]
    fn test_push_pop_restores() {
        let mut stack = OptionStack::with_defaults();
        stack.set(&OptionOverrides::new().set("user", "admin"));
        stack.push(&OptionOverrides::new().set("user", "bob"));
        assert_eq!(stack.get("user"), Some("bob"));
        assert_eq!(stack.depth(), 2);
        stack.pop();
        assert_eq!(stack.get("user"), Some("admin"));
    }

    #[test]
    fn test_base_never_popped() {
        let mut stack = OptionStack::with_defaults();
        assert!(stack.pop().is_none());
        stack.truncate(0);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.get("gui-mode"), Some("yes"));
    }

    #[test]
    fn test_truncate_pops_layers() {
        let mut stack = OptionStack::with_defaults();
        let depth = stack.depth();
        stack.push(&OptionOverrides::new().set("a", "1"));
        stack.push(&OptionOverrides::new().set("b", "2"));
        assert_eq!(stack.get("a"), Some("1"));
        stack.truncate(depth);
        assert_eq!(stack.get("a"), None);
        assert_eq!(stack.get("b"), None);
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = OptionOverrides::new().set("user", "a").set("password", "x");
        base.merge(&OptionOverrides::new().set("user", "b").unset("password"));
        assert_eq!(base.lookup("user"), Some(Some("b")));
        assert_eq!(base.lookup("password"), Some(None));
        assert_eq!(base.lookup("other"), None);
    }

    #[test]
    fn test_from_iterator() {
        let overrides: OptionOverrides = [("gui_mode", "no")].into_iter().collect();
        let mut map = OptionMap::new();
        overrides.apply(&mut map);
        assert_eq!(map.get("gui-mode").map(String::as_str), Some("no"));
    }
}
