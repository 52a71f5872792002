//! Model list state and display-name mapping
//!
//! Display names live in a data table (`data/model_names.toml`) embedded
//! at compile time, not in code, so the mapping can grow without touching
//! logic.

// Allow unused code that's part of the public API for future features
#![allow(dead_code)]

use std::collections::HashMap;

use serde::Deserialize;

/// Embedded display-name table
const MODEL_NAMES_TOML: &str = include_str!("../data/model_names.toml");

#[derive(Debug, Deserialize)]
struct ModelNameTable {
    models: HashMap<String, String>,
}

/// Ordered model identifiers plus the display-name lookup
#[derive(Debug)]
pub struct ModelList {
    ids: Vec<String>,
    selected: usize,
    names: HashMap<String, String>,
}

impl ModelList {
    /// Create an empty list with the embedded display-name table
    pub fn new() -> Self {
        let names = toml::from_str::<ModelNameTable>(MODEL_NAMES_TOML)
            .map(|t| t.models)
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to parse model name table: {}", e);
                HashMap::new()
            });

        Self {
            ids: Vec::new(),
            selected: 0,
            names,
        }
    }

    /// Replace the identifier list, keeping the current selection if the
    /// selected identifier is still present
    pub fn set_models(&mut self, ids: Vec<String>) {
        let previous = self.selected_id().map(str::to_owned);
        self.ids = ids;
        self.selected = previous
            .and_then(|id| self.ids.iter().position(|m| *m == id))
            .unwrap_or(0);
    }

    /// Select an identifier if it is present in the list
    pub fn select(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|m| m == id) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// Move the selection by one entry, wrapping around
    pub fn cycle(&mut self, forward: bool) {
        if self.ids.is_empty() {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % self.ids.len()
        } else {
            (self.selected + self.ids.len() - 1) % self.ids.len()
        };
    }

    /// Currently selected identifier
    pub fn selected_id(&self) -> Option<&str> {
        self.ids.get(self.selected).map(String::as_str)
    }

    /// Index of the current selection
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// All identifiers, in backend order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Friendly label for an identifier, falling back to the identifier
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Labels for every identifier, in list order
    pub fn display_names(&self) -> Vec<&str> {
        self.ids.iter().map(|id| self.display_name(id)).collect()
    }
}

impl Default for ModelList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table_parses() {
        let list = ModelList::new();
        assert!(!list.names.is_empty());
    }

    #[test]
    fn test_mapped_and_unmapped_names() {
        let mut list = ModelList::new();
        list.set_models(vec!["qwen3:4b".into(), "custom-model".into()]);

        assert_eq!(list.display_names(), vec!["Qwen 3 (4B)", "custom-model"]);
    }

    #[test]
    fn test_select_known_model() {
        let mut list = ModelList::new();
        list.set_models(vec!["qwen3:8b".into(), "llava:7b".into()]);

        assert!(list.select("llava:7b"));
        assert_eq!(list.selected_id(), Some("llava:7b"));
    }

    #[test]
    fn test_select_unknown_model_keeps_selection() {
        let mut list = ModelList::new();
        list.set_models(vec!["qwen3:8b".into()]);

        assert!(!list.select("missing:1b"));
        assert_eq!(list.selected_id(), Some("qwen3:8b"));
    }

    #[test]
    fn test_refresh_preserves_selection_when_possible() {
        let mut list = ModelList::new();
        list.set_models(vec!["a".into(), "b".into(), "c".into()]);
        list.select("b");

        // "b" moved; selection follows it
        list.set_models(vec!["c".into(), "b".into()]);
        assert_eq!(list.selected_id(), Some("b"));

        // "b" gone; selection falls back to the first entry
        list.set_models(vec!["x".into(), "y".into()]);
        assert_eq!(list.selected_id(), Some("x"));
    }

    #[test]
    fn test_cycle_wraps() {
        let mut list = ModelList::new();
        list.set_models(vec!["a".into(), "b".into()]);

        list.cycle(true);
        assert_eq!(list.selected_id(), Some("b"));
        list.cycle(true);
        assert_eq!(list.selected_id(), Some("a"));
        list.cycle(false);
        assert_eq!(list.selected_id(), Some("b"));
    }

    #[test]
    fn test_cycle_empty_list_is_noop() {
        let mut list = ModelList::new();
        list.cycle(true);
        assert!(list.selected_id().is_none());
    }
}
