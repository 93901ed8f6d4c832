//! Corpus builder with efficient link handling
//!
//! This module provides a mutable builder that uses FxHashMap for O(1)
//! page lookups during construction. Freezing it produces the immutable
//! [`Corpus`] the estimators consume.

use super::csr::Corpus;
use crate::error::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};

/// A page in the corpus builder
#[derive(Debug, Clone)]
pub struct BuilderPage {
    /// The page identifier
    pub name: String,
    /// Outbound links by builder-local page ID
    pub links: FxHashSet<u32>,
}

impl BuilderPage {
    /// Create a new page with no links
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: FxHashSet::default(),
        }
    }
}

/// A mutable corpus builder optimized for incremental construction
///
/// Builder IDs follow insertion order. They are *not* the IDs of the built
/// [`Corpus`], which renumbers pages in sorted name order.
#[derive(Debug)]
pub struct CorpusBuilder {
    /// Maps page name -> builder ID
    name_to_id: FxHashMap<String, u32>,
    /// Page storage
    pages: Vec<BuilderPage>,
}

impl Default for CorpusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self {
            name_to_id: FxHashMap::default(),
            pages: Vec::new(),
        }
    }

    /// Create a builder with pre-allocated capacity
    pub fn with_capacity(page_capacity: usize) -> Self {
        Self {
            name_to_id: FxHashMap::with_capacity_and_hasher(page_capacity, Default::default()),
            pages: Vec::with_capacity(page_capacity),
        }
    }

    /// Get or create a page with the given name, returning its builder ID
    pub fn get_or_create_page(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }

        let id = self.pages.len() as u32;
        self.name_to_id.insert(name.to_string(), id);
        self.pages.push(BuilderPage::new(name));
        id
    }

    /// Add a directed link between two pages
    ///
    /// Self-links are ignored and repeated links collapse into one.
    pub fn add_link(&mut self, from: u32, to: u32) {
        if from == to {
            return;
        }
        if (to as usize) >= self.pages.len() {
            return;
        }
        if let Some(page) = self.pages.get_mut(from as usize) {
            page.links.insert(to);
        }
    }

    /// Add a directed link by page name, creating either page if needed
    pub fn add_link_by_name(&mut self, from: &str, to: &str) {
        let from = self.get_or_create_page(from);
        let to = self.get_or_create_page(to);
        self.add_link(from, to);
    }

    /// Get the number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get the total number of links
    pub fn link_count(&self) -> usize {
        self.pages.iter().map(|p| p.links.len()).sum()
    }

    /// Get a page by builder ID
    pub fn get_page(&self, id: u32) -> Option<&BuilderPage> {
        self.pages.get(id as usize)
    }

    /// Get a builder ID by page name
    pub fn page_id(&self, name: &str) -> Option<u32> {
        self.name_to_id.get(name).copied()
    }

    /// Iterate over all pages
    pub fn pages(&self) -> impl Iterator<Item = (u32, &BuilderPage)> {
        self.pages.iter().enumerate().map(|(i, p)| (i as u32, p))
    }

    /// Check if the builder is empty
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Freeze into an immutable [`Corpus`]
    ///
    /// Fails with [`Error::InvalidCorpus`] when no page was added.
    pub fn build(&self) -> Result<Corpus> {
        if self.is_empty() {
            return Err(Error::InvalidCorpus("corpus has no pages".to_string()));
        }
        Ok(Corpus::from_builder(self))
    }
}
