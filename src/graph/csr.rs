//! Compressed Sparse Row (CSR) corpus representation
//!
//! CSR is optimized for iteration over neighbors. The corpus keeps two
//! row sets: out-links, which the transition model and the sampler follow,
//! and in-links, which the iterative estimator sums over.

use std::collections::{BTreeMap, BTreeSet};

use super::builder::CorpusBuilder;
use crate::error::{Error, Result};

/// An immutable hyperlink corpus in Compressed Sparse Row format
///
/// Page IDs are dense `u32`s assigned in lexicographic order of the page
/// names, so ID order is also the deterministic output order. Every link
/// target is a page of the corpus and no page links to itself.
#[derive(Debug, Clone)]
pub struct Corpus {
    /// Page names, sorted; index is the page ID
    names: Vec<String>,
    /// Row pointers: page i's out-links are at out_idx[out_ptr[i]..out_ptr[i+1]]
    out_ptr: Vec<usize>,
    /// Out-link targets, sorted within each row
    out_idx: Vec<u32>,
    /// Row pointers for in-links
    in_ptr: Vec<usize>,
    /// In-link sources, sorted within each row
    in_idx: Vec<u32>,
}

impl Corpus {
    /// Convert a [`CorpusBuilder`] into CSR format
    ///
    /// Callers outside the crate go through [`CorpusBuilder::build`], which
    /// rejects an empty builder.
    pub(crate) fn from_builder(builder: &CorpusBuilder) -> Self {
        let num_pages = builder.page_count();

        // Renumber builder IDs into sorted-name order
        let mut order: Vec<(u32, &str)> = builder
            .pages()
            .map(|(id, page)| (id, page.name.as_str()))
            .collect();
        order.sort_by(|a, b| a.1.cmp(b.1));

        let mut remap = vec![0u32; num_pages];
        for (new_id, &(old_id, _)) in order.iter().enumerate() {
            remap[old_id as usize] = new_id as u32;
        }

        let mut names = Vec::with_capacity(num_pages);
        let mut out_ptr = Vec::with_capacity(num_pages + 1);
        let mut out_idx = Vec::with_capacity(builder.link_count());
        let mut in_degree = vec![0usize; num_pages];

        out_ptr.push(0);
        for &(old_id, name) in &order {
            names.push(name.to_string());

            let mut links: Vec<u32> = builder
                .get_page(old_id)
                .map(|page| page.links.iter().map(|&t| remap[t as usize]).collect())
                .unwrap_or_default();
            links.sort_unstable();

            for &target in &links {
                in_degree[target as usize] += 1;
            }
            out_idx.extend(links);
            out_ptr.push(out_idx.len());
        }

        // Transpose; sources are visited in ascending order so rows come out sorted
        let mut in_ptr = Vec::with_capacity(num_pages + 1);
        in_ptr.push(0);
        for degree in &in_degree {
            let last = in_ptr[in_ptr.len() - 1];
            in_ptr.push(last + degree);
        }
        let mut cursor = in_ptr[..num_pages].to_vec();
        let mut in_idx = vec![0u32; out_idx.len()];
        for source in 0..num_pages {
            for &target in &out_idx[out_ptr[source]..out_ptr[source + 1]] {
                in_idx[cursor[target as usize]] = source as u32;
                cursor[target as usize] += 1;
            }
        }

        Self {
            names,
            out_ptr,
            out_idx,
            in_ptr,
            in_idx,
        }
    }

    /// Build a corpus from a `page -> outbound links` mapping, rejecting
    /// any link that breaks the corpus invariants.
    ///
    /// Errors: [`Error::InvalidCorpus`] for an empty mapping,
    /// [`Error::SelfLink`] for a page linking to itself and
    /// [`Error::UnknownLinkTarget`] for a link to a page that is not a key.
    pub fn from_links<I, K, L, T>(links: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, L)>,
        K: AsRef<str>,
        L: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let rows = collect_rows(links);
        let mut builder = CorpusBuilder::with_capacity(rows.len());
        for (page, _) in &rows {
            builder.get_or_create_page(page);
        }

        for (page, targets) in &rows {
            let from = builder.get_or_create_page(page);
            for target in targets {
                if target == page {
                    return Err(Error::SelfLink(page.clone()));
                }
                let to = builder
                    .page_id(target)
                    .ok_or_else(|| Error::UnknownLinkTarget {
                        page: page.clone(),
                        target: target.clone(),
                    })?;
                builder.add_link(from, to);
            }
        }

        builder.build()
    }

    /// Build a corpus from a `page -> outbound links` mapping, dropping
    /// self-links and links to pages that are not keys.
    ///
    /// Still fails with [`Error::InvalidCorpus`] for an empty mapping.
    pub fn from_links_lossy<I, K, L, T>(links: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, L)>,
        K: AsRef<str>,
        L: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let rows = collect_rows(links);
        let mut builder = CorpusBuilder::with_capacity(rows.len());
        for (page, _) in &rows {
            builder.get_or_create_page(page);
        }

        for (page, targets) in &rows {
            let from = builder.get_or_create_page(page);
            for target in targets {
                if let Some(to) = builder.page_id(target) {
                    builder.add_link(from, to);
                }
            }
        }

        builder.build()
    }

    /// Number of pages
    pub fn num_pages(&self) -> usize {
        self.names.len()
    }

    /// Total number of links
    pub fn num_links(&self) -> usize {
        self.out_idx.len()
    }

    /// Outbound links of a page, in ascending ID order
    pub fn links(&self, page: u32) -> &[u32] {
        let start = self.out_ptr[page as usize];
        let end = self.out_ptr[page as usize + 1];
        &self.out_idx[start..end]
    }

    /// Pages linking to `page`, in ascending ID order
    pub fn inbound(&self, page: u32) -> &[u32] {
        let start = self.in_ptr[page as usize];
        let end = self.in_ptr[page as usize + 1];
        &self.in_idx[start..end]
    }

    /// Number of outbound links of a page
    pub fn out_degree(&self, page: u32) -> usize {
        self.out_ptr[page as usize + 1] - self.out_ptr[page as usize]
    }

    /// Whether `page` has no outbound links
    pub fn is_dangling(&self, page: u32) -> bool {
        self.out_degree(page) == 0
    }

    /// Find dangling pages (pages with no outbound links)
    pub fn dangling_pages(&self) -> Vec<u32> {
        (0..self.num_pages() as u32)
            .filter(|&p| self.is_dangling(p))
            .collect()
    }

    /// Name of a page
    pub fn page_name(&self, page: u32) -> &str {
        &self.names[page as usize]
    }

    /// Page ID by name
    pub fn page_id(&self, name: &str) -> Option<u32> {
        self.names
            .binary_search_by(|probe| probe.as_str().cmp(name))
            .ok()
            .map(|i| i as u32)
    }

    /// All page names in ID order
    pub fn pages(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Materialize the `page -> outbound links` mapping
    pub fn to_link_map(&self) -> BTreeMap<String, BTreeSet<String>> {
        (0..self.num_pages() as u32)
            .map(|page| {
                let targets = self
                    .links(page)
                    .iter()
                    .map(|&t| self.page_name(t).to_string())
                    .collect();
                (self.page_name(page).to_string(), targets)
            })
            .collect()
    }
}

/// Flatten a mapping into owned rows, merging repeated keys
fn collect_rows<I, K, L, T>(links: I) -> Vec<(String, Vec<String>)>
where
    I: IntoIterator<Item = (K, L)>,
    K: AsRef<str>,
    L: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut rows: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (page, targets) in links {
        rows.entry(page.as_ref().to_string())
            .or_default()
            .extend(targets.into_iter().map(|t| t.as_ref().to_string()));
    }
    rows.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_test_corpus() -> Corpus {
        Corpus::from_links([
            ("a", vec!["b", "c"]),
            ("b", vec!["c"]),
            ("c", vec!["a"]),
            ("d", vec![]),
        ])
        .unwrap()
    }

    #[test]
    fn test_csr_conversion() {
        let corpus = build_test_corpus();

        assert_eq!(corpus.num_pages(), 4);
        assert_eq!(corpus.num_links(), 4);
        assert_eq!(corpus.pages().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_ids_follow_sorted_names() {
        let mut builder = CorpusBuilder::new();
        builder.add_link_by_name("zeta", "alpha");
        builder.add_link_by_name("mid", "zeta");
        let corpus = builder.build().unwrap();

        assert_eq!(corpus.page_id("alpha"), Some(0));
        assert_eq!(corpus.page_id("mid"), Some(1));
        assert_eq!(corpus.page_id("zeta"), Some(2));
        assert_eq!(corpus.links(2), &[0]);
        assert_eq!(corpus.links(1), &[2]);
    }

    #[test]
    fn test_outbound_and_inbound() {
        let corpus = build_test_corpus();

        assert_eq!(corpus.links(0), &[1, 2]);
        assert_eq!(corpus.out_degree(0), 2);
        // c is linked from a and b
        assert_eq!(corpus.inbound(2), &[0, 1]);
        assert_eq!(corpus.inbound(0), &[2]);
        assert!(corpus.inbound(3).is_empty());
    }

    #[test]
    fn test_dangling_pages() {
        let corpus = build_test_corpus();

        assert_eq!(corpus.dangling_pages(), vec![3]);
        assert!(corpus.is_dangling(3));
        assert!(!corpus.is_dangling(0));
    }

    #[test]
    fn test_page_lookup() {
        let corpus = build_test_corpus();

        assert_eq!(corpus.page_id("b"), Some(1));
        assert_eq!(corpus.page_id("z"), None);
        assert_eq!(corpus.page_name(2), "c");
    }

    #[test]
    fn test_strict_rejects_unknown_target() {
        let err = Corpus::from_links([("a", vec!["b"]), ("c", vec![])]).unwrap_err();
        match err {
            Error::UnknownLinkTarget { page, target } => {
                assert_eq!(page, "a");
                assert_eq!(target, "b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_strict_rejects_self_link() {
        let err = Corpus::from_links([("a", vec!["a"])]).unwrap_err();
        assert!(matches!(err, Error::SelfLink(ref p) if p == "a"));
    }

    #[test]
    fn test_empty_mapping_rejected() {
        let empty: Vec<(&str, Vec<&str>)> = Vec::new();
        assert!(matches!(
            Corpus::from_links(empty.clone()),
            Err(Error::InvalidCorpus(_))
        ));
        assert!(matches!(
            Corpus::from_links_lossy(empty),
            Err(Error::InvalidCorpus(_))
        ));
    }

    #[test]
    fn test_lossy_drops_invalid_links() {
        let corpus =
            Corpus::from_links_lossy([("a", vec!["a", "b", "outside"]), ("b", vec![])]).unwrap();

        assert_eq!(corpus.num_pages(), 2);
        assert_eq!(corpus.num_links(), 1);
        assert_eq!(corpus.links(0), &[1]);
    }

    #[test]
    fn test_link_map_roundtrip() {
        let corpus = build_test_corpus();
        let map = corpus.to_link_map();

        assert_eq!(map.len(), 4);
        assert!(map["a"].contains("b"));
        assert!(map["d"].is_empty());

        let rebuilt = Corpus::from_links(map).unwrap();
        assert_eq!(rebuilt.num_links(), corpus.num_links());
    }
}
