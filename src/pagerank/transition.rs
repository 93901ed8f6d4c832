//! Random-surfer transition model
//!
//! Given the current page, the surfer follows one of its outbound links
//! with probability `damping` and teleports to a uniformly chosen page
//! otherwise. A dangling page teleports uniformly with probability 1.

use crate::graph::Corpus;

/// Distribution over the next page to visit from `page`.
///
/// The result is indexed by page ID and sums to 1.
///
/// # Panics
///
/// Panics if `page` is not a page ID of `corpus`.
pub fn transition(corpus: &Corpus, page: u32, damping: f64) -> Vec<f64> {
    let mut dist = vec![0.0; corpus.num_pages()];
    transition_into(corpus, page, damping, &mut dist);
    dist
}

/// Allocation-free form of [`transition`], writing into `dist`.
///
/// `dist` is resized to the number of pages and fully overwritten.
///
/// # Panics
///
/// Panics if `page` is not a page ID of `corpus`.
pub fn transition_into(corpus: &Corpus, page: u32, damping: f64, dist: &mut Vec<f64>) {
    let n = corpus.num_pages();
    assert!(
        (page as usize) < n,
        "page {page} is not in a corpus of {n} pages"
    );
    dist.resize(n, 0.0);

    let links = corpus.links(page);
    if links.is_empty() {
        dist.fill(1.0 / n as f64);
        return;
    }

    dist.fill((1.0 - damping) / n as f64);
    let follow = damping / links.len() as f64;
    for &target in links {
        dist[target as usize] += follow;
    }
}
