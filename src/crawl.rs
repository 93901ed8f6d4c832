//! Corpus discovery from a directory of HTML pages
//!
//! Every `*.html` file directly inside the directory is a page named by its
//! file name. Its outbound links are the `href` targets of its `<a>` tags
//! that name another page of the corpus.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::graph::Corpus;

lazy_static! {
    static ref ANCHOR_HREF_RE: Regex = Regex::new(r#"<a\s+(?:[^>]*?)href="([^"]*)""#).unwrap();
}

/// Extract the `href` targets of every `<a>` tag in `html`
pub fn extract_links(html: &str) -> BTreeSet<String> {
    ANCHOR_HREF_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Build a corpus from the HTML files in `dir`
///
/// Self-links and links to files outside the corpus are dropped.
/// Fails with [`Error::InvalidCorpus`] when the directory holds no HTML
/// files and with [`Error::Io`] when it cannot be read.
pub fn crawl(dir: impl AsRef<Path>) -> Result<Corpus> {
    let dir = dir.as_ref();
    let mut pages: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !name.ends_with(".html") {
            continue;
        }

        let contents = std::fs::read_to_string(entry.path())?;
        pages.insert(name.to_string(), extract_links(&contents));
    }

    if pages.is_empty() {
        return Err(Error::InvalidCorpus(format!(
            "no .html pages in {}",
            dir.display()
        )));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(dir = %dir.display(), pages = pages.len(), "crawled corpus");

    Corpus::from_links_lossy(pages)
}
