//! Integration tests for crawling HTML corpora and ranking them end to end.

use std::fs;
use std::path::Path;

use link_rank::pipeline::observer::{StageTimingObserver, STAGE_CORPUS};
use link_rank::{crawl, Error, RankPipeline, RankSpec};
use tempfile::TempDir;

fn write_page(dir: &Path, name: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|l| format!("<li><a href=\"{l}\">{l}</a></li>\n"))
        .collect();
    let html = format!("<!DOCTYPE html>\n<html><body><ul>\n{anchors}</ul></body></html>\n");
    fs::write(dir.join(name), html).unwrap();
}

fn sample_corpus() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_page(dir.path(), "1.html", &["2.html"]);
    write_page(dir.path(), "2.html", &["1.html", "3.html"]);
    write_page(dir.path(), "3.html", &["2.html", "4.html"]);
    write_page(dir.path(), "4.html", &["2.html"]);
    dir
}

#[test]
fn crawl_builds_link_map() {
    let dir = sample_corpus();
    let corpus = crawl(dir.path()).unwrap();

    let map = corpus.to_link_map();
    assert_eq!(map.len(), 4);
    assert_eq!(map["2.html"].iter().collect::<Vec<_>>(), vec!["1.html", "3.html"]);
    assert_eq!(map["4.html"].iter().collect::<Vec<_>>(), vec!["2.html"]);
}

#[test]
fn crawl_drops_self_and_external_links() {
    let dir = TempDir::new().unwrap();
    write_page(
        dir.path(),
        "home.html",
        &["home.html", "about.html", "https://example.com/", "missing.html"],
    );
    write_page(dir.path(), "about.html", &[]);

    let corpus = crawl(dir.path()).unwrap();
    let home = corpus.page_id("home.html").unwrap();
    let about = corpus.page_id("about.html").unwrap();

    assert_eq!(corpus.links(home), &[about]);
    assert!(corpus.is_dangling(about));
}

#[test]
fn crawl_ignores_other_files_and_subdirectories() {
    let dir = sample_corpus();
    fs::write(dir.path().join("notes.txt"), "<a href=\"1.html\">x</a>").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    write_page(&dir.path().join("nested"), "5.html", &["1.html"]);

    let corpus = crawl(dir.path()).unwrap();
    assert_eq!(corpus.num_pages(), 4);
    assert!(corpus.page_id("5.html").is_none());
}

#[cfg(unix)]
#[test]
fn crawl_follows_symlinked_pages() {
    let dir = sample_corpus();
    let shared = TempDir::new().unwrap();
    write_page(shared.path(), "faq.html", &["1.html"]);
    std::os::unix::fs::symlink(shared.path().join("faq.html"), dir.path().join("faq.html"))
        .unwrap();

    let corpus = crawl(dir.path()).unwrap();
    assert_eq!(corpus.num_pages(), 5);
    let faq = corpus.page_id("faq.html").unwrap();
    let one = corpus.page_id("1.html").unwrap();
    assert_eq!(corpus.links(faq), &[one]);
}

#[test]
fn crawl_empty_directory_is_invalid() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(crawl(dir.path()), Err(Error::InvalidCorpus(_))));
}

#[test]
fn crawl_missing_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");
    assert!(matches!(crawl(&missing), Err(Error::Io(_))));
}

#[test]
fn pipeline_ranks_crawled_corpus() {
    let dir = sample_corpus();
    let spec = RankSpec::from_json(r#"{ "v": 1, "seed": 17, "samples": 20000 }"#).unwrap();
    let pipeline = RankPipeline::from_spec(spec).unwrap();
    let mut observer = StageTimingObserver::new();

    let (corpus, report) = pipeline.run_dir(dir.path(), &mut observer).unwrap();

    assert_eq!(observer.stages[0].0, STAGE_CORPUS);
    assert_eq!(observer.stages[0].1.pages, Some(4));
    assert_eq!(observer.stages.len(), 3);

    let named = report.to_named(&corpus);
    let iterated = named.iteration.unwrap();
    let sampled = named.sampling.unwrap();

    // 2.html is linked from every other page
    let best = iterated
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(page, _)| page.as_str());
    assert_eq!(best, Some("2.html"));

    for page in ["1.html", "2.html", "3.html", "4.html"] {
        assert!((iterated[page] - sampled[page]).abs() < 0.05);
    }
    assert!((iterated.values().sum::<f64>() - 1.0).abs() < 1e-3);
}
