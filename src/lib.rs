//! # link-rank
//!
//! Ranks the pages of a hyperlink corpus by estimating the stationary
//! distribution of a random surfer who follows an outbound link with
//! probability `damping` and otherwise jumps to a uniformly chosen page.
//!
//! Two independent estimators are provided:
//!
//! - [`SamplingPageRank`] walks the chain for a fixed number of samples and
//!   averages the transition distributions it sees.
//! - [`IterativePageRank`] applies the PageRank recurrence until no page
//!   moves by more than a tolerance.
//!
//! ```rust,ignore
//! use link_rank::{Corpus, IterativePageRank, SamplingPageRank};
//!
//! let corpus = Corpus::from_links([("a", vec!["b"]), ("b", vec!["a"])])?;
//! let sampled = SamplingPageRank::new().with_seed(1).run(&corpus)?;
//! let iterated = IterativePageRank::new().run(&corpus)?;
//! for (page, rank) in iterated.to_map(&corpus) {
//!     println!("{page}: {rank:.4}");
//! }
//! ```

pub mod crawl;
pub mod error;
pub mod graph;
pub mod pagerank;
pub mod pipeline;

pub use crawl::crawl;
pub use error::{Error, Result};
pub use graph::{Corpus, CorpusBuilder};
pub use pagerank::iterative::IterativePageRank;
pub use pagerank::sampling::SamplingPageRank;
pub use pagerank::transition::transition;
pub use pagerank::RankResult;
pub use pipeline::runner::{RankPipeline, RankReport};
pub use pipeline::spec::RankSpec;
