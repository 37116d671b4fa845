//! Assign taxonomy to amplicon reads.
//!
//! Two classifiers are provided, both built on the unique 8-mer words of the query:
//!  - [`SintaxIndex`](crate::sintax::SintaxIndex) - the SINTAX algorithm: a posting-list
//!    index over reference words, bootstrap resampling of the query words and per-rank
//!    confidences derived from the vote counts
//!  - [`NbcIndex`](crate::nbc::NbcIndex) - a Naive Bayesian classifier walking a taxonomy
//!    tree, with bootstrap-agreement confidences per rank
//!
//! Both indices are immutable once built and may be shared between worker threads; every
//! worker owns a mutable workspace created once and reused across queries. The classifiers
//! are deterministic: repeated calls on the same query return identical hits.

mod errors;
pub mod rng;
pub mod taxonomy;
pub mod sintax;
pub mod nbc;

pub use errors::ClassifyError;
