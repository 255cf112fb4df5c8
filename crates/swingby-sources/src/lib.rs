//! # swingby-sources
//!
//! Bibliographic source adapters and the multi-source article reconciler.
//!
//! Three providers are wired in (arXiv, Crossref, ADS), each behind the
//! [`BibliographicSource`] trait from `swingby-core`. The [`Reconciler`]
//! queries them in priority order, merges partial results first-writer-wins,
//! and walks a fallback graph of identifier re-queries for anything still
//! missing. The [`ReferenceResolver`] turns raw outgoing references into
//! SBKeys, calling the language-model citation parser only for unstructured
//! entries.

pub mod ads;
pub mod arxiv;
pub mod crossref;
pub mod merge;
pub mod mock;
pub mod reconciler;
pub mod resolver;

pub use ads::AdsSource;
pub use arxiv::ArxivSource;
pub use crossref::CrossrefSource;
pub use merge::merge_partial;
pub use mock::MockSource;
pub use reconciler::Reconciler;
pub use resolver::ReferenceResolver;

use std::sync::Arc;

use swingby_core::traits::BibliographicSource;
use swingby_core::Result;

/// The production source set in priority order: arXiv, Crossref, ADS.
///
/// The ADS credential is required; its absence is a configuration error,
/// fatal at startup rather than silently degrading the set.
pub fn default_sources() -> Result<Vec<Arc<dyn BibliographicSource>>> {
    Ok(vec![
        Arc::new(ArxivSource::new()?),
        Arc::new(CrossrefSource::new()?),
        Arc::new(AdsSource::from_env()?),
    ])
}
