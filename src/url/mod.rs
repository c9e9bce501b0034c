//! URL handling module for Trawl
//!
//! This module provides URL canonicalization (fragment removal) and the
//! authority + path-prefix scope test that bounds every crawl.

mod normalize;
mod scope;

pub use normalize::{canonicalize, canonicalize_url};
pub use scope::Scope;
