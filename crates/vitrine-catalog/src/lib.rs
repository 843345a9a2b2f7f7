#![forbid(unsafe_code)]

//! Catalog core for Vitrine: manifest data model and the pin-aware
//! arrangement engine.
//!
//! A storefront page loads a manifest document describing one or more
//! [`Tier`]s of catalog items. On every load each tier is re-arranged:
//! pinned items keep their manifest order at the front, the rest are
//! shuffled, and a small featured subset is drawn from the initially
//! visible slice. See [`arrange_with`] for the exact policy.
//!
//! Randomness is always injected through [`RandomSource`], so callers can
//! pin arrangements with a seeded [`SplitMix`] or take fresh draws per load
//! with [`EntropyRng`].

pub mod arrange;
pub mod manifest;
pub mod rng;

pub use arrange::{arrange, arrange_with, Arrangement};
pub use manifest::{CatalogItem, ContentSource, Manifest, ManifestError, Tier};
pub use rng::{EntropyRng, RandomSource, SplitMix};
