#![forbid(unsafe_code)]

//! Vitrine public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from the catalog and forms crates and offers a
//! lightweight prelude for day-to-day usage.

use std::fmt;

// --- Catalog re-exports ----------------------------------------------------

pub use vitrine_catalog::arrange::{arrange, arrange_with, Arrangement};
pub use vitrine_catalog::manifest::{CatalogItem, ContentSource, Manifest, ManifestError, Tier};
pub use vitrine_catalog::rng::{EntropyRng, RandomSource, SplitMix};

// --- Forms re-exports ------------------------------------------------------

pub use vitrine_forms::checkout::{CheckoutState, Field, FieldSet, OrderDraft, Product};
pub use vitrine_forms::national_id;
pub use vitrine_forms::remote::{
    CheckOutcome, CheckToken, CodeCache, Debouncer, RemoteCheckConfig, RemoteCheckCoordinator,
};
pub use vitrine_forms::validators::{
    AccountIdPolicy, CodeShape, ValidationError, ValidationResult, Validator,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for vitrine apps.
#[derive(Debug)]
pub enum Error {
    /// Manifest loading or validation failure.
    Manifest(ManifestError),
    /// Form-level error with message.
    Form(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest(err) => write!(f, "{err}"),
            Self::Form(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Manifest(err) => Some(err),
            Self::Form(_) => None,
        }
    }
}

impl From<ManifestError> for Error {
    fn from(err: ManifestError) -> Self {
        Self::Manifest(err)
    }
}

/// Standard result type for vitrine APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        arrange, arrange_with, Arrangement, CatalogItem, CheckOutcome, CheckoutState, Error,
        Field, Manifest, Product, RandomSource, RemoteCheckCoordinator, Result, SplitMix, Tier,
        ValidationResult,
    };

    pub use crate::{catalog, forms};
}

pub use vitrine_catalog as catalog;
pub use vitrine_forms as forms;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_error_converts() {
        let manifest_err = Manifest::from_json("not json").unwrap_err();
        let err: Error = manifest_err.into();
        assert!(matches!(err, Error::Manifest(_)));
        assert!(!format!("{err}").is_empty());
    }

    #[test]
    fn facade_paths_line_up() {
        // A manifest tier can be arranged and its items fed to the form.
        let manifest = Manifest::from_json(
            r#"{
                "baseUrl": "https://cdn.example.com/",
                "tiers": [
                    { "id": "t", "label": "T", "showFirst": 2,
                      "items": [
                        { "file": "a.webp", "name": "A", "pinned": true },
                        { "file": "b.webp", "name": "B" },
                        { "file": "c.webp", "name": "C" }
                      ] }
                ]
            }"#,
        )
        .unwrap();

        let tier = manifest.tier("t").unwrap();
        let arrangement = tier.arrange(&mut SplitMix::new(1));
        assert_eq!(arrangement.ordered().len(), 3);
        assert_eq!(arrangement.ordered()[0].name, "A");

        let mut form = CheckoutState::new();
        form.select_product(Product {
            id: format!("{}-0", tier.id),
            name: arrangement.ordered()[0].name.clone(),
        });
        assert!(form.selected_product().is_some());
    }
}
