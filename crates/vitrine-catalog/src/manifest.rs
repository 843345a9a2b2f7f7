#![forbid(unsafe_code)]

//! Wire-faithful model of the catalog manifest document.
//!
//! The manifest is a JSON document with camelCase keys:
//!
//! ```json
//! {
//!   "baseUrl": "https://cdn.example.com/cards/",
//!   "tiers": [
//!     {
//!       "id": "standard",
//!       "label": "Standard",
//!       "showFirst": 6,
//!       "items": [
//!         { "file": "card-01.webp", "name": "Starter", "pinned": true },
//!         { "url": "https://other.example.com/promo.webp", "name": "Promo" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Items are immutable once loaded; identity is positional within a tier.
//! [`Manifest::from_json`] parses and structurally validates in one step so
//! downstream code never sees an item without a content source.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ManifestError
// ---------------------------------------------------------------------------

/// Failure while loading or validating a manifest document.
#[derive(Debug)]
pub enum ManifestError {
    /// The document is not valid JSON or does not match the schema.
    Parse(serde_json::Error),
    /// An item declares neither `file` nor `url`.
    MissingSource {
        /// Tier id the offending item belongs to.
        tier: String,
        /// Zero-based position of the item within its tier.
        index: usize,
    },
    /// A tier has an empty `id`.
    EmptyTierId {
        /// Zero-based position of the tier in the document.
        index: usize,
    },
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "manifest parse error: {err}"),
            Self::MissingSource { tier, index } => {
                write!(f, "item {index} in tier {tier:?} has neither file nor url")
            }
            Self::EmptyTierId { index } => write!(f, "tier {index} has an empty id"),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ManifestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

// ---------------------------------------------------------------------------
// CatalogItem
// ---------------------------------------------------------------------------

/// A single catalog entry.
///
/// Exactly one of `file` / `url` carries the content reference; `url` wins
/// when both are present. A missing `pinned` key defaults to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// File name resolved against the manifest's `baseUrl`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Absolute URL used verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Display name shown on the card.
    pub name: String,
    /// Pinned items keep their manifest order ahead of shuffled items.
    #[serde(default)]
    pub pinned: bool,
}

/// Borrowed view of an item's content reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource<'a> {
    /// File name, relative to the manifest `baseUrl`.
    File(&'a str),
    /// Absolute URL.
    Url(&'a str),
}

impl CatalogItem {
    /// The item's content reference, if it has one.
    ///
    /// `url` takes precedence when both fields are present.
    #[must_use]
    pub fn source(&self) -> Option<ContentSource<'_>> {
        if let Some(url) = self.url.as_deref() {
            return Some(ContentSource::Url(url));
        }
        self.file.as_deref().map(ContentSource::File)
    }

    /// Resolve the item's display URL against `base_url`.
    ///
    /// Absolute URLs pass through untouched; file names are joined to the
    /// base with exactly one `/` between them. Returns `None` for an item
    /// with no source (rejected by validation, but the view stays total).
    #[must_use]
    pub fn resolve(&self, base_url: &str) -> Option<String> {
        match self.source()? {
            ContentSource::Url(url) => Some(url.to_string()),
            ContentSource::File(file) => {
                let base = base_url.trim_end_matches('/');
                let file = file.trim_start_matches('/');
                if base.is_empty() {
                    Some(file.to_string())
                } else {
                    Some(format!("{base}/{file}"))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// A labeled group of catalog items with its own visible/extra split.
///
/// After arrangement, the first `show_first` items are rendered up front
/// and the rest sit behind a reveal control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    /// Stable tier identifier.
    pub id: String,
    /// Human-readable heading.
    pub label: String,
    /// Size of the initially visible slice.
    pub show_first: usize,
    /// Items in manifest order.
    pub items: Vec<CatalogItem>,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// The full catalog manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Base URL that `file` references resolve against.
    pub base_url: String,
    /// Catalog tiers in display order.
    pub tiers: Vec<Tier>,
}

impl Manifest {
    /// Parse and validate a manifest document.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] for malformed JSON,
    /// [`ManifestError::EmptyTierId`] for a tier with an empty id, and
    /// [`ManifestError::MissingSource`] for an item with neither `file`
    /// nor `url`.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check structural invariants beyond the serde schema.
    fn validate(&self) -> Result<(), ManifestError> {
        for (tier_index, tier) in self.tiers.iter().enumerate() {
            if tier.id.is_empty() {
                return Err(ManifestError::EmptyTierId { index: tier_index });
            }
            for (item_index, item) in tier.items.iter().enumerate() {
                if item.source().is_none() {
                    return Err(ManifestError::MissingSource {
                        tier: tier.id.clone(),
                        index: item_index,
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a tier by id.
    #[must_use]
    pub fn tier(&self, id: &str) -> Option<&Tier> {
        self.tiers.iter().find(|t| t.id == id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
