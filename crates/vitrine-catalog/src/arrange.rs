#![forbid(unsafe_code)]

//! Pin-aware arrangement of a tier's items.
//!
//! [`arrange_with`] produces the display order for one catalog load:
//! pinned items first in manifest order, the rest in a fresh uniform
//! shuffle, plus a small featured subset drawn from the initially visible
//! slice.
//!
//! # Invariants
//!
//! 1. The output is a permutation of the input (multiset equality).
//! 2. Every pinned item precedes every unpinned item.
//! 3. Pinned relative order is exactly the input order.
//! 4. `featured ⊆ [0, min(show_first, len))` with 1 or 2 members whenever
//!    that range is non-empty, otherwise empty.
//! 5. Empty input yields an empty arrangement; `show_first == 0` yields no
//!    featured indices.
//!
//! The shuffle and the featured draw are intentionally fresh per call.
//! Tests either pass a seeded [`SplitMix`](crate::rng::SplitMix) for exact
//! output or assert the invariants above as distribution properties.

use std::collections::BTreeSet;

use crate::manifest::{CatalogItem, Tier};
use crate::rng::{EntropyRng, RandomSource};

// ---------------------------------------------------------------------------
// Arrangement
// ---------------------------------------------------------------------------

/// The display order produced for one catalog load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrangement {
    ordered: Vec<CatalogItem>,
    featured: BTreeSet<usize>,
    show_first: usize,
}

impl Arrangement {
    /// All items in display order.
    #[must_use]
    pub fn ordered(&self) -> &[CatalogItem] {
        &self.ordered
    }

    /// Consume the arrangement, yielding the ordered items.
    #[must_use]
    pub fn into_ordered(self) -> Vec<CatalogItem> {
        self.ordered
    }

    /// Number of items rendered up front.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.show_first.min(self.ordered.len())
    }

    /// The initially visible slice.
    #[must_use]
    pub fn visible(&self) -> &[CatalogItem] {
        &self.ordered[..self.visible_count()]
    }

    /// The overflow slice hidden behind the reveal control.
    #[must_use]
    pub fn extra(&self) -> &[CatalogItem] {
        &self.ordered[self.visible_count()..]
    }

    /// Indices (into [`ordered`](Self::ordered)) of the featured items.
    #[must_use]
    pub fn featured_indices(&self) -> &BTreeSet<usize> {
        &self.featured
    }

    /// Whether the item at `index` is featured.
    ///
    /// Featured status never applies to the overflow region, so this is
    /// `false` for any index at or beyond `show_first`.
    #[must_use]
    pub fn is_featured(&self, index: usize) -> bool {
        index < self.show_first && self.featured.contains(&index)
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Arrange `items` for display using the given random source.
///
/// Pinned items keep their input order at the front. Unpinned items are
/// shuffled with an unbiased Fisher–Yates pass. One or two distinct
/// featured indices (uniform count over {1, 2}) are then drawn from
/// `[0, min(show_first, len))`; fewer when the visible slice is smaller.
#[must_use]
pub fn arrange_with<R: RandomSource>(
    items: Vec<CatalogItem>,
    show_first: usize,
    rng: &mut R,
) -> Arrangement {
    #[cfg(feature = "tracing")]
    let _span =
        tracing::debug_span!("arrange", items = items.len(), show_first).entered();

    let mut ordered: Vec<CatalogItem> = Vec::with_capacity(items.len());
    let mut others: Vec<CatalogItem> = Vec::new();
    for item in items {
        if item.pinned {
            ordered.push(item);
        } else {
            others.push(item);
        }
    }

    shuffle(&mut others, rng);
    ordered.append(&mut others);

    let visible = show_first.min(ordered.len());
    let featured = pick_featured(visible, rng);

    Arrangement {
        ordered,
        featured,
        show_first,
    }
}

/// Arrange `items` with a fresh entropy-seeded source.
///
/// Production entry point; consecutive calls produce different orders.
#[must_use]
pub fn arrange(items: Vec<CatalogItem>, show_first: usize) -> Arrangement {
    arrange_with(items, show_first, &mut EntropyRng::new())
}

impl Tier {
    /// Arrange this tier's items using its own `show_first`.
    ///
    /// Each tier is arranged independently, once per catalog load.
    #[must_use]
    pub fn arrange<R: RandomSource>(&self, rng: &mut R) -> Arrangement {
        arrange_with(self.items.clone(), self.show_first, rng)
    }
}

/// Unbiased Fisher–Yates shuffle, last index down to 1.
fn shuffle<T, R: RandomSource>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.next_below(i as u64 + 1) as usize;
        items.swap(i, j);
    }
}

/// Draw the featured index set for a visible slice of `visible` items.
///
/// Count is uniform over {1, 2}, capped at `visible`; distinct indices are
/// collected by repeated uniform sampling. The draw loop terminates because
/// the target size never exceeds `visible`.
fn pick_featured<R: RandomSource>(visible: usize, rng: &mut R) -> BTreeSet<usize> {
    let mut featured = BTreeSet::new();
    if visible == 0 {
        return featured;
    }
    let count = (1 + rng.next_below(2) as usize).min(visible);
    while featured.len() < count {
        featured.insert(rng.next_below(visible as u64) as usize);
    }
    featured
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
