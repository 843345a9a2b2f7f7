#![forbid(unsafe_code)]

//! Form core for Vitrine: identifier validation, explicit checkout state,
//! and the remote-check lifecycle.
//!
//! The checkout form gates submission on three fields — a national ID
//! whose checksum is verified locally ([`national_id`]), a platform
//! account identifier, and a backend-issued redemption code. Field
//! validity lives in [`checkout::CheckoutState`] rather than scattered
//! flags, and the debounced, cancellation-safe remote code check is
//! managed by [`remote::RemoteCheckCoordinator`] without performing any
//! I/O itself.

pub mod checkout;
pub mod national_id;
pub mod remote;
pub mod validators;

pub use checkout::{CheckoutState, Field, FieldSet, OrderDraft, Product};
pub use remote::{
    CheckOutcome, CheckToken, CodeCache, Debouncer, RemoteCheckConfig, RemoteCheckCoordinator,
};
pub use validators::{
    AccountId, AccountIdPolicy, CodeShape, NationalId, Required, ValidationError,
    ValidationResult, Validator,
};
