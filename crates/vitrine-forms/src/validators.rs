#![forbid(unsafe_code)]

//! Composable field validators for the checkout form.
//!
//! Each validator is a pure check over a borrowed value producing a
//! [`ValidationResult`]. Errors carry a stable code for i18n lookup plus a
//! default message with `{key}` interpolation parameters.

use std::collections::HashMap;
use std::fmt;

use crate::national_id;

// ---------------------------------------------------------------------------
// Error Codes (for i18n lookup)
// ---------------------------------------------------------------------------

/// Error code for required field validation.
pub const ERROR_CODE_REQUIRED: &str = "required";
/// Error code for national-ID checksum validation.
pub const ERROR_CODE_NATIONAL_ID: &str = "national_id";
/// Error code for account identifier validation.
pub const ERROR_CODE_ACCOUNT_ID: &str = "account_id";
/// Error code for redemption-code shape validation.
pub const ERROR_CODE_CODE_SHAPE: &str = "code_shape";

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A validation error with code, message, and interpolation parameters.
///
/// The `code` field is a stable identifier for i18n systems, `message` is
/// a human-readable default, and `params` holds `{key}` substitutions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationError {
    /// Stable error code for programmatic handling and i18n.
    pub code: &'static str,
    /// Human-readable error message template.
    pub message: String,
    /// Parameters for message interpolation.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Create a new validation error with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            params: HashMap::new(),
        }
    }

    /// Add a parameter for message interpolation.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Format the message, replacing `{key}` patterns with parameter values.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut result = self.message.clone();
        for (key, value) in &self.params {
            result = result.replace(&format!("{{{key}}}"), value);
        }
        result
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

/// The result of a validation operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationResult {
    /// The value is valid.
    #[default]
    Valid,
    /// The value is invalid with an error.
    Invalid(ValidationError),
}

impl ValidationResult {
    /// Returns `true` if the result is `Valid`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns `true` if the result is `Invalid`.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Returns the error if the result is `Invalid`, otherwise `None`.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid => None,
            Self::Invalid(e) => Some(e),
        }
    }

    /// Returns the formatted error message if the result is `Invalid`.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error().map(ValidationError::format_message)
    }

    /// Combine two results, returning the first error if any.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::Valid => other,
            Self::Invalid(_) => self,
        }
    }
}

// ---------------------------------------------------------------------------
// Validator Trait
// ---------------------------------------------------------------------------

/// A trait for validating values of type `T`.
///
/// Validators are pure and composable; combine them with [`And`] or [`All`].
pub trait Validator<T: ?Sized>: Send + Sync {
    /// Validate the given value.
    fn validate(&self, value: &T) -> ValidationResult;

    /// Return the default error message for this validator.
    fn error_message(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Built-in Validators
// ---------------------------------------------------------------------------

/// Validates that a string is not empty.
///
/// Whitespace-only strings are considered empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Required {
    /// Create a new `Required` validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator<str> for Required {
    fn validate(&self, value: &str) -> ValidationResult {
        if value.trim().is_empty() {
            ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_REQUIRED,
                "This field is required",
            ))
        } else {
            ValidationResult::Valid
        }
    }

    fn error_message(&self) -> &str {
        "This field is required"
    }
}

/// Validates the national-ID checksum.
///
/// Wraps [`national_id::is_valid`]: separators are stripped before the
/// length, degenerate-pattern, and check-digit tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NationalId;

impl NationalId {
    /// Create a new `NationalId` validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Validator<str> for NationalId {
    fn validate(&self, value: &str) -> ValidationResult {
        if national_id::is_valid(value) {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_NATIONAL_ID,
                "Invalid identification number",
            ))
        }
    }

    fn error_message(&self) -> &str {
        "Invalid identification number"
    }
}

/// Length bounds for the platform account identifier.
///
/// The platform rule is presentation-layer configuration; defaults cover
/// the common handle range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountIdPolicy {
    /// Minimum digit count (inclusive).
    pub min_len: usize,
    /// Maximum digit count (inclusive).
    pub max_len: usize,
}

impl Default for AccountIdPolicy {
    fn default() -> Self {
        Self {
            min_len: 5,
            max_len: 16,
        }
    }
}

impl AccountIdPolicy {
    /// Set the minimum digit count.
    #[must_use]
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Set the maximum digit count.
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }
}

/// Validates the platform account identifier.
///
/// Strips separators, then requires the remainder to be all digits with a
/// length inside the policy bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountId {
    /// Length bounds applied after stripping separators.
    pub policy: AccountIdPolicy,
}

impl AccountId {
    /// Create a validator with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with an explicit policy.
    #[must_use]
    pub fn with_policy(policy: AccountIdPolicy) -> Self {
        Self { policy }
    }
}

impl Validator<str> for AccountId {
    fn validate(&self, value: &str) -> ValidationResult {
        let trimmed = value.trim();
        if trimmed.chars().any(|c| !c.is_ascii_digit() && c != '.' && c != '-' && c != ' ') {
            return ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_ACCOUNT_ID,
                "Account ID must contain only digits",
            ));
        }
        let digits = national_id::strip_digits(trimmed);
        if digits.len() < self.policy.min_len || digits.len() > self.policy.max_len {
            return ValidationResult::Invalid(
                ValidationError::new(
                    ERROR_CODE_ACCOUNT_ID,
                    "Account ID must be between {min} and {max} digits",
                )
                .with_param("min", self.policy.min_len)
                .with_param("max", self.policy.max_len)
                .with_param("actual", digits.len()),
            );
        }
        ValidationResult::Valid
    }

    fn error_message(&self) -> &str {
        "Invalid account ID"
    }
}

/// Local shape check for the redemption code.
///
/// Runs before any remote check is scheduled: the trimmed code must be
/// alphanumeric and at least `min_len` characters. The backend owns real
/// code validity.
#[derive(Debug, Clone, Copy)]
pub struct CodeShape {
    /// Minimum trimmed length.
    pub min_len: usize,
}

impl Default for CodeShape {
    fn default() -> Self {
        Self { min_len: 4 }
    }
}

impl CodeShape {
    /// Create a validator with the default minimum length.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with an explicit minimum length.
    #[must_use]
    pub fn with_min_len(min_len: usize) -> Self {
        Self { min_len }
    }
}

impl Validator<str> for CodeShape {
    fn validate(&self, value: &str) -> ValidationResult {
        let trimmed = value.trim();
        if trimmed.chars().count() < self.min_len {
            return ValidationResult::Invalid(
                ValidationError::new(
                    ERROR_CODE_CODE_SHAPE,
                    "Code must be at least {min} characters",
                )
                .with_param("min", self.min_len),
            );
        }
        if !trimmed.chars().all(char::is_alphanumeric) {
            return ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_CODE_SHAPE,
                "Code must contain only letters and digits",
            ));
        }
        ValidationResult::Valid
    }

    fn error_message(&self) -> &str {
        "Invalid code"
    }
}

// ---------------------------------------------------------------------------
// Composition Validators
// ---------------------------------------------------------------------------

/// Combines two validators with AND logic.
///
/// Both validators must pass for the result to be valid.
#[derive(Debug, Clone)]
pub struct And<A, B> {
    /// First validator.
    pub first: A,
    /// Second validator.
    pub second: B,
}

impl<A, B> And<A, B> {
    /// Create a new `And` validator.
    #[must_use]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<T: ?Sized, A, B> Validator<T> for And<A, B>
where
    A: Validator<T>,
    B: Validator<T>,
{
    fn validate(&self, value: &T) -> ValidationResult {
        match self.first.validate(value) {
            ValidationResult::Valid => self.second.validate(value),
            err => err,
        }
    }

    fn error_message(&self) -> &str {
        self.first.error_message()
    }
}

/// Combines multiple validators with AND logic, first error wins.
pub struct All<T: ?Sized> {
    validators: Vec<Box<dyn Validator<T>>>,
}

impl<T: ?Sized> All<T> {
    /// Create a new `All` validator with the given validators.
    #[must_use]
    pub fn new(validators: Vec<Box<dyn Validator<T>>>) -> Self {
        Self { validators }
    }
}

impl<T: ?Sized> Validator<T> for All<T> {
    fn validate(&self, value: &T) -> ValidationResult {
        for validator in &self.validators {
            let result = validator.validate(value);
            if result.is_invalid() {
                return result;
            }
        }
        ValidationResult::Valid
    }

    fn error_message(&self) -> &str {
        self.validators
            .first()
            .map_or("Validation failed", |v| v.error_message())
    }
}

impl<T: ?Sized> fmt::Debug for All<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("All")
            .field(
                "validators",
                &format!("[{} validators]", self.validators.len()),
            )
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
