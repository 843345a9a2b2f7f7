#![forbid(unsafe_code)]

//! Explicit checkout form state.
//!
//! The form owns three text fields (national ID, account ID, redemption
//! code), a selected product, and a remote confirmation flag for the code.
//! Field validity and touched status live in two [`FieldSet`] bit sets
//! rather than scattered mutable flags, so the submit gate is a single
//! readable predicate: [`CheckoutState::can_submit`].

use bitflags::bitflags;

use crate::national_id;
use crate::validators::{
    AccountId, AccountIdPolicy, And, CodeShape, NationalId, Required, ValidationResult, Validator,
};

// ---------------------------------------------------------------------------
// Field / FieldSet
// ---------------------------------------------------------------------------

/// One of the checkout form's text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// National identification number.
    NationalId,
    /// Platform account identifier.
    AccountId,
    /// Backend-issued redemption code.
    Code,
}

impl Field {
    /// All fields, in display order.
    pub const ALL: [Self; 3] = [Self::NationalId, Self::AccountId, Self::Code];

    fn flag(self) -> FieldSet {
        match self {
            Self::NationalId => FieldSet::NATIONAL_ID,
            Self::AccountId => FieldSet::ACCOUNT_ID,
            Self::Code => FieldSet::CODE,
        }
    }
}

bitflags! {
    /// A set of checkout fields, used for valid and touched tracking.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldSet: u8 {
        /// National identification number field.
        const NATIONAL_ID = 0b001;
        /// Platform account identifier field.
        const ACCOUNT_ID  = 0b010;
        /// Redemption code field.
        const CODE        = 0b100;
    }
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Product / OrderDraft
// ---------------------------------------------------------------------------

/// The product picked from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Product {
    /// Stable product identifier sent to the backend.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// The collected order values, ready for the order request payload.
///
/// Produced by [`CheckoutState::draft`] only when the form can submit, so
/// every field here has already passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OrderDraft {
    /// Identifier of the selected product.
    pub product_id: String,
    /// National ID, digits only.
    pub national_id: String,
    /// Account ID, digits only.
    pub account_id: String,
    /// Redemption code, trimmed.
    pub code: String,
}

// ---------------------------------------------------------------------------
// CheckoutState
// ---------------------------------------------------------------------------

/// Mutable state for one checkout form instance.
///
/// Raw field values are kept exactly as typed; validation and draft
/// extraction normalize them. Editing the code field drops any previous
/// remote confirmation, since the backend verdict no longer applies.
#[derive(Debug)]
pub struct CheckoutState {
    national_id: String,
    account_id: String,
    code: String,
    valid: FieldSet,
    touched: FieldSet,
    selected: Option<Product>,
    code_confirmed: bool,
    national_id_validator: And<Required, NationalId>,
    account_id_validator: And<Required, AccountId>,
    code_validator: And<Required, CodeShape>,
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutState {
    /// Create an empty form with default field policies.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policies(AccountIdPolicy::default(), CodeShape::default())
    }

    /// Create an empty form with explicit account-ID and code policies.
    #[must_use]
    pub fn with_policies(account_policy: AccountIdPolicy, code_shape: CodeShape) -> Self {
        Self {
            national_id: String::new(),
            account_id: String::new(),
            code: String::new(),
            valid: FieldSet::empty(),
            touched: FieldSet::empty(),
            selected: None,
            code_confirmed: false,
            national_id_validator: And::new(Required::new(), NationalId::new()),
            account_id_validator: And::new(Required::new(), AccountId::with_policy(account_policy)),
            code_validator: And::new(Required::new(), code_shape),
        }
    }

    /// Set a field's raw value, marking it touched and revalidating it.
    ///
    /// Returns the field's new validation result. Changing the code field
    /// clears any remote confirmation.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> ValidationResult {
        let value = value.into();
        match field {
            Field::NationalId => self.national_id = value,
            Field::AccountId => self.account_id = value,
            Field::Code => {
                if self.code != value {
                    self.code_confirmed = false;
                }
                self.code = value;
            }
        }
        self.touched.insert(field.flag());
        self.validate_field(field)
    }

    /// Revalidate a field against its validator, updating the valid set.
    pub fn validate_field(&mut self, field: Field) -> ValidationResult {
        let result = match field {
            Field::NationalId => self.national_id_validator.validate(&self.national_id),
            Field::AccountId => self.account_id_validator.validate(&self.account_id),
            Field::Code => self.code_validator.validate(&self.code),
        };
        self.valid.set(field.flag(), result.is_valid());
        result
    }

    /// Revalidate every field, returning the first error if any.
    pub fn validate_all(&mut self) -> ValidationResult {
        let mut combined = ValidationResult::Valid;
        for field in Field::ALL {
            combined = combined.and(self.validate_field(field));
        }
        combined
    }

    /// Mark a field as touched without changing its value.
    pub fn mark_touched(&mut self, field: Field) {
        self.touched.insert(field.flag());
    }

    /// A field's raw value as typed.
    #[must_use]
    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::NationalId => &self.national_id,
            Field::AccountId => &self.account_id,
            Field::Code => &self.code,
        }
    }

    /// Whether a field currently passes its validator.
    #[must_use]
    pub fn is_valid(&self, field: Field) -> bool {
        self.valid.contains(field.flag())
    }

    /// Whether the user has interacted with a field.
    #[must_use]
    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(field.flag())
    }

    /// Select the product being ordered.
    pub fn select_product(&mut self, product: Product) {
        self.selected = Some(product);
    }

    /// Clear the product selection.
    pub fn clear_product(&mut self) {
        self.selected = None;
    }

    /// The currently selected product, if any.
    #[must_use]
    pub fn selected_product(&self) -> Option<&Product> {
        self.selected.as_ref()
    }

    /// Record the backend's verdict for the current code.
    ///
    /// The caller applies this only for a current remote-check token; see
    /// [`RemoteCheckCoordinator`](crate::remote::RemoteCheckCoordinator).
    pub fn set_code_confirmed(&mut self, confirmed: bool) {
        self.code_confirmed = confirmed;
    }

    /// Whether the backend has confirmed the current code.
    #[must_use]
    pub fn code_confirmed(&self) -> bool {
        self.code_confirmed
    }

    /// The submit gate: every field valid, a product selected, and the
    /// code confirmed by the backend.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.valid == FieldSet::all() && self.selected.is_some() && self.code_confirmed
    }

    /// Extract the normalized order values.
    ///
    /// Returns `None` unless [`can_submit`](Self::can_submit) holds.
    #[must_use]
    pub fn draft(&self) -> Option<OrderDraft> {
        if !self.can_submit() {
            return None;
        }
        let product = self.selected.as_ref()?;
        Some(OrderDraft {
            product_id: product.id.clone(),
            national_id: national_id::strip_digits(&self.national_id),
            account_id: national_id::strip_digits(&self.account_id),
            code: self.code.trim().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: "tier1-card3".into(),
            name: "Card 3".into(),
        }
    }

    fn fill_valid(state: &mut CheckoutState) {
        state.set_field(Field::NationalId, "111.444.777-35");
        state.set_field(Field::AccountId, "123456");
        state.set_field(Field::Code, "WIN2024");
        state.select_product(product());
        state.set_code_confirmed(true);
    }

    #[test]
    fn new_form_is_pristine() {
        let state = CheckoutState::new();
        for field in Field::ALL {
            assert!(!state.is_touched(field));
            assert!(!state.is_valid(field));
        }
        assert!(state.selected_product().is_none());
        assert!(!state.can_submit());
        assert!(state.draft().is_none());
    }

    #[test]
    fn set_field_marks_touched_and_validates() {
        let mut state = CheckoutState::new();
        let result = state.set_field(Field::NationalId, "11144477735");
        assert!(result.is_valid());
        assert!(state.is_touched(Field::NationalId));
        assert!(state.is_valid(Field::NationalId));
        assert!(!state.is_touched(Field::AccountId));
    }

    #[test]
    fn invalid_value_clears_valid_flag() {
        let mut state = CheckoutState::new();
        state.set_field(Field::NationalId, "11144477735");
        assert!(state.is_valid(Field::NationalId));
        state.set_field(Field::NationalId, "11144477736");
        assert!(!state.is_valid(Field::NationalId));
    }

    #[test]
    fn can_submit_requires_everything() {
        let mut state = CheckoutState::new();
        fill_valid(&mut state);
        assert!(state.can_submit());

        state.clear_product();
        assert!(!state.can_submit());
        state.select_product(product());
        assert!(state.can_submit());

        state.set_code_confirmed(false);
        assert!(!state.can_submit());
    }

    #[test]
    fn editing_code_drops_confirmation() {
        let mut state = CheckoutState::new();
        fill_valid(&mut state);
        assert!(state.can_submit());

        state.set_field(Field::Code, "WIN2025");
        assert!(!state.code_confirmed());
        assert!(!state.can_submit());

        // Re-setting the same value keeps the (now cleared) flag untouched.
        state.set_code_confirmed(true);
        state.set_field(Field::Code, "WIN2025");
        assert!(state.code_confirmed());
    }

    #[test]
    fn draft_normalizes_values() {
        let mut state = CheckoutState::new();
        fill_valid(&mut state);
        state.set_field(Field::AccountId, "123-456");
        state.set_field(Field::Code, "  WIN2024  ");
        state.set_code_confirmed(true);

        let draft = state.draft().unwrap();
        assert_eq!(draft.product_id, "tier1-card3");
        assert_eq!(draft.national_id, "11144477735");
        assert_eq!(draft.account_id, "123456");
        assert_eq!(draft.code, "WIN2024");
    }

    #[test]
    fn draft_none_when_field_invalid() {
        let mut state = CheckoutState::new();
        fill_valid(&mut state);
        state.set_field(Field::AccountId, "1");
        assert!(state.draft().is_none());
    }

    #[test]
    fn validate_all_reports_first_error() {
        let mut state = CheckoutState::new();
        state.set_field(Field::NationalId, "11144477735");
        let result = state.validate_all();
        assert!(result.is_invalid(), "empty fields should fail");
        assert!(state.is_valid(Field::NationalId));
        assert!(!state.is_valid(Field::Code));
    }

    #[test]
    fn custom_policies_apply() {
        let mut state = CheckoutState::with_policies(
            AccountIdPolicy::default().with_min_len(2).with_max_len(4),
            CodeShape::with_min_len(8),
        );
        assert!(state.set_field(Field::AccountId, "12").is_valid());
        assert!(state.set_field(Field::Code, "abcd").is_invalid());
        assert!(state.set_field(Field::Code, "abcd1234").is_valid());
    }
}
