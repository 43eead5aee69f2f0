//! Client-side validation and submission for the login, signup and new
//! transaction forms.
//!
//! A form starts out [FormState::Editing]. Submitting validates the draft
//! first; invalid drafts never reach the API. `submit` borrows the form
//! mutably until the request is answered, so callers show the in-flight
//! state themselves (the CLI wraps it in a spinner).

use std::collections::BTreeMap;

mod login;
mod signup;
mod transaction;

pub use login::{
    validate_account_number, validate_agency, LoginError, LoginField, LoginForm,
    ACCOUNT_NUMBER_LEN, AGENCY_LEN,
};
pub use signup::{validate_email, validate_name, SignupError, SignupField, SignupForm};
pub use transaction::{
    max_amount, validate_amount, validate_description, CreatedTransaction, TransactionError,
    TransactionField, TransactionForm,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState<T, F: Ord> {
    Editing,
    /// Back to editing, with a message for each field that needs fixing.
    Invalid(FieldErrors<F>),
    /// Back to editing after the API rejected the submission.
    Failed(&'static str),
    Success(T),
}

impl<T, F: Ord> Default for FormState<T, F> {
    fn default() -> Self {
        FormState::Editing
    }
}

/// At most one message per field, ordered by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord>(BTreeMap<F, &'static str>);

impl<F: Ord> FieldErrors<F> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn check(&mut self, field: F, error: Option<&'static str>) {
        if let Some(error) = error {
            self.0.entry(field).or_insert(error);
        }
    }

    pub fn get(&self, field: &F) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&F, &'static str)> {
        self.0.iter().map(|(field, error)| (field, *error))
    }
}

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self::new()
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn is_exact_digits(text: &str, len: usize) -> bool {
    text.len() == len && text.chars().all(|c| c.is_ascii_digit())
}
