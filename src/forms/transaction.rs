use rust_decimal::Decimal;
use thiserror::Error;

use super::{char_len, FieldErrors, FormState};
use crate::api::{BankApi, CreateTransactionRequest, TransactionType};
use crate::category::Category;
use crate::format::{digits_only, format_currency, get_numeric_value, mask_currency};
use crate::statement::StatementEntry;

const DESCRIPTION_MIN_LEN: usize = 3;
const DESCRIPTION_MAX_LEN: usize = 255;

const SUBMIT_FAILED: &str = "Tente novamente mais tarde.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransactionField {
    Description,
    Category,
    Amount,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Dados da transação inválidos")]
    Invalid(FieldErrors<TransactionField>),
    #[error("Tente novamente mais tarde.")]
    Failed,
}

/// R$ 999.999,99
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999, 2)
}

pub fn validate_description(description: &str) -> Option<&'static str> {
    let description = description.trim();
    if description.is_empty() {
        Some("Descrição é obrigatória")
    } else if char_len(description) < DESCRIPTION_MIN_LEN {
        Some("Descrição deve ter pelo menos 3 caracteres")
    } else if char_len(description) > DESCRIPTION_MAX_LEN {
        Some("Descrição deve ter no máximo 255 caracteres")
    } else {
        None
    }
}

pub fn validate_amount(amount: Decimal) -> Option<&'static str> {
    if amount <= Decimal::ZERO {
        Some("Valor deve ser maior que zero")
    } else if amount > max_amount() {
        Some("Valor máximo é R$ 999.999,99")
    } else {
        None
    }
}

fn validate_category(category: Category) -> Option<&'static str> {
    if category.is_user_facing() {
        None
    } else {
        Some("Categoria inválida")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTransaction {
    pub entry: StatementEntry,
    /// e.g. "Crédito de R$ 50,00 registrado com sucesso."
    pub confirmation: String,
}

#[derive(Debug, Default)]
pub struct TransactionForm {
    description: String,
    transaction_type: TransactionType,
    category: Category,
    // Masked amount as shown in the input, empty until something is typed
    amount: String,
    state: FormState<CreatedTransaction, TransactionField>,
}

impl TransactionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn set_type(&mut self, transaction_type: TransactionType) {
        self.transaction_type = transaction_type;
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    /// Replaces the amount with the digits of `input`, read as cents.
    pub fn set_amount_digits(&mut self, input: &str) {
        let digits = digits_only(input, usize::MAX);
        self.amount = if digits.is_empty() {
            String::new()
        } else {
            mask_currency(&digits)
        };
    }

    /// Appends keystrokes to the amount the way a masked input field does:
    /// typing `1`, `0`, `0` gives `R$ 1,00`.
    pub fn push_amount_digits(&mut self, input: &str) {
        let typed = format!("{}{input}", digits_only(&self.amount, usize::MAX));
        // Leading zeros from the mask ("R$ 0,01") don't count as typed digits
        self.set_amount_digits(typed.trim_start_matches('0'));
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// The amount as displayed, e.g. `R$ 1.234,56`, or empty.
    pub fn amount_display(&self) -> &str {
        &self.amount
    }

    pub fn amount(&self) -> Decimal {
        get_numeric_value(&self.amount)
    }

    pub fn state(&self) -> &FormState<CreatedTransaction, TransactionField> {
        &self.state
    }

    pub fn validate(&self) -> FieldErrors<TransactionField> {
        let mut errors = FieldErrors::new();
        errors.check(
            TransactionField::Description,
            validate_description(&self.description),
        );
        errors.check(TransactionField::Category, validate_category(self.category));
        errors.check(TransactionField::Amount, validate_amount(self.amount()));
        errors
    }

    /// Back to a blank draft. The category is reset too.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Creates the transaction for `account_id`. On success `on_created` is
    /// called with the new entry and the draft is reset, keeping the category.
    pub async fn submit(
        &mut self,
        api: &dyn BankApi,
        account_id: &str,
        on_created: impl FnOnce(&StatementEntry),
    ) -> Result<CreatedTransaction, TransactionError> {
        let errors = self.validate();
        if !errors.is_empty() {
            self.state = FormState::Invalid(errors.clone());
            return Err(TransactionError::Invalid(errors));
        }

        let request = CreateTransactionRequest {
            account_id: account_id.to_string(),
            transaction_type: self.transaction_type,
            category: self.category,
            amount: self.amount(),
            description: self.description.trim().to_string(),
        };
        let entry = match api.create_transaction(&request).await {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Creating transaction failed: {err}");
                self.state = FormState::Failed(SUBMIT_FAILED);
                return Err(TransactionError::Failed);
            }
        };

        on_created(&entry);

        let created = CreatedTransaction {
            confirmation: format!(
                "{} de {} registrado com sucesso.",
                request.transaction_type,
                format_currency(request.amount)
            ),
            entry,
        };
        self.description.clear();
        self.transaction_type = TransactionType::default();
        self.amount.clear();
        self.state = FormState::Success(created.clone());
        Ok(created)
    }
}
