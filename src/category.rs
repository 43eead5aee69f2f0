use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[default]
    Salario,
    Deposito,
    Saque,
    Transferencia,
    Pagamento,
    FaturaCartao,
    ResgateInvestimento,
    TaxaServico,
    Reembolso,
    Outro,

    // Only ever created by the bank itself
    DailyBalance,
    BonusAbertura,
}

impl Category {
    /// Categories a customer may pick when creating a transaction, in the
    /// order they are offered.
    pub const USER_FACING: [Category; 10] = [
        Category::Salario,
        Category::Deposito,
        Category::Saque,
        Category::Transferencia,
        Category::Pagamento,
        Category::FaturaCartao,
        Category::ResgateInvestimento,
        Category::TaxaServico,
        Category::Reembolso,
        Category::Outro,
    ];

    pub const INTERNAL: [Category; 2] = [Category::DailyBalance, Category::BonusAbertura];

    pub fn code(self) -> &'static str {
        match self {
            Category::Salario => "SALARIO",
            Category::Deposito => "DEPOSITO",
            Category::Saque => "SAQUE",
            Category::Transferencia => "TRANSFERENCIA",
            Category::Pagamento => "PAGAMENTO",
            Category::FaturaCartao => "FATURA_CARTAO",
            Category::ResgateInvestimento => "RESGATE_INVESTIMENTO",
            Category::TaxaServico => "TAXA_SERVICO",
            Category::Reembolso => "REEMBOLSO",
            Category::Outro => "OUTRO",
            Category::DailyBalance => "DAILY_BALANCE",
            Category::BonusAbertura => "BONUS_ABERTURA",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Salario => "Salário",
            Category::Deposito => "Depósito",
            Category::Saque => "Saque",
            Category::Transferencia => "Transferência",
            Category::Pagamento => "Pagamento",
            Category::FaturaCartao => "Fatura Cartão",
            Category::ResgateInvestimento => "Resgate de Investimento",
            Category::TaxaServico => "Taxa/Serviço",
            Category::Reembolso => "Reembolso",
            Category::Outro => "Outro",
            Category::DailyBalance => "Saldo Diário",
            Category::BonusAbertura => "Bônus de Abertura",
        }
    }

    pub fn is_user_facing(self) -> bool {
        Self::USER_FACING.contains(&self)
    }

    /// Looks up a user-facing category by its wire code, case-insensitively.
    pub fn parse_user_facing(code: &str) -> Option<Category> {
        Self::USER_FACING
            .into_iter()
            .find(|category| category.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_categories_are_never_offered() {
        for category in Category::INTERNAL {
            assert!(!category.is_user_facing());
            assert_eq!(None, Category::parse_user_facing(category.code()));
        }
    }

    #[test]
    fn codes_match_wire_format() {
        for category in Category::USER_FACING.into_iter().chain(Category::INTERNAL) {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(format!("\"{}\"", category.code()), json);
        }
    }

    #[test]
    fn parses_user_facing_codes() {
        assert_eq!(
            Some(Category::FaturaCartao),
            Category::parse_user_facing("fatura_cartao")
        );
        assert_eq!(None, Category::parse_user_facing("CASHBACK"));
    }
}
