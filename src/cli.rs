use anyhow::{anyhow, bail, Context as _, Result};
use chrono::Local;
use console::{pad_str, style, Alignment, StyledObject};
use rust_decimal::Decimal;

use crate::api::{BankApi, KeysBankClient, TransactionType};
use crate::args::{Args, Command};
use crate::category::Category;
use crate::config::Config;
use crate::format::{
    digits_only, format_account_number, format_category, format_currency, format_day,
    format_timestamp, get_numeric_value, mask_currency,
};
use crate::forms::{
    validate_account_number, validate_agency, validate_amount, validate_description,
    validate_email, validate_name, FieldErrors, LoginError, LoginForm, SignupError, SignupForm,
    TransactionError, TransactionForm, ACCOUNT_NUMBER_LEN, AGENCY_LEN,
};
use crate::session::{FileStorage, Identity, SessionStorage, SessionStore};
use crate::statement::{
    load_balance_card, transaction_list, EntryType, StatementEntry, StatementFilter,
};
use crate::terminal::{self, with_spinner, BulletPointPrinter, LineWriter, StdoutLineWriter};

const HIDDEN_BALANCE: &str = "••••••";
const HIDDEN_AMOUNT: &str = "••••";

pub async fn main(args: Args) -> Result<()> {
    let config = Config::from_args(&args)?;
    let api = KeysBankClient::new(config.api_base_url.clone())?;
    let session = SessionStore::open(FileStorage::in_dir(&config.session_dir)).await;
    let mut cli = Cli::new(api, session, BulletPointPrinter::new_stdout());

    match args.command {
        Command::Signup { name, email } => cli.main_signup(name, email).await?,
        Command::Login {
            agency,
            account_number,
        } => cli.main_login(agency, account_number).await?,
        Command::Logout => cli.main_logout().await?,
        Command::Whoami => cli.main_whoami()?,
        Command::Balance { hide } => cli.main_balance(hide).await?,
        Command::Statement {
            start_date,
            end_date,
            entry_type,
        } => {
            let filter = StatementFilter {
                start_date,
                end_date,
                entry_type,
            };
            cli.main_statement(&filter).await?
        }
        Command::Transact {
            description,
            transaction_type,
            category,
            amount_cents,
        } => {
            cli.main_transact(description, transaction_type, category, amount_cents)
                .await?
        }
    }
    Ok(())
}

pub struct Cli<A: BankApi, S: SessionStorage, W: LineWriter + Clone = StdoutLineWriter> {
    api: A,
    session: SessionStore<S>,
    printer: BulletPointPrinter<W>,
}

impl<A: BankApi, S: SessionStorage, W: LineWriter + Clone> Cli<A, S, W> {
    pub fn new(api: A, session: SessionStore<S>, printer: BulletPointPrinter<W>) -> Self {
        Self {
            api,
            session,
            printer,
        }
    }

    /// Commands that act on an account only run with someone logged in.
    fn require_login(&self) -> Result<Identity> {
        self.session
            .session()
            .identity()
            .ok_or_else(|| anyhow!("Você não está logado. Entre com `keysbank login`."))
    }

    /// Login and signup only run when nobody is logged in.
    fn require_logged_out(&self) -> Result<()> {
        if let Some(identity) = self.session.session().identity() {
            bail!(
                "Você já está logado como {}. Saia com `keysbank logout` antes.",
                identity.customer_name
            );
        }
        Ok(())
    }

    pub async fn main_signup(&mut self, name: Option<String>, email: Option<String>) -> Result<()> {
        self.require_logged_out()?;

        let mut form = SignupForm::new();
        form.set_name(&match name {
            Some(name) => name,
            None => terminal::prompt_validated("Nome completo", validate_name)?,
        });
        form.set_email(&match email {
            Some(email) => email,
            None => terminal::prompt_validated("Email", validate_email)?,
        });

        let account = match with_spinner("Criando conta...", form.submit(&self.api)).await {
            Ok(account) => account,
            Err(SignupError::Invalid(errors)) => return Err(invalid_input(&errors)),
            Err(err) => bail!(err),
        };

        self.printer.print_line(style_success("Conta criada com sucesso!"));
        self.printer.print_line("Anote seus dados de acesso:");
        let printer = self.printer.indent();
        printer.print_item(format!("Agência: {}", style_account(&account.agency)));
        printer.print_item(format!("Conta: {}", style_account(&account.account_number)));
        Ok(())
    }

    pub async fn main_login(
        &mut self,
        agency: Option<String>,
        account_number: Option<String>,
    ) -> Result<()> {
        self.require_logged_out()?;

        let mut form = LoginForm::new();
        form.set_agency(&match agency {
            Some(agency) => agency,
            None => terminal::prompt_validated("Agência", |input| {
                validate_agency(&digits_only(input, AGENCY_LEN))
            })?,
        });
        form.set_account_number(&match account_number {
            Some(account_number) => account_number,
            None => terminal::prompt_validated("Conta", |input| {
                validate_account_number(&digits_only(input, ACCOUNT_NUMBER_LEN))
            })?,
        });

        let response = match with_spinner(
            "Entrando...",
            form.submit(&self.api, &mut self.session),
        )
        .await
        {
            Ok(response) => response,
            Err(LoginError::Invalid(errors)) => return Err(invalid_input(&errors)),
            Err(LoginError::Session(err)) => return Err(err.context("Falha ao salvar a sessão")),
            Err(err) => bail!(err),
        };

        self.printer.print_line(style_success("Bem-vindo!"));
        self.printer
            .print_line(format!("Olá, {}!", style_name(&response.customer_name)));
        Ok(())
    }

    pub async fn main_logout(&mut self) -> Result<()> {
        if !self.session.is_authenticated() {
            self.printer.print_line("Nenhuma sessão ativa.");
            return Ok(());
        }
        self.session.logout().await?;
        self.printer.print_line("Sessão encerrada.");
        Ok(())
    }

    pub fn main_whoami(&self) -> Result<()> {
        let identity = self.require_login()?;
        self.print_header(&identity);
        Ok(())
    }

    pub async fn main_balance(&self, hide: bool) -> Result<()> {
        let identity = self.require_login()?;
        let today = Local::now().date_naive();
        let card = with_spinner(
            "Carregando saldo...",
            load_balance_card(&self.api, &identity.account_id, today),
        )
        .await
        .context("Não foi possível carregar o saldo")?;

        self.print_header(&identity);
        self.printer.print_line(style_header("Saldo disponível"));
        let printer = self.printer.indent();
        let (balance, credits, debits) = if hide {
            (
                style(HIDDEN_BALANCE.to_string()).bold(),
                style(HIDDEN_AMOUNT.to_string()),
                style(HIDDEN_AMOUNT.to_string()),
            )
        } else {
            (
                style_amount(card.balance, format_currency(card.balance)),
                style(format_currency(card.month.credits)).green(),
                style(format_currency(card.month.debits)).red(),
            )
        };
        printer.print_line(balance);
        printer.print_item(format!("Entradas do mês: {credits}"));
        printer.print_item(format!("Saídas do mês: {debits}"));
        Ok(())
    }

    pub async fn main_statement(&self, filter: &StatementFilter) -> Result<()> {
        let identity = self.require_login()?;
        self.print_statement(&identity, filter).await
    }

    pub async fn main_transact(
        &mut self,
        description: Option<String>,
        transaction_type: Option<TransactionType>,
        category: Option<String>,
        amount_cents: Option<String>,
    ) -> Result<()> {
        let identity = self.require_login()?;

        let mut form = TransactionForm::new();
        form.set_description(&match description {
            Some(description) => description,
            None => terminal::prompt_validated("Descrição", validate_description)?,
        });
        form.set_type(match transaction_type {
            Some(transaction_type) => transaction_type,
            None => prompt_transaction_type()?,
        });
        form.set_category(match category {
            Some(code) => Category::parse_user_facing(&code)
                .ok_or_else(|| anyhow!("Categoria inválida: {code}"))?,
            None => prompt_category()?,
        });
        form.set_amount_digits(&match amount_cents {
            Some(amount_cents) => amount_cents,
            None => terminal::prompt_validated("Valor em centavos", |input| {
                validate_amount(get_numeric_value(&mask_currency(input)))
            })?,
        });

        let mut created_id = None;
        let created = match with_spinner(
            "Registrando transação...",
            form.submit(&self.api, &identity.account_id, |entry| {
                created_id = Some(entry.id.clone())
            }),
        )
        .await
        {
            Ok(created) => created,
            Err(TransactionError::Invalid(errors)) => return Err(invalid_input(&errors)),
            Err(err) => bail!(err),
        };

        self.printer.print_line(style_success(&created.confirmation));
        if let Some(id) = created_id {
            log::info!("Created transaction {id}");
            self.printer.print_line("");
            self.print_statement(&identity, &StatementFilter::default())
                .await?;
        }
        Ok(())
    }

    fn print_header(&self, identity: &Identity) {
        self.printer.print_line(format!(
            "{} {}",
            style_name(&identity.customer_name),
            style_account(&format_account_number(
                &identity.agency,
                &identity.account_number
            )),
        ));
    }

    async fn print_statement(&self, identity: &Identity, filter: &StatementFilter) -> Result<()> {
        let entries = with_spinner(
            "Carregando extrato...",
            self.api.get_statement(&identity.account_id, filter),
        )
        .await
        .context("Não foi possível carregar o extrato")?;

        self.printer.print_line(style_header("Extrato"));
        if filter.is_active() {
            self.printer
                .print_line(style_filter(&format!("Filtros: {}", describe_filter(filter))));
        }
        let printer = self.printer.indent();
        let transactions = transaction_list(entries);
        if transactions.is_empty() {
            printer.print_item(style("(nenhuma transação)").italic());
        } else {
            for entry in &transactions {
                print_entry(&printer, entry);
            }
        }
        Ok(())
    }
}

fn prompt_transaction_type() -> Result<TransactionType> {
    let options = [TransactionType::Credit, TransactionType::Debit];
    let labels = options.map(|option| EntryType::from(option).label());
    let selected = terminal::prompt_select("Tipo", &labels, 0)?;
    Ok(options[selected])
}

fn prompt_category() -> Result<Category> {
    let labels = Category::USER_FACING.map(Category::label);
    let default = Category::USER_FACING
        .iter()
        .position(|category| *category == Category::default())
        .unwrap_or(0);
    let selected = terminal::prompt_select("Categoria", &labels, default)?;
    Ok(Category::USER_FACING[selected])
}

fn describe_filter(filter: &StatementFilter) -> String {
    let mut parts = Vec::new();
    if let Some(start_date) = filter.start_date {
        parts.push(format!("de {}", format_day(start_date)));
    }
    if let Some(end_date) = filter.end_date {
        parts.push(format!("até {}", format_day(end_date)));
    }
    if let Some(entry_type) = filter.entry_type {
        parts.push(format!("tipo {entry_type}"));
    }
    parts.join(", ")
}

fn invalid_input<F: Ord>(errors: &FieldErrors<F>) -> anyhow::Error {
    let messages: Vec<&str> = errors.iter().map(|(_, message)| message).collect();
    anyhow!("{}", messages.join("\n"))
}

fn print_entry<W: LineWriter + Clone>(printer: &BulletPointPrinter<W>, entry: &StatementEntry) {
    let signed = match entry.entry_type {
        EntryType::Debit => -entry.amount,
        _ => entry.amount,
    };
    let amount = match entry.entry_type {
        EntryType::Credit => format!("+{}", format_currency(signed)),
        _ => format_currency(signed),
    };
    printer.print_item(format!(
        "{} {} {} {}",
        pad_str(
            &style_date(&format_timestamp(&entry.created_at)).to_string(),
            10,
            Alignment::Left,
            None
        ),
        pad_str(
            &style_amount(signed, amount).to_string(),
            16,
            Alignment::Right,
            None
        ),
        style_description(&entry.description),
        style_category(&format!("[{}]", format_category(&entry.category))),
    ));
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_filter(filter: &str) -> StyledObject<&str> {
    style(filter).dim()
}

fn style_success(message: &str) -> StyledObject<&str> {
    style(message).green().bold()
}

fn style_name(name: &str) -> StyledObject<&str> {
    style(name).cyan().bold()
}

fn style_account(account: &str) -> StyledObject<&str> {
    style(account).magenta()
}

fn style_date(date: &str) -> StyledObject<&str> {
    style(date)
}

fn style_amount(amount: Decimal, formatted: String) -> StyledObject<String> {
    let result = style(formatted).bold();
    if amount < Decimal::ZERO {
        result.red()
    } else {
        result.green()
    }
}

fn style_description(description: &str) -> StyledObject<&str> {
    style(description).blue()
}

fn style_category(category: &str) -> StyledObject<&str> {
    style(category).magenta()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::api::testutils::{login_response, Call, FakeBank};
    use crate::api::{Account, ApiError, CreateTransactionRequest, Customer};
    use crate::session::MemoryStorage;
    use crate::statement::tests::entry;
    use crate::terminal::RecordingLineWriter;

    async fn cli(
        api: FakeBank,
        logged_in: bool,
    ) -> (Cli<FakeBank, MemoryStorage, RecordingLineWriter>, RecordingLineWriter) {
        let mut session = SessionStore::open(MemoryStorage::default()).await;
        if logged_in {
            session.login(&login_response()).await.unwrap();
        }
        let writer = RecordingLineWriter::default();
        let cli = Cli::new(api, session, BulletPointPrinter::new(writer.clone()));
        (cli, writer)
    }

    // Falls inside the month-to-date window whatever the local timezone is
    fn today_entry(id: &str, entry_type: EntryType, amount: Decimal) -> StatementEntry {
        let today = Local::now().date_naive();
        StatementEntry {
            created_at: today.and_hms_opt(12, 0, 0).unwrap().and_utc(),
            ..entry(id, entry_type, amount, 1, 0)
        }
    }

    #[tokio::test]
    async fn account_commands_require_login() {
        let (cli, writer) = cli(FakeBank::new(), false).await;

        let err = cli.main_statement(&StatementFilter::default()).await.unwrap_err();
        assert!(err.to_string().contains("keysbank login"));
        assert!(cli.main_whoami().is_err());
        assert!(cli.main_balance(false).await.is_err());
        assert!(writer.lines().is_empty());
    }

    #[tokio::test]
    async fn login_refused_while_logged_in() {
        let (mut cli, _) = cli(FakeBank::new(), true).await;

        let err = cli
            .main_login(Some("0001".to_string()), Some("343316".to_string()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Você já está logado como X"));
        assert!(cli.api.calls().is_empty());
    }

    #[tokio::test]
    async fn login_greets_customer() {
        let api = FakeBank::new().with_login(Ok(login_response()));
        let (mut cli, writer) = cli(api, false).await;

        cli.main_login(Some("0001".to_string()), Some("343316".to_string()))
            .await
            .unwrap();

        assert_eq!(vec!["Bem-vindo!", "Olá, X!"], writer.lines());
        assert!(cli.session.is_authenticated());
    }

    #[tokio::test]
    async fn failed_login_reports_invalid_credentials() {
        let api = FakeBank::new().with_login(Err(ApiError::from_response(404, None)));
        let (mut cli, _) = cli(api, false).await;

        let err = cli
            .main_login(Some("0001".to_string()), Some("343316".to_string()))
            .await
            .unwrap_err();
        assert_eq!("Agência ou conta inválida. Verifique seus dados.", err.to_string());
    }

    #[tokio::test]
    async fn signup_prints_access_data() {
        let api = FakeBank::new()
            .with_customer(Ok(Customer {
                id: "c-1".to_string(),
                name: "João Silva".to_string(),
                email: "joao@email.com".to_string(),
                created_at: None,
            }))
            .with_account(Ok(Account {
                id: "a-1".to_string(),
                customer_id: "c-1".to_string(),
                agency: "0001".to_string(),
                account_number: "343316".to_string(),
                status: None,
                created_at: None,
            }));
        let (mut cli, writer) = cli(api, false).await;

        cli.main_signup(
            Some("João Silva".to_string()),
            Some("joao@email.com".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(
            vec![
                "Conta criada com sucesso!",
                "Anote seus dados de acesso:",
                "  • Agência: 0001",
                "  • Conta: 343316",
            ],
            writer.lines()
        );
        assert!(!cli.session.is_authenticated());
    }

    #[tokio::test]
    async fn signup_with_invalid_args_lists_problems() {
        let (mut cli, _) = cli(FakeBank::new(), false).await;

        let err = cli
            .main_signup(Some("Jo".to_string()), Some("not-an-email".to_string()))
            .await
            .unwrap_err();
        assert_eq!(
            "Nome deve ter pelo menos 3 caracteres\nEmail inválido",
            err.to_string()
        );
    }

    #[tokio::test]
    async fn whoami_prints_header() {
        let (cli, writer) = cli(FakeBank::new(), true).await;
        cli.main_whoami().unwrap();
        assert_eq!(vec!["X 0001 / 343316"], writer.lines());
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let (mut cli, writer) = cli(FakeBank::new(), true).await;
        cli.main_logout().await.unwrap();
        cli.main_logout().await.unwrap();
        assert!(!cli.session.is_authenticated());
        assert_eq!(vec!["Sessão encerrada.", "Nenhuma sessão ativa."], writer.lines());
    }

    #[tokio::test]
    async fn empty_statement() {
        let (cli, writer) = cli(FakeBank::new(), true).await;
        cli.main_statement(&StatementFilter::default()).await.unwrap();
        assert_eq!(vec!["Extrato", "  • (nenhuma transação)"], writer.lines());
    }

    #[tokio::test]
    async fn statement_lists_newest_first_without_balance() {
        let api = FakeBank::new().with_statement(vec![
            entry("a", EntryType::Credit, Decimal::new(1000, 2), 1, 12),
            entry("b", EntryType::Balance, Decimal::new(1000, 2), 1, 23),
            entry("c", EntryType::Debit, Decimal::new(250, 2), 2, 12),
        ]);
        let (cli, writer) = cli(api, true).await;

        cli.main_statement(&StatementFilter::default()).await.unwrap();

        let lines = writer.lines();
        assert_eq!(3, lines.len());
        assert!(lines[1].contains("-R$ 2,50"), "{}", lines[1]);
        assert!(lines[1].contains("entry c [Outro]"), "{}", lines[1]);
        assert!(lines[2].contains("+R$ 10,00"), "{}", lines[2]);
        assert!(lines[2].contains("entry a"), "{}", lines[2]);
    }

    #[tokio::test]
    async fn statement_shows_creation_date() {
        let mut reported = entry("a", EntryType::Credit, Decimal::ONE, 5, 12);
        reported.date = Some(Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0).unwrap());
        let reported_created_at = reported.created_at;
        let api = FakeBank::new().with_statement(vec![reported]);
        let (cli, writer) = cli(api, true).await;

        cli.main_statement(&StatementFilter::default()).await.unwrap();

        let lines = writer.lines();
        let created = format!("  • {}", format_timestamp(&reported_created_at));
        assert!(lines[1].starts_with(&created), "{}", lines[1]);
    }

    #[tokio::test]
    async fn statement_passes_filter_to_api() {
        let (cli, writer) = cli(FakeBank::new(), true).await;
        let filter = StatementFilter {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
            end_date: None,
            entry_type: Some(EntryType::Debit),
        };

        cli.main_statement(&filter).await.unwrap();

        assert_eq!(
            vec![
                "Extrato",
                "Filtros: de 01/01/2026, tipo Débito",
                "  • (nenhuma transação)",
            ],
            writer.lines()
        );
        assert_eq!(
            vec![Call::GetStatement("u1".to_string(), filter)],
            cli.api.calls()
        );
    }

    #[tokio::test]
    async fn balance_shows_latest_snapshot_and_month() {
        let api = FakeBank::new().with_statement(vec![
            today_entry("bal", EntryType::Balance, Decimal::new(123456, 2)),
            today_entry("in", EntryType::Credit, Decimal::new(5000, 2)),
            today_entry("out", EntryType::Debit, Decimal::new(1250, 2)),
        ]);
        let (cli, writer) = cli(api, true).await;

        cli.main_balance(false).await.unwrap();

        assert_eq!(
            vec![
                "X 0001 / 343316",
                "Saldo disponível",
                "  R$ 1.234,56",
                "  • Entradas do mês: R$ 50,00",
                "  • Saídas do mês: R$ 12,50",
            ],
            writer.lines()
        );
    }

    #[tokio::test]
    async fn hidden_balance_is_masked() {
        let api = FakeBank::new().with_statement(vec![today_entry(
            "bal",
            EntryType::Balance,
            Decimal::new(100, 0),
        )]);
        let (cli, writer) = cli(api, true).await;

        cli.main_balance(true).await.unwrap();

        let lines = writer.lines();
        assert_eq!("  ••••••", lines[2]);
        assert_eq!("  • Entradas do mês: ••••", lines[3]);
        assert!(lines.iter().all(|line| !line.contains("R$")));
    }

    #[tokio::test]
    async fn transact_confirms_and_refreshes_statement() {
        let created = entry("t-1", EntryType::Debit, Decimal::new(1050, 2), 3, 9);
        let api = FakeBank::new()
            .with_transaction(Ok(created.clone()))
            .with_statement(vec![created]);
        let (mut cli, writer) = cli(api, true).await;

        cli.main_transact(
            Some("Conta de luz".to_string()),
            Some(TransactionType::Debit),
            Some("pagamento".to_string()),
            Some("1050".to_string()),
        )
        .await
        .unwrap();

        let lines = writer.lines();
        assert_eq!("Débito de R$ 10,50 registrado com sucesso.", lines[0]);
        assert_eq!("Extrato", lines[2]);
        assert!(lines[3].contains("-R$ 10,50"), "{}", lines[3]);
        assert_eq!(
            vec![
                Call::CreateTransaction(CreateTransactionRequest {
                    account_id: "u1".to_string(),
                    transaction_type: TransactionType::Debit,
                    category: Category::Pagamento,
                    amount: Decimal::new(1050, 2),
                    description: "Conta de luz".to_string(),
                }),
                Call::GetStatement("u1".to_string(), StatementFilter::default()),
            ],
            cli.api.calls()
        );
    }

    #[tokio::test]
    async fn transact_rejects_internal_category() {
        let (mut cli, _) = cli(FakeBank::new(), true).await;

        let err = cli
            .main_transact(
                Some("Saldo".to_string()),
                Some(TransactionType::Credit),
                Some("DAILY_BALANCE".to_string()),
                Some("100".to_string()),
            )
            .await
            .unwrap_err();
        assert_eq!("Categoria inválida: DAILY_BALANCE", err.to_string());
        assert!(cli.api.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_transaction_asks_to_retry() {
        let api = FakeBank::new().with_transaction(Err(ApiError::from_response(500, None)));
        let (mut cli, _) = cli(api, true).await;

        let err = cli
            .main_transact(
                Some("Conta de luz".to_string()),
                Some(TransactionType::Debit),
                Some("PAGAMENTO".to_string()),
                Some("1050".to_string()),
            )
            .await
            .unwrap_err();
        assert_eq!("Tente novamente mais tarde.", err.to_string());
    }
}
