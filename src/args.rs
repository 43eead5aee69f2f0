use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::api::TransactionType;
use crate::config::{DEFAULT_API_URL, DEFAULT_SESSION_DIR};
use crate::statement::EntryType;

/// Terminal client for the KeysBank digital bank.
#[derive(Parser, Debug)]
pub struct Args {
    /// Base URL of the KeysBank API
    #[clap(long, global = true, env = "KEYSBANK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Directory where the login session is kept
    #[clap(long, global = true, env = "KEYSBANK_SESSION_DIR", default_value = DEFAULT_SESSION_DIR)]
    pub session_dir: PathBuf,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a new account
    Signup {
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        email: Option<String>,
    },

    /// Log in with agency and account number
    Login {
        #[clap(long)]
        agency: Option<String>,
        #[clap(long)]
        account_number: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Show the balance and this month's credits and debits
    Balance {
        /// Mask the amounts
        #[clap(long)]
        hide: bool,
    },

    /// List the account's transactions, newest first
    Statement {
        /// YYYY-MM-DD
        #[clap(long)]
        start_date: Option<NaiveDate>,
        /// YYYY-MM-DD
        #[clap(long)]
        end_date: Option<NaiveDate>,
        /// CREDIT, DEBIT or BALANCE
        #[clap(long = "type")]
        entry_type: Option<EntryType>,
    },

    /// Register a credit or debit
    Transact {
        #[clap(long)]
        description: Option<String>,
        /// CREDIT or DEBIT
        #[clap(long = "type")]
        transaction_type: Option<TransactionType>,
        /// Category code, e.g. SALARIO or FATURA_CARTAO
        #[clap(long)]
        category: Option<String>,
        /// Amount in cents, e.g. 1050 for R$ 10,50
        #[clap(long)]
        amount_cents: Option<String>,
    },
}

pub fn parse() -> Args {
    Args::parse()
}
