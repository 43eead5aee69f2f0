pub mod api;
pub mod args;
pub mod category;
pub mod cli;
pub mod config;
pub mod format;
pub mod forms;
pub mod session;
pub mod statement;
pub mod terminal;
