use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, Select};

/// Asks again until `validate` has nothing to complain about.
pub fn prompt_validated(
    prompt: &str,
    validate: impl Fn(&str) -> Option<&'static str>,
) -> Result<String> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .validate_with(|input: &String| match validate(input) {
            Some(error) => Err(error),
            None => Ok(()),
        })
        .interact_text()?)
}

pub fn prompt_select(prompt: &str, options: &[&str], default: usize) -> Result<usize> {
    Ok(Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(options)
        .default(default)
        .interact()?)
}
