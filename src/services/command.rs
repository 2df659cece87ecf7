//! Parser for the `/quote-alert` command text.
//!
//! `<symbol> <price> [ABOVE|BELOW] [delete] [deleteall] [#channel]`, tokens in
//! any order and any case. Empty text lists the caller's alerts.

use thiserror::Error;

use crate::models::Direction;

#[derive(Debug, Clone, PartialEq)]
pub enum AlertCommand {
    List,
    Upsert {
        symbol: String,
        price: f64,
        direction: Option<Direction>,
        notify_target: String,
    },
    Delete {
        symbol: String,
    },
    DeleteAll,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("'{0}' is not a valid price")]
    InvalidPrice(String),

    #[error("please give a symbol, e.g. `AAPL 150 above`")]
    MissingSymbol,

    #[error("please give a target price, e.g. `{0} 150 above`")]
    MissingPrice(String),
}

pub fn parse(text: &str) -> Result<AlertCommand, CommandError> {
    let mut symbol: Option<String> = None;
    let mut price: Option<f64> = None;
    let mut direction: Option<Direction> = None;
    let mut notify_target = String::new();
    let mut delete = false;
    let mut delete_all = false;
    let mut any = false;

    for token in text.split_whitespace() {
        any = true;
        let lower = token.to_lowercase();

        if let Some(channel) = token.strip_prefix('#') {
            notify_target = channel.to_string();
        } else if lower == "deleteall" {
            delete_all = true;
        } else if lower == "delete" {
            delete = true;
        } else if let Ok(dir) = lower.parse::<Direction>() {
            direction = Some(dir);
        } else if token.chars().any(|c| c.is_ascii_digit()) {
            let parsed = token
                .trim_start_matches('$')
                .parse::<f64>()
                .map_err(|_| CommandError::InvalidPrice(token.to_string()))?;
            price = Some(parsed);
        } else {
            symbol = Some(token.to_uppercase());
        }
    }

    if !any {
        return Ok(AlertCommand::List);
    }

    if delete_all {
        return Ok(AlertCommand::DeleteAll);
    }

    let symbol = symbol.ok_or(CommandError::MissingSymbol)?;

    if delete {
        return Ok(AlertCommand::Delete { symbol });
    }

    let price = price.ok_or_else(|| CommandError::MissingPrice(symbol.clone()))?;

    Ok(AlertCommand::Upsert {
        symbol,
        price,
        direction,
        notify_target,
    })
}
