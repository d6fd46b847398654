//! Chat command parsing
//!
//! Accepted `/add` forms:
//! - `/add TCS >= 4200`
//! - `/add TCS >=4200` (operator attached to the price)
//! - `/add TCS 4200` (legacy form, treated as `>=`)

use thiserror::Error;

use crate::core::alert::{Operator, Symbol};

/// Usage text shared by `/help`, `/start` and every parse error
pub const USAGE: &str = "Commands:\n\
/add SYMBOL >= PRICE - alert when price rises to PRICE\n\
/add SYMBOL <= PRICE - alert when price falls to PRICE\n\
/list - show your active alerts\n\
/remove SYMBOL - delete an alert\n\
Example: /add TCS.NS >= 4200";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Help,
    Add {
        symbol: Symbol,
        operator: Operator,
        threshold: f64,
    },
    List,
    Remove {
        symbol: Symbol,
    },
    Unknown(String),
}

/// Parse one message text
///
/// Returns `None` for plain text (not a command). Command names are
/// case-insensitive and may carry a bot mention (`/add@MyBot`).
pub fn parse_command(text: &str) -> Option<Result<Command, CommandError>> {
    let text = text.trim();
    let body = text.strip_prefix('/')?;

    let (head, args) = match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], body[idx..].trim()),
        None => (body, ""),
    };
    let name = head.split('@').next().unwrap_or_default().to_ascii_lowercase();

    let parsed = match name.as_str() {
        "start" => Ok(Command::Start),
        "help" => Ok(Command::Help),
        "list" => Ok(Command::List),
        "add" => parse_add(args),
        "remove" => parse_remove(args),
        _ => Ok(Command::Unknown(name)),
    };
    Some(parsed)
}

fn parse_add(args: &str) -> Result<Command, CommandError> {
    let (symbol_part, operator, price_part) = match find_operator(args) {
        Some((idx, operator)) => (&args[..idx], operator, &args[idx + 2..]),
        None => {
            let mut tokens = args.split_whitespace();
            match (tokens.next(), tokens.next(), tokens.next()) {
                (Some(symbol), Some(price), None) => (symbol, Operator::Gte, price),
                _ => return Err(CommandError::Parse("expected SYMBOL OPERATOR PRICE".into())),
            }
        }
    };

    let symbol = Symbol::parse(symbol_part).map_err(|e| CommandError::Parse(e.to_string()))?;
    let price_part = price_part.trim();
    let threshold: f64 = price_part
        .parse()
        .map_err(|_| CommandError::Parse(format!("'{}' is not a price", price_part)))?;

    Ok(Command::Add {
        symbol,
        operator,
        threshold,
    })
}

fn parse_remove(args: &str) -> Result<Command, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Parse("expected SYMBOL".into()));
    }
    let symbol = Symbol::parse(args).map_err(|e| CommandError::Parse(e.to_string()))?;
    Ok(Command::Remove { symbol })
}

/// Byte offset and kind of the first `>=` / `<=` in `args`
fn find_operator(args: &str) -> Option<(usize, Operator)> {
    [(">=", Operator::Gte), ("<=", Operator::Lte)]
        .into_iter()
        .filter_map(|(token, op)| args.find(token).map(|idx| (idx, op)))
        .min_by_key(|(idx, _)| *idx)
}
