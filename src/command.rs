use crate::line_item::RowId;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ADD_REGEX: Regex = Regex::new(r"^add(?:\s+([0-9]+))?$").unwrap();
    static ref ROW_REGEX: Regex =
        Regex::new(r"^(rm|qty|price|product|size|color)\s+([0-9]+)(?:\s+(.*))?$").unwrap();
}

/// One line typed at the order-entry prompt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Append a row, or insert it at a 0-based position
    Add(Option<usize>),
    Remove(RowId),
    /// Raw quantity text, normalized by the ledger
    Quantity(RowId, String),
    /// Raw price text, normalized by the ledger
    Price(RowId, String),
    /// Pick a product; `None` clears it
    Product(RowId, Option<String>),
    Size(RowId, String),
    Color(RowId, String),
    Show,
    Totals,
    Wait,
    Help,
    Quit,
}

/// Parse a prompt line
///
/// # Arguments
/// * `line` - The text typed by the user
///
/// # Returns
/// * `Option<Command>` - The command, or `None` when the line is not understood
///
/// # Examples
/// ```
/// use order_ledger::command::{parse_command, Command};
/// use order_ledger::RowId;
///
/// assert_eq!(parse_command("qty 2 5"), Some(Command::Quantity(RowId(2), "5".to_string())));
/// assert_eq!(parse_command("add 1"), Some(Command::Add(Some(0))));
/// assert_eq!(parse_command("fly"), None);
/// ```
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();

    match line {
        "show" | "ls" => return Some(Command::Show),
        "totals" => return Some(Command::Totals),
        "wait" => return Some(Command::Wait),
        "help" => return Some(Command::Help),
        "q" | "quit" => return Some(Command::Quit),
        _ => {}
    }

    if let Some(captures) = ADD_REGEX.captures(line) {
        // positions are typed 1-based, like the rows on screen
        let position = match captures.get(1) {
            Some(digits) => Some(digits.as_str().parse::<usize>().ok()?.saturating_sub(1)),
            None => None,
        };
        return Some(Command::Add(position));
    }

    let captures = ROW_REGEX.captures(line)?;
    let verb = captures.get(1)?.as_str();
    let row_id = RowId(captures.get(2)?.as_str().parse().ok()?);
    let argument = captures
        .get(3)
        .map(|m| m.as_str().trim().to_string())
        .filter(|arg| !arg.is_empty());

    match verb {
        "rm" if argument.is_none() => Some(Command::Remove(row_id)),
        "qty" => Some(Command::Quantity(row_id, argument.unwrap_or_default())),
        "price" => Some(Command::Price(row_id, argument.unwrap_or_default())),
        "product" => Some(Command::Product(row_id, argument)),
        "size" => Some(Command::Size(row_id, argument?)),
        "color" => Some(Command::Color(row_id, argument?)),
        _ => None,
    }
}

pub const HELP: &str = "\
Commands:
  add [pos]               Add an empty row (at position pos, 1-based)
  rm <row>                Remove a row
  qty <row> <value>       Set quantity (invalid input counts as 0)
  price <row> <value>     Set unit price (invalid input counts as 0)
  product <row> [id]      Choose a product (no id clears it)
  size <row> <label>      Choose one of the offered sizes
  color <row> <label>     Choose one of the offered colors
  show                    Print the order
  totals                  Print subtotal, tax, total and profit
  wait                    Wait for running product lookups
  q                       Quit";
