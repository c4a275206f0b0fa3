//! # Operator Input
//!
//! Parses typed lines into commands and reads them off a blocking source.
//!
//! ## Commands
//! ```text
//! <barcode>          look up a code (same as scanning it)
//! find <barcode>     explicit form, for codes that look like commands
//! +  /  -            change the staged quantity
//! add                put the staged item in the cart
//! cart <n> + | -     change cart line n (1-based)
//! torch              toggle the scanner light
//! new                start over for the next customer
//! help               show this list
//! quit               exit
//! ```

use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{AppError, AppResult};

pub const HELP: &str = "\
Commands:
  <barcode>        look up a code
  find <barcode>   look up a code that looks like a command
  + / -            change the scanned item's quantity
  add              add the scanned item to the cart
  cart <n> + / -   change the quantity of cart line n
  torch            toggle the scanner light
  new              start over for the next customer
  help             show this list
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Lookup(String),
    WorkingQuantity(i32),
    Commit,
    CartQuantity { line: usize, delta: i32 },
    Torch,
    Reset,
    Help,
    Quit,
}

fn parse_delta(word: &str) -> Option<i32> {
    match word {
        "+" => Some(1),
        "-" => Some(-1),
        _ => None,
    }
}

/// Parses one typed line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> AppResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default();
    let rest: Vec<&str> = words.collect();

    let command = match (head.to_lowercase().as_str(), rest.as_slice()) {
        ("find", [code]) => Command::Lookup(code.to_string()),
        ("find", _) => return Err(AppError::input("Usage: find <barcode>")),
        ("+", []) => Command::WorkingQuantity(1),
        ("-", []) => Command::WorkingQuantity(-1),
        ("add", []) => Command::Commit,
        ("cart", [n, sign]) => {
            let line = n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AppError::input(format!("Not a cart line number: {}", n)))?;
            let delta = parse_delta(sign)
                .ok_or_else(|| AppError::input("Usage: cart <n> + | -"))?;
            Command::CartQuantity { line, delta }
        }
        ("cart", _) => return Err(AppError::input("Usage: cart <n> + | -")),
        ("torch", []) => Command::Torch,
        ("new", []) => Command::Reset,
        ("help" | "?", []) => Command::Help,
        ("quit" | "exit" | "q", []) => Command::Quit,
        _ => Command::Lookup(line.to_string()),
    };

    Ok(Some(command))
}

/// Reads lines on a dedicated thread and forwards them.
///
/// A blocking console read cannot be cancelled, so it stays off the runtime;
/// the thread ends at EOF or when the receiver is dropped.
pub fn spawn_line_reader<R>(reader: R) -> AppResult<mpsc::Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    thread::Builder::new()
        .name("console-input".into())
        .spawn(move || {
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!(error = %e, "Console read failed");
                        break;
                    }
                }
            }
            debug!("Console input closed");
        })?;

    Ok(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_plain_line_is_lookup() {
        assert_eq!(parse("5449000000996"), Command::Lookup("5449000000996".into()));
        assert_eq!(parse("  A1 "), Command::Lookup("A1".into()));
    }

    #[test]
    fn test_find_forces_lookup() {
        assert_eq!(parse("find add"), Command::Lookup("add".into()));
        assert!(parse_command("find").is_err());
    }

    #[test]
    fn test_quantity_commands() {
        assert_eq!(parse("+"), Command::WorkingQuantity(1));
        assert_eq!(parse("-"), Command::WorkingQuantity(-1));
        assert_eq!(parse("cart 2 +"), Command::CartQuantity { line: 2, delta: 1 });
        assert_eq!(parse("CART 1 -"), Command::CartQuantity { line: 1, delta: -1 });
    }

    #[test]
    fn test_bad_cart_commands() {
        assert!(parse_command("cart 0 +").is_err());
        assert!(parse_command("cart x +").is_err());
        assert!(parse_command("cart 1 *").is_err());
        assert!(parse_command("cart").is_err());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse("add"), Command::Commit);
        assert_eq!(parse("torch"), Command::Torch);
        assert_eq!(parse("new"), Command::Reset);
        assert_eq!(parse("HELP"), Command::Help);
        assert_eq!(parse("q"), Command::Quit);
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_reader_forwards_until_eof() {
        let mut rx = spawn_line_reader(Cursor::new("A1\nadd\n")).unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("A1"));
        assert_eq!(rx.recv().await.as_deref(), Some("add"));
        assert_eq!(rx.recv().await, None);
    }
}
