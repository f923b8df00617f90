//! Command parsing for the comparison front-end

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{CompareError, Result};

static TICKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9][A-Z0-9.\-]{0,9}$").expect("valid ticker pattern")
});

/// Normalize a ticker to upper case and check its shape
pub fn parse_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_uppercase();
    if !TICKER.is_match(&ticker) {
        return Err(CompareError::Command(format!("Invalid ticker: {ticker}")));
    }
    Ok(ticker)
}

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Greeting with usage
    Start,
    /// Compare a ticker with its industry
    Compare { ticker: String },
    /// Show help
    Help,
    /// Exit the REPL
    Exit,
    /// Free text that is not a ticker; no reply
    Ignore,
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(CompareError::Command("Empty input".to_string()));
        }

        // Bare text is treated as a ticker only when purely alphabetic
        let Some(rest) = input.strip_prefix('/') else {
            if input.chars().all(char::is_alphabetic) {
                return Ok(Command::Compare {
                    ticker: input.to_uppercase(),
                });
            }
            return Ok(Command::Ignore);
        };

        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some(cmd) = parts.first() else {
            return Err(CompareError::Command("Empty command".to_string()));
        };
        let args = &parts[1..];

        match cmd.to_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "compare" | "cmp" | "c" => {
                let raw = args
                    .first()
                    .ok_or_else(|| CompareError::Command("Usage: /compare TICKER".to_string()))?;
                Ok(Command::Compare {
                    ticker: parse_ticker(raw)?,
                })
            }
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            other => Err(CompareError::Command(format!("Unknown command: /{other}"))),
        }
    }

    /// Greeting shown for `/start`
    pub fn greeting() -> &'static str {
        "Hello! I am financebro.\n\
         Send me a stock ticker (e.g. AAPL) or use /compare TICKER to see ratios vs. industry."
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r"
Commands:
  /compare <ticker>   Compare a company's valuation ratios with its industry
  <ticker>            Same as /compare (letters only)
  /start              Show the greeting
  /help               Show help
  /exit               Exit

Aliases:
  /c = /cmp = /compare     /q = /exit

Metrics: P/E, EV/EBITDA, Assets/Debt, Price/Book, EV/Revenue
"
    }
}
