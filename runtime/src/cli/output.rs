//! Terminal output helpers shared by every subcommand.
//!
//! The global `--json`, `--quiet` and `--no-color` flags are
//! published as environment variables by `main` so any command can check
//! them without threading the parsed CLI through.

use std::io::IsTerminal;

pub const JSON_ENV: &str = "SCOUT_JSON";
pub const QUIET_ENV: &str = "SCOUT_QUIET";
pub const NO_COLOR_ENV: &str = "SCOUT_NO_COLOR";

fn flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

pub fn is_json() -> bool {
    flag(JSON_ENV)
}

pub fn is_quiet() -> bool {
    flag(QUIET_ENV)
}

/// Pretty-print a JSON value on stdout.
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

/// ANSI styling that switches itself off for pipes and `--no-color`.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        let color = !flag(NO_COLOR_ENV)
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stderr().is_terminal();
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    pub fn ok_sym(&self) -> String {
        self.paint("32", "✓")
    }

    pub fn warn_sym(&self) -> String {
        self.paint("33", "!")
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }
}
