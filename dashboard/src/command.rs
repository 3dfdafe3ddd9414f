//! Line-oriented input. Each line read from stdin maps to one user intent.

use std::str::FromStr;

use dashboard_core::Field;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  refresh               reload the user list
  add                   open the form for a new user
  edit <id>             open the form for an existing user
  delete <id>           delete a user (asks for confirmation)
  name <value>          set the name in the open form
  email <value>         set the email in the open form (new users only)
  role <value>          set the role: Viewer, Editor or Admin
  submit                save the open form
  cancel                close the form without saving
  dismiss               hide the current notification
  help                  show this text
  quit                  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Add,
    Edit(String),
    Delete(String),
    Set(Field, String),
    Submit,
    Cancel,
    Dismiss,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty input")]
    Empty,
    #[error("unknown command `{0}`, type `help` for a list")]
    Unknown(String),
    #[error("`{0}` needs a user id")]
    MissingId(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let id = |name: &'static str| {
            if rest.is_empty() {
                Err(CommandError::MissingId(name))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "refresh" | "r" => Ok(Command::Refresh),
            "add" | "new" => Ok(Command::Add),
            "edit" => id("edit").map(Command::Edit),
            "delete" | "rm" => id("delete").map(Command::Delete),
            "name" => Ok(Command::Set(Field::Name, rest.to_string())),
            "email" => Ok(Command::Set(Field::Email, rest.to_string())),
            "role" => Ok(Command::Set(Field::Role, rest.to_string())),
            "submit" | "save" => Ok(Command::Submit),
            "cancel" | "close" => Ok(Command::Cancel),
            "dismiss" => Ok(Command::Dismiss),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(verb.to_string())),
        }
    }
}

/// `true` for an affirmative answer to a confirmation prompt.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
