//! Interactive loop over stdin.

use anyhow::Result;
use client_core::{ContactStore, Phonebook};

use crate::{prompt::StdinPrompt, render};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add { name: String, number: String },
    Delete { target: String },
    Filter(String),
    List,
    Refresh,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  add NAME NUMBER   add a contact, or replace the number of an existing name
                    (`add \"NAME\" NUMBER` or `add NAME, NUMBER` when the number has spaces)
  delete NAME|ID    delete a contact
  filter [TERM]     show only names containing TERM (empty clears)
  list              show contacts
  refresh           reload contacts from the server
  help              show this text
  quit              leave the shell";

/// Splits `add` arguments into name and number. A quoted name or a comma
/// ends the name; otherwise the last word is the number.
fn split_add(rest: &str) -> Option<(&str, &str)> {
    let (name, number) = if let Some(quoted) = rest.strip_prefix('"') {
        quoted.split_once('"')?
    } else if let Some(split) = rest.split_once(',') {
        split
    } else {
        rest.rsplit_once(char::is_whitespace)?
    };
    let (name, number) = (name.trim(), number.trim());
    if name.is_empty() || number.is_empty() {
        return None;
    }
    Some((name, number))
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "add" | "a" => {
            let (name, number) =
                split_add(rest).ok_or_else(|| "usage: add NAME NUMBER".to_string())?;
            Ok(ShellCommand::Add {
                name: name.to_string(),
                number: number.to_string(),
            })
        }
        "delete" | "del" | "rm" => {
            if rest.is_empty() {
                return Err("usage: delete NAME|ID".to_string());
            }
            Ok(ShellCommand::Delete {
                target: rest.to_string(),
            })
        }
        "filter" | "f" => Ok(ShellCommand::Filter(rest.to_string())),
        "list" | "ls" | "" => Ok(ShellCommand::List),
        "refresh" => Ok(ShellCommand::Refresh),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}', try 'help'")),
    }
}

pub async fn run<S: ContactStore>(phonebook: &Phonebook<S>, prompt: &StdinPrompt) -> Result<()> {
    println!("{HELP}");
    render::contacts(&phonebook.visible().await);

    loop {
        if let Some(notification) = phonebook.notification().await {
            render::notification(&notification);
        }

        let Some(line) = prompt.read_line("phonebook> ").await? else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        match command {
            ShellCommand::Add { name, number } => {
                match phonebook.submit(name, number, prompt).await {
                    Ok(outcome) => render::submit_outcome(&outcome),
                    Err(err) => eprintln!("{err}"),
                }
            }
            ShellCommand::Delete { target } => match phonebook.resolve(&target).await {
                Ok(contact) => {
                    let outcome = phonebook.delete(&contact.id, prompt).await;
                    render::delete_outcome(&outcome, &contact.name);
                }
                Err(err) => eprintln!("{err}"),
            },
            ShellCommand::Filter(term) => {
                phonebook.set_filter(term).await;
                render::contacts(&phonebook.visible().await);
            }
            ShellCommand::List => render::contacts(&phonebook.visible().await),
            ShellCommand::Refresh => match phonebook.load().await {
                Ok(_) => render::contacts(&phonebook.visible().await),
                Err(err) => eprintln!("{err}"),
            },
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
