//! # CLA Commands
//!
//! Turns a pull-request comment addressed to the bot into a typed
//! [`CommentAction`].
//!
//! ```text
//! @cla-bot agree
//! @cla-bot agree company="Acme Corp"
//! @cla-bot terminate
//! ```
//!
//! Malformed commands become [`CommentAction::Failure`]; comments not
//! addressed to the bot become [`CommentAction::Noop`]. Parsing never fails.

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

const AGREE: &str = "agree";
const TERMINATE: &str = "terminate";
const COMPANY: &str = "company";

/// Action requested by a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentAction {
    Agree,
    Terminate,
    /// Addressed to the bot but not understood.
    Failure,
    /// Agree or terminate on behalf of a prohibited company.
    BlockedCompany,
    /// Not addressed to the bot.
    Noop,
}

/// Parsed comment: the action and the company it names (empty if none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub action: CommentAction,
    pub company: String,
}

impl ParsedCommand {
    fn new(action: CommentAction) -> Self {
        Self {
            action,
            company: String::new(),
        }
    }

    /// Company named by the command, if any.
    pub fn company(&self) -> Option<&str> {
        Some(self.company.as_str()).filter(|c| !c.is_empty())
    }
}

/// `@name` form used to address the bot.
pub fn bot_mention(bot_name: &str) -> String {
    format!("@{}", bot_name)
}

/// Parse `body` addressed to `mention` (e.g. `@cla-bot`).
pub fn parse<S: AsRef<str>>(body: &str, mention: &str, prohibited_companies: &[S]) -> ParsedCommand {
    let line = command_line(body, mention);
    let tokens = tokenize(line);

    if tokens.len() < 2 || tokens[0] != mention {
        return ParsedCommand::new(CommentAction::Noop);
    }

    let action = match tokens[1] {
        AGREE => CommentAction::Agree,
        TERMINATE => CommentAction::Terminate,
        _ => CommentAction::Failure,
    };

    if tokens.len() != 3 {
        return ParsedCommand::new(action);
    }

    match company_argument(tokens[2]) {
        Some(company) => {
            let blocked = prohibited_companies.iter().any(|c| c.as_ref() == company);
            let action = match action {
                CommentAction::Agree | CommentAction::Terminate if blocked => {
                    CommentAction::BlockedCompany
                }
                other => other,
            };
            ParsedCommand {
                action,
                company,
            }
        }
        None => ParsedCommand::new(CommentAction::Failure),
    }
}

/// First line starting with the mention, or the whole comment.
fn command_line<'a>(body: &'a str, mention: &str) -> &'a str {
    body.split('\n')
        .find(|line| line.starts_with(mention))
        .map(str::trim)
        .unwrap_or(body)
}

/// Split on spaces outside double quotes, dropping empty tokens.
fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (index, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' if !in_quotes => {
                tokens.push(&line[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    tokens.push(&line[start..]);

    tokens.retain(|t| !t.is_empty());
    tokens
}

/// `company="Name"` yields `Name`.
fn company_argument(token: &str) -> Option<String> {
    let (key, value) = token.split_once('=')?;
    if key != COMPANY {
        return None;
    }
    Some(value.replace('"', ""))
}
