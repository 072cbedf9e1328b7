//! Message parser - Splits raw text into a keyword and parameters

use crate::domain::entities::Params;

/// Leading keyword and the whitespace-delimited tokens after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub keyword: String,
    pub params: Vec<String>,
}

impl ParsedCommand {
    /// Parameters shaped for a command's [`Params`] spec
    pub fn params_for(&self, spec: Params) -> Vec<String> {
        match spec {
            Params::None => self.params.clone(),
            Params::Subject => {
                let Some((subject, rest)) = self.params.split_first() else {
                    return Vec::new();
                };
                // A bare `@` is a missing subject, not a cue to use the next token
                let subject = MessageParser::strip_sigil(subject);
                if subject.is_empty() {
                    return Vec::new();
                }
                std::iter::once(subject.to_string())
                    .chain(rest.iter().cloned())
                    .collect()
            }
        }
    }
}

/// Parses incoming message text
#[derive(Debug, Clone, Default)]
pub struct MessageParser;

impl MessageParser {
    pub fn new() -> Self {
        Self
    }

    /// Split `text` into its keyword and parameters. Blank text yields `None`.
    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        let mut parts = text.split_whitespace();
        let keyword = parts.next()?.to_string();
        Some(ParsedCommand {
            keyword,
            params: parts.map(str::to_string).collect(),
        })
    }

    /// `@name` -> `name`; anything else is returned unchanged
    pub fn strip_sigil(token: &str) -> &str {
        token.strip_prefix('@').unwrap_or(token)
    }
}
