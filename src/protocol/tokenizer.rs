//! Tokenizer
//!
//! Splits one input line into tokens. Runs of whitespace separate tokens;
//! a token wrapped in double quotes may contain whitespace, and `""`
//! inside a quoted token stands for a literal quote.

use crate::error::{RespError, Result};

/// Split `line` into tokens.
///
/// An empty or all-whitespace line yields no tokens. Unbalanced quotes,
/// stray quotes inside a bare token, and text glued to a closing quote are
/// all `MalformedCommand`.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some(&(start, first)) = chars.peek() else {
            return Ok(tokens);
        };

        if first == '"' {
            chars.next();
            tokens.push(quoted_token(&mut chars, start)?);
        } else {
            let mut token = String::new();
            while let Some((pos, c)) = chars.next_if(|(_, c)| !c.is_whitespace()) {
                if c == '"' {
                    return Err(RespError::MalformedCommand(format!(
                        "bare quote in unquoted token at column {}",
                        pos + 1
                    )));
                }
                token.push(c);
            }
            tokens.push(token);
        }
    }
}

fn quoted_token<I>(chars: &mut std::iter::Peekable<I>, start: usize) -> Result<String>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut token = String::new();

    loop {
        match chars.next() {
            None => {
                return Err(RespError::MalformedCommand(format!(
                    "unterminated quote starting at column {}",
                    start + 1
                )))
            }
            Some((_, '"')) => {
                if chars.next_if(|(_, c)| *c == '"').is_some() {
                    token.push('"');
                    continue;
                }
                return match chars.peek() {
                    None => Ok(token),
                    Some((_, c)) if c.is_whitespace() => Ok(token),
                    Some((pos, _)) => Err(RespError::MalformedCommand(format!(
                        "unexpected character after closing quote at column {}",
                        pos + 1
                    ))),
                };
            }
            Some((_, c)) => token.push(c),
        }
    }
}

