//! Single-pass tokenizer for the search DSL.
//!
//! Turns the raw input into a flat token vector, each token tagged with its
//! zero-based column for error reporting. Rules are tried in a fixed
//! priority order; the first lexical problem aborts the scan.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Bare word, searched in the title by default
    Keyword,
    /// Quoted run without a sigil
    Phrase,
    /// `@value` / `@"..."` / `@(` marker
    Author,
    /// `#value`
    Category,
    /// `$value`
    Abstract,
    /// `*value`
    All,
    /// Explicit archive-style `prefix:value`
    Field,
    /// Result cap digits
    Number,
    /// Sort code (`s`, `sd`, `ra`, ...)
    Sort,
    /// `>YYYYMMDD[HHMM[SS]]` date filter
    Since,
    /// `<YYYYMMDD[HHMM[SS]]` date filter
    Until,
    Or,
    Not,
    LParen,
    RParen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// User-visible text, minus any sigil or surrounding quotes. Empty for
    /// a sigil that introduces a group (`@(`).
    pub value: String,
    /// Zero-based char column in the input
    pub position: usize,
    /// Field prefix, set on `Field` tokens only
    pub prefix: Option<String>,
    /// Whether the value came from a quoted run
    pub phrase: bool,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            position,
            prefix: None,
            phrase: false,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn quoted(mut self) -> Self {
        self.phrase = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unterminated phrase")]
    UnterminatedPhrase { position: usize },

    #[error("Empty phrase")]
    EmptyPhrase { position: usize },

    #[error("Operator '|' must be separated by whitespace")]
    UnspacedOr { position: usize },

    #[error("Operator '-' must be followed by a term")]
    DanglingNot { position: usize },

    #[error("Field sigil '{sigil}' must be followed by a value")]
    LoneSigil { sigil: char, position: usize },

    #[error("Field prefix '{prefix}:' must be followed by a value")]
    MissingFieldValue { prefix: String, position: usize },

    #[error("Date filter must be 8, 12, or 14 digits")]
    MalformedDate { position: usize },

    #[error("Unexpected character '{ch}'")]
    UnexpectedChar { ch: char, position: usize },
}

impl LexError {
    /// Zero-based column of the offending construct.
    pub fn position(&self) -> usize {
        match self {
            LexError::UnterminatedPhrase { position }
            | LexError::EmptyPhrase { position }
            | LexError::UnspacedOr { position }
            | LexError::DanglingNot { position }
            | LexError::LoneSigil { position, .. }
            | LexError::MissingFieldValue { position, .. }
            | LexError::MalformedDate { position }
            | LexError::UnexpectedChar { position, .. } => *position,
        }
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '.' | '-' | '_')
}

fn is_boundary(ch: char) -> bool {
    ch.is_whitespace() || ch == '(' || ch == ')'
}

pub struct Tokenizer {
    input: Vec<char>,
    pos: usize,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn read_while<F>(&mut self, predicate: F) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if predicate(ch) {
                out.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    /// Read a quoted run. `self.pos` must be at the opening quote; on
    /// success the cursor sits past the closing quote.
    fn read_phrase(&mut self) -> Result<String, LexError> {
        let quote_pos = self.pos;
        self.pos += 1;
        let text = self.read_while(|c| c != '"');
        match self.peek() {
            Some('"') => {
                self.pos += 1;
                if text.is_empty() {
                    Err(LexError::EmptyPhrase {
                        position: quote_pos,
                    })
                } else {
                    Ok(text)
                }
            }
            _ => Err(LexError::UnterminatedPhrase {
                position: quote_pos,
            }),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += 1;
                continue;
            }
            let start = self.pos;

            match ch {
                '(' => {
                    self.pos += 1;
                    tokens.push(Token::new(TokenKind::LParen, "(", start));
                }
                ')' => {
                    self.pos += 1;
                    tokens.push(Token::new(TokenKind::RParen, ")", start));
                }
                '"' => {
                    let text = self.read_phrase()?;
                    tokens.push(Token::new(TokenKind::Phrase, text, start).quoted());
                }
                '|' => {
                    let before_ok = start == 0 || is_boundary(self.input[start - 1]);
                    let after_ok = self.peek_at(1).map_or(true, is_boundary);
                    if !(before_ok && after_ok) {
                        return Err(LexError::UnspacedOr { position: start });
                    }
                    self.pos += 1;
                    tokens.push(Token::new(TokenKind::Or, "|", start));
                }
                '-' => match self.peek_at(1) {
                    Some(next) if !next.is_whitespace() => {
                        self.pos += 1;
                        tokens.push(Token::new(TokenKind::Not, "-", start));
                    }
                    _ => return Err(LexError::DanglingNot { position: start }),
                },
                '@' | '#' | '$' | '*' => {
                    let token = self.read_sigil(ch, start)?;
                    tokens.push(token);
                }
                '>' | '<' => {
                    let kind = if ch == '>' {
                        TokenKind::Since
                    } else {
                        TokenKind::Until
                    };
                    self.pos += 1;
                    let digits = self.read_while(|c| c.is_ascii_digit());
                    let trailing_word = self.peek().is_some_and(|c| c.is_alphanumeric());
                    if !matches!(digits.len(), 8 | 12 | 14) || trailing_word {
                        return Err(LexError::MalformedDate { position: start });
                    }
                    tokens.push(Token::new(kind, digits, start));
                }
                c if c.is_alphanumeric() || c == '_' || c == '.' => {
                    let token = self.read_word(start)?;
                    tokens.push(token);
                }
                other => {
                    return Err(LexError::UnexpectedChar {
                        ch: other,
                        position: start,
                    })
                }
            }
        }

        Ok(tokens)
    }

    fn read_sigil(&mut self, sigil: char, start: usize) -> Result<Token, LexError> {
        let kind = match sigil {
            '@' => TokenKind::Author,
            '#' => TokenKind::Category,
            '$' => TokenKind::Abstract,
            _ => TokenKind::All,
        };
        match self.peek_at(1) {
            Some('"') => {
                self.pos += 1;
                let text = self.read_phrase()?;
                Ok(Token::new(kind, text, start).quoted())
            }
            // Sigil-led group: emit the sigil with an empty value; the
            // LPAREN that follows is lexed on the next loop iteration.
            Some('(') => {
                self.pos += 1;
                Ok(Token::new(kind, "", start))
            }
            Some(next) if is_ident_char(next) => {
                self.pos += 1;
                let value = self.read_while(is_ident_char);
                Ok(Token::new(kind, value, start))
            }
            _ => Err(LexError::LoneSigil {
                sigil,
                position: start,
            }),
        }
    }

    fn read_word(&mut self, start: usize) -> Result<Token, LexError> {
        let word = self.read_while(is_ident_char);

        if self.peek() == Some(':') {
            // Archive-style `prefix:value`. The prefix is kept verbatim;
            // unrecognized prefixes are rejected by the transformer.
            if !word.chars().next().is_some_and(|c| c.is_alphabetic()) {
                return Err(LexError::UnexpectedChar {
                    ch: ':',
                    position: self.pos,
                });
            }
            self.pos += 1;
            return match self.peek() {
                Some('"') => {
                    let text = self.read_phrase()?;
                    Ok(Token::new(TokenKind::Field, text, start)
                        .with_prefix(word)
                        .quoted())
                }
                Some(next) if is_ident_char(next) => {
                    let value = self.read_while(is_ident_char);
                    Ok(Token::new(TokenKind::Field, value, start).with_prefix(word))
                }
                _ => Err(LexError::MissingFieldValue {
                    prefix: word,
                    position: start,
                }),
            };
        }

        Ok(classify_word(word, start))
    }
}

/// Classify a bare word as NUMBER, SORT, or KEYWORD.
fn classify_word(word: String, position: usize) -> Token {
    if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) {
        return Token::new(TokenKind::Number, word, position);
    }
    if word.len() <= 2 && word.chars().all(|c| c.is_ascii_alphabetic()) {
        let lower = word.to_lowercase();
        if fields::sort_code(&lower).is_some() {
            return Token::new(TokenKind::Sort, lower, position);
        }
    }
    Token::new(TokenKind::Keyword, word, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Tokenizer::new(input).tokenize().unwrap()
    }

    fn lex_err(input: &str) -> LexError {
        Tokenizer::new(input).tokenize().unwrap_err()
    }

    #[test]
    fn test_bare_keywords() {
        let tokens = lex("quantum neural");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::new(TokenKind::Keyword, "quantum", 0));
        assert_eq!(tokens[1], Token::new(TokenKind::Keyword, "neural", 8));
    }

    #[test]
    fn test_sigil_values() {
        let tokens = lex("@hinton #cs.AI $transformer *attention");
        assert_eq!(tokens[0], Token::new(TokenKind::Author, "hinton", 0));
        assert_eq!(tokens[1], Token::new(TokenKind::Category, "cs.AI", 8));
        assert_eq!(tokens[2], Token::new(TokenKind::Abstract, "transformer", 15));
        assert_eq!(tokens[3], Token::new(TokenKind::All, "attention", 28));
    }

    #[test]
    fn test_quoted_phrase() {
        let tokens = lex("\"vision transformer\"");
        assert_eq!(
            tokens[0],
            Token::new(TokenKind::Phrase, "vision transformer", 0).quoted()
        );
    }

    #[test]
    fn test_quoted_sigil_value() {
        let tokens = lex("@\"geoffrey hinton\"");
        assert_eq!(
            tokens[0],
            Token::new(TokenKind::Author, "geoffrey hinton", 0).quoted()
        );
    }

    #[test]
    fn test_sigil_group_marker() {
        let tokens = lex("@(hinton lecun)");
        assert_eq!(tokens[0], Token::new(TokenKind::Author, "", 0));
        assert_eq!(tokens[1].kind, TokenKind::LParen);
        assert_eq!(tokens[2], Token::new(TokenKind::Keyword, "hinton", 2));
        assert_eq!(tokens[4].kind, TokenKind::RParen);
    }

    #[test]
    fn test_explicit_field() {
        let tokens = lex("ti:quantum au:\"yann lecun\"");
        assert_eq!(
            tokens[0],
            Token::new(TokenKind::Field, "quantum", 0).with_prefix("ti")
        );
        assert_eq!(
            tokens[1],
            Token::new(TokenKind::Field, "yann lecun", 11)
                .with_prefix("au")
                .quoted()
        );
    }

    #[test]
    fn test_unknown_prefix_is_lexed() {
        // Prefix validity is the transformer's call
        let tokens = lex("foo:bar");
        assert_eq!(
            tokens[0],
            Token::new(TokenKind::Field, "bar", 0).with_prefix("foo")
        );
    }

    #[test]
    fn test_number_and_sort() {
        let tokens = lex("quantum 20 rd");
        assert_eq!(tokens[1], Token::new(TokenKind::Number, "20", 8));
        assert_eq!(tokens[2], Token::new(TokenKind::Sort, "rd", 11));
    }

    #[test]
    fn test_sort_case_insensitive() {
        let tokens = lex("RA");
        assert_eq!(tokens[0], Token::new(TokenKind::Sort, "ra", 0));
    }

    #[test]
    fn test_digits_next_to_letters_are_keyword() {
        let tokens = lex("gpt4 2d");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Keyword);
    }

    #[test]
    fn test_out_of_range_number_still_number() {
        // Range is enforced by the parser for a better message
        let tokens = lex("5000");
        assert_eq!(tokens[0].kind, TokenKind::Number);
    }

    #[test]
    fn test_not_operator() {
        let tokens = lex("quantum -classical -@bengio");
        assert_eq!(tokens[1], Token::new(TokenKind::Not, "-", 8));
        assert_eq!(tokens[2], Token::new(TokenKind::Keyword, "classical", 9));
        assert_eq!(tokens[3], Token::new(TokenKind::Not, "-", 19));
        assert_eq!(tokens[4], Token::new(TokenKind::Author, "bengio", 20));
    }

    #[test]
    fn test_leading_dot_word() {
        let tokens = lex(".NET frameworks");
        assert_eq!(tokens[0], Token::new(TokenKind::Keyword, ".NET", 0));
        assert_eq!(tokens[1], Token::new(TokenKind::Keyword, "frameworks", 5));
    }

    #[test]
    fn test_hyphen_inside_word_is_not_an_operator() {
        let tokens = lex("q-bio co-training");
        assert_eq!(tokens[0], Token::new(TokenKind::Keyword, "q-bio", 0));
        assert_eq!(tokens[1], Token::new(TokenKind::Keyword, "co-training", 6));
    }

    #[test]
    fn test_or_needs_spacing() {
        assert_eq!(lex_err("a|b"), LexError::UnspacedOr { position: 1 });
        assert_eq!(lex_err("a |b"), LexError::UnspacedOr { position: 2 });
        let tokens = lex("a | b");
        assert_eq!(tokens[1].kind, TokenKind::Or);
    }

    #[test]
    fn test_or_next_to_parens_is_fine() {
        let tokens = lex("(a)|(b)");
        assert_eq!(tokens[3].kind, TokenKind::Or);
    }

    #[test]
    fn test_dangling_not() {
        assert_eq!(lex_err("quantum -"), LexError::DanglingNot { position: 8 });
        assert_eq!(lex_err("- quantum"), LexError::DanglingNot { position: 0 });
    }

    #[test]
    fn test_lone_sigil() {
        assert_eq!(
            lex_err("quantum @"),
            LexError::LoneSigil {
                sigil: '@',
                position: 8
            }
        );
        assert_eq!(
            lex_err("# cs"),
            LexError::LoneSigil {
                sigil: '#',
                position: 0
            }
        );
    }

    #[test]
    fn test_unterminated_phrase() {
        assert_eq!(
            lex_err("\"vision transformer"),
            LexError::UnterminatedPhrase { position: 0 }
        );
    }

    #[test]
    fn test_empty_phrase() {
        assert_eq!(lex_err("\"\""), LexError::EmptyPhrase { position: 0 });
        assert_eq!(lex_err("@\"\""), LexError::EmptyPhrase { position: 1 });
    }

    #[test]
    fn test_missing_field_value() {
        assert_eq!(
            lex_err("ti:"),
            LexError::MissingFieldValue {
                prefix: "ti".to_string(),
                position: 0
            }
        );
    }

    #[test]
    fn test_date_filters() {
        let tokens = lex(">20240101 <202412312359");
        assert_eq!(tokens[0], Token::new(TokenKind::Since, "20240101", 0));
        assert_eq!(tokens[1], Token::new(TokenKind::Until, "202412312359", 10));
    }

    #[test]
    fn test_malformed_date() {
        assert_eq!(lex_err(">2024"), LexError::MalformedDate { position: 0 });
        assert_eq!(
            lex_err(">20240101x"),
            LexError::MalformedDate { position: 0 }
        );
        assert_eq!(lex_err("< now"), LexError::MalformedDate { position: 0 });
    }

    #[test]
    fn test_unexpected_char() {
        assert_eq!(
            lex_err("quantum ^2"),
            LexError::UnexpectedChar {
                ch: '^',
                position: 8
            }
        );
    }

    #[test]
    fn test_unicode_author() {
        let tokens = lex("@müller");
        assert_eq!(tokens[0], Token::new(TokenKind::Author, "müller", 0));
    }

    #[test]
    fn test_positions_survive_whitespace_runs() {
        let tokens = lex("  quantum    @hinton");
        assert_eq!(tokens[0].position, 2);
        assert_eq!(tokens[1].position, 13);
    }
}
