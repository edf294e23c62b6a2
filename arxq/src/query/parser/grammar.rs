//! Recursive-descent parser over the token vector.
//!
//! A pre-pass pulls the trailing options (result cap, sort code, date
//! filters) out of the stream wherever they appear; the descent then builds
//! the boolean expression from what remains. Precedence, loosest first:
//! OR, implicit AND by juxtaposition, NOT, atoms.

use chrono::Days;
use thiserror::Error;

use super::tokenizer::{Token, TokenKind};
use crate::query::ast::{Expr, TermExpr};
use crate::query::fields::{sort_code, Field};
use crate::query::options::{parse_date_literal, SearchOptions, RESULT_COUNT_LIMIT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("Empty group")]
    EmptyGroup { position: usize },

    #[error("Unmatched parenthesis")]
    UnmatchedParen { position: usize },

    #[error("Operator '|' is missing an operand")]
    OrMissingOperand { position: usize },

    #[error("Operator '-' is missing an operand")]
    NotMissingOperand { position: usize },

    #[error("Number of results must be between 1 and 1000")]
    ResultCountRange { position: usize },

    #[error("Only one result count is allowed")]
    DuplicateNumber { position: usize },

    #[error("Only one sort code is allowed")]
    DuplicateSort { position: usize },

    #[error("Only one '>' date filter is allowed")]
    DuplicateSince { position: usize },

    #[error("Only one '<' date filter is allowed")]
    DuplicateUntil { position: usize },

    #[error("Unknown sort code: {value}")]
    UnknownSort { value: String, position: usize },

    #[error("Invalid date: {value}")]
    InvalidDate { value: String, position: usize },
}

impl SyntaxError {
    /// Zero-based column of the offending token, when one exists.
    pub fn position(&self) -> Option<usize> {
        match self {
            SyntaxError::EmptyQuery => None,
            SyntaxError::EmptyGroup { position }
            | SyntaxError::UnmatchedParen { position }
            | SyntaxError::OrMissingOperand { position }
            | SyntaxError::NotMissingOperand { position }
            | SyntaxError::ResultCountRange { position }
            | SyntaxError::DuplicateNumber { position }
            | SyntaxError::DuplicateSort { position }
            | SyntaxError::DuplicateSince { position }
            | SyntaxError::DuplicateUntil { position }
            | SyntaxError::UnknownSort { position, .. }
            | SyntaxError::InvalidDate { position, .. } => Some(*position),
        }
    }
}

/// Parse a token vector into an expression plus its options.
///
/// The expression is `None` only for a content-free input that carries a
/// date filter (search everything in the window); a content-free input
/// without one is the `EmptyQuery` error.
pub fn parse(tokens: Vec<Token>) -> Result<(Option<Expr>, SearchOptions), SyntaxError> {
    let (content, options) = extract_options(tokens)?;

    if content.is_empty() {
        if options.has_date_filter() {
            return Ok((None, options));
        }
        return Err(SyntaxError::EmptyQuery);
    }

    let mut parser = Parser {
        tokens: content,
        pos: 0,
    };
    let expr = parser.parse_or()?;
    if let Some(tok) = parser.peek() {
        // Only a stray ')' can survive the descent
        return Err(SyntaxError::UnmatchedParen {
            position: tok.position,
        });
    }
    Ok((Some(expr), options))
}

/// Remove NUMBER / SORT / SINCE / UNTIL tokens from anywhere in the stream,
/// enforcing at-most-one of each.
fn extract_options(tokens: Vec<Token>) -> Result<(Vec<Token>, SearchOptions), SyntaxError> {
    let mut options = SearchOptions::default();
    let mut seen_number = false;
    let mut seen_sort = false;
    let mut content = Vec::with_capacity(tokens.len());

    for tok in tokens {
        match tok.kind {
            TokenKind::Number => {
                if seen_number {
                    return Err(SyntaxError::DuplicateNumber {
                        position: tok.position,
                    });
                }
                seen_number = true;
                let count = tok.value.parse::<u32>().ok().filter(|n| {
                    (1..=RESULT_COUNT_LIMIT).contains(n)
                });
                options.max_results = count.ok_or(SyntaxError::ResultCountRange {
                    position: tok.position,
                })?;
            }
            TokenKind::Sort => {
                if seen_sort {
                    return Err(SyntaxError::DuplicateSort {
                        position: tok.position,
                    });
                }
                seen_sort = true;
                let (criterion, order) =
                    sort_code(&tok.value).ok_or_else(|| SyntaxError::UnknownSort {
                        value: tok.value.clone(),
                        position: tok.position,
                    })?;
                options.sort_by = criterion;
                options.sort_order = order;
            }
            TokenKind::Since => {
                if options.since.is_some() {
                    return Err(SyntaxError::DuplicateSince {
                        position: tok.position,
                    });
                }
                options.since = Some(parse_date_token(&tok)?);
            }
            TokenKind::Until => {
                if options.until.is_some() {
                    return Err(SyntaxError::DuplicateUntil {
                        position: tok.position,
                    });
                }
                let date = parse_date_token(&tok)?;
                // A day-granularity upper bound means the end of that day
                options.until = Some(if tok.value.len() == 8 {
                    date.checked_add_days(Days::new(1))
                        .ok_or_else(|| invalid_date(&tok))?
                } else {
                    date
                });
            }
            _ => content.push(tok),
        }
    }

    Ok((content, options))
}

fn parse_date_token(tok: &Token) -> Result<chrono::NaiveDateTime, SyntaxError> {
    parse_date_literal(&tok.value).ok_or_else(|| invalid_date(tok))
}

fn invalid_date(tok: &Token) -> SyntaxError {
    SyntaxError::InvalidDate {
        value: tok.value.clone(),
        position: tok.position,
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut items = vec![self.parse_and()?];
        while let Some(tok) = self.peek() {
            if tok.kind != TokenKind::Or {
                break;
            }
            let or_pos = tok.position;
            self.pos += 1;
            match self.peek_kind() {
                None | Some(TokenKind::RParen) => {
                    return Err(SyntaxError::OrMissingOperand { position: or_pos })
                }
                _ => items.push(self.parse_and()?),
            }
        }
        if items.len() == 1 {
            Ok(items.remove(0))
        } else {
            Ok(Expr::Or(items))
        }
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut items = Vec::new();
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokenKind::Or | TokenKind::RParen => break,
                _ => items.push(self.parse_not()?),
            }
        }
        match items.len() {
            0 => Err(match self.peek() {
                Some(tok) if tok.kind == TokenKind::Or => SyntaxError::OrMissingOperand {
                    position: tok.position,
                },
                Some(tok) => SyntaxError::UnmatchedParen {
                    position: tok.position,
                },
                None => SyntaxError::EmptyQuery,
            }),
            1 => Ok(items.remove(0)),
            _ => Ok(Expr::And(items)),
        }
    }

    fn parse_not(&mut self) -> Result<Expr, SyntaxError> {
        if self.peek_kind() == Some(TokenKind::Not) {
            let not_pos = self.peek().map(|t| t.position).unwrap_or_default();
            self.pos += 1;
            return match self.peek_kind() {
                None | Some(TokenKind::RParen) | Some(TokenKind::Or) => {
                    Err(SyntaxError::NotMissingOperand { position: not_pos })
                }
                _ => Ok(Expr::Not(Box::new(self.parse_not()?))),
            };
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, SyntaxError> {
        let tok = match self.advance() {
            Some(tok) => tok,
            None => return Err(SyntaxError::EmptyQuery),
        };

        match tok.kind {
            TokenKind::Keyword => Ok(Expr::Term(TermExpr {
                field: None,
                value: tok.value,
                phrase: false,
            })),
            TokenKind::Phrase => Ok(Expr::Term(TermExpr {
                field: None,
                value: tok.value,
                phrase: true,
            })),
            TokenKind::Field => Ok(Expr::Term(TermExpr {
                field: tok.prefix,
                value: tok.value,
                phrase: tok.phrase,
            })),
            TokenKind::Author | TokenKind::Category | TokenKind::Abstract | TokenKind::All => {
                let prefix = sigil_prefix(tok.kind);
                if tok.value.is_empty() {
                    // The tokenizer only emits an empty sigil directly
                    // before '('
                    let inner = self.parse_group(tok.position)?;
                    Ok(Expr::Group {
                        inner: Box::new(inner),
                        field: Some(prefix.to_string()),
                    })
                } else {
                    Ok(Expr::Term(TermExpr {
                        field: Some(prefix.to_string()),
                        value: tok.value,
                        phrase: tok.phrase,
                    }))
                }
            }
            TokenKind::LParen => {
                self.pos -= 1;
                let inner = self.parse_group(tok.position)?;
                Ok(Expr::Group {
                    inner: Box::new(inner),
                    field: None,
                })
            }
            // Remaining kinds cannot reach an atom position: options are
            // stripped by the pre-pass, operators are consumed above.
            _ => Err(SyntaxError::UnmatchedParen {
                position: tok.position,
            }),
        }
    }

    /// Consume `( expr )` and return the inner expression. `self.pos` must
    /// be at the LPAREN.
    fn parse_group(&mut self, sigil_pos: usize) -> Result<Expr, SyntaxError> {
        let lparen_pos = match self.peek() {
            Some(tok) if tok.kind == TokenKind::LParen => tok.position,
            _ => {
                return Err(SyntaxError::UnmatchedParen {
                    position: sigil_pos,
                })
            }
        };
        self.pos += 1;

        match self.peek_kind() {
            None => {
                return Err(SyntaxError::UnmatchedParen {
                    position: lparen_pos,
                })
            }
            Some(TokenKind::RParen) => {
                return Err(SyntaxError::EmptyGroup {
                    position: lparen_pos,
                })
            }
            _ => {}
        }

        let inner = self.parse_or()?;
        match self.peek_kind() {
            Some(TokenKind::RParen) => {
                self.pos += 1;
                Ok(inner)
            }
            _ => Err(SyntaxError::UnmatchedParen {
                position: lparen_pos,
            }),
        }
    }
}

fn sigil_prefix(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Author => Field::Author.prefix(),
        TokenKind::Category => Field::Category.prefix(),
        TokenKind::Abstract => Field::Abstract.prefix(),
        _ => Field::All.prefix(),
    }
}
