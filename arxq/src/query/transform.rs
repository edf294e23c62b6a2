//! Transforms a parsed expression and its options into the final arXiv
//! API query.
//!
//! Field context flows top-down: a sigil-led group sets the ambient field
//! for bare terms inside it; anything still unresolved defaults to the
//! title field. Category values are normalized against the alias and
//! case tables before rendering.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ast::{Expr, TermExpr};
use super::fields::{self, Field};
use super::options::SearchOptions;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("Unrecognized field: {0}")]
    UnrecognizedField(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),
}

/// The compiled query, handed to the search client verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    /// Query string in the archive's boolean grammar
    pub query: String,
    pub max_results: u32,
    pub sort_by: fields::SortCriterion,
    pub sort_order: fields::SortOrder,
    /// Human-readable rendering for the chat surface
    pub echo: String,
}

pub struct Transformer {
    /// Hours ahead of UTC that date filters are written in
    timezone_offset_hours: i32,
}

impl Transformer {
    pub fn new(timezone_offset_hours: i32) -> Self {
        Self {
            timezone_offset_hours,
        }
    }

    pub fn transform(
        &self,
        expr: Option<&Expr>,
        options: &SearchOptions,
    ) -> Result<CompiledQuery, TransformError> {
        let date_clause = self.date_clause(options);

        let content = match expr {
            // With a date clause appended the content becomes an AND
            // conjunct, so a root OR must keep its parentheses.
            Some(e) => Some(self.render(e, None, false, date_clause.is_none())?),
            None => None,
        };

        let query = match (content, date_clause) {
            (Some(content), Some(dates)) => format!("{content} AND {dates}"),
            (Some(content), None) => content,
            (None, Some(dates)) => dates,
            // The parser guarantees content, a date filter, or an error
            (None, None) => String::new(),
        };

        let echo = format!(
            "{} ({} results, {} {})",
            query, options.max_results, options.sort_by, options.sort_order
        );
        tracing::debug!(%query, max_results = options.max_results, "compiled query");

        Ok(CompiledQuery {
            query,
            max_results: options.max_results,
            sort_by: options.sort_by,
            sort_order: options.sort_order,
            echo,
        })
    }

    /// Render an expression into the archive grammar.
    ///
    /// `ambient` is the inherited field context; `bare` is true inside a
    /// sigil-led group, where context-resolved terms drop their prefix
    /// (the group carries it); `root` is true when the expression owns its
    /// parenthesis scope, in which case an OR needs no wrapping.
    fn render(
        &self,
        expr: &Expr,
        ambient: Option<Field>,
        bare: bool,
        root: bool,
    ) -> Result<String, TransformError> {
        match expr {
            Expr::Term(term) => self.render_term(term, ambient, bare),

            Expr::Not(inner) => {
                let body = self.render(inner, ambient, bare, true)?;
                Ok(format!("NOT ( {body} )"))
            }

            Expr::And(children) => {
                let parts = children
                    .iter()
                    .map(|child| self.render(child, ambient, bare, false))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(parts.join(" AND "))
            }

            Expr::Or(children) => {
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    let rendered = self.render(child, ambient, bare, false)?;
                    // AND binds tighter in the archive grammar; keep an AND
                    // operand intact under OR
                    if is_and_like(child) {
                        parts.push(format!("({rendered})"));
                    } else {
                        parts.push(rendered);
                    }
                }
                let joined = parts.join(" OR ");
                Ok(if root { joined } else { format!("({joined})") })
            }

            Expr::Group { inner, field: None } => self.render(inner, ambient, bare, root),

            Expr::Group {
                inner,
                field: Some(prefix),
            } => {
                let field = Field::from_prefix(prefix)
                    .ok_or_else(|| TransformError::UnrecognizedField(prefix.clone()))?;
                let body = self.render(inner, Some(field), true, true)?;
                Ok(format!("{}:({})", field.prefix(), body))
            }
        }
    }

    fn render_term(
        &self,
        term: &TermExpr,
        ambient: Option<Field>,
        bare: bool,
    ) -> Result<String, TransformError> {
        match &term.field {
            Some(prefix) => {
                let field = Field::from_prefix(prefix)
                    .ok_or_else(|| TransformError::UnrecognizedField(prefix.clone()))?;
                let value = field_value(field, &term.value)?;
                Ok(format!("{}:{}", field.prefix(), quote(&value, term.phrase)))
            }
            None => {
                let field = ambient.unwrap_or(Field::Title);
                let value = field_value(field, &term.value)?;
                if bare && ambient.is_some() {
                    Ok(quote(&value, term.phrase))
                } else {
                    Ok(format!("{}:{}", field.prefix(), quote(&value, term.phrase)))
                }
            }
        }
    }

    /// `submittedDate:[A TO B]` clause for the date filters, bounds in
    /// UTC at second granularity.
    fn date_clause(&self, options: &SearchOptions) -> Option<String> {
        if !options.has_date_filter() {
            return None;
        }
        let since = options
            .since
            .map(|d| self.to_utc(d))
            .unwrap_or_else(|| year_start(1900));
        let until = options
            .until
            .map(|d| self.to_utc(d))
            .unwrap_or_else(|| year_start(2100));
        Some(format!(
            "submittedDate:[{} TO {}]",
            since.format("%Y%m%d%H%M%S"),
            until.format("%Y%m%d%H%M%S")
        ))
    }

    fn to_utc(&self, local: NaiveDateTime) -> NaiveDateTime {
        local - chrono::Duration::hours(i64::from(self.timezone_offset_hours))
    }
}

fn year_start(year: i32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

fn field_value(field: Field, value: &str) -> Result<String, TransformError> {
    if field == Field::Category {
        normalize_category(value)
    } else {
        Ok(value.to_string())
    }
}

fn quote(value: &str, phrase: bool) -> String {
    if phrase {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// An AND at the top of a (transparent) group, which must be parenthesized
/// when it becomes an OR operand.
fn is_and_like(expr: &Expr) -> bool {
    match expr {
        Expr::And(_) => true,
        Expr::Group { inner, field: None } => is_and_like(inner),
        _ => false,
    }
}

/// Normalize a category value: lowercase, expand group aliases to
/// wildcards, fix canonical casing, and otherwise pass the value through if
/// it looks like a category at all. Already-normalized values (including
/// `name.*` wildcards) are fixpoints.
pub fn normalize_category(value: &str) -> Result<String, TransformError> {
    let lower = value.to_lowercase();
    if let Some(alias) = fields::category_alias(&lower) {
        return Ok(alias.to_string());
    }
    if let Some(canonical) = fields::category_case(&lower) {
        return Ok(canonical.to_string());
    }
    if let Some(stem) = lower.strip_suffix(".*") {
        if fields::is_category_shape(stem) {
            return Ok(lower);
        }
    }
    if fields::is_category_shape(&lower) {
        Ok(lower)
    } else {
        Err(TransformError::CategoryNotFound(value.to_string()))
    }
}
