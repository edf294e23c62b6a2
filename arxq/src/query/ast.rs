use serde::{Deserialize, Serialize};

/// Boolean expression tree built by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Single search term: a bare keyword, phrase, or `field:value`
    Term(TermExpr),

    /// Implicit AND between adjacent operands: `quantum @hinton`
    And(Vec<Expr>),

    /// Alternatives: `bert | gpt`
    Or(Vec<Expr>),

    /// Negation: `-classical`
    Not(Box<Expr>),

    /// Parenthesized group. A sigil-led group (`@(...)`) carries the field
    /// context that bare terms inside inherit.
    Group {
        inner: Box<Expr>,
        field: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermExpr {
    /// Field prefix (`ti`, `au`, ...). None = inherit context or default.
    /// Kept as the raw string so unrecognized explicit prefixes surface as
    /// transform errors instead of parse errors.
    pub field: Option<String>,
    /// Term value without sigil or quotes
    pub value: String,
    /// Whether the value came from a quoted run
    pub phrase: bool,
}

impl Expr {
    /// Create a bare keyword term
    pub fn term(value: impl Into<String>) -> Self {
        Expr::Term(TermExpr {
            field: None,
            value: value.into(),
            phrase: false,
        })
    }

    /// Create a bare quoted phrase term
    pub fn phrase(value: impl Into<String>) -> Self {
        Expr::Term(TermExpr {
            field: None,
            value: value.into(),
            phrase: true,
        })
    }

    /// Create a `field:value` term
    pub fn field_term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::Term(TermExpr {
            field: Some(field.into()),
            value: value.into(),
            phrase: false,
        })
    }

    /// Create a `field:"quoted phrase"` term
    pub fn field_phrase(field: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::Term(TermExpr {
            field: Some(field.into()),
            value: value.into(),
            phrase: true,
        })
    }

    /// Combine with AND, flattening an existing AND on the left
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut nodes) => {
                nodes.push(other);
                Expr::And(nodes)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combine with OR, flattening an existing OR on the left
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut nodes) => {
                nodes.push(other);
                Expr::Or(nodes)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negate
    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Wrap in a plain group
    pub fn grouped(self) -> Self {
        Expr::Group {
            inner: Box::new(self),
            field: None,
        }
    }

    /// Wrap in a group carrying a field context, as built for `@(...)`
    pub fn field_group(self, field: impl Into<String>) -> Self {
        Expr::Group {
            inner: Box::new(self),
            field: Some(field.into()),
        }
    }

    /// Get the node type as a string
    pub fn node_type(&self) -> &'static str {
        match self {
            Expr::Term(_) => "term",
            Expr::And(_) => "and",
            Expr::Or(_) => "or",
            Expr::Not(_) => "not",
            Expr::Group { .. } => "group",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_builder() {
        let e = Expr::term("quantum");
        assert_eq!(
            e,
            Expr::Term(TermExpr {
                field: None,
                value: "quantum".to_string(),
                phrase: false,
            })
        );
    }

    #[test]
    fn test_field_term_builder() {
        let e = Expr::field_term("au", "hinton");
        match e {
            Expr::Term(t) => {
                assert_eq!(t.field, Some("au".to_string()));
                assert_eq!(t.value, "hinton");
                assert!(!t.phrase);
            }
            _ => panic!("Expected Term"),
        }
    }

    #[test]
    fn test_and_combinator_flattens() {
        let e = Expr::term("a").and(Expr::term("b")).and(Expr::term("c"));
        match e {
            Expr::And(nodes) => assert_eq!(nodes.len(), 3),
            _ => panic!("Expected And"),
        }
    }

    #[test]
    fn test_or_combinator_flattens() {
        let e = Expr::term("a").or(Expr::term("b")).or(Expr::term("c"));
        match e {
            Expr::Or(nodes) => assert_eq!(nodes.len(), 3),
            _ => panic!("Expected Or"),
        }
    }

    #[test]
    fn test_negate_preserves_double_not() {
        let e = Expr::term("x").negate().negate();
        match e {
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Not(_) => {}
                _ => panic!("Expected nested Not"),
            },
            _ => panic!("Expected Not"),
        }
    }

    #[test]
    fn test_field_group() {
        let e = Expr::term("hinton")
            .and(Expr::term("lecun"))
            .field_group("au");
        match e {
            Expr::Group { field, .. } => assert_eq!(field, Some("au".to_string())),
            _ => panic!("Expected Group"),
        }
    }
}
