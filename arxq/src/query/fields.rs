//! Field, sort, and category normalization tables.
//!
//! Everything here is a compile-time lookup: the tables are `match`
//! functions, so there is no initialization order and nothing to lock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A recognized arXiv search field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Author,
    Abstract,
    Category,
    All,
}

impl Field {
    /// The arXiv API prefix for this field.
    pub fn prefix(&self) -> &'static str {
        match self {
            Field::Title => "ti",
            Field::Author => "au",
            Field::Abstract => "abs",
            Field::Category => "cat",
            Field::All => "all",
        }
    }

    /// Resolve an explicit `prefix:value` prefix. Anything outside the
    /// recognized set is an error at transform time, not here.
    pub fn from_prefix(prefix: &str) -> Option<Field> {
        match prefix {
            "ti" => Some(Field::Title),
            "au" => Some(Field::Author),
            "abs" => Some(Field::Abstract),
            "cat" => Some(Field::Category),
            "all" => Some(Field::All),
            _ => None,
        }
    }

    /// Resolve a single-character sigil.
    pub fn from_sigil(sigil: char) -> Option<Field> {
        match sigil {
            '@' => Some(Field::Author),
            '#' => Some(Field::Category),
            '$' => Some(Field::Abstract),
            '*' => Some(Field::All),
            _ => None,
        }
    }
}

/// Sort criterion accepted by the arXiv API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    Relevance,
    SubmittedDate,
    LastUpdatedDate,
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortCriterion::Relevance => write!(f, "Relevance"),
            SortCriterion::SubmittedDate => write!(f, "Submitted Date"),
            SortCriterion::LastUpdatedDate => write!(f, "Last Updated Date"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "Ascending"),
            SortOrder::Descending => write!(f, "Descending"),
        }
    }
}

/// Look up a sort code. Single-letter codes default to descending.
/// Expects the code already lowercased (the tokenizer lowercases it).
pub fn sort_code(code: &str) -> Option<(SortCriterion, SortOrder)> {
    match code {
        "s" | "sd" => Some((SortCriterion::SubmittedDate, SortOrder::Descending)),
        "sa" => Some((SortCriterion::SubmittedDate, SortOrder::Ascending)),
        "r" | "rd" => Some((SortCriterion::Relevance, SortOrder::Descending)),
        "ra" => Some((SortCriterion::Relevance, SortOrder::Ascending)),
        "l" | "ld" => Some((SortCriterion::LastUpdatedDate, SortOrder::Descending)),
        "la" => Some((SortCriterion::LastUpdatedDate, SortOrder::Ascending)),
        _ => None,
    }
}

/// Archive group shortcuts expanding to a wildcard over the whole group.
/// `quant-ph` is deliberately absent: it has no subcategories, so it passes
/// through as an exact category instead.
pub fn category_alias(lower: &str) -> Option<&'static str> {
    match lower {
        "cs" => Some("cs.*"),
        "physics" => Some("physics.*"),
        "math" => Some("math.*"),
        "stat" => Some("stat.*"),
        "econ" => Some("econ.*"),
        "q-bio" => Some("q-bio.*"),
        "q-fin" => Some("q-fin.*"),
        "cond-mat" => Some("cond-mat.*"),
        "astro-ph" => Some("astro-ph.*"),
        "nlin" => Some("nlin.*"),
        "math-ph" => Some("math-ph.*"),
        _ => None,
    }
}

/// Lowercase category name to its canonical archive spelling.
pub fn category_case(lower: &str) -> Option<&'static str> {
    match lower {
        // Computer science
        "cs.ai" => Some("cs.AI"),
        "cs.ar" => Some("cs.AR"),
        "cs.cc" => Some("cs.CC"),
        "cs.ce" => Some("cs.CE"),
        "cs.cg" => Some("cs.CG"),
        "cs.cl" => Some("cs.CL"),
        "cs.cr" => Some("cs.CR"),
        "cs.cv" => Some("cs.CV"),
        "cs.cy" => Some("cs.CY"),
        "cs.db" => Some("cs.DB"),
        "cs.dc" => Some("cs.DC"),
        "cs.dl" => Some("cs.DL"),
        "cs.dm" => Some("cs.DM"),
        "cs.ds" => Some("cs.DS"),
        "cs.et" => Some("cs.ET"),
        "cs.fl" => Some("cs.FL"),
        "cs.gl" => Some("cs.GL"),
        "cs.gr" => Some("cs.GR"),
        "cs.gt" => Some("cs.GT"),
        "cs.hc" => Some("cs.HC"),
        "cs.ir" => Some("cs.IR"),
        "cs.it" => Some("cs.IT"),
        "cs.lg" => Some("cs.LG"),
        "cs.lo" => Some("cs.LO"),
        "cs.ma" => Some("cs.MA"),
        "cs.mm" => Some("cs.MM"),
        "cs.ms" => Some("cs.MS"),
        "cs.na" => Some("cs.NA"),
        "cs.ne" => Some("cs.NE"),
        "cs.ni" => Some("cs.NI"),
        "cs.oh" => Some("cs.OH"),
        "cs.os" => Some("cs.OS"),
        "cs.pf" => Some("cs.PF"),
        "cs.pl" => Some("cs.PL"),
        "cs.ro" => Some("cs.RO"),
        "cs.sc" => Some("cs.SC"),
        "cs.sd" => Some("cs.SD"),
        "cs.se" => Some("cs.SE"),
        "cs.si" => Some("cs.SI"),
        "cs.sy" => Some("cs.SY"),
        // Statistics
        "stat.ap" => Some("stat.AP"),
        "stat.co" => Some("stat.CO"),
        "stat.me" => Some("stat.ME"),
        "stat.ml" => Some("stat.ML"),
        "stat.ot" => Some("stat.OT"),
        "stat.th" => Some("stat.TH"),
        // Mathematics
        "math.ac" => Some("math.AC"),
        "math.ag" => Some("math.AG"),
        "math.ap" => Some("math.AP"),
        "math.at" => Some("math.AT"),
        "math.ca" => Some("math.CA"),
        "math.co" => Some("math.CO"),
        "math.ct" => Some("math.CT"),
        "math.cv" => Some("math.CV"),
        "math.dg" => Some("math.DG"),
        "math.ds" => Some("math.DS"),
        "math.fa" => Some("math.FA"),
        "math.gm" => Some("math.GM"),
        "math.gn" => Some("math.GN"),
        "math.gr" => Some("math.GR"),
        "math.gt" => Some("math.GT"),
        "math.ho" => Some("math.HO"),
        "math.it" => Some("math.IT"),
        "math.kt" => Some("math.KT"),
        "math.lo" => Some("math.LO"),
        "math.mg" => Some("math.MG"),
        "math.mp" => Some("math.MP"),
        "math.na" => Some("math.NA"),
        "math.nt" => Some("math.NT"),
        "math.oa" => Some("math.OA"),
        "math.oc" => Some("math.OC"),
        "math.pr" => Some("math.PR"),
        "math.qa" => Some("math.QA"),
        "math.ra" => Some("math.RA"),
        "math.rt" => Some("math.RT"),
        "math.sg" => Some("math.SG"),
        "math.sp" => Some("math.SP"),
        "math.st" => Some("math.ST"),
        _ => None,
    }
}

/// Whether a lowercased value looks like an archive category: lowercase
/// ASCII letter segments joined by single `.` or `-` separators.
/// Accepts `quant-ph`, `cond-mat.str-el`; rejects `cs..ai`, `.cs`, `cs.`.
pub fn is_category_shape(lower: &str) -> bool {
    if lower.is_empty() {
        return false;
    }
    let mut prev_was_sep = true; // leading separator is invalid
    for ch in lower.chars() {
        match ch {
            'a'..='z' => prev_was_sep = false,
            '.' | '-' => {
                if prev_was_sep {
                    return false;
                }
                prev_was_sep = true;
            }
            _ => return false,
        }
    }
    !prev_was_sep
}
