//! Field extraction from parsed documentation.
//!
//! [`gen_fields`] walks the field lists of a [`Document`] and yields one [`Field`] per
//! documented argument, keyword argument, return value or yielded value.
//!
//! The flat dialect documents a typed argument with two entries, a value half
//! (`:param foo: ...`) and a type half (`:type foo: int`). The two halves are merged into
//! a single [`Field`] whichever order they appear in. A half whose partner is not the
//! next paired entry is dropped.

use crate::docblock::{Document, FieldEntry};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Placeholder for an unknown type or kind.
pub const NOT_APPLICABLE: &str = "n/a";

/// What a [`Field`] documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    /// Positional argument (`:param name:`)
    Param,
    /// Positional argument type (`:type name:`)
    Type,
    /// Keyword argument (`:keyword name:`)
    Keyword,
    /// Keyword argument type (`:kwtype name:`)
    KwType,
    /// Return or yielded value
    Result,
    /// Plain field without a kind prefix (`:foo:`)
    NotApplicable,
    /// Any other kind prefix, e.g. `raises`
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Param => "param",
            FieldKind::Type => "type",
            FieldKind::Keyword => "keyword",
            FieldKind::KwType => "kwtype",
            FieldKind::Result => "result",
            FieldKind::NotApplicable => NOT_APPLICABLE,
            FieldKind::Other(kind) => kind,
        }
    }

    /// True for kinds documenting a path parameter.
    pub fn is_positional(&self) -> bool {
        matches!(self, FieldKind::Param | FieldKind::Type)
    }

    /// True for kinds documenting a query-string parameter.
    pub fn is_keyword(&self) -> bool {
        matches!(self, FieldKind::Keyword | FieldKind::KwType)
    }
}

impl From<&str> for FieldKind {
    fn from(s: &str) -> Self {
        match s {
            "param" => FieldKind::Param,
            "type" => FieldKind::Type,
            "keyword" => FieldKind::Keyword,
            "kwtype" => FieldKind::KwType,
            "result" => FieldKind::Result,
            NOT_APPLICABLE => FieldKind::NotApplicable,
            other => FieldKind::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(s: String) -> Self {
        FieldKind::from(s.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One documented argument, keyword argument, return value or yielded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Argument name, `rvalue` for return values and `yvalue` for yielded values
    pub name: String,
    /// Description text
    pub desc: String,
    /// Declared type, or `n/a` when none was documented
    #[serde(rename = "type")]
    pub ty: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: &str, desc: &str, ty: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            desc: desc.to_string(),
            ty: ty.to_string(),
            kind,
        }
    }
}

/// The first half of a value/type pair, waiting for its partner.
#[derive(Debug, Clone)]
struct Pending {
    arg: String,
    desc: Option<String>,
    ty: Option<String>,
}

/// Lazy iterator over the [`Field`]s of a [`Document`].
///
/// Created by [`gen_fields`]. Cloning the iterator, or calling [`gen_fields`] again,
/// restarts extraction from the current position or the beginning respectively.
#[derive(Clone)]
pub struct Fields<'a, I> {
    entries: I,
    allowed: Option<&'a BTreeSet<String>>,
    pending: Option<Pending>,
}

/// Extracts the fields documented in `tree`.
///
/// When `allowed` is given, `type` entries naming an argument outside the allow-list are
/// skipped entirely. This keeps stray type declarations for arguments that are not real
/// path parameters out of the result.
pub fn gen_fields<'a>(
    tree: &'a Document,
    allowed: Option<&'a BTreeSet<String>>,
) -> Fields<'a, impl Iterator<Item = &'a FieldEntry> + Clone + 'a> {
    Fields {
        entries: tree.fields(),
        allowed,
        pending: None,
    }
}

/// Splits a field name into `(kind, arg)`.
///
/// `param foo` gives `("param", "foo")`; a name without a space has no kind and its
/// argument is lowercased.
fn split_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((kind, arg)) => (kind.to_string(), arg.trim().to_string()),
        None => (NOT_APPLICABLE.to_string(), name.to_lowercase()),
    }
}

impl<'a, I> Iterator for Fields<'a, I>
where
    I: Iterator<Item = &'a FieldEntry>,
{
    type Item = Field;

    fn next(&mut self) -> Option<Field> {
        for entry in self.entries.by_ref() {
            let (kind, arg) = split_name(&entry.name);

            if kind == "type" && self.allowed.is_some_and(|allowed| !allowed.contains(&arg)) {
                debug!("Skipping type of undeclared argument: {}", arg);
                continue;
            }

            let body = entry.body.as_str();
            let (desc, ty) = if kind == "param" || kind == "keyword" || arg == "returns" {
                (Some(body.to_string()), None)
            } else if arg == "yields" {
                match body.split_once(" -- ") {
                    Some((hint, rest)) => (Some(rest.to_string()), Some(hint.trim().to_string())),
                    None => (Some(String::new()), None),
                }
            } else if kind == "type" || kind == "kwtype" || arg == "rtype" {
                (None, Some(body.to_string()))
            } else {
                (Some(body.to_string()), None)
            };

            let (kind, arg) = match arg.as_str() {
                "returns" | "rtype" => (FieldKind::Result, "rvalue".to_string()),
                "yields" => {
                    return Some(Field {
                        name: "yvalue".to_string(),
                        desc: desc.unwrap_or_default(),
                        ty: ty.unwrap_or_else(|| NOT_APPLICABLE.to_string()),
                        kind: FieldKind::Result,
                    });
                }
                _ => (FieldKind::from(kind), arg),
            };

            if kind == FieldKind::NotApplicable {
                return Some(Field {
                    name: arg,
                    desc: desc.unwrap_or_default(),
                    ty: NOT_APPLICABLE.to_string(),
                    kind,
                });
            }

            match self.pending.take() {
                Some(first) if first.arg == arg => {
                    return Some(Field {
                        name: arg,
                        desc: desc.or(first.desc).unwrap_or_default(),
                        ty: ty
                            .or(first.ty)
                            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
                        kind,
                    });
                }
                Some(orphan) => {
                    debug!("Dropping unpaired declaration of {}", orphan.arg);
                    self.pending = Some(Pending { arg, desc, ty });
                }
                None => self.pending = Some(Pending { arg, desc, ty }),
            }
        }

        if let Some(orphan) = self.pending.take() {
            debug!("Dropping unpaired declaration of {}", orphan.arg);
        }
        None
    }
}
