//! Google-style section normalization.
//!
//! Rewrites sections such as
//!
//! ```text
//! Args:
//!     arg1 (int): Description of arg1
//!
//! Returns:
//!     str: Description of return value.
//! ```
//!
//! into the flat field-list dialect understood by [`super::parse_structured`]:
//!
//! ```text
//! :param arg1: Description of arg1
//! :type arg1: int
//!
//! :returns: Description of return value.
//! :rtype: str
//! ```
//!
//! Lines outside recognised sections, including headers that look like sections but are
//! not known, are passed through untouched.

use super::{dedent, indent_of, indented_block_end};
use regex::Regex;
use std::sync::LazyLock;

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z][A-Za-z ]*?)\s*:\s*$").unwrap());

static TYPED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\(\s*(.*?)\s*\)$").unwrap());

/// Sections recognised in the Google dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Args,
    Kwargs,
    Returns,
    Yields,
    Raises,
    /// Free-form section rendered as a directive of the given name
    Prose(&'static str),
}

impl Section {
    fn from_header(header: &str) -> Option<Self> {
        let section = match header.to_lowercase().as_str() {
            "args" | "arguments" | "parameters" | "params" => Section::Args,
            "kwargs" | "keyword args" | "keyword arguments" => Section::Kwargs,
            "returns" | "return" => Section::Returns,
            "yields" | "yield" => Section::Yields,
            "raises" | "raise" => Section::Raises,
            "attributes" => Section::Prose("attributes"),
            "example" | "examples" => Section::Prose("examples"),
            "note" | "notes" => Section::Prose("note"),
            "references" => Section::Prose("references"),
            "see also" => Section::Prose("seealso"),
            "todo" => Section::Prose("todo"),
            "warning" | "warnings" | "warns" => Section::Prose("warning"),
            _ => return None,
        };
        Some(section)
    }
}

/// Rewrites every recognised Google-style section of `text` into field-list syntax.
pub fn normalize(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;
    // keeps a section visually separated from the text that follows it
    let mut pending_break = false;

    while i < lines.len() {
        let Some((section, header_indent)) = section_at(&lines, i) else {
            if pending_break && !lines[i].trim().is_empty() {
                out.push(String::new());
            }
            pending_break = false;
            out.push(lines[i].to_string());
            i += 1;
            continue;
        };

        let end = indented_block_end(&lines, i + 1, header_indent);
        let body = dedent(&lines[i + 1..end]);

        if out.last().is_some_and(|line| !line.trim().is_empty()) {
            out.push(String::new());
        }
        out.extend(render(section, &body));
        pending_break = true;
        i = end;
    }

    out.join("\n")
}

/// Returns the section starting at line `i`, if any.
///
/// A header only counts when its name is known and the next non-blank line is indented
/// deeper than the header itself.
fn section_at(lines: &[&str], i: usize) -> Option<(Section, usize)> {
    let caps = SECTION_HEADER.captures(lines[i])?;
    let section = Section::from_header(&caps[1])?;
    let header_indent = indent_of(lines[i]);
    let next = lines[i + 1..].iter().find(|line| !line.trim().is_empty())?;

    (indent_of(next) > header_indent).then_some((section, header_indent))
}

fn render(section: Section, body: &[String]) -> Vec<String> {
    match section {
        Section::Args => render_params(body, "param", "type"),
        Section::Kwargs => render_params(body, "keyword", "kwtype"),
        Section::Returns => {
            let (ty, desc) = split_return(body);
            let mut out = vec![format!(":returns: {}", desc)];
            if let Some(ty) = ty {
                out.push(format!(":rtype: {}", ty));
            }
            out
        }
        Section::Yields => match split_return(body) {
            (Some(ty), desc) => vec![format!(":yields: {} -- {}", ty, desc)],
            (None, desc) => vec![format!(":yields: {}", desc)],
        },
        Section::Raises => entries(body)
            .into_iter()
            .map(|entry| match entry.split_once(':') {
                Some((exc, desc)) => format!(":raises {}: {}", exc.trim(), desc.trim()),
                None => format!(":raises: {}", entry),
            })
            .collect(),
        Section::Prose(name) => {
            let mut out = vec![format!(".. {}::", name)];
            out.extend(body.iter().map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("   {}", line)
                }
            }));
            out
        }
    }
}

/// `name (type): desc` entries become a value field plus, when typed, a type field.
fn render_params(body: &[String], value_role: &str, type_role: &str) -> Vec<String> {
    let mut out = Vec::new();

    for entry in entries(body) {
        let (head, desc) = match entry.split_once(':') {
            Some((head, desc)) => (head.trim(), desc.trim()),
            None => (entry.trim(), ""),
        };
        let (name, ty) = match TYPED_NAME.captures(head) {
            Some(caps) => (
                caps.get(1).map_or(head, |m| m.as_str()),
                caps.get(2).map(|m| m.as_str()).filter(|ty| !ty.is_empty()),
            ),
            None => (head, None),
        };

        out.push(format!(":{} {}: {}", value_role, name, desc));
        if let Some(ty) = ty {
            out.push(format!(":{} {}: {}", type_role, name, ty));
        }
    }

    out
}

/// Splits a returns/yields body into an optional type and a description.
///
/// Only the first line may carry the `type:` prefix; later lines extend the description.
fn split_return(body: &[String]) -> (Option<String>, String) {
    let joined = join_entry(body);
    let first = body.iter().find(|line| !line.is_empty());

    match first.and_then(|line| line.split_once(':')) {
        Some((ty, _)) if !ty.trim().is_empty() => {
            let rest = joined[joined.find(':').map_or(0, |pos| pos + 1)..].trim();
            (Some(ty.trim().to_string()), rest.to_string())
        }
        _ => (None, joined),
    }
}

/// Groups a dedented section body into entries: a line at column zero starts a new entry
/// and deeper lines continue it.
fn entries(body: &[String]) -> Vec<String> {
    let mut grouped: Vec<Vec<String>> = Vec::new();

    for line in body.iter().filter(|line| !line.is_empty()) {
        match grouped.last_mut() {
            Some(current) if indent_of(line) > 0 => current.push(line.clone()),
            _ => grouped.push(vec![line.clone()]),
        }
    }

    grouped.iter().map(|entry| join_entry(entry)).collect()
}

fn join_entry(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
