//! Structured-text parsing for route handler documentation.
//!
//! Parsing is a two-stage pipeline:
//!
//! 1. [`google::normalize`] rewrites Google-style sections (`Args:`, `Kwargs:`, `Returns:`,
//!    `Yields:`, ...) into the flat field-list dialect (`:kind name: body`).
//! 2. [`parse_structured`] parses flat text into a [`Document`] made of paragraphs,
//!    field lists, literal blocks and directives.
//!
//! [`parse_docblock`] runs both stages. Parsing never fails: text that contains no
//! recognisable structure simply produces paragraphs and no fields.
//!
//! # Example
//!
//! ```
//! use swaggerify::docblock::parse_docblock;
//!
//! let doc = parse_docblock("Get an item\n\nArgs:\n    item_id (str): item ID\n");
//! assert_eq!(doc.first_paragraph(), Some("Get an item"));
//! assert_eq!(doc.fields().count(), 2);
//! ```

pub mod google;

use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static FIELD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:\s][^:]*?):(?:\s+(.*))?$").unwrap());

static DIRECTIVE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\.\s+([\w:-]+?)::(?:\s+(.*))?$").unwrap());

/// Inline markup patterns and their replacements, applied in order. Each keeps only the
/// enclosed text. Emphasis only opens at the start of the text or after a non-word
/// character, so `5*3*2` is left alone.
static INLINE_MARKUP: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r":[\w.+-]+:`([^`]*)`", "${1}"),
        (r"``([^`]+)``", "${1}"),
        (r"`([^`]+)`_{0,2}", "${1}"),
        (r"(^|[^\w*])\*\*([^*]+)\*\*", "${1}${2}"),
        (r"(^|[^\w*])\*([^*\s][^*]*)\*", "${1}${2}"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// A parsed documentation block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Top-level nodes in source order
    pub nodes: Vec<Node>,
}

/// A block-level node of a structured-text [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Running text, with lines joined by a single space and inline markup removed
    Paragraph(String),
    /// A run of `:name: body` entries
    FieldList(Vec<FieldEntry>),
    /// Preformatted text (`::` blocks and `>>>` doctest blocks), kept verbatim
    LiteralBlock(String),
    /// `.. name:: argument` followed by indented content
    Directive {
        name: String,
        argument: String,
        content: String,
    },
}

/// One entry of a field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    /// Field name, e.g. `param foo`, `type foo` or `returns`
    pub name: String,
    /// Body text with inline markup removed
    pub body: String,
}

impl Document {
    /// Iterates over every field entry of every field list, in source order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldEntry> + Clone + '_ {
        self.nodes.iter().flat_map(|node| match node {
            Node::FieldList(entries) => entries.as_slice(),
            _ => &[][..],
        })
    }

    /// Text of the first paragraph, which serves as the summary line.
    pub fn first_paragraph(&self) -> Option<&str> {
        self.nodes.iter().find_map(|node| match node {
            Node::Paragraph(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Parses documentation written in either dialect into a [`Document`].
///
/// The source is first cleaned the way docstrings are (tabs expanded, common
/// indentation removed), then normalized from the Google dialect and finally parsed.
pub fn parse_docblock(source: &str) -> Document {
    let cleaned = clean_indentation(source);
    let flat = google::normalize(&cleaned);
    parse_structured(&flat)
}

/// Parses flat field-list text into a [`Document`].
pub fn parse_structured(text: &str) -> Document {
    let lines: Vec<&str> = text.lines().collect();
    let mut nodes: Vec<Node> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut nodes);
            i += 1;
            continue;
        }

        let indent = indent_of(line);

        if let Some(caps) = FIELD_MARKER.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut nodes);
            let name = caps[1].trim().to_string();
            let first = caps.get(2).map_or("", |m| m.as_str().trim());
            let end = indented_block_end(&lines, i + 1, indent);
            let mut body_lines = vec![first];
            body_lines.extend(lines[i + 1..end].iter().map(|l| l.trim()));
            push_field(
                &mut nodes,
                FieldEntry {
                    name,
                    body: inline_text(&join_lines(&body_lines)),
                },
            );
            i = end;
            continue;
        }

        if trimmed == ".." || trimmed.starts_with(".. ") {
            flush_paragraph(&mut paragraph, &mut nodes);
            let end = indented_block_end(&lines, i + 1, indent);
            if let Some(caps) = DIRECTIVE_MARKER.captures(trimmed) {
                nodes.push(Node::Directive {
                    name: caps[1].to_string(),
                    argument: caps.get(2).map_or("", |m| m.as_str().trim()).to_string(),
                    content: block_text(&lines[i + 1..end]),
                });
            } else {
                debug!("Skipping comment block: {}", trimmed);
            }
            i = end;
            continue;
        }

        if trimmed.starts_with(">>>") {
            flush_paragraph(&mut paragraph, &mut nodes);
            let mut end = i;
            while end < lines.len() && !lines[end].trim().is_empty() {
                end += 1;
            }
            nodes.push(Node::LiteralBlock(block_text(&lines[i..end])));
            i = end;
            continue;
        }

        if let Some(text) = trimmed.strip_suffix("::") {
            // `Text::` keeps one colon, a bare `::` disappears
            let text = text.trim_end();
            if !text.is_empty() {
                paragraph.push(trimmed.strip_suffix(':').unwrap_or(trimmed));
            }
            flush_paragraph(&mut paragraph, &mut nodes);
            let end = indented_block_end(&lines, i + 1, indent);
            if end > i + 1 {
                nodes.push(Node::LiteralBlock(block_text(&lines[i + 1..end])));
            }
            i = end;
            continue;
        }

        paragraph.push(trimmed);
        i += 1;
    }

    flush_paragraph(&mut paragraph, &mut nodes);
    Document { nodes }
}

/// Cleans up indentation the way docstrings are cleaned before display.
///
/// Tabs are expanded, the first line loses its leading whitespace, the common margin of
/// the remaining lines is removed and blank lines at either end are dropped.
pub fn clean_indentation(source: &str) -> String {
    let expanded = source.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line.trim_start()
            } else if line.trim().is_empty() {
                ""
            } else {
                &line[margin..]
            }
        })
        .map(str::trim_end)
        .collect();

    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|line| line.is_empty()).count();
    cleaned[leading..].join("\n")
}

/// Number of leading spaces.
pub(crate) fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Index one past the last line, starting at `start`, that is indented deeper than
/// `indent`. Blank lines inside the block are included, trailing ones are not.
pub(crate) fn indented_block_end(lines: &[&str], start: usize, indent: usize) -> usize {
    let mut end = start;
    let mut j = start;
    while j < lines.len() {
        let line = lines[j];
        if !line.trim().is_empty() {
            if indent_of(line) <= indent {
                break;
            }
            end = j + 1;
        }
        j += 1;
    }
    end
}

/// Removes the smallest indentation shared by the non-blank lines.
pub(crate) fn dedent(lines: &[&str]) -> Vec<String> {
    let margin = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line[margin..].trim_end().to_string()
            }
        })
        .collect()
}

fn block_text(lines: &[&str]) -> String {
    dedent(lines).join("\n").trim_matches('\n').to_string()
}

fn join_lines(lines: &[&str]) -> String {
    lines
        .iter()
        .filter(|line| !line.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduces inline markup to its text content.
fn inline_text(text: &str) -> String {
    INLINE_MARKUP
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

fn flush_paragraph(paragraph: &mut Vec<&str>, nodes: &mut Vec<Node>) {
    if paragraph.is_empty() {
        return;
    }
    nodes.push(Node::Paragraph(inline_text(&join_lines(paragraph))));
    paragraph.clear();
}

fn push_field(nodes: &mut Vec<Node>, entry: FieldEntry) {
    if let Some(Node::FieldList(entries)) = nodes.last_mut() {
        entries.push(entry);
    } else {
        nodes.push(Node::FieldList(vec![entry]));
    }
}
