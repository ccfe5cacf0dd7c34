//! Diagram parser
//!
//! Reads the PlantUML component-diagram subset microzoo understands into a
//! `RawSystem`. The parser is line oriented: one statement per line, except
//! for `{ ... }` property blocks which may span lines.
//!
//! Relation endpoints are resolved (alias or display name to component id)
//! after the whole file is read, so declarations may follow the relations
//! that use them. Endpoints that match nothing are kept as written; the
//! diagram validator reports them.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::domain::entities::{RawComponent, RawRelation, RawSystem};
use crate::domain::value_objects::{ComponentId, PropertyValue, Protocol};
use crate::error::{MicrozooError, MicrozooResult};

/// Declaration keywords
const KEYWORDS: &[&str] = &[
    "component",
    "node",
    "rectangle",
    "database",
    "queue",
    "frame",
    "cloud",
    "artifact",
];

/// Keywords that imply a kind when no stereotype is given
const IMPLIED_KINDS: &[&str] = &["database", "queue"];

/// Statements accepted and ignored
const IGNORED_PREFIXES: &[&str] = &[
    "@startuml",
    "@enduml",
    "title ",
    "skinparam",
    "left to right direction",
    "top to bottom direction",
    "hide ",
    "show ",
    "!",
];

/// Why a line was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorReason {
    #[error("unknown stereotype delimiter '{0}' (stereotypes are written <<kind>>)")]
    UnknownStereotypeDelimiter(String),

    #[error("stereotype opened with '<<' is never closed with '>>'")]
    UnterminatedStereotype,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("property block opened here is never closed with '}}'")]
    UnterminatedBlock,

    #[error("component id '{id}' is already declared on line {first_line}")]
    DuplicateId { id: ComponentId, first_line: usize },

    #[error("component name is empty")]
    EmptyName,

    #[error("invalid property '{0}' (expected key = value)")]
    InvalidProperty(String),

    #[error("unrecognized statement '{0}'")]
    Unrecognized(String),
}

/// A rejected line and the reason
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-indexed
    pub line: usize,
    pub reason: ParseErrorReason,
}

/// Parse diagram text. `name` becomes the system name.
pub fn parse(name: &str, source: &str) -> Result<RawSystem, ParseError> {
    let mut builder = Builder::new(name);
    let mut block: Option<OpenBlock> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        let fail = |reason| ParseError {
            line: line_no,
            reason,
        };

        if let Some(mut open) = block.take() {
            match find_unquoted(raw_line, '}') {
                Some(close) => {
                    open.content.push_str(&raw_line[..close]);
                    let trailing = raw_line[close + 1..].trim();
                    if !trailing.is_empty() {
                        return Err(fail(ParseErrorReason::Unrecognized(trailing.to_string())));
                    }
                    let entries = parse_entries(&open.content).map_err(|reason| ParseError {
                        line: open.line,
                        reason,
                    })?;
                    builder.set_properties(open.component, entries);
                }
                None => {
                    if !is_comment(raw_line.trim()) {
                        open.content.push_str(raw_line);
                        open.content.push('\n');
                    }
                    block = Some(open);
                }
            }
            continue;
        }

        let line = raw_line.trim();
        if line.is_empty() || is_comment(line) || is_ignored(line) {
            continue;
        }

        if let Some(relation) = relation(line).map_err(fail)? {
            builder.relations.push((relation, line_no));
            continue;
        }

        match declaration(line).map_err(fail)? {
            Some(decl) => {
                let component = builder.declare(&decl, line_no).map_err(fail)?;
                match decl.block {
                    Some(BlockStart::Closed(content)) => {
                        let entries = parse_entries(&content).map_err(fail)?;
                        builder.set_properties(component, entries);
                    }
                    Some(BlockStart::Open(content)) => {
                        block = Some(OpenBlock {
                            component,
                            line: line_no,
                            content,
                        });
                    }
                    None => {}
                }
            }
            None => return Err(fail(ParseErrorReason::Unrecognized(line.to_string()))),
        }
    }

    if let Some(open) = block {
        return Err(ParseError {
            line: open.line,
            reason: ParseErrorReason::UnterminatedBlock,
        });
    }

    Ok(builder.finish())
}

/// Parse a diagram file; the file stem names the system
pub fn parse_file(path: &Path) -> MicrozooResult<RawSystem> {
    let source = fs::read_to_string(path).map_err(|source| MicrozooError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(diagram_name(path), &source).map_err(|source| MicrozooError::Parse {
        file: path.to_path_buf(),
        source,
    })
}

/// System name of a diagram file: its stem
pub fn diagram_name(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("diagram")
}

fn is_comment(line: &str) -> bool {
    line.starts_with('\'') || line.starts_with("//")
}

fn is_ignored(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    IGNORED_PREFIXES.iter().any(|p| lower.starts_with(p)) || lower == "title"
}

struct OpenBlock {
    component: usize,
    line: usize,
    content: String,
}

enum BlockStart {
    /// `{ ... }` on the declaration line
    Closed(String),
    /// `{` without `}`; content so far
    Open(String),
}

struct Declaration {
    keyword: Option<String>,
    name: String,
    stereotype: Option<String>,
    alias: Option<String>,
    block: Option<BlockStart>,
}

struct PendingRelation {
    source: String,
    target: String,
    protocol: Protocol,
    label: Option<String>,
}

/// Accumulates components and relations, then resolves endpoints
struct Builder {
    system: RawSystem,
    first_lines: HashMap<ComponentId, usize>,
    relations: Vec<(PendingRelation, usize)>,
}

impl Builder {
    fn new(name: &str) -> Self {
        Self {
            system: RawSystem::new(name),
            first_lines: HashMap::new(),
            relations: Vec::new(),
        }
    }

    fn declare(&mut self, decl: &Declaration, line: usize) -> Result<usize, ParseErrorReason> {
        let id = ComponentId::normalize(&decl.name);
        if id.is_empty() {
            return Err(ParseErrorReason::EmptyName);
        }
        if let Some(&first_line) = self.first_lines.get(&id) {
            return Err(ParseErrorReason::DuplicateId { id, first_line });
        }
        self.first_lines.insert(id, line);

        let kind = match (&decl.stereotype, &decl.keyword) {
            (Some(stereotype), _) => stereotype.clone(),
            (None, Some(keyword)) if IMPLIED_KINDS.contains(&keyword.as_str()) => keyword.clone(),
            _ => String::new(),
        };

        let mut component = RawComponent::new(decl.name.trim(), kind).with_line(line);
        component.alias = decl.alias.clone();
        self.system.components.push(component);
        Ok(self.system.components.len() - 1)
    }

    fn set_properties(&mut self, component: usize, entries: Vec<(String, PropertyValue)>) {
        if let Some(component) = self.system.components.get_mut(component) {
            component.properties.extend(entries);
        }
    }

    fn finish(mut self) -> RawSystem {
        let mut lookup: HashMap<String, ComponentId> = HashMap::new();
        for component in &self.system.components {
            lookup.insert(component.id.to_string(), component.id.clone());
        }
        // Aliases win over names that happen to normalize the same way
        for component in &self.system.components {
            if let Some(alias) = &component.alias {
                lookup.insert(ComponentId::normalize(alias).to_string(), component.id.clone());
            }
        }
        let endpoint = |text: &str| {
            let normalized = ComponentId::normalize(text);
            lookup
                .get(normalized.as_str())
                .cloned()
                .unwrap_or(normalized)
        };

        for (pending, line) in self.relations {
            self.system.relations.push(RawRelation {
                source: endpoint(&pending.source),
                target: endpoint(&pending.target),
                protocol: pending.protocol,
                label: pending.label,
                line,
            });
        }
        self.system
    }
}

/// `A --> B : protocol label`, or `None` when the line has no arrow after
/// its first name.
fn relation(line: &str) -> Result<Option<PendingRelation>, ParseErrorReason> {
    let mut cursor = Cursor::new(line);
    let Ok(Some(left)) = cursor.name() else {
        return Ok(None);
    };
    cursor.skip_ws();
    let Some(arrow) = cursor.arrow() else {
        return Ok(None);
    };
    cursor.skip_ws();

    let right = cursor
        .name()?
        .ok_or_else(|| ParseErrorReason::Unrecognized(line.to_string()))?;
    cursor.skip_ws();

    let (protocol, label) = if cursor.eat(":") {
        let text = cursor.rest().trim();
        match text.split_once(char::is_whitespace) {
            Some((protocol, label)) => (Protocol::new(protocol), Some(label.trim().to_string())),
            None => (Protocol::new(text), None),
        }
    } else if cursor.rest().trim().is_empty() {
        (Protocol::default(), None)
    } else {
        return Err(ParseErrorReason::Unrecognized(line.to_string()));
    };

    let (source, target) = match arrow {
        Arrow::Forward => (left, right),
        Arrow::Reversed => (right, left),
    };
    Ok(Some(PendingRelation {
        source,
        target,
        protocol,
        label,
    }))
}

/// `keyword name [<<stereotype>>] [as alias] [{ ... }]` or `[name] ...`
fn declaration(line: &str) -> Result<Option<Declaration>, ParseErrorReason> {
    let mut cursor = Cursor::new(line);

    let keyword = if cursor.peek() == Some('[') {
        None
    } else {
        match cursor.word() {
            Some(word) if KEYWORDS.contains(&word.to_ascii_lowercase().as_str()) => {
                Some(word.to_ascii_lowercase())
            }
            _ => return Ok(None),
        }
    };
    cursor.skip_ws();

    let name = cursor.name()?.ok_or(ParseErrorReason::EmptyName)?;
    if name.trim().is_empty() {
        return Err(ParseErrorReason::EmptyName);
    }

    let mut decl = Declaration {
        keyword,
        name,
        stereotype: None,
        alias: None,
        block: None,
    };

    loop {
        cursor.skip_ws();
        match cursor.peek() {
            None => break,
            Some('<') => decl.stereotype = Some(cursor.stereotype()?),
            Some('{') => {
                cursor.bump();
                let rest = cursor.rest();
                decl.block = Some(match find_unquoted(rest, '}') {
                    Some(close) => {
                        let trailing = rest[close + 1..].trim();
                        if !trailing.is_empty() {
                            return Err(ParseErrorReason::Unrecognized(trailing.to_string()));
                        }
                        BlockStart::Closed(rest[..close].to_string())
                    }
                    None => BlockStart::Open(format!("{}\n", rest)),
                });
                break;
            }
            // Colour hints such as `#LightBlue`
            Some('#') => {
                cursor.bump();
                cursor.word();
            }
            Some(_) if cursor.eat_keyword("as") => {
                cursor.skip_ws();
                let alias = cursor
                    .name()?
                    .ok_or_else(|| ParseErrorReason::Unrecognized(line.to_string()))?;
                decl.alias = Some(alias);
            }
            Some(_) => return Err(ParseErrorReason::Unrecognized(cursor.rest().to_string())),
        }
    }

    Ok(Some(decl))
}

/// Split block content into `key = value` entries on `;`, `,` or newline.
fn parse_entries(content: &str) -> Result<Vec<(String, PropertyValue)>, ParseErrorReason> {
    let mut entries = Vec::new();
    for entry in split_unquoted(content)? {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let split = entry
            .find('=')
            .or_else(|| entry.find(':'))
            .ok_or_else(|| ParseErrorReason::InvalidProperty(entry.to_string()))?;
        let key = entry[..split].trim();
        let value = entry[split + 1..].trim();
        if key.is_empty() || key.contains(char::is_whitespace) || value.is_empty() {
            return Err(ParseErrorReason::InvalidProperty(entry.to_string()));
        }
        entries.push((key.to_string(), PropertyValue::parse(value)));
    }
    Ok(entries)
}

fn split_unquoted(content: &str) -> Result<Vec<&str>, ParseErrorReason> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' | ',' | '\n' if !in_quotes => {
                parts.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(ParseErrorReason::UnterminatedString);
    }
    parts.push(&content[start..]);
    Ok(parts)
}

fn find_unquoted(text: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in text.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == needle && !in_quotes {
            return Some(i);
        }
    }
    None
}

enum Arrow {
    /// `A --> B`
    Forward,
    /// `A <-- B`, meaning `B --> A`
    Reversed,
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// `token` followed by whitespace
    fn eat_keyword(&mut self, token: &str) -> bool {
        let rest = self.rest();
        let matches = rest
            .get(..token.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(token))
            && rest
                .get(token.len()..)
                .is_some_and(|tail| tail.starts_with(char::is_whitespace));
        if matches {
            self.pos += token.len();
        }
        matches
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.text[start..self.pos]
    }

    /// Bare identifier: letters, digits, `_`
    fn word(&mut self) -> Option<&'a str> {
        let word = self.eat_while(|c| c.is_alphanumeric() || c == '_');
        (!word.is_empty()).then_some(word)
    }

    /// Quoted string, `[bracketed text]`, or a bare word
    fn name(&mut self) -> Result<Option<String>, ParseErrorReason> {
        match self.peek() {
            Some('"') => {
                self.bump();
                let inner = self.eat_while(|c| c != '"');
                if !self.eat("\"") {
                    return Err(ParseErrorReason::UnterminatedString);
                }
                Ok(Some(inner.to_string()))
            }
            Some('[') => {
                let start = self.pos;
                self.bump();
                let inner = self.eat_while(|c| c != ']');
                if !self.eat("]") {
                    return Err(ParseErrorReason::Unrecognized(self.text[start..].to_string()));
                }
                Ok(Some(inner.to_string()))
            }
            _ => Ok(self.word().map(str::to_string)),
        }
    }

    /// `<<text>>` at the cursor
    fn stereotype(&mut self) -> Result<String, ParseErrorReason> {
        let rest = self.rest();
        let token = rest.split_whitespace().next().unwrap_or(rest).to_string();
        if !rest.starts_with("<<") || rest.starts_with("<<<") {
            return Err(ParseErrorReason::UnknownStereotypeDelimiter(token));
        }
        let inner = &rest[2..];
        let Some(close) = inner.find(">>") else {
            return Err(ParseErrorReason::UnterminatedStereotype);
        };
        let text = inner[..close].trim().to_string();
        self.pos += 2 + close + 2;
        Ok(text)
    }

    /// Dash/dot run with `>` on the right or `<` on the left, optionally
    /// carrying a direction word (`-right->`). Leaves the cursor untouched
    /// when the text is not an arrow.
    fn arrow(&mut self) -> Option<Arrow> {
        let start = self.pos;
        let reset = |cursor: &mut Self| {
            cursor.pos = start;
            None
        };

        let left = self.eat("<");
        if self.eat_while(|c| c == '-' || c == '.').is_empty() {
            return reset(self);
        }
        if self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.eat_while(|c| c.is_ascii_alphabetic());
            if self.eat_while(|c| c == '-' || c == '.').is_empty() {
                return reset(self);
            }
        }
        let right = self.eat(">");

        match (left, right) {
            (false, true) => Some(Arrow::Forward),
            (true, false) => Some(Arrow::Reversed),
            _ => reset(self),
        }
    }
}
