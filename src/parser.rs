//! XML document reader
//!
//! Turns a window description into a `Document`. The reader is hand-written
//! and only understands what widget documents use: elements, attributes,
//! text, CDATA, comments, the XML declaration and a skipped DOCTYPE.
//!
//! Every element is laid out the moment it is attached, so the tree that
//! comes out is fully resolved.

use crate::dom::{Document, Node, NodeId, NodeKind};
use crate::layout;
use crate::sandbox::{Sandbox, SandboxError};
use crate::style::{lenient_f32, Style, DEFAULT_FONT};
use log::{debug, info};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at {}:{}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for ParseError {}

type Result<T> = std::result::Result<T, ParseError>;

/// Why a document could not be loaded from disk
#[derive(Debug)]
pub enum LoadError {
    Io(PathBuf, std::io::Error),
    Sandbox(SandboxError),
    Encoding(PathBuf),
    Parse(PathBuf, ParseError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(path, e) => write!(f, "Failed to read {}: {}", path.display(), e),
            LoadError::Sandbox(e) => write!(f, "Refusing to load: {}", e),
            LoadError::Encoding(path) => write!(f, "{} is not valid UTF-8", path.display()),
            LoadError::Parse(path, e) => write!(f, "{} in {}", e, path.display()),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(_, e) => Some(e),
            LoadError::Sandbox(e) => Some(e),
            LoadError::Parse(_, e) => Some(e),
            LoadError::Encoding(_) => None,
        }
    }
}

/// Reads and parses a document file. Fails when the file can't be read, is
/// too large, isn't UTF-8 or doesn't parse.
pub fn load(path: &Path, default_font: &str) -> std::result::Result<Document, LoadError> {
    let bytes = Sandbox::new().read(path).map_err(|e| match e {
        SandboxError::Io(e) => LoadError::Io(path.to_path_buf(), e),
        e => LoadError::Sandbox(e),
    })?;
    let source = String::from_utf8(bytes).map_err(|_| LoadError::Encoding(path.to_path_buf()))?;
    let doc = parse_with_font(&source, default_font).map_err(|e| LoadError::Parse(path.to_path_buf(), e))?;
    info!("Loaded: {} ({} nodes)", path.display(), doc.len());
    Ok(doc)
}

pub fn parse(input: &str) -> Result<Document> {
    parse_with_font(input, DEFAULT_FONT)
}

/// Parses with `default_font` as the font family of the default stylesheet.
pub fn parse_with_font(input: &str, default_font: &str) -> Result<Document> {
    Parser::new(input, default_font).parse()
}

pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    col: usize,
    default_font: &'a str,
    doc: Document,
    /// Last element attached; new nodes are placed relative to it
    prev: NodeId,
    depth: usize,
    has_declaration: bool,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, default_font: &'a str) -> Self {
        let doc = Document::new();
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
            default_font,
            prev: doc.root(),
            doc,
            depth: 1,
            has_declaration: false,
        }
    }

    pub fn parse(mut self) -> Result<Document> {
        let mut open: Vec<String> = vec![];
        let mut root_seen = false;

        while self.peek().is_some() {
            if self.starts_with("<?") {
                self.parse_processing_instruction()?;
            } else if self.starts_with("<!--") {
                let content = self.read_delimited("<!--", "-->")?;
                self.attach_leaf(NodeKind::Comment, content);
            } else if self.starts_with("<![CDATA[") {
                let content = self.read_delimited("<![CDATA[", "]]>")?;
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    self.attach_leaf(NodeKind::CData, trimmed.to_string());
                }
            } else if self.starts_with("<!") {
                self.skip_directive()?;
            } else if self.starts_with("</") {
                self.advance();
                self.advance();
                let name = self.parse_name()?;
                self.skip_whitespace();
                self.expect('>')?;
                match open.pop() {
                    Some(expected) if expected == name => self.depth -= 1,
                    Some(expected) => {
                        return Err(self.error(&format!("Expected </{}>, found </{}>", expected, name)))
                    }
                    None => return Err(self.error(&format!("Unexpected closing tag </{}>", name))),
                }
            } else if self.peek() == Some('<') {
                if open.is_empty() {
                    if root_seen {
                        return Err(self.error("Document has more than one root element"));
                    }
                    root_seen = true;
                }
                let (name, self_closing) = self.parse_start_tag()?;
                if !self_closing {
                    open.push(name);
                    self.depth += 1;
                }
            } else {
                let text = self.read_text()?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    if open.is_empty() {
                        return Err(self.error("Text outside of the root element"));
                    }
                    self.attach_leaf(NodeKind::Text, trimmed.to_string());
                }
            }
        }

        if let Some(name) = open.pop() {
            return Err(self.error(&format!("Unclosed element <{}>", name)));
        }
        if self.doc.window().is_none() {
            return Err(self.error("Document has no root element"));
        }
        Ok(self.doc)
    }

    fn parse_processing_instruction(&mut self) -> Result<()> {
        self.advance();
        self.advance();
        let target = self.parse_name()?;
        while !self.starts_with("?>") {
            if self.advance().is_none() {
                return Err(self.error("Unterminated processing instruction"));
            }
        }
        self.advance();
        self.advance();
        if target == "xml" && !self.has_declaration {
            self.attach_declaration();
        }
        Ok(())
    }

    fn attach_declaration(&mut self) {
        self.has_declaration = true;
        let mut node = Node::new(NodeKind::Declaration, "xml");
        node.depth = 1;
        let id = self.doc.insert(node);
        let root = self.doc.root();
        self.doc.add_child(root, id);
        self.prev = id;
    }

    fn parse_start_tag(&mut self) -> Result<(String, bool)> {
        self.expect('<')?;
        let name = self.parse_name()?;

        if self.depth == 1 && !self.has_declaration {
            // missing XML declaration
            self.attach_declaration();
        }

        let mut node = Node::element(name.clone(), Style::with_font(self.default_font));
        let self_closing;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('>') => {
                    self.advance();
                    self_closing = false;
                    break;
                }
                Some('/') => {
                    self.advance();
                    self.expect('>')?;
                    self_closing = true;
                    break;
                }
                Some(_) => {
                    let key = self.parse_name()?;
                    self.skip_whitespace();
                    self.expect('=')?;
                    self.skip_whitespace();
                    let value = self.parse_attribute_value()?;
                    apply_attribute(&mut node, &key, &value);
                }
                None => return Err(self.error(&format!("Unterminated tag <{}>", name))),
            }
        }

        let id = self.attach(node);
        layout::resolve(&mut self.doc, id);
        self.prev = id;
        Ok((name, self_closing))
    }

    fn attach_leaf(&mut self, kind: NodeKind, content: String) {
        self.attach(Node::new(kind, content));
    }

    /// Places a new node next to or below `prev` depending on how deep the
    /// reader currently is compared to it.
    fn attach(&mut self, mut node: Node) -> NodeId {
        node.depth = self.depth;
        let id = self.doc.insert(node);
        let prev_depth = self.doc.node(self.prev).depth;
        if self.depth > prev_depth {
            self.doc.add_child(self.prev, id);
        } else {
            let mut anchor = self.prev;
            for _ in self.depth..prev_depth {
                if let Some(parent) = self.doc.node(anchor).parent {
                    anchor = parent;
                }
            }
            self.doc.add_sibling(anchor, id);
        }
        id
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.peek() {
            Some(c) if c == '"' || c == '\'' => c,
            Some(c) => return Err(self.error(&format!("Expected quoted attribute value, found '{}'", c))),
            None => return Err(self.error("Expected quoted attribute value, found end of input")),
        };
        self.advance();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let raw = &self.input[start..self.pos];
                self.advance();
                return self.decode_entities(raw);
            }
            if c == '<' {
                return Err(self.error("'<' is not allowed in attribute values"));
            }
            self.advance();
        }
        Err(self.error("Unterminated attribute value"))
    }

    fn read_text(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '<' {
                break;
            }
            self.advance();
        }
        let raw = &self.input[start..self.pos];
        self.decode_entities(raw)
    }

    fn read_delimited(&mut self, open: &str, close: &str) -> Result<String> {
        for _ in open.chars() {
            self.advance();
        }
        let start = self.pos;
        while !self.starts_with(close) {
            if self.advance().is_none() {
                return Err(self.error(&format!("Expected '{}' before end of input", close)));
            }
        }
        let content = self.input[start..self.pos].to_string();
        for _ in close.chars() {
            self.advance();
        }
        Ok(content)
    }

    /// Skips `<!DOCTYPE ...>` including an internal subset in brackets.
    fn skip_directive(&mut self) -> Result<()> {
        let mut brackets = 0usize;
        while let Some(c) = self.advance() {
            match c {
                '[' => brackets += 1,
                ']' => brackets = brackets.saturating_sub(1),
                '>' if brackets == 0 => {
                    debug!("skipped directive");
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(self.error("Unterminated directive"))
    }

    fn decode_entities(&self, raw: &str) -> Result<String> {
        if !raw.contains('&') {
            return Ok(raw.to_string());
        }
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let Some(semi) = after.find(';') else {
                return Err(self.error("Unterminated entity reference"));
            };
            let entity = &after[..semi];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    if let Some(hex) = entity.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok().and_then(char::from_u32)
                    } else {
                        None
                    }
                }
            };
            match decoded {
                Some(c) => out.push(c),
                None => return Err(self.error(&format!("Unknown entity '&{};'", entity))),
            }
            rest = &after[semi + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Element or attribute name. A namespace prefix is dropped.
    fn parse_name(&mut self) -> Result<String> {
        let mut s = String::new();

        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
            Some(c) => return Err(self.error(&format!("Expected name, found '{}'", c))),
            None => return Err(self.error("Expected name, found end of input")),
        }

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match s.rsplit_once(':') {
            Some((_, local)) if !local.is_empty() => Ok(local.to_string()),
            _ => Ok(s),
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.input[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(self.error(&format!("Expected '{}', found '{}'", expected, c))),
            None => Err(self.error(&format!("Expected '{}', found end of input", expected))),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            line: self.line,
            col: self.col,
        }
    }
}

/// Applies one attribute. A value that doesn't parse only affects its own
/// attribute.
fn apply_attribute(node: &mut Node, key: &str, value: &str) {
    match key {
        "name" => node.name = value.to_string(),
        "id" => node.id = value.to_string(),
        "xy" => {
            let (x, y) = parse_xy(value);
            node.frame.x = x;
            node.frame.y = y;
        }
        "rel-xy" => {
            let (x, y) = parse_xy(value);
            node.frame.rel_x = x;
            node.frame.rel_y = y;
        }
        "width" => node.frame.width = lenient_f32(value),
        "height" => node.frame.height = lenient_f32(value),
        "value" => node.value = value.chars().collect(),
        "style" => node.style.apply_inline(value),
        _ => debug!("ignoring unknown attribute {}={:?} on <{}>", key, value, node.tag),
    }
}

/// Reads a comma separated coordinate pair.
///
/// Kept bit-compatible with existing documents: a single value sets only x,
/// two values set only y, anything else sets neither.
fn parse_xy(value: &str) -> (f32, f32) {
    let parts: Vec<&str> = value.split(',').collect();
    match parts.as_slice() {
        [x] => (lenient_f32(x), 0.0),
        [_, y] => (0.0, lenient_f32(y)),
        _ => (0.0, 0.0),
    }
}
