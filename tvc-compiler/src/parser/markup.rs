//! Hand-written recursive-descent scanner for the markup fragment (§4.1,
//! §4.3.2). Grounded in the teacher's `azul-core::xml` node-tree walker
//! (`XmlNode { node_type, attributes, children, text }`) for the element
//! shape; the curly-brace block constructs (`{#if}`/`{#each}`/`{#await}`,
//! `{expr}` mustaches) are not valid XML, so they're scanned by hand rather
//! than handed to an XML parser.

use tvc_core::ast::{Attr, AttrValue, IfBranch, TemplateNode};
use tvc_core::source::ByteSpan;

use super::script::parse_expr_snippet;

pub struct MarkupParser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    base_offset: u32,
}

impl<'a> MarkupParser<'a> {
    pub fn new(src: &'a str, base_offset: u32) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0, base_offset }
    }

    pub fn parse_fragment(mut self) -> Vec<TemplateNode> {
        self.parse_nodes(&[])
    }

    fn span(&self, start: usize, end: usize) -> ByteSpan {
        ByteSpan::new(self.base_offset + start as u32, self.base_offset + end as u32)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, needle: &str) -> bool {
        self.src[self.pos..].starts_with(needle)
    }

    /// Parses sibling nodes until EOF or until the text at the current
    /// position matches one of `stop_markers` (used to end a block branch at
    /// `{:else}`/`{/if}`/`{/each}` without consuming it).
    fn parse_nodes(&mut self, stop_markers: &[&str]) -> Vec<TemplateNode> {
        let mut nodes = Vec::new();
        loop {
            if self.pos >= self.bytes.len() {
                break;
            }
            if stop_markers.iter().any(|m| self.starts_with(m)) {
                break;
            }
            if self.starts_with("{#if") {
                nodes.push(self.parse_if_block());
            } else if self.starts_with("{#each") {
                nodes.push(self.parse_each_block());
            } else if self.starts_with("{#await") {
                nodes.push(self.parse_await_block());
            } else if self.peek() == Some(b'{') {
                nodes.push(self.parse_mustache());
            } else if self.peek() == Some(b'<') {
                if let Some(node) = self.parse_element() {
                    nodes.push(node);
                }
            } else {
                nodes.push(self.parse_text());
            }
        }
        nodes
    }

    fn parse_text(&mut self) -> TemplateNode {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.peek() != Some(b'<') && self.peek() != Some(b'{') {
            self.pos += 1;
        }
        TemplateNode::Text(self.src[start..self.pos].to_string())
    }

    /// Finds the matching `}` for a `{` at `self.pos`, tracking nested
    /// braces and skipping over string/template literal contents so a `}`
    /// inside a quoted string doesn't end the mustache early.
    fn scan_braced(&mut self) -> (usize, usize) {
        let open = self.pos;
        self.pos += 1; // consume '{'
        let content_start = self.pos;
        let mut depth = 1usize;
        while self.pos < self.bytes.len() && depth > 0 {
            match self.peek() {
                Some(b'{') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b'}') => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some(q @ (b'"' | b'\'' | b'`')) => {
                    self.pos += 1;
                    while self.pos < self.bytes.len() && self.peek() != Some(q) {
                        if self.peek() == Some(b'\\') {
                            self.pos += 1;
                        }
                        self.pos += 1;
                    }
                    self.pos += 1;
                }
                _ => self.pos += 1,
            }
        }
        let _ = open;
        let content_end = self.pos.saturating_sub(1).max(content_start);
        (content_start, content_end)
    }

    fn parse_mustache(&mut self) -> TemplateNode {
        let start = self.pos;
        let (content_start, content_end) = self.scan_braced();
        let text = &self.src[content_start..content_end];
        let expr = parse_expr_snippet(text);
        TemplateNode::Mustache { expr, span: self.span(start, self.pos) }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')) {
            self.pos += 1;
        }
    }

    /// `{#if test}`/`{:else if test}`/`{:else}` chains, ending at `{/if}`.
    fn parse_if_block(&mut self) -> TemplateNode {
        let start = self.pos;
        let mut branches = Vec::new();

        // {#if <expr>}
        self.advance_past("{#if");
        let (cs, ce) = self.scan_to('}');
        let test = parse_expr_snippet(&self.src[cs..ce]);
        let body = self.parse_nodes(&["{:else", "{/if}"]);
        branches.push(IfBranch { test: Some(test), body });

        loop {
            if self.starts_with("{:else if") {
                self.advance_past("{:else if");
                let (cs, ce) = self.scan_to('}');
                let test = parse_expr_snippet(&self.src[cs..ce]);
                let body = self.parse_nodes(&["{:else", "{/if}"]);
                branches.push(IfBranch { test: Some(test), body });
            } else if self.starts_with("{:else}") {
                self.advance_past("{:else}");
                let body = self.parse_nodes(&["{/if}"]);
                branches.push(IfBranch { test: None, body });
            } else {
                break;
            }
        }
        self.advance_past("{/if}");
        TemplateNode::IfBlock { branches, span: self.span(start, self.pos) }
    }

    /// `{#each arrayVar as alias[, index][ (key)]}` ... `{/each}`.
    fn parse_each_block(&mut self) -> TemplateNode {
        let start = self.pos;
        self.advance_past("{#each");
        let (cs, ce) = self.scan_to('}');
        let header = self.src[cs..ce].trim();

        let (iter_part, rest) = match header.split_once(" as ") {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (header, ""),
        };
        let array_var = iter_part.to_string();

        let has_key = rest.contains('(');
        let alias_and_index = rest.split('(').next().unwrap_or(rest).trim();
        let mut parts = alias_and_index.split(',').map(str::trim);
        let item_alias = parts.next().unwrap_or("item").to_string();
        let index_name = parts.next().map(|s| s.to_string());

        let body = self.parse_nodes(&["{/each}"]);
        self.advance_past("{/each}");
        TemplateNode::EachBlock {
            array_var,
            item_alias,
            index_name,
            has_key,
            body,
            span: self.span(start, self.pos),
        }
    }

    /// `{#await …}` blocks are recognized but never lowered (§4.2 no-await-block);
    /// their content is skipped without being walked.
    fn parse_await_block(&mut self) -> TemplateNode {
        let start = self.pos;
        self.advance_past("{#await");
        self.scan_to('}');
        let mut depth = 1usize;
        while self.pos < self.bytes.len() && depth > 0 {
            if self.starts_with("{#await") {
                depth += 1;
                self.pos += 1;
            } else if self.starts_with("{/await}") {
                depth -= 1;
                if depth == 0 {
                    self.advance_past("{/await}");
                    break;
                }
                self.pos += 1;
            } else {
                self.pos += 1;
            }
        }
        TemplateNode::AwaitBlock { span: self.span(start, self.pos) }
    }

    fn advance_past(&mut self, marker: &str) {
        if self.starts_with(marker) {
            self.pos += marker.len();
        }
    }

    fn scan_to(&mut self, close: char) -> (usize, usize) {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.peek() != Some(close as u8) {
            self.pos += 1;
        }
        let end = self.pos;
        if self.pos < self.bytes.len() {
            self.pos += 1; // consume the closing char
        }
        (start, end)
    }

    fn parse_element(&mut self) -> Option<TemplateNode> {
        let start = self.pos;
        self.pos += 1; // consume '<'
        let tag_start = self.pos;
        while self.pos < self.bytes.len() && !matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'>') | Some(b'/')) {
            self.pos += 1;
        }
        let tag = self.src[tag_start..self.pos].to_string();

        let attrs = self.parse_attrs();

        self.skip_ws();
        if self.peek() == Some(b'/') {
            self.pos += 1; // consume '/'
            if self.peek() == Some(b'>') {
                self.pos += 1;
            }
            return Some(TemplateNode::Element { tag, attrs, children: Vec::new(), span: self.span(start, self.pos) });
        }
        if self.peek() == Some(b'>') {
            self.pos += 1;
        }

        let closing = format!("</{}>", tag);
        let children = self.parse_nodes(&[&closing]);
        if self.starts_with(&closing) {
            self.pos += closing.len();
        }
        Some(TemplateNode::Element { tag, attrs, children, span: self.span(start, self.pos) })
    }

    fn parse_attrs(&mut self) -> Vec<Attr> {
        let mut attrs = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None | Some(b'>') | Some(b'/') => break,
                _ => {}
            }
            let name_start = self.pos;
            while self.pos < self.bytes.len() && !matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'=') | Some(b'>') | Some(b'/')) {
                self.pos += 1;
            }
            if self.pos == name_start {
                break;
            }
            let raw_name = self.src[name_start..self.pos].to_string();

            self.skip_ws();
            if self.peek() != Some(b'=') {
                attrs.push(Attr { name: raw_name, value: AttrValue::Flag });
                continue;
            }
            self.pos += 1; // consume '='
            self.skip_ws();

            let value = match self.peek() {
                Some(b'{') => {
                    let (cs, ce) = self.scan_braced();
                    let text = self.src[cs..ce].trim().to_string();
                    self.classify_dynamic_attr(&raw_name, text)
                }
                Some(q @ (b'"' | b'\'')) => {
                    self.pos += 1;
                    let vstart = self.pos;
                    while self.pos < self.bytes.len() && self.peek() != Some(q) {
                        self.pos += 1;
                    }
                    let text = self.src[vstart..self.pos].to_string();
                    self.pos += 1;
                    AttrValue::Static(text)
                }
                _ => AttrValue::Static(String::new()),
            };
            attrs.push(Attr { name: raw_name, value });
        }
        attrs
    }

    fn classify_dynamic_attr(&self, name: &str, text: String) -> AttrValue {
        if let Some(handler) = name.strip_prefix("on:") {
            let _ = handler;
            return AttrValue::EventHandler(text);
        }
        if name.strip_prefix("bind:").is_some() {
            return AttrValue::Bind(text);
        }
        AttrValue::Dynamic(parse_expr_snippet(&text))
    }
}

pub fn parse(src: &str, base_offset: u32) -> Vec<TemplateNode> {
    MarkupParser::new(src, base_offset).parse_fragment()
}
