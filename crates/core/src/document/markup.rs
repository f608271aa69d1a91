//! Tolerant markup parsing and serialization for the in-memory document.
//!
//! Only what the drafting editor emits is understood: elements with quoted or
//! bare attributes, void elements and the common character references.
//! Comments, declarations and `script`/`style` bodies are carried through
//! verbatim. Anything else is kept as text rather than rejected.

use crate::placeholders::{ID_ATTR, escape_html};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Markup written back exactly as read and never shown as text.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    /// `script` and `style`, whose bodies are not markup.
    pub fn is_raw_text(&self) -> bool {
        RAW_TEXT_ELEMENTS.contains(&self.tag.as_str())
    }

    /// A span holding a substituted variable value.
    pub fn is_applied_value(&self) -> bool {
        self.tag == "span" && self.attr(ID_ATTR).is_some()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

impl Node {
    /// Width of the node in document positions: one per character of text,
    /// one for a void element, and an opening plus a closing boundary around
    /// the children of any other element.
    pub fn size(&self) -> usize {
        match self {
            Node::Text(t) => t.chars().count(),
            Node::Raw(_) => 0,
            Node::Element(el) if el.is_void() => 1,
            Node::Element(el) => 2 + el.children.iter().map(Node::size).sum::<usize>(),
        }
    }
}

enum Tag {
    Open { name: String, attrs: Vec<(String, String)>, self_closing: bool },
    Close(String),
}

/// Parse markup into a list of top-level nodes. Never fails: unclosed
/// elements are closed at the end, stray closing tags are dropped and
/// anything that is not a well-formed tag is text.
pub fn parse(markup: &str) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut text = String::new();
    let mut rest = markup;

    while !rest.is_empty() {
        if let Some(len) = raw_markup_len(rest) {
            flush_text(&mut text, &mut stack, &mut root);
            push_node(Node::Raw(rest[..len].to_string()), &mut stack, &mut root);
            rest = &rest[len..];
            continue;
        }

        if rest.starts_with('<')
            && let Some((tag, consumed)) = parse_tag(rest)
        {
            flush_text(&mut text, &mut stack, &mut root);
            match tag {
                Tag::Open { name, attrs, self_closing } => {
                    let mut el = Element { tag: name, attrs, children: Vec::new() };
                    if self_closing || el.is_void() {
                        push_node(Node::Element(el), &mut stack, &mut root);
                    } else if el.is_raw_text() {
                        let body = &rest[consumed..];
                        let (body_len, close_len) = raw_text_body(body, &el.tag);
                        if body_len > 0 {
                            el.children.push(Node::Raw(body[..body_len].to_string()));
                        }
                        push_node(Node::Element(el), &mut stack, &mut root);
                        rest = &body[body_len + close_len..];
                        continue;
                    } else {
                        stack.push(el);
                    }
                }
                Tag::Close(name) => {
                    if let Some(depth) = stack.iter().rposition(|e| e.tag == name) {
                        close_to(depth, &mut stack, &mut root);
                    }
                }
            }
            rest = &rest[consumed..];
            continue;
        }

        // Plain text up to the next '<' (the current '<' is literal text).
        let first = rest.chars().next().map_or(1, char::len_utf8);
        let end = rest[first..].find('<').map_or(rest.len(), |i| i + first);
        text.push_str(&rest[..end]);
        rest = &rest[end..];
    }

    flush_text(&mut text, &mut stack, &mut root);
    close_to(0, &mut stack, &mut root);
    root
}

/// Serialize nodes back to markup. Text and attribute values are escaped and
/// raw nodes are written unchanged.
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&escape_text(t)),
        Node::Raw(raw) => out.push_str(raw),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (k, v) in &el.attrs {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&escape_text(v));
                out.push('"');
            }
            out.push('>');
            if el.is_void() {
                return;
            }
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str) -> String {
    let escaped = escape_html(text);
    if escaped.contains('\u{a0}') { escaped.replace('\u{a0}', "&nbsp;") } else { escaped }
}

/// Length of a comment, doctype or processing instruction at the start of
/// `s`. An unterminated comment runs to the end of the input.
fn raw_markup_len(s: &str) -> Option<usize> {
    if let Some(after) = s.strip_prefix("<!--") {
        return Some(after.find("-->").map_or(s.len(), |end| 4 + end + 3));
    }
    if s.starts_with("<!") || s.starts_with("<?") {
        return s.find('>').map(|end| end + 1);
    }
    None
}

/// Split a `script` or `style` body from its closing tag. Returns the body
/// length and the closing tag length. A missing closing tag leaves the rest
/// of the input as the body.
fn raw_text_body(s: &str, tag: &str) -> (usize, usize) {
    let close = format!("</{tag}");
    let lower = s.to_ascii_lowercase();
    let mut from = 0;
    while let Some(found) = lower[from..].find(&close) {
        let start = from + found;
        let after = &lower[start + close.len()..];
        if after.starts_with(|c: char| c == '>' || c == '/' || c.is_ascii_whitespace()) {
            let close_len = after.find('>').map_or(lower.len() - start, |gt| close.len() + gt + 1);
            return (start, close_len);
        }
        from = start + close.len();
    }
    (s.len(), 0)
}

fn push_node(node: Node, stack: &mut [Element], root: &mut Vec<Node>) {
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => root,
    };
    if let Node::Text(t) = &node
        && let Some(Node::Text(prev)) = siblings.last_mut()
    {
        prev.push_str(t);
        return;
    }
    siblings.push(node);
}

fn flush_text(text: &mut String, stack: &mut [Element], root: &mut Vec<Node>) {
    if !text.is_empty() {
        let decoded = decode_entities(text);
        push_node(Node::Text(decoded), stack, root);
        text.clear();
    }
}

fn close_to(depth: usize, stack: &mut Vec<Element>, root: &mut Vec<Node>) {
    while stack.len() > depth {
        if let Some(el) = stack.pop() {
            push_node(Node::Element(el), stack, root);
        }
    }
}

fn parse_tag(s: &str) -> Option<(Tag, usize)> {
    let bytes = s.as_bytes();
    let closing = bytes.get(1) == Some(&b'/');
    let name_start = if closing { 2 } else { 1 };

    if !bytes.get(name_start).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    let name_end = name_start
        + bytes[name_start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
            .count();
    let name = s[name_start..name_end].to_ascii_lowercase();

    if closing {
        let close = s[name_end..].find('>')?;
        return Some((Tag::Close(name), name_end + close + 1));
    }

    let mut attrs = Vec::new();
    let mut i = name_end;
    loop {
        i += s[i..].len() - s[i..].trim_start().len();
        let rest = &s[i..];
        if rest.is_empty() {
            return None;
        }
        if rest.starts_with("/>") {
            return Some((Tag::Open { name, attrs, self_closing: true }, i + 2));
        }
        if rest.starts_with('>') {
            return Some((Tag::Open { name, attrs, self_closing: false }, i + 1));
        }
        if rest.starts_with('/') {
            i += 1;
            continue;
        }

        let key_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let key = rest[..key_len].to_ascii_lowercase();
        i += key_len;

        let after_key = &s[i..];
        let trimmed = after_key.trim_start();
        if let Some(value_part) = trimmed.strip_prefix('=') {
            i += after_key.len() - trimmed.len() + 1;
            let value_part_trimmed = value_part.trim_start();
            i += value_part.len() - value_part_trimmed.len();
            let (value, consumed) = parse_attr_value(value_part_trimmed)?;
            if !key.is_empty() {
                attrs.push((key, decode_entities(value)));
            }
            i += consumed;
        } else if !key.is_empty() {
            attrs.push((key, String::new()));
        }
    }
}

fn parse_attr_value(s: &str) -> Option<(&str, usize)> {
    match s.chars().next()? {
        quote @ ('"' | '\'') => {
            let end = s[1..].find(quote)?;
            Some((&s[1..1 + end], end + 2))
        }
        _ => {
            let end = s.find(|c: char| c.is_whitespace() || c == '>').unwrap_or(s.len());
            Some((&s[..end], end))
        }
    }
}

/// Decode the character references the editor produces. Unknown references
/// are left as written.
pub fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let semi = tail.char_indices().take(12).find(|&(_, c)| c == ';').map(|(i, _)| i);

        if let Some(semi) = semi
            && let Some(decoded) = decode_entity(&tail[1..semi])
        {
            out.push(decoded);
            rest = &tail[semi + 1..];
        } else {
            out.push('&');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
