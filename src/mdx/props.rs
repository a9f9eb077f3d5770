//! Component tag syntax: `<Name attr="text" flag data={json} />`.

use std::collections::BTreeMap;

use serde_json::Value;

/// Attributes of a component tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(BTreeMap<String, Value>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> bool {
        match self.0.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    /// String items of an array attribute such as `items={['npm', 'yarn']}`.
    pub fn get_str_list(&self, name: &str) -> Vec<String> {
        self.0
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A parsed opening tag.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenTag {
    pub name: String,
    pub props: Props,
    pub self_closing: bool,
    /// Bytes consumed from the input, including the closing `>`
    pub len: usize,
}

/// Parse an opening tag at the start of `input`.
///
/// Returns `None` when the text is not a capitalised component tag or the
/// tag is not terminated.
pub fn parse_open_tag(input: &str) -> Option<OpenTag> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'<') || !bytes.get(1).is_some_and(u8::is_ascii_uppercase) {
        return None;
    }

    let mut pos = 1;
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'.') {
        pos += 1;
    }
    let name = input[1..pos].to_string();
    let mut props = Props::new();

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        match *bytes.get(pos)? {
            b'>' => {
                return Some(OpenTag {
                    name,
                    props,
                    self_closing: false,
                    len: pos + 1,
                })
            }
            b'/' if bytes.get(pos + 1) == Some(&b'>') => {
                return Some(OpenTag {
                    name,
                    props,
                    self_closing: true,
                    len: pos + 2,
                })
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = pos;
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || matches!(bytes[pos], b'_' | b'-' | b':'))
                {
                    pos += 1;
                }
                let attr = &input[start..pos];

                if bytes.get(pos) != Some(&b'=') {
                    props.insert(attr, Value::Bool(true));
                    continue;
                }
                pos += 1;

                let (value, consumed) = parse_value(&input[pos..])?;
                props.insert(attr, value);
                pos += consumed;
            }
            _ => return None,
        }
    }
}

/// Parse `"text"`, `'text'` or `{expression}`.
fn parse_value(input: &str) -> Option<(Value, usize)> {
    let first = *input.as_bytes().first()?;
    match first {
        b'"' | b'\'' => {
            let end = input[1..].find(first as char)? + 1;
            Some((Value::String(input[1..end].to_string()), end + 1))
        }
        b'{' => {
            let end = matching_brace(input)?;
            Some((parse_expression(input[1..end].trim()), end + 1))
        }
        _ => None,
    }
}

/// Index of the `}` closing the `{` at position 0, skipping quoted strings.
fn matching_brace(input: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (c == '}').then_some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// JSON value of an attribute expression.
///
/// JavaScript-style single-quoted strings are accepted; anything that is not
/// JSON is kept as its source text.
fn parse_expression(expr: &str) -> Value {
    if let Ok(value) = serde_json::from_str(expr) {
        return value;
    }
    let normalized = expr.replace('\'', "\"");
    serde_json::from_str(&normalized).unwrap_or_else(|_| Value::String(expr.to_string()))
}
