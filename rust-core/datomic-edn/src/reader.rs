// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! EDN reader.
//!
//! A single-pass recursive reader over the input characters. Whitespace and
//! commas separate forms, `;` starts a line comment and `#_` discards the
//! next form. Tagged literals are resolved through a [`TagRegistry`].
//! Nesting deeper than [`MAX_DEPTH`] is rejected. Error offsets count
//! characters, not bytes.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{EdnError, Result};
use crate::registry::{self, TagRegistry};
use crate::value::Value;

/// Characters that end a token.
const DELIMITERS: &[char] = &['(', ')', '[', ']', '{', '}', '"', ';'];

/// Deepest nesting of collections and tagged payloads the reader accepts.
pub const MAX_DEPTH: usize = 512;

/// Read exactly one value from `input` using the process-wide registry.
pub fn from_str(input: &str) -> Result<Value> {
    from_str_with(input, registry::global())
}

/// Read exactly one value from `input` using `registry` for tagged literals.
///
/// Trailing whitespace and comments are allowed; any other trailing form is
/// an error.
pub fn from_str_with(input: &str, registry: &TagRegistry) -> Result<Value> {
    let mut reader = Reader::new(input, registry);
    let value = reader.read_value()?;
    reader.skip_separators();
    match reader.peek() {
        None => Ok(value),
        Some(found) => Err(EdnError::Unexpected {
            offset: reader.pos,
            found,
        }),
    }
}

struct Reader<'r> {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    registry: &'r TagRegistry,
}

impl<'r> Reader<'r> {
    fn new(input: &str, registry: &'r TagRegistry) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            depth: 0,
            registry,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn next(&mut self, context: &'static str) -> Result<char> {
        let ch = self.peek().ok_or(EdnError::UnexpectedEof(context))?;
        self.pos += 1;
        Ok(ch)
    }

    fn unexpected(&self, found: char) -> EdnError {
        EdnError::Unexpected {
            offset: self.pos,
            found,
        }
    }

    fn skip_separators(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == ',' {
                self.pos += 1;
            } else if ch == ';' {
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn read_value(&mut self) -> Result<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(EdnError::TooDeep {
                offset: self.pos,
                max: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let value = self.read_form();
        self.depth -= 1;
        value
    }

    fn read_form(&mut self) -> Result<Value> {
        self.skip_separators();
        let ch = self.peek().ok_or(EdnError::UnexpectedEof("value"))?;

        match ch {
            '(' => {
                self.pos += 1;
                Ok(Value::List(self.read_until(')', "list")?))
            }
            '[' => {
                self.pos += 1;
                Ok(Value::Vector(self.read_until(']', "vector")?))
            }
            '{' => {
                self.pos += 1;
                self.read_map()
            }
            '#' => self.read_dispatch(),
            '"' => {
                self.pos += 1;
                self.read_string().map(Value::String)
            }
            '\\' => {
                self.pos += 1;
                self.read_char().map(Value::Char)
            }
            ':' => {
                self.pos += 1;
                let token = self.read_token();
                if token.is_empty() {
                    return Err(self.unexpected(':'));
                }
                Ok(Value::Keyword(token))
            }
            ')' | ']' | '}' => Err(self.unexpected(ch)),
            c if c.is_ascii_digit() => self.read_number(),
            '+' | '-' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()
            }
            _ => {
                let token = self.read_token();
                if token.is_empty() {
                    return Err(self.unexpected(ch));
                }
                Ok(match token.as_str() {
                    "nil" => Value::Nil,
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::Symbol(token),
                })
            }
        }
    }

    /// Read forms until `close`, consuming it.
    fn read_until(&mut self, close: char, context: &'static str) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => return Err(EdnError::UnexpectedEof(context)),
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(_) => {
                    if let Some(item) = self.read_form_or_discard()? {
                        items.push(item);
                    }
                }
            }
        }
    }

    /// A `#_` discard inside a collection yields nothing.
    fn read_form_or_discard(&mut self) -> Result<Option<Value>> {
        if self.peek() == Some('#') && self.peek_at(1) == Some('_') {
            self.pos += 2;
            self.read_value()?;
            return Ok(None);
        }
        self.read_value().map(Some)
    }

    fn read_map(&mut self) -> Result<Value> {
        let items = self.read_until('}', "map")?;
        if items.len() % 2 != 0 {
            return Err(EdnError::OddMap {
                offset: self.pos - 1,
                forms: items.len(),
            });
        }
        let mut map = BTreeMap::new();
        let mut iter = items.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            map.insert(k, v);
        }
        Ok(Value::Map(map))
    }

    fn read_dispatch(&mut self) -> Result<Value> {
        self.pos += 1; // '#'
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                let items = self.read_until('}', "set")?;
                Ok(Value::Set(items.into_iter().collect::<BTreeSet<_>>()))
            }
            Some('_') => {
                self.pos += 1;
                self.read_value()?;
                self.read_value()
            }
            Some('#') => {
                self.pos += 1;
                match self.read_token().as_str() {
                    "NaN" => Ok(Value::Float(f64::NAN)),
                    "Inf" => Ok(Value::Float(f64::INFINITY)),
                    "-Inf" => Ok(Value::Float(f64::NEG_INFINITY)),
                    other => Err(EdnError::InvalidNumber(format!("##{other}"))),
                }
            }
            Some(c) if c.is_alphabetic() => {
                let tag = self.read_token();
                let payload = self.read_value()?;
                self.registry.parse(&tag, payload)
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(EdnError::UnexpectedEof("dispatch")),
        }
    }

    fn read_token(&mut self) -> String {
        let mut token = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == ',' || DELIMITERS.contains(&ch) {
                break;
            }
            token.push(ch);
            self.pos += 1;
        }
        token
    }

    fn read_number(&mut self) -> Result<Value> {
        let token = self.read_token();
        if let Some(digits) = token.strip_suffix('N') {
            return digits
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| EdnError::InvalidNumber(token.clone()));
        }
        if let Some(digits) = token.strip_suffix('M') {
            return digits
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| EdnError::InvalidNumber(token.clone()));
        }
        if token.contains(['.', 'e', 'E']) {
            return token
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| EdnError::InvalidNumber(token.clone()));
        }
        token
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| EdnError::InvalidNumber(token.clone()))
    }

    fn read_string(&mut self) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.next("string")? {
                '"' => return Ok(out),
                '\\' => {
                    let esc = self.next("string escape")?;
                    match esc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        '"' => out.push('"'),
                        '\\' => out.push('\\'),
                        'u' => out.push(self.read_unicode_escape()?),
                        other => return Err(EdnError::InvalidEscape(format!("\\{other}"))),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn read_unicode_escape(&mut self) -> Result<char> {
        let mut hex = String::with_capacity(4);
        for _ in 0..4 {
            hex.push(self.next("unicode escape")?);
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| EdnError::InvalidEscape(format!("\\u{hex}")))
    }

    fn read_char(&mut self) -> Result<char> {
        // The first character is always part of the literal, even a delimiter.
        let first = self.next("character")?;
        let mut name = String::from(first);
        name.push_str(&self.read_token());

        match name.as_str() {
            "newline" => Ok('\n'),
            "space" => Ok(' '),
            "tab" => Ok('\t'),
            "return" => Ok('\r'),
            "formfeed" => Ok('\u{c}'),
            "backspace" => Ok('\u{8}'),
            _ if name.chars().count() == 1 => Ok(first),
            _ if name.starts_with('u') && name.len() == 5 => u32::from_str_radix(&name[1..], 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| EdnError::InvalidEscape(format!("\\{name}"))),
            _ => Err(EdnError::InvalidEscape(format!("\\{name}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TaggedValue;

    fn read(input: &str) -> Value {
        from_str_with(input, &TagRegistry::default()).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(read("nil"), Value::Nil);
        assert_eq!(read("true"), Value::Bool(true));
        assert_eq!(read("-42"), Value::Integer(-42));
        assert_eq!(read("42N"), Value::Integer(42));
        assert_eq!(read("1.5"), Value::Float(1.5));
        assert_eq!(read("2.5M"), Value::Float(2.5));
        assert_eq!(read(":db/ident"), Value::keyword("db/ident"));
        assert_eq!(read("?e"), Value::symbol("?e"));
        assert_eq!(read(r#""a\nb""#), Value::string("a\nb"));
        assert_eq!(read(r"\newline"), Value::Char('\n'));
        assert_eq!(read(r"\("), Value::Char('('));
    }

    #[test]
    fn test_query_form() {
        let v = read("[:find ?e :where [?e :db/ident :foo]]");
        let items = v.as_seq().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], Value::keyword("find"));
        assert_eq!(items[3].as_seq().unwrap()[2], Value::keyword("foo"));
    }

    #[test]
    fn test_map_commas_and_comments() {
        let v = read("{:basis-t 1000, ; trailing comment\n :db/alias \"free/test\"}");
        assert_eq!(v.get_keyword("basis-t"), Some(&Value::Integer(1000)));
        assert_eq!(v.get_keyword("db/alias"), Some(&Value::string("free/test")));
    }

    #[test]
    fn test_odd_map_is_rejected() {
        let err = from_str_with("{:a 1 :b}", &TagRegistry::default()).unwrap_err();
        assert_eq!(err, EdnError::OddMap { offset: 8, forms: 3 });
    }

    #[test]
    fn test_nesting_limit() {
        let registry = TagRegistry::default();

        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(from_str_with(&ok, &registry).is_ok());

        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert_eq!(
            from_str_with(&deep, &registry),
            Err(EdnError::TooDeep {
                offset: MAX_DEPTH,
                max: MAX_DEPTH
            })
        );

        let unterminated = "[".repeat(5_000);
        assert!(matches!(
            from_str_with(&unterminated, &registry),
            Err(EdnError::TooDeep { .. })
        ));

        let tags = format!("{}1", "#x ".repeat(MAX_DEPTH + 1));
        assert!(matches!(
            from_str_with(&tags, &registry),
            Err(EdnError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_discard_and_sets() {
        assert_eq!(read("[1 #_2 3]"), Value::vector([Value::Integer(1), Value::Integer(3)]));
        assert_eq!(read("#_ :skipped 7"), Value::Integer(7));
        assert_eq!(read("#{3 1 2}").to_string(), "#{1 2 3}");
    }

    #[test]
    fn test_db_id_literal() {
        let v = read("#db/id[1000 5]");
        assert_eq!(
            v,
            Value::Tagged(TaggedValue::db_id(Value::vector([
                Value::Integer(1000),
                Value::Integer(5)
            ])))
        );
        assert_eq!(v.to_string(), "#db/id[1000 5]");
    }

    #[test]
    fn test_db_id_literal_with_number_is_malformed() {
        let err = from_str_with("#db/id 5", &TagRegistry::default()).unwrap_err();
        assert!(matches!(err, EdnError::MalformedLiteral(_)));
    }

    #[test]
    fn test_inst_and_uuid_literals() {
        let v = read(r#"#inst "2024-01-02T03:04:05.000Z""#);
        assert!(matches!(v, Value::Inst(_)));
        let v = read(r#"#uuid "00000000-0000-0000-0000-000000000000""#);
        assert!(matches!(v, Value::Uuid(_)));
    }

    #[test]
    fn test_special_floats() {
        assert!(read("##NaN").as_f64().unwrap().is_nan());
        assert_eq!(read("##-Inf"), Value::Float(f64::NEG_INFINITY));
    }

    #[test]
    fn test_errors() {
        let registry = TagRegistry::default();
        assert!(matches!(
            from_str_with("[1 2", &registry),
            Err(EdnError::UnexpectedEof("vector"))
        ));
        assert!(matches!(
            from_str_with("]", &registry),
            Err(EdnError::Unexpected { offset: 0, found: ']' })
        ));
        assert!(matches!(
            from_str_with("1 2", &registry),
            Err(EdnError::Unexpected { offset: 2, found: '2' })
        ));
        // Offsets count characters: `é` is one position.
        assert!(matches!(
            from_str_with("\"é\" 2", &registry),
            Err(EdnError::Unexpected { offset: 4, found: '2' })
        ));
        assert!(matches!(
            from_str_with("12abc", &registry),
            Err(EdnError::InvalidNumber(_))
        ));
        assert!(matches!(
            from_str_with(r#""\q""#, &registry),
            Err(EdnError::InvalidEscape(_))
        ));
    }
}
