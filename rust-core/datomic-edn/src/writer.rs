// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Canonical EDN text output.
//!
//! - Sequence elements are separated by a single space: `[1000 5]`
//! - Map entries are separated by `", "`: `{:a 1, :b 2}`
//! - A tagged literal is glued to a collection payload (`#db/id[1000 5]`) and
//!   separated by one space from any other payload (`#inst "..."`)

use chrono::SecondsFormat;

use crate::value::{TaggedValue, Value};

/// Render `value` as EDN text.
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

/// Render a tagged literal as EDN text.
pub fn tagged_to_string(tagged: &TaggedValue) -> String {
    let mut out = String::new();
    write_tagged(tagged.tag(), tagged.value(), &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(n) => out.push_str(&n.to_string()),
        Value::Float(f) => write_float(*f, out),
        Value::String(s) => write_string(s, out),
        Value::Char(c) => write_char(*c, out),
        Value::Symbol(s) => out.push_str(s),
        Value::Keyword(k) => {
            out.push(':');
            out.push_str(k);
        }
        Value::List(items) => write_seq("(", ")", items.iter(), out),
        Value::Vector(items) => write_seq("[", "]", items.iter(), out),
        Value::Set(items) => write_seq("#{", "}", items.iter(), out),
        Value::Map(entries) => {
            out.push('{');
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(k, out);
                out.push(' ');
                write_value(v, out);
            }
            out.push('}');
        }
        Value::Inst(t) => {
            let text = Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true));
            write_tagged("inst", &text, out);
        }
        Value::Uuid(u) => write_tagged("uuid", &Value::String(u.to_string()), out),
        Value::Tagged(t) => write_tagged(t.tag(), t.value(), out),
    }
}

fn write_seq<'a>(open: &str, close: &str, items: impl Iterator<Item = &'a Value>, out: &mut String) {
    out.push_str(open);
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_value(item, out);
    }
    out.push_str(close);
}

fn write_tagged(tag: &str, payload: &Value, out: &mut String) {
    out.push('#');
    out.push_str(tag);
    if !payload.is_collection() {
        out.push(' ');
    }
    write_value(payload, out);
}

fn write_float(f: f64, out: &mut String) {
    if f.is_nan() {
        out.push_str("##NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "##Inf" } else { "##-Inf" });
    } else {
        // Debug formatting always keeps a fractional part or exponent ("1.0", "1e100").
        out.push_str(&format!("{f:?}"));
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_char(c: char, out: &mut String) {
    match c {
        '\n' => out.push_str("\\newline"),
        ' ' => out.push_str("\\space"),
        '\t' => out.push_str("\\tab"),
        '\r' => out.push_str("\\return"),
        c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => {
            out.push('\\');
            out.push(c);
        }
    }
}
