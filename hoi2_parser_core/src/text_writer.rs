use std::fmt::Display;

use crate::format::{NumberStyle, quoted, yes_no};

/// Builds scenario text: one tab per nesting level, CRLF line endings.
#[derive(Debug, Default)]
pub struct TextWriter {
    buffer: String,
    depth: usize,
}
impl TextWriter {
    pub fn new() -> Self {
        return TextWriter::default();
    }

    pub fn depth(&self) -> usize {
        return self.depth;
    }

    pub fn finish(self) -> String {
        return self.buffer;
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push('\t');
        }
    }

    /// Writes an indented line
    pub fn line(&mut self, text: impl Display) {
        self.indent();
        self.buffer.push_str(&text.to_string());
        self.buffer.push_str("\r\n");
    }

    pub fn blank(&mut self) {
        self.buffer.push_str("\r\n");
    }

    pub fn comment(&mut self, text: &str) {
        self.line(format_args!("# {text}"));
    }

    /// `key = value`
    pub fn field(&mut self, key: &str, value: impl Display) {
        self.line(format_args!("{key} = {value}"));
    }

    pub fn string(&mut self, key: &str, value: &str) {
        self.field(key, quoted(value));
    }

    /// Skipped when empty
    pub fn opt_string(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.string(key, value);
        }
    }

    pub fn bool(&mut self, key: &str, value: bool) {
        self.field(key, yes_no(value));
    }

    /// `key = yes`, skipped when false
    pub fn flag(&mut self, key: &str, value: bool) {
        if value {
            self.field(key, "yes");
        }
    }

    pub fn number(&mut self, key: &str, value: f64, style: NumberStyle) {
        self.field(key, style.render(value));
    }

    /// Writes the number when `value` is `Some`
    pub fn opt_number(&mut self, key: &str, value: Option<f64>, style: NumberStyle) {
        if let Some(value) = value {
            self.number(key, value, style);
        }
    }

    pub fn opt_field<T: Display>(&mut self, key: &str, value: Option<T>) {
        if let Some(value) = value {
            self.field(key, value);
        }
    }

    /// `key = { a b c }`, skipped when empty
    pub fn list<T: Display>(&mut self, key: &str, items: impl IntoIterator<Item = T>) {
        let text = inline_list(items);
        if !text.is_empty() {
            self.line(format_args!("{key} = {{ {text} }}"));
        }
    }

    /// `key = {` and one level deeper
    pub fn open(&mut self, key: &str) {
        self.line(format_args!("{key} = {{"));
        self.depth += 1;
    }

    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    /// Three-line `#` banner around `text`
    pub fn banner(&mut self, text: &str) {
        let rule = "#".repeat(text.len() + 4);
        self.line(&rule);
        self.line(format_args!("# {text} #"));
        self.line(&rule);
    }
}

/// Space separated items, no trailing separator
pub fn inline_list<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    return items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ");
}

/// `{ k1 = v1 k2 = v2 }` for records written on one line
pub fn inline_record<K: Display, V: Display>(fields: impl IntoIterator<Item = (K, V)>) -> String {
    let body = fields
        .into_iter()
        .map(|(key, value)| format!("{key} = {value}"))
        .collect::<Vec<_>>()
        .join(" ");
    return format!("{{ {body} }}");
}
