use std::fmt::{Display, Write};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextToken<'a> {
    Equal,
    OpenBracket,
    CloseBracket,
    /// Used for all negative numbers
    Int(i64),
    /// Used for all positive numbers
    UInt(u64),
    Float(f64),
    Bool(bool),
    StringQuoted(&'a str),
    StringUnquoted(&'a str),
}
impl<'a> TextToken<'a> {
    /// The text of this token when it is used as the key of a `key = value` entry.
    ///
    /// Numeric keys are not returned since the lexer has already discarded their text.
    pub fn as_key(&self) -> Option<&'a str> {
        return match self {
            TextToken::StringQuoted(text) | TextToken::StringUnquoted(text) => Some(text),
            TextToken::Bool(true) => Some("yes"),
            TextToken::Bool(false) => Some("no"),
            _ => None,
        };
    }

    pub fn token_type_repr(&self) -> &'static str {
        return match self {
            TextToken::Equal => "=",
            TextToken::OpenBracket => "{",
            TextToken::CloseBracket => "}",
            TextToken::Int(_) => "int",
            TextToken::UInt(_) => "uint",
            TextToken::Float(_) => "float",
            TextToken::Bool(_) => "bool",
            TextToken::StringQuoted(_) => "string_quoted",
            TextToken::StringUnquoted(_) => "string_unquoted",
        };
    }
}
impl<'a> Display for TextToken<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return match self {
            TextToken::Equal => f.write_char('='),
            TextToken::OpenBracket => f.write_char('{'),
            TextToken::CloseBracket => f.write_char('}'),
            TextToken::Int(num) => write!(f, "{num}"),
            TextToken::UInt(num) => write!(f, "{num}"),
            TextToken::Float(num) => write!(f, "{num}"),
            TextToken::Bool(true) => f.write_str("yes"),
            TextToken::Bool(false) => f.write_str("no"),
            TextToken::StringQuoted(text) => f.write_fmt(format_args!("\"{text}\"")),
            TextToken::StringUnquoted(text) => f.write_str(text),
        };
    }
}

/// Splits scenario text into tokens, dropping whitespace and `#` comments.
///
/// Strings are never escaped in scenario files, so a quoted string simply runs to the next `"`.
#[derive(Clone)]
pub struct TextLexer<'a> {
    source: &'a str,
    rest: &'a str,
}
impl<'a> TextLexer<'a> {
    pub fn new(buffer: &'a str) -> TextLexer<'a> {
        return TextLexer {
            source: buffer,
            rest: buffer,
        };
    }

    /// 1-based line of the next unread character
    pub fn line(&self) -> usize {
        let consumed = self.source.len() - self.rest.len();
        return self.source[..consumed].matches('\n').count() + 1;
    }

    pub fn print_to_string(self) -> String {
        let mut depth: usize = 0;
        let mut out_buf = String::new();

        for token in self {
            if let TextToken::CloseBracket = token {
                depth = depth.saturating_sub(4);
            }
            out_buf.push_str(&format!("{:depth$}{token}\n", ""));
            if let TextToken::OpenBracket = token {
                depth += 4;
            }
        }

        return out_buf;
    }

    /// Drops leading whitespace and any number of comment lines
    fn skip_trivia(&mut self) {
        loop {
            self.rest = self.rest.trim_start();
            let Some(comment) = self.rest.strip_prefix('#') else {
                return;
            };
            self.rest = match comment.split_once('\n') {
                Some((_, rest)) => rest,
                None => "",
            };
        }
    }
}
impl<'a> Iterator for TextLexer<'a> {
    type Item = TextToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_trivia();
        let (peek, rest) = {
            let mut it = self.rest.chars();
            let peek = it.next()?;
            (peek, it.as_str())
        };
        match peek {
            '=' => {
                self.rest = rest;
                return Some(TextToken::Equal);
            }
            '{' => {
                self.rest = rest;
                return Some(TextToken::OpenBracket);
            }
            '}' => {
                self.rest = rest;
                return Some(TextToken::CloseBracket);
            }
            '"' => {
                let (string, rest) = rest.split_once('"')?; // unclosed string
                self.rest = rest;
                return Some(TextToken::StringQuoted(string));
            }
            _ => {}
        }

        // Otherwise, it is some scalar but we need to figure it out
        let end = self.rest.find(char_ends_token).unwrap_or(self.rest.len());
        let (value, rest) = self.rest.split_at(end);
        self.rest = rest;

        if value == "yes" {
            return Some(TextToken::Bool(true));
        } else if value == "no" {
            return Some(TextToken::Bool(false));
        }

        let mut dot_count: usize = 0;
        let mut digit_count: usize = 0;
        let mut signed: bool = false;
        for (i, b) in value.bytes().enumerate() {
            if b == b'-' && i == 0 {
                signed = true;
            } else if b == b'.' {
                dot_count += 1;
            } else if b.is_ascii_digit() {
                digit_count += 1;
            } else {
                return Some(TextToken::StringUnquoted(value));
            }
        }
        let number = match dot_count {
            _ if digit_count == 0 => None,
            0 if signed => value.parse().ok().map(TextToken::Int),
            0 => value.parse().ok().map(TextToken::UInt),
            1 => value.parse().ok().map(TextToken::Float),
            _ => None,
        };
        return Some(number.unwrap_or(TextToken::StringUnquoted(value)));
    }
}

fn char_ends_token(c: char) -> bool {
    return c == '=' || c == '{' || c == '}' || c == '"' || c == '#' || c.is_whitespace();
}
