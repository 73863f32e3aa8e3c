use serde::{Deserialize, Serialize};

use crate::{
    TextDeserialize, TextDeserializer, err_context::Context, text_deserialize::TextError, text_err,
    text_lexer::TextToken,
};

/// Extracts no data, just exists to implement [`TextDeserialize`] and skip the next value
#[derive(Debug, Serialize, Deserialize)]
pub struct SkipValue;
impl SkipValue {
    /// Starting after the opening `{`, skips the rest of the current object.
    fn finish_object<'de>(
        mut stream: TextDeserializer<'de>,
    ) -> Result<TextDeserializer<'de>, TextError> {
        loop {
            let peek = stream.peek_token().ok_or(TextError::EOF)?;
            match peek {
                TextToken::CloseBracket => {
                    stream.eat_token();
                    return Ok(stream);
                }
                TextToken::Equal => return Err(TextError::UnexpectedToken),
                _ => {
                    stream = SkipValue::take_text(stream)
                        .context("While skipping value or KV key")?
                        .1;
                    if let Some(TextToken::Equal) = stream.peek_token() {
                        stream.eat_token();
                        stream = SkipValue::take_text(stream)
                            .context("While skipping KV value")?
                            .1;
                    }
                }
            }
        }
    }
}
impl<'de> TextDeserialize<'de> for SkipValue {
    fn take_text(
        mut stream: TextDeserializer<'de>,
    ) -> Result<(Self, TextDeserializer<'de>), TextError> {
        match stream.expect_token()? {
            TextToken::OpenBracket => {
                stream = SkipValue::finish_object(stream)?;
            }
            TextToken::CloseBracket | TextToken::Equal => {
                return Err(TextError::UnexpectedToken);
            }
            _ => {}
        }
        return Ok((SkipValue, stream));
    }
}

/// Skips the value of a key that `record` does not know about.
pub fn skip_unknown<'de>(
    record: &str,
    key: &str,
    stream: TextDeserializer<'de>,
) -> Result<TextDeserializer<'de>, TextError> {
    log::debug!(
        "Skipping unknown key `{key}` of {record} on line {}",
        stream.line()
    );
    let (_, stream) = SkipValue::take_text(stream)
        .with_context(|| format!("While skipping `{key}` of {record}"))?;
    return Ok(stream);
}

/// Walks the `key = value` entries of an object, handing each value to `handle`.
///
/// When `bracketed` the object must open with `{` and the walk ends on its `}`,
/// otherwise it runs to the end of input.
/// `handle` returns `false` for keys it does not know, which are then skipped.
/// Entries whose key is not a string (or that have no `=`) are skipped silently.
pub fn take_entries<'de, F>(
    stream: &mut TextDeserializer<'de>,
    record: &str,
    bracketed: bool,
    mut handle: F,
) -> Result<(), TextError>
where
    F: FnMut(&'de str, &mut TextDeserializer<'de>) -> Result<bool, TextError>,
{
    if bracketed {
        stream.parse_token(TextToken::OpenBracket)?;
    }
    loop {
        let token = match stream.peek_token() {
            None if bracketed => return Err(TextError::EOF),
            None => return Ok(()),
            Some(TextToken::CloseBracket) if bracketed => {
                stream.eat_token();
                return Ok(());
            }
            Some(TextToken::Equal) | Some(TextToken::CloseBracket) => {
                return Err(text_err!(
                    "Unexpected `{}` in {record} on line {}",
                    stream.expect_peek_token()?,
                    stream.line()
                ));
            }
            Some(token) => token,
        };

        let Some(key) = token.as_key() else {
            stream.parse::<SkipValue>()?;
            if let Some(TextToken::Equal) = stream.peek_token() {
                stream.eat_token();
                stream.parse::<SkipValue>()?;
            }
            continue;
        };
        stream.eat_token();
        if stream.peek_token() != Some(TextToken::Equal) {
            continue;
        }
        stream.eat_token();

        let handled = handle(key, stream)
            .with_context(|| format!("While reading `{key}` of {record}"))?;
        if !handled {
            *stream = skip_unknown(record, key, stream.clone())?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_value() {
        let mut stream =
            TextDeserializer::from_str("{ a = { b = 1 c = { 1 2 3 } } d = \"x\" } after");
        stream.parse::<SkipValue>().unwrap();
        assert_eq!(stream.parse::<&str>().unwrap(), "after");
    }

    #[test]
    fn test_take_entries() {
        let mut stream = TextDeserializer::from_str("{ id = 4 unknown = { 1 2 } 7 = 8 name = \"A\" } rest");
        let mut id = None;
        let mut name = None;
        take_entries(&mut stream, "test", true, |key, stream| {
            match key {
                "id" => id = Some(stream.parse::<u32>()?),
                "name" => name = Some(stream.parse::<String>()?),
                _ => return Ok(false),
            }
            return Ok(true);
        })
        .unwrap();
        assert_eq!(id, Some(4));
        assert_eq!(name.as_deref(), Some("A"));
        assert_eq!(stream.parse::<&str>().unwrap(), "rest");
    }

    #[test]
    fn test_take_entries_unbracketed() {
        let mut stream = TextDeserializer::from_str("a = 1\r\nb = 2\r\n");
        let mut sum = 0;
        take_entries(&mut stream, "test", false, |_, stream| {
            sum += stream.parse::<i32>()?;
            return Ok(true);
        })
        .unwrap();
        assert_eq!(sum, 3);
    }

    #[test]
    fn test_take_entries_unclosed() {
        let mut stream = TextDeserializer::from_str("{ a = 1");
        let result = take_entries(&mut stream, "test", true, |_, stream| {
            stream.parse::<i32>()?;
            return Ok(true);
        });
        assert!(matches!(result, Err(TextError::EOF)));
    }
}
