//! Declarative descriptors for the numeric fields of a record, shared by its reader and writer.

use crate::{
    TextDeserializer, format::NumberStyle, text_deserialize::TextError, text_writer::TextWriter,
};

pub struct NumField<S> {
    pub key: &'static str,
    pub get: fn(&S) -> f64,
    pub slot: fn(&mut S) -> &mut f64,
    pub style: NumberStyle,
    /// Whether the value is written at all
    pub present: fn(f64) -> bool,
}
impl<S> NumField<S> {
    pub fn write(&self, record: &S, out: &mut TextWriter) {
        let value = (self.get)(record);
        if (self.present)(value) {
            out.number(self.key, value, self.style);
        }
    }
}

pub fn write_all<S>(fields: &[NumField<S>], record: &S, out: &mut TextWriter) {
    for field in fields {
        field.write(record, out);
    }
}

/// Reads the value of `key` into `record` if one of `fields` has that key
pub fn read_into<'de, S>(
    fields: &[NumField<S>],
    record: &mut S,
    key: &str,
    stream: &mut TextDeserializer<'de>,
) -> Result<bool, TextError> {
    let Some(field) = fields.iter().find(|field| field.key == key) else {
        return Ok(false);
    };
    *(field.slot)(record) = stream.parse()?;
    return Ok(true);
}

macro_rules! num_field {
    ($field:ident, $style:expr, $present:expr) => {
        num_field!(stringify!($field), $field, $style, $present)
    };
    ($key:expr, $field:ident, $style:expr, $present:expr) => {
        $crate::scenario::fields::NumField {
            key: $key,
            get: |record| record.$field,
            slot: |record| &mut record.$field,
            style: $style,
            present: $present,
        }
    };
}
pub(crate) use num_field;
