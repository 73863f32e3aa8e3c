mod common;
mod text_deserialize;

/// Derives `hoi2_parser_core::text_deserialize::TextDeserialize` for a struct with named fields.
///
/// Each field is read from the `key = value` entry whose key is the field name,
/// or the name given by `#[key("...")]`. Entries may come in any order.
///
/// - `Option<T>` fields are optional.
/// - `Vec<T>` fields marked `#[multiple]` collect every entry with their key.
/// - Other fields are required unless given a `#[default(expr)]`,
///   or the struct is marked `#[or_default]`, in which case they come from its [`Default`] impl.
/// - `#[skip]` fields are not read and start as [`Default::default`].
/// - `#[no_brackets]` on the struct reads an unbracketed body (a whole file).
///
/// Unknown keys are skipped and logged.
#[proc_macro_derive(TextDeserialize, attributes(multiple, default, key, skip, no_brackets, or_default))]
pub fn derive_text_deserialize(stream: proc_macro::TokenStream) -> proc_macro::TokenStream {
    text_deserialize::derive_text_deserialize(stream)
}
