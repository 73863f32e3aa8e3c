use crate::common::*;
use proc_macro;
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{FieldsNamed, Ident, PathArguments, Type};

struct DeserNamedField {
    ident: Ident,
    /// The key as written in the file
    key: String,
    ty: Type,
    quantifier: Quantifier,
    default: Option<syn::Expr>,
}
impl DeserNamedField {
    /// Local holding the value while the record is read, kept apart from the generated locals
    fn capture(&self) -> Ident {
        return format_ident!("__field_{}", self.ident.to_string().trim_start_matches("r#"));
    }

    fn get_quantifier<'a>(
        ty: &'a syn::Type,
        is_multiple: bool,
    ) -> Result<(&'a syn::Type, Quantifier), syn::Error> {
        let Type::Path(path) = ty else {
            return Ok((ty, Quantifier::Single));
        };

        let Some(last) = path.path.segments.last() else {
            return Ok((ty, Quantifier::Single));
        };
        let quantifier = match last.ident.to_string().as_str() {
            "Vec" if is_multiple => Quantifier::Multiple,
            _ if is_multiple => {
                return Err(syn::Error::new_spanned(
                    ty,
                    "The multiple attribute can only be applied to a Vec type",
                ))
            }
            "Option" => Quantifier::Optional,
            _ => return Ok((ty, Quantifier::Single)),
        };
        let PathArguments::AngleBracketed(args) = &last.arguments else {
            return Ok((ty, Quantifier::Single));
        };

        if args.args.len() != 1 {
            return Ok((ty, Quantifier::Single));
        };
        let Some(syn::GenericArgument::Type(inner_ty)) = args.args.first() else {
            return Ok((ty, Quantifier::Single));
        };
        return Ok((inner_ty, quantifier));
    }

    pub fn new(field: syn::Field) -> Result<Self, syn::Error> {
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(
                field.ident,
                "Missing field identifier",
            ));
        };

        let mut is_multiple = false;
        let mut is_skipped = false;
        let mut default = None;
        let mut key = None;
        for attr in &field.attrs {
            let Some(attr_ident) = attr.path().get_ident() else {
                continue; // not our attribute
            };
            match attr_ident.to_string().as_str() {
                "multiple" => is_multiple = true,
                "skip" => is_skipped = true,
                "default" => {
                    default = Some(attr.parse_args::<syn::Expr>()?);
                }
                "key" => {
                    key = Some(attr.parse_args::<syn::LitStr>()?.value());
                }
                _ => continue, // not our attribute
            }
        }
        let key = key.unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());

        if is_skipped {
            return Ok(DeserNamedField {
                ident: ident.clone(),
                key,
                ty: field.ty.clone(),
                quantifier: Quantifier::Skipped,
                default: None,
            });
        }

        let (ty, quantifier) = Self::get_quantifier(&field.ty, is_multiple)?;
        if default.is_some() && !matches!(quantifier, Quantifier::Single) {
            return Err(syn::Error::new_spanned(
                field,
                "The `default` attribute is applied, but the type was not found to be a single field.",
            ));
        }
        return Ok(DeserNamedField {
            ident: ident.clone(),
            key,
            ty: ty.clone(),
            quantifier,
            default,
        });
    }
}

fn derive_text_deserialize_struct_named(
    ident: Ident,
    generics: syn::Generics,
    fields: FieldsNamed,
    no_brackets: bool,
    or_default: bool,
) -> Result<proc_macro::TokenStream, syn::Error> {
    let core = core_crate_ref();
    let record_name = ident.to_string();

    let fields = fields
        .named
        .into_iter()
        .map(DeserNamedField::new)
        .collect::<Result<Vec<_>, syn::Error>>()?;

    let define_field_captures = fields.iter().map(|field| {
        let DeserNamedField { ty, quantifier, .. } = field;
        let ident = field.capture();
        return match quantifier {
            Quantifier::Multiple => quote! {
                let mut #ident: ::std::vec::Vec<#ty> = ::std::vec::Vec::new();
            },
            Quantifier::Skipped => TokenStream::new(),
            _ => quote! {
                let mut #ident: ::std::option::Option<#ty> = ::std::option::Option::None;
            },
        };
    });

    let match_cases = fields
        .iter()
        .filter(|field| !matches!(field.quantifier, Quantifier::Skipped))
        .map(|field| {
            let DeserNamedField {
                key,
                ty,
                quantifier,
                ..
            } = field;
            let capture = field.capture();
            let add_value = if let Quantifier::Multiple = *quantifier {
                quote! { #capture.push(__value); }
            } else {
                quote! { #capture = ::std::option::Option::Some(__value); }
            };

            let context = format!("While reading `{key}` of {record_name}");
            return quote! {
                #key => {
                    let (__value, __rest) = <#ty>::take_text(stream)
                        .map_err(|err| err.context(#context))?;
                    stream = __rest;
                    #add_value
                }
            };
        });

    let normalize_fields = fields.iter().map(|field| {
        let DeserNamedField {
            ident,
            key,
            quantifier,
            default,
            ..
        } = field;
        let capture = field.capture();

        return match (quantifier, default) {
            (Quantifier::Single, Some(default)) => quote! {
                let #ident = #capture.unwrap_or_else(|| #default);
            },
            (Quantifier::Single, None) if or_default => quote! {
                let #ident = match #capture {
                    Some(value) => value,
                    None => __defaults.#ident,
                };
            },
            (Quantifier::Single, None) => quote! {
                let #ident = #capture.ok_or_else(|| TextError::MissingExpectedField(#key.to_string()))?;
            },
            (Quantifier::Skipped, _) => quote! {
                let #ident = ::std::default::Default::default();
            },
            _ => quote! {
                let #ident = #capture;
            },
        };
    });

    let return_fields = fields.iter().map(|field| field.ident.clone());

    let define_defaults = match or_default {
        true => quote! {
            let __defaults = <Self as ::std::default::Default>::default();
        },
        false => TokenStream::new(),
    };

    let (handle_open_bracket, handle_eof, handle_close_bracket) = match no_brackets {
        true => (
            TokenStream::new(),
            quote! { break; },
            quote! { return Err(TextError::UnexpectedToken); },
        ),
        false => (
            quote! { stream.parse_token(TextToken::OpenBracket)?; },
            quote! {
                return Err(TextError::EOF);
            },
            quote! {
                stream.eat_token();
                break;
            },
        ),
    };

    let has_lifetime_de = generics.params.iter().any(|generic| match generic {
        syn::GenericParam::Lifetime(lifetime) => lifetime.lifetime.ident == "de",
        _ => false,
    });
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut _generics_add_de: syn::Generics;
    let impl_generics = if has_lifetime_de {
        impl_generics
    } else {
        _generics_add_de = generics.clone();
        _generics_add_de.params.push(syn::parse_quote! { 'de });
        _generics_add_de.split_for_impl().0
    };

    let impl_block = quote! {
        impl #impl_generics #core::text_deserialize::TextDeserialize<'de> for #ident #ty_generics #where_clause {
            fn take_text(
                mut stream: #core::text_deserialize::TextDeserializer<'de>
            ) -> ::std::result::Result<
                (Self, #core::text_deserialize::TextDeserializer<'de>),
                #core::text_deserialize::TextError
            > {
                #[allow(unused_imports)]
                use #core::{
                    text_deserialize::{
                        TextDeserializer,
                        TextDeserialize,
                        TextError,
                    },
                    common_deserialize::{skip_unknown, SkipValue},
                    text_lexer::TextToken,
                };
                #[allow(unused_imports)]
                use ::std::result::Result::{self, Err, Ok};
                #[allow(unused_imports)]
                use ::std::option::Option::{self, Some, None};

                #handle_open_bracket

                #(#define_field_captures)*

                loop {
                    match stream.peek_token() {
                        None => {
                            #handle_eof
                        }
                        Some(TextToken::Equal) => return Err(TextError::UnexpectedToken),
                        Some(TextToken::CloseBracket) => {
                            #handle_close_bracket
                        }
                        Some(token) => {
                            let Some(__key) = token.as_key() else {
                                stream = SkipValue::take_text(stream)?.1;
                                if let Some(TextToken::Equal) = stream.peek_token() {
                                    stream.eat_token();
                                    stream = SkipValue::take_text(stream)?.1;
                                }
                                continue;
                            };
                            stream.eat_token();
                            let Some(TextToken::Equal) = stream.peek_token() else {
                                continue;
                            };
                            stream.eat_token();
                            match __key {
                                #(#match_cases)*
                                _ => {
                                    stream = skip_unknown(#record_name, __key, stream)?;
                                }
                            }
                        }
                    }
                }

                #define_defaults
                #(#normalize_fields)*
                return Ok((
                    #ident {
                        #(#return_fields,)*
                    },
                    stream,
                ));
            }
        }
    };
    return Ok(impl_block.into());
}

pub fn derive_text_deserialize(stream: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let syn::DeriveInput {
        attrs,
        ident,
        generics,
        data,
        ..
    } = syn::parse_macro_input!(stream);

    let mut no_brackets = false;
    let mut or_default = false;
    for attr in attrs {
        let Some(ident) = attr.path().get_ident().map(|ident| ident.to_string()) else {
            continue; // ignore other attributes, might not be ours
        };
        match ident.as_str() {
            "no_brackets" => {
                no_brackets = true;
            }
            "or_default" => {
                or_default = true;
            }
            _ => continue, // ignore other attributes, might not be ours
        }
    }

    let impl_block = match data {
        syn::Data::Struct(data_struct) => match data_struct.fields {
            syn::Fields::Named(fields_named) => {
                derive_text_deserialize_struct_named(
                    ident,
                    generics,
                    fields_named,
                    no_brackets,
                    or_default,
                )
            }
            syn::Fields::Unnamed(fields_unnamed) => {
                return syn::Error::new_spanned(
                    fields_unnamed,
                    "Tuple structs are not currently supported",
                )
                .into_compile_error()
                .into();
            }
            syn::Fields::Unit => {
                return syn::Error::new(
                    Span::call_site(),
                    "Unit structs are not currently supported",
                )
                .into_compile_error()
                .into();
            }
        },
        syn::Data::Enum(_) => {
            return syn::Error::new(
                Span::call_site(),
                "Enums are read through their string tables, not derived",
            )
            .into_compile_error()
            .into();
        }
        syn::Data::Union(_) => {
            return syn::Error::new(Span::call_site(), "Unions are not currently supported")
                .into_compile_error()
                .into();
        }
    };

    return match impl_block {
        Ok(impl_block) => proc_macro::TokenStream::from(impl_block),
        Err(err) => err.into_compile_error().into(),
    };
}
