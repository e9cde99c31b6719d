//! Derive macros for rxstore
//!
//! This crate provides procedural macros to reduce boilerplate when
//! declaring the command and event enums of a store.
//!
//! # Available Macros
//!
//! - `#[derive(Kind)]` - Implements `rxstore_core::Kind` for an enum
//!
//! # Example
//!
//! ```ignore
//! use rxstore_macros::Kind;
//!
//! #[derive(Kind, Clone, Debug)]
//! enum CounterEvent {
//!     Incremented,
//!     Decremented,
//!     #[kind("was-reset")]
//!     Reset,
//! }
//!
//! // Generated:
//! assert_eq!(CounterEvent::Incremented.kind(), "incremented");
//! assert_eq!(CounterEvent::Reset.kind(), "was-reset");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive macro for command and event enums
///
/// Implements `rxstore_core::Kind`, whose `kind()` returns a stable tag
/// per variant. The tag is the kebab-case variant name unless overridden.
///
/// # Attributes
///
/// - `#[kind("tag")]` - Use `tag` instead of the kebab-case variant name
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A `#[kind(...)]` attribute does not hold a single string literal
///
/// # Example
///
/// ```ignore
/// #[derive(Kind)]
/// enum TodoItemCommand {
///     UpdateEditingText(String),
///     StartEdition,
/// }
///
/// assert_eq!(TodoItemCommand::StartEdition.kind(), "start-edition");
/// ```
#[proc_macro_derive(Kind, attributes(kind))]
pub fn derive_kind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Kind)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut arms = Vec::with_capacity(data_enum.variants.len());
    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let tag = match kind_override(&variant.attrs) {
            Ok(Some(tag)) => tag,
            Ok(None) => kebab_case(&variant_name.to_string()),
            Err(error) => return error.to_compile_error().into(),
        };

        let pattern = match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) },
            Fields::Unit => quote! { Self::#variant_name },
        };
        arms.push(quote! { #pattern => #tag, });
    }

    // An uninhabited enum still needs a body that type-checks.
    let body = if arms.is_empty() {
        quote! { match *self {} }
    } else {
        quote! { match self { #(#arms)* } }
    };

    let expanded = quote! {
        impl #impl_generics ::rxstore_core::Kind for #name #ty_generics #where_clause {
            fn kind(&self) -> &'static str {
                #body
            }
        }
    };

    TokenStream::from(expanded)
}

/// Reads `#[kind("...")]` if present
fn kind_override(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs {
        if attr.path().is_ident("kind") {
            let lit: LitStr = attr.parse_args()?;
            return Ok(Some(lit.value()));
        }
    }
    Ok(None)
}

/// `EditingTextUpdated` -> `editing-text-updated`
fn kebab_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
        } else if ch == '_' {
            out.push('-');
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::kebab_case;

    #[test]
    fn kebab_case_splits_on_capitals() {
        assert_eq!(kebab_case("Increment"), "increment");
        assert_eq!(kebab_case("EditingTextUpdated"), "editing-text-updated");
        assert_eq!(kebab_case("SetFilter"), "set-filter");
    }
}
