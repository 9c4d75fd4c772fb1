//! Attribute macro behind `#[graft_testhelpers::test]`.

use proc_macro2::{Delimiter, Group, TokenStream, TokenTree};
use quote::quote;

/// Marks a test and installs the tracing subscriber before its body runs.
///
/// ```ignore
/// #[graft_testhelpers::test]
/// fn decodes_a_student() -> Result<(), IPanic> {
///     // tracing output is captured from here on
///     Ok(())
/// }
/// ```
///
/// Another test attribute can be named in place of `#[test]`, as in
/// `#[graft_testhelpers::test(tokio::test)]`.
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let attr = TokenStream::from(attr);
    let mut signature: Vec<TokenTree> = TokenStream::from(item).into_iter().collect();

    // The body is the trailing brace group; everything before it is kept as-is
    let body = match signature.pop() {
        Some(TokenTree::Group(body)) if body.delimiter() == Delimiter::Brace => body,
        _ => {
            return quote! {
                ::core::compile_error!("#[graft_testhelpers::test] expects a function with a body");
            }
            .into();
        }
    };

    let statements = body.stream();
    let mut wrapped = Group::new(
        Delimiter::Brace,
        quote! {
            ::graft_testhelpers::setup();
            #statements
        },
    );
    wrapped.set_span(body.span());

    let test_attr = if attr.is_empty() {
        quote! { #[::core::prelude::rust_2024::test] }
    } else {
        quote! { #[#attr] }
    };
    let signature: TokenStream = signature.into_iter().collect();

    quote! {
        #test_attr
        #signature #wrapped
    }
    .into()
}
