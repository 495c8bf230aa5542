#![allow(clippy::needless_return)]

//! Test helpers for the grammar productions.
//!
//! `assert_parse_node!("a { }", selector)` expands to
//! `assert_node("a { }", |parser: &mut Parser| parser.parse_selector())` and
//! `assert_parse_error!("a {", selector, Expected)` to
//! `assert_error("a {", |parser: &mut Parser| parser.parse_selector(), ParseErrorKind::Expected)`.
//! Arguments for the production go in parentheses after its name.

use proc_macro2::{Ident, TokenStream};
use proc_macro_error::{abort, proc_macro_error};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{parenthesized, LitStr, Token};

struct Production {
    text: LitStr,
    fun: Ident,
    args: TokenStream,
}

impl Parse for Production {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let text: LitStr = input.parse()?;
        input.parse::<Token![,]>()?;
        let id: Ident = input.parse()?;
        let args = if input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in input);
            content.parse::<TokenStream>()?
        } else {
            TokenStream::new()
        };
        let fun = Ident::new(&format!("parse_{}", id), id.span());
        return Ok(Production { text, fun, args });
    }
}

struct ProductionWithError {
    production: Production,
    error_kind: Ident,
}

impl Parse for ProductionWithError {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let production = input.parse()?;
        input.parse::<Token![,]>()?;
        let error_kind = input.parse()?;
        return Ok(ProductionWithError { production, error_kind });
    }
}

fn parse_input<T: Parse>(input: proc_macro::TokenStream, usage: &str) -> T {
    let input = proc_macro2::TokenStream::from(input);
    match syn::parse2::<T>(input) {
        Ok(parsed) => parsed,
        Err(e) => abort!(e.span(), "{}; usage: {}", e, usage),
    }
}

#[proc_macro_error]
#[proc_macro]
pub fn assert_parse_node(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let Production { text, fun, args } = parse_input(input, r#"assert_parse_node!("text", production[(args)])"#);
    return quote!(assert_node(#text, |parser: &mut Parser| parser.#fun(#args))).into();
}

#[proc_macro_error]
#[proc_macro]
pub fn assert_parse_error(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ProductionWithError {
        production: Production { text, fun, args },
        error_kind,
    } = parse_input(input, r#"assert_parse_error!("text", production[(args)], Kind)"#);
    return quote!(assert_error(
        #text,
        |parser: &mut Parser| parser.#fun(#args),
        ParseErrorKind::#error_kind
    ))
    .into();
}
