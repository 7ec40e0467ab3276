//! Derive macros for courier. Use `#[derive(Command)]` and `#[derive(Request)]` instead of
//! writing the trait impls by hand.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Type};

/// Implements the `Command` trait. Requires `Command` to be in scope (e.g. `use courier::Command`).
#[proc_macro_derive(Command)]
pub fn derive_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let expanded = quote! {
        impl #impl_generics Command for #name #ty_generics #where_clause {}
    };
    TokenStream::from(expanded)
}

/// Implements the `Request` trait with the response type named by `#[response(Type)]`.
/// Requires `Request` to be in scope (e.g. `use courier::Request`).
#[proc_macro_derive(Request, attributes(response))]
pub fn derive_request(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let response = match response_type(&input) {
        Ok(ty) => ty,
        Err(err) => return err.to_compile_error().into(),
    };
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let expanded = quote! {
        impl #impl_generics Request for #name #ty_generics #where_clause {
            type Response = #response;
        }
    };
    TokenStream::from(expanded)
}

fn response_type(input: &DeriveInput) -> syn::Result<Type> {
    let mut found = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("response")) {
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[response(...)] attribute"));
        }
        found = Some(attr.parse_args::<Type>()?);
    }
    found.ok_or_else(|| {
        syn::Error::new_spanned(
            &input.ident,
            "#[derive(Request)] needs a #[response(Type)] attribute",
        )
    })
}
