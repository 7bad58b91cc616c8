//! Procedural macros for the apikit framework

mod api_model;

use proc_macro::TokenStream;
use syn::punctuated::Punctuated;
use syn::{DeriveInput, Ident, Token, parse_macro_input};

/// Declare an API payload type.
///
/// `#[api_model(request)]` derives `serde::Deserialize`, rejects unknown
/// fields, and implements `RequestModel`; `#[api_model(response)]` derives
/// `serde::Serialize` and implements `ResponseModel`. Both flags may be
/// combined. Every model gets `utoipa::ToSchema` and snake_case wire
/// names.
///
/// ```ignore
/// #[apikit_macros::api_model(request, response)]
/// pub struct Greeting {
///     pub message: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args with Punctuated::<Ident, Token![,]>::parse_terminated);
    let input = parse_macro_input!(item as DeriveInput);
    api_model::expand_api_model(&args, &input).into()
}
