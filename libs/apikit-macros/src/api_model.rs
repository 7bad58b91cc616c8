use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::punctuated::Punctuated;
use syn::{DeriveInput, Ident, Token};

const KNOWN_FLAGS: &[&str] = &["request", "response"];

/// Checks `api_model` flags for unknown or repeated identifiers.
/// Returns Ok(()) if valid, or Err(TokenStream) with a compile error.
pub fn check_flags(args: &Punctuated<Ident, Token![,]>) -> Result<(), TokenStream> {
    let mut seen = HashSet::new();

    for ident in args {
        let flag = ident.to_string();

        if !KNOWN_FLAGS.contains(&flag.as_str()) {
            let err = syn::Error::new_spanned(
                ident,
                format!("unknown flag '{flag}'; expected one of: {}", KNOWN_FLAGS.join(", ")),
            );
            return Err(err.to_compile_error());
        }

        if !seen.insert(flag.clone()) {
            let err = syn::Error::new_spanned(ident, format!("flag '{flag}' given twice"));
            return Err(err.to_compile_error());
        }
    }

    Ok(())
}

pub fn expand_api_model(args: &Punctuated<Ident, Token![,]>, input: &DeriveInput) -> TokenStream {
    if let Err(err) = check_flags(args) {
        return err;
    }

    let is_request = args.iter().any(|id| id == "request");
    let is_response = args.iter().any(|id| id == "response");

    if !is_request && !is_response {
        return quote! {
            compile_error!("api_model requires at least one of 'request' or 'response'");
        };
    }

    let name = &input.ident;

    let de = if is_request {
        quote! { ::serde::Deserialize, }
    } else {
        quote! {}
    };
    // Unknown-field rejection applies to inbound payloads only; response
    // types may grow fields without breaking old clients.
    let strict_attr = if is_request {
        quote! { #[serde(deny_unknown_fields)] }
    } else {
        quote! {}
    };
    let request_impl = if is_request {
        quote! { impl ::apikit::api::model::RequestModel for #name {} }
    } else {
        quote! {}
    };

    let ser = if is_response {
        quote! { ::serde::Serialize, }
    } else {
        quote! {}
    };
    let response_impl = if is_response {
        quote! { impl ::apikit::api::model::ResponseModel for #name {} }
    } else {
        quote! {}
    };

    quote! {
        #[derive(#ser #de utoipa::ToSchema)]
        #[serde(rename_all = "snake_case")]
        #strict_attr
        #input
        #request_impl
        #response_impl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn check_flags_accepts_request() {
        let args: Punctuated<Ident, Token![,]> = parse_quote!(request);
        assert!(check_flags(&args).is_ok());
    }

    #[test]
    fn check_flags_accepts_both() {
        let args: Punctuated<Ident, Token![,]> = parse_quote!(request, response);
        assert!(check_flags(&args).is_ok());
    }

    #[test]
    fn check_flags_rejects_unknown() {
        let args: Punctuated<Ident, Token![,]> = parse_quote!(payload);
        let err = check_flags(&args).unwrap_err().to_string();
        assert!(err.contains("unknown flag 'payload'"));
        assert!(err.contains("expected one of: request, response"));
    }

    #[test]
    fn check_flags_rejects_duplicates() {
        let args: Punctuated<Ident, Token![,]> = parse_quote!(response, response);
        let err = check_flags(&args).unwrap_err().to_string();
        assert!(err.contains("flag 'response' given twice"));
    }

    #[test]
    fn expand_request_only() {
        let args: Punctuated<Ident, Token![,]> = parse_quote!(request);
        let input: DeriveInput = parse_quote! {
            pub struct CreateUser {
                pub name: String,
            }
        };
        let output = expand_api_model(&args, &input).to_string();

        assert!(output.contains("serde :: Deserialize"));
        assert!(!output.contains("serde :: Serialize"));
        assert!(output.contains("deny_unknown_fields"));
        assert!(output.contains("RequestModel"));
        assert!(!output.contains("ResponseModel"));
        assert!(output.contains("utoipa :: ToSchema"));
        assert!(output.contains("rename_all = \"snake_case\""));
    }

    #[test]
    fn expand_response_only() {
        let args: Punctuated<Ident, Token![,]> = parse_quote!(response);
        let input: DeriveInput = parse_quote! {
            pub struct UserView {
                pub name: String,
            }
        };
        let output = expand_api_model(&args, &input).to_string();

        assert!(output.contains("serde :: Serialize"));
        assert!(!output.contains("serde :: Deserialize"));
        assert!(!output.contains("deny_unknown_fields"));
        assert!(output.contains("ResponseModel"));
        assert!(!output.contains("RequestModel"));
    }

    #[test]
    fn expand_both_flags() {
        let args: Punctuated<Ident, Token![,]> = parse_quote!(request, response);
        let input: DeriveInput = parse_quote! {
            pub struct Echo {
                pub body: String,
            }
        };
        let output = expand_api_model(&args, &input).to_string();

        assert!(output.contains("serde :: Serialize"));
        assert!(output.contains("serde :: Deserialize"));
        assert!(output.contains("RequestModel"));
        assert!(output.contains("ResponseModel"));
    }

    #[test]
    fn expand_without_flags_is_an_error() {
        let args: Punctuated<Ident, Token![,]> = parse_quote!();
        let input: DeriveInput = parse_quote! {
            pub struct Nothing {}
        };
        let output = expand_api_model(&args, &input).to_string();

        assert!(output.contains("compile_error"));
        assert!(output.contains("requires at least one of 'request' or 'response'"));
    }
}
