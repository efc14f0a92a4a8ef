use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr};

pub fn derive_typed_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let entity = match extract_entity_name(&input) {
        Ok(entity) => entity,
        Err(err) => return err.to_compile_error().into(),
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::entity_store::TypedEntity for #name #ty_generics #where_clause {
            const ENTITY: &'static str = #entity;
        }
    };

    TokenStream::from(expanded)
}

/// Reads `#[entity(name = "...")]`, falling back to the struct name.
fn extract_entity_name(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        let mut entity = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                entity = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute, expected `name = \"...\"`"))
            }
        })?;

        if let Some(entity) = entity {
            if entity.trim().is_empty() {
                return Err(syn::Error::new_spanned(attr, "entity name must not be empty"));
            }
            return Ok(entity);
        }
    }

    Ok(input.ident.to_string())
}
