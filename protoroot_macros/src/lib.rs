use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, GenericParam, LitStr,
    Result as SynResult,
};

#[derive(Default)]
struct DescribeAttrs {
    rename: Option<String>,
    skip: bool,
}

impl DescribeAttrs {
    fn from_attributes(attrs: &[Attribute]) -> SynResult<Self> {
        let mut out = DescribeAttrs::default();
        for attr in attrs {
            if !attr.path().is_ident("describe") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    out.rename = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `rename = \"...\"` or `skip`"))
                }
            })?;
        }
        Ok(out)
    }
}

/// Derives `protoroot::Describe` for a struct with named fields.
///
/// The struct becomes a record named after the struct (or
/// `#[describe(rename = "...")]`); every field contributes one ordinal in
/// declaration order unless marked `#[describe(skip)]`.
#[proc_macro_derive(Describe, attributes(describe))]
pub fn derive_describe(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(mut input: DeriveInput) -> SynResult<proc_macro2::TokenStream> {
    let struct_attrs = DescribeAttrs::from_attributes(&input.attrs)?;
    if struct_attrs.skip {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "`skip` is only valid on fields",
        ));
    }
    let ident = input.ident.clone();
    let record_name = struct_attrs.rename.unwrap_or_else(|| ident.to_string());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.clone(),
            _ => {
                return Err(syn::Error::new_spanned(
                    &ident,
                    "Describe can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &ident,
                "Describe can only be derived for structs",
            ))
        }
    };

    let mut field_calls = Vec::new();
    for field in &fields {
        let attrs = DescribeAttrs::from_attributes(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let name = attrs.rename.unwrap_or_else(|| {
            let raw = field_ident.to_string();
            raw.strip_prefix("r#").map(str::to_string).unwrap_or(raw)
        });
        let ty = &field.ty;
        field_calls.push(quote! {
            .field(#name, <#ty as ::protoroot::Describe>::describe())
        });
    }

    for param in input.generics.params.iter_mut() {
        if let GenericParam::Type(type_param) = param {
            type_param.bounds.push(parse_quote!(::protoroot::Describe));
        }
    }
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::protoroot::Describe for #ident #ty_generics #where_clause {
            fn describe() -> ::protoroot::TypeDescriptor {
                ::protoroot::TypeDescriptor::Record(
                    ::protoroot::RecordDescriptor::new(#record_name)
                        #(#field_calls)*
                )
            }
        }
    })
}
