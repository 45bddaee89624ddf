use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse2, *};

/// Derives `fluent_assertions::Inspect`, the member metadata the equivalency engine walks.
///
/// Structs become objects with one member per field, field-less enums become enum values carrying
/// their discriminant. Fields accept `#[inspect(skip)]` and `#[inspect(rename = "Name")]`.
#[proc_macro_derive(Inspect, attributes(inspect))]
pub fn inspect(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input: TokenStream = input.into();

    impl_inspect(input).into()
}

#[derive(Default)]
struct FieldOptions {
    skip: bool,
    rename: Option<String>,
}

fn field_options(field: &Field) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in field.attrs.iter().filter(|a| a.path().is_ident("inspect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                options.rename = Some(name.value());
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename = \"...\"`"))
            }
        })?;
    }

    Ok(options)
}

fn member_name(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map(str::to_owned).unwrap_or(name)
}

fn impl_inspect(input: TokenStream) -> TokenStream {
    let item: DeriveInput = match parse2(input) {
        Ok(item) => item,
        Err(err) => {
            return err.to_compile_error();
        },
    };

    let result = match &item.data {
        Data::Struct(data) => impl_struct(&item, data),
        Data::Enum(data) => impl_enum(&item, data),
        Data::Union(_) => Err(Error::new_spanned(&item.ident, "Inspect cannot be derived for unions")),
    };

    result.unwrap_or_else(|err| err.to_compile_error())
}

fn impl_struct(item: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let class_name = &item.ident;

    let mut generics = item.generics.clone();
    let type_params = generics.type_params().map(|p| p.ident.clone()).collect::<Vec<_>>();
    let where_clause = generics.make_where_clause();
    for param in type_params {
        where_clause.predicates.push(parse_quote!(#param: fluent_assertions::Inspect));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut members = Vec::new();
    for (index, field) in data.fields.iter().enumerate() {
        let options = field_options(field)?;
        if options.skip {
            continue;
        }

        let (access, default_name) = match &field.ident {
            Some(ident) => (quote! { #ident }, member_name(ident)),
            None => {
                let index = Index::from(index);
                (quote! { #index }, index.index.to_string())
            },
        };
        let name = options.rename.unwrap_or(default_name);
        let field_type = &field.ty;
        let visibility = match field.vis {
            Visibility::Public(_) => quote! { fluent_assertions::Visibility::Public },
            _ => quote! { fluent_assertions::Visibility::Internal },
        };

        members.push(quote! {
            object.set_member(
                fluent_assertions::Member::new(#name, fluent_assertions::Inspect::to_value(&self.#access))
                    .with_visibility(#visibility)
                    .with_declared_type(fluent_assertions::short_type_name(std::any::type_name::<#field_type>())),
            );
        });
    }

    Ok(quote! {
        impl #impl_generics fluent_assertions::Inspect for #class_name #ty_generics #where_clause {
            fn to_value(&self) -> fluent_assertions::Value {
                let object = fluent_assertions::Object::new(stringify!(#class_name));
                #(#members)*
                fluent_assertions::Value::Object(object)
            }
        }
    })
}

fn impl_enum(item: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let class_name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();

    if let Some(variant) = data.variants.iter().find(|v| !matches!(v.fields, Fields::Unit)) {
        return Err(Error::new_spanned(
            &variant.ident,
            "Inspect can only be derived for enums whose variants carry no fields",
        ));
    }

    let arms = data.variants.iter().map(|v| {
        let variant_name = &v.ident;
        let display_name = member_name(variant_name);
        quote! {
            #class_name::#variant_name => (#display_name, #class_name::#variant_name as i128),
        }
    });

    Ok(quote! {
        impl #impl_generics fluent_assertions::Inspect for #class_name #ty_generics #where_clause {
            #[allow(unreachable_code)]
            fn to_value(&self) -> fluent_assertions::Value {
                let (name, value): (&str, i128) = match *self {
                    #(#arms)*
                };
                fluent_assertions::Value::Enum(fluent_assertions::EnumValue::new(stringify!(#class_name), name, value))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_identifier_is_member_name() {
        let ident: Ident = parse_quote!(name);
        assert_eq!(member_name(&ident), "name");
    }

    #[test]
    fn raw_identifier_drops_prefix() {
        let ident: Ident = parse_quote!(r#type);
        assert_eq!(member_name(&ident), "type");
    }

    #[test]
    fn union_is_rejected() {
        let output = impl_inspect(quote! {
            union Bits { a: u32, b: f32 }
        });
        assert!(output.to_string().contains("compile_error"));
    }

    #[test]
    fn enum_with_fields_is_rejected() {
        let output = impl_inspect(quote! {
            enum Shape { Circle(f64), Square }
        });
        assert!(output.to_string().contains("carry no fields"));
    }

    #[test]
    fn skipped_field_is_not_generated() {
        let output = impl_inspect(quote! {
            struct Customer { pub name: String, #[inspect(skip)] cache: Vec<u8> }
        })
        .to_string();
        assert!(output.contains("\"name\""));
        assert!(!output.contains("cache"));
    }

    #[test]
    fn renamed_field_uses_new_name() {
        let output = impl_inspect(quote! {
            struct Customer { #[inspect(rename = "Name")] name: String }
        })
        .to_string();
        assert!(output.contains("\"Name\""));
        assert!(output.contains("Visibility :: Internal"));
    }
}
