use quote::quote;

/// The column name that leaves a field out of the catalog.
const EXCLUDE: &str = "-";

/// Derive macro available if dbx is built with `features = ["derive"]`.
#[proc_macro_derive(Record, attributes(dbx))]
pub fn derive_record(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);

    impl_record(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn impl_record(ast: &syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &ast.ident;
    let fields = match &ast.data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(syn::FieldsNamed { named, .. }),
            ..
        }) => named,
        syn::Data::Struct(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "Record can only be derived for structs with named fields",
            ))
        }
        syn::Data::Enum(_) => {
            return Err(syn::Error::new_spanned(name, "Cannot derive Record on enum!"))
        }
        syn::Data::Union(_) => {
            return Err(syn::Error::new_spanned(name, "Cannot derive Record on union!"))
        }
    };

    let fields = FieldInfo::from_fields(fields)?;
    let count = fields.len();

    let mut wheres = vec![];
    let mut field_puts = vec![];
    let mut value_puts = vec![];
    for field in &fields {
        let FieldInfo { ident, ty, column } = field;

        wheres.push(quote! {
            #ty: ::dbx::client::FromColumn<C> + ::dbx::client::ToParam<C>
        });
        field_puts.push(quote! {
            catalog.insert(#column, &mut self.#ident as &mut dyn ::dbx::client::FromColumn<C>);
        });
        value_puts.push(quote! {
            catalog.insert(#column, <#ty as ::dbx::client::ToParam<C>>::to_param(&self.#ident));
        });
    }

    let generics = insert_c(&ast.generics);
    let (impl_generics, _, _) = generics.split_for_impl();
    let (_, ty_generics, where_clause) = ast.generics.split_for_impl();
    let existing: Vec<_> = where_clause
        .map(|clause| clause.predicates.iter().collect())
        .unwrap_or_default();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::dbx::Record<C> for #name #ty_generics
        where
            C: ::dbx::client::Client,
            #(#existing,)*
            #(#wheres,)*
        {
            fn fields(
                &mut self,
            ) -> ::dbx::record::FieldCatalog<&mut dyn ::dbx::client::FromColumn<C>> {
                #[allow(unused_mut)]
                let mut catalog = ::dbx::record::FieldCatalog::with_capacity(#count);
                #(#field_puts)*
                catalog
            }

            fn values(
                &self,
            ) -> ::dbx::record::FieldCatalog<<C as ::dbx::client::Client>::Param<'_>> {
                #[allow(unused_mut)]
                let mut catalog = ::dbx::record::FieldCatalog::with_capacity(#count);
                #(#value_puts)*
                catalog
            }
        }
    })
}

fn insert_c(generics: &syn::Generics) -> syn::Generics {
    let param = syn::TypeParam {
        attrs: vec![],
        ident: syn::Ident::new("C", proc_macro2::Span::call_site()),
        colon_token: None,
        bounds: syn::punctuated::Punctuated::new(),
        eq_token: None,
        default: None,
    };

    let mut generics = generics.clone();
    generics.params.push(syn::GenericParam::Type(param));
    generics
}

/// A field that takes part in the catalog.
struct FieldInfo {
    ident: syn::Ident,
    ty: syn::Type,
    column: String,
}

impl FieldInfo {
    /// Collects the persisted fields, in declaration order.
    fn from_fields(
        fields: &syn::punctuated::Punctuated<syn::Field, syn::Token![,]>,
    ) -> syn::Result<Vec<FieldInfo>> {
        let mut infos = vec![];

        for field in fields {
            let mut skip = false;
            let mut column = None;

            for attr in &field.attrs {
                if !attr.path().is_ident("dbx") {
                    continue;
                }

                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip") {
                        skip = true;
                        return Ok(());
                    }

                    if meta.path.is_ident("column") {
                        let value = meta.value()?;
                        let lit: syn::LitStr = value.parse()?;
                        column = Some(lit.value());
                        return Ok(());
                    }

                    Err(meta.error("unrecognized attr"))
                })?;
            }

            let Some(ident) = field.ident.clone() else {
                continue;
            };

            let column = match column {
                Some(column) if column == EXCLUDE => continue,
                Some(column) if !column.is_empty() => column,
                _ => default_column(&ident),
            };

            if skip {
                continue;
            }

            infos.push(FieldInfo {
                ident,
                ty: field.ty.clone(),
                column,
            });
        }

        Ok(infos)
    }
}

/// The field's identifier, lower-cased, without any `r#` prefix.
fn default_column(ident: &syn::Ident) -> String {
    use syn::ext::IdentExt;
    ident.unraw().to_string().to_lowercase()
}

#[cfg(test)]
mod test {
    use super::*;

    fn columns(input: syn::DeriveInput) -> Vec<String> {
        let named = match input.data {
            syn::Data::Struct(syn::DataStruct {
                fields: syn::Fields::Named(syn::FieldsNamed { named, .. }),
                ..
            }) => named,
            _ => panic!("expected named struct"),
        };
        FieldInfo::from_fields(&named)
            .unwrap()
            .into_iter()
            .map(|field| field.column)
            .collect()
    }

    #[test]
    fn default_names_are_lower_cased() {
        let input: syn::DeriveInput = syn::parse_quote! {
            struct Holding {
                Ts: String,
                loc: String,
                r#type: String,
            }
        };
        assert_eq!(vec!["ts", "loc", "type"], columns(input));
    }

    #[test]
    fn override_and_exclusion() {
        let input: syn::DeriveInput = syn::parse_quote! {
            struct Holding {
                #[dbx(column = "location")]
                loc: String,
                #[dbx(column = "-")]
                amount: f64,
                #[dbx(skip)]
                cached: String,
                #[dbx(column = "")]
                notes: Option<String>,
            }
        };
        assert_eq!(vec!["location", "notes"], columns(input));
    }

    #[test]
    fn duplicates_are_kept_for_the_catalog_to_resolve() {
        let input: syn::DeriveInput = syn::parse_quote! {
            struct Holding {
                notes: String,
                #[dbx(column = "notes")]
                memo: String,
            }
        };
        assert_eq!(vec!["notes", "notes"], columns(input));
    }

    #[test]
    fn rejects_tuple_structs_and_enums() {
        let tuple: syn::DeriveInput = syn::parse_quote! {
            struct Pair(i32, String);
        };
        assert!(impl_record(&tuple).is_err());

        let unit: syn::DeriveInput = syn::parse_quote! {
            struct Nothing;
        };
        assert!(impl_record(&unit).is_err());

        let enumeration: syn::DeriveInput = syn::parse_quote! {
            enum Status { Open, Closed }
        };
        assert!(impl_record(&enumeration).is_err());
    }

    #[test]
    fn unknown_attributes_are_errors() {
        let input: syn::DeriveInput = syn::parse_quote! {
            struct Holding {
                #[dbx(nested)]
                loc: String,
            }
        };
        assert!(impl_record(&input).is_err());
    }
}
