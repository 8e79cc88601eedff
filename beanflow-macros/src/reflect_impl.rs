//! Reflect 派生宏实现
//!
//! 为结构体生成 `TypeInfo` 并通过 inventory 注册到全局类型注册表

use proc_macro::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

use crate::attribute_helpers::{get_annotations, get_reflect_options};

pub(crate) fn derive_reflect_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        abort!(
            input.generics,
            "#[derive(Reflect)] does not support generic types";
            help = "type metadata is registered once per concrete type"
        );
    }

    // 获取所有字段（单元结构体没有字段）
    let all_fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
            Fields::Unit => vec![],
            Fields::Unnamed(fields) => abort!(
                fields,
                "#[derive(Reflect)] requires named fields"
            ),
        },
        _ => abort!(name.span(), "#[derive(Reflect)] can only be used on structs"),
    };

    // 类型注解
    let type_annotations = get_annotations(&input.attrs).into_iter().map(|expr| {
        quote! { .annotation(#expr) }
    });

    let type_options = get_reflect_options(&input.attrs);
    if type_options.skip || type_options.extends {
        abort!(name.span(), "only #[reflect(proxy)] is allowed on the type itself");
    }
    let proxy = if type_options.proxy {
        quote! { .proxy::<#name>() }
    } else {
        quote! {}
    };

    let mut parent = None;
    let mut field_infos = Vec::new();

    for field in &all_fields {
        let options = get_reflect_options(&field.attrs);
        let annotations = get_annotations(&field.attrs);
        let Some(field_name) = &field.ident else {
            continue;
        };
        let field_type = &field.ty;
        let field_str = field_name.to_string();

        if options.extends {
            // extends 字段承载父类型，不作为普通字段出现
            if parent.is_some() {
                abort!(field_name.span(), "only one field can be marked #[reflect(extends)]");
            }
            if !annotations.is_empty() {
                abort!(field_name.span(), "a #[reflect(extends)] field cannot carry annotations");
            }
            parent = Some(quote! {
                .extends::<#name, #field_type>(
                    #field_str,
                    |this| &this.#field_name,
                    |this| &mut this.#field_name,
                )
            });
            continue;
        }

        if options.skip {
            continue;
        }

        let annotated = annotations.iter().map(|expr| quote! { .annotated(#expr) });
        field_infos.push(quote! {
            .field(
                ::beanflow_core::reflect::FieldInfo::new::<#name, #field_type>(
                    #field_str,
                    |this| &this.#field_name,
                    |this| &mut this.#field_name,
                )
                #(#annotated)*
            )
        });
    }

    let parent = parent.unwrap_or_default();

    let expanded = quote! {
        impl ::beanflow_core::reflect::Reflect for #name {
            fn type_info() -> &'static ::beanflow_core::reflect::TypeInfo {
                static TYPE_INFO: ::beanflow_core::once_cell::sync::Lazy<::beanflow_core::reflect::TypeInfo> =
                    ::beanflow_core::once_cell::sync::Lazy::new(|| {
                        ::beanflow_core::reflect::TypeInfo::builder::<#name>()
                            #(#type_annotations)*
                            #parent
                            #(#field_infos)*
                            #proxy
                            .build()
                    });
                &TYPE_INFO
            }
        }

        // 提交类型元数据到 inventory
        ::beanflow_core::inventory::submit! {
            ::beanflow_core::reflect::TypeRegistration {
                type_info: <#name as ::beanflow_core::reflect::Reflect>::type_info,
            }
        }
    };

    TokenStream::from(expanded)
}
