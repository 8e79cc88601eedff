//! Annotation 派生宏实现

use proc_macro::TokenStream;
use proc_macro_error::abort;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::attribute_helpers::get_annotations;

pub(crate) fn derive_annotation_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        abort!(input.generics, "#[derive(Annotation)] does not support generic types");
    }

    // 注解类型上的 #[annotate(...)] 即元注解
    let meta = get_annotations(&input.attrs);

    let meta_annotations = if meta.is_empty() {
        quote! {}
    } else {
        quote! {
            fn meta_annotations(&self) -> &'static ::beanflow_core::reflect::Annotations {
                static META_ANNOTATIONS: ::beanflow_core::once_cell::sync::Lazy<::beanflow_core::reflect::Annotations> =
                    ::beanflow_core::once_cell::sync::Lazy::new(|| {
                        ::beanflow_core::reflect::Annotations::new()
                            #(.with(#meta))*
                    });
                &META_ANNOTATIONS
            }
        }
    };

    let expanded = quote! {
        impl ::beanflow_core::reflect::Annotation for #name {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            #meta_annotations
        }
    };

    TokenStream::from(expanded)
}
