//! reflect_methods impl 块属性宏实现
//!
//! 扫描 impl 块中的方法，为可以反射调用的方法生成 `MethodInfo`，
//! 并通过 inventory 提交给对应类型

use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro_error::abort;
use quote::quote;
use syn::{parse_macro_input, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, ReturnType, Type};

use crate::attribute_helpers::{get_annotations, get_reflect_options, strip_reflect_attrs};

/// 方法不能注册的原因
fn unsupported_reason(method: &ImplItemFn) -> Option<&'static str> {
    let sig = &method.sig;

    if sig.asyncness.is_some() {
        return Some("async methods cannot be invoked reflectively");
    }
    if !sig.generics.params.is_empty() {
        return Some("generic methods cannot be invoked reflectively");
    }

    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() => {}
        Some(FnArg::Receiver(_)) => return Some("methods taking `self` by value cannot be invoked reflectively"),
        _ => return Some("associated functions without `&self` or `&mut self` cannot be invoked reflectively"),
    }

    for arg in sig.inputs.iter().skip(1) {
        if let FnArg::Typed(pat_type) = arg {
            if !is_owned_type(&pat_type.ty) {
                return Some("arguments must be owned types");
            }
        }
    }

    if let ReturnType::Type(_, ty) = &sig.output {
        if !is_owned_type(ty) {
            return Some("the return type must be an owned type");
        }
    }

    None
}

/// 引用、impl Trait 这类类型无法装箱为 DynValue
fn is_owned_type(ty: &Type) -> bool {
    match ty {
        Type::Reference(_) | Type::ImplTrait(_) | Type::Infer(_) | Type::Never(_) => false,
        Type::Paren(inner) => is_owned_type(&inner.elem),
        Type::Group(inner) => is_owned_type(&inner.elem),
        _ => true,
    }
}

/// 为单个方法生成 MethodInfo 构建代码
fn method_info(method: &ImplItemFn, annotations: &[syn::Expr]) -> proc_macro2::TokenStream {
    let method_name = &method.sig.ident;
    let method_str = method_name.to_string();

    let arg_types: Vec<&Type> = method
        .sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat_type) => Some(pat_type.ty.as_ref()),
            FnArg::Receiver(_) => None,
        })
        .collect();
    let arg_count = arg_types.len();

    let arg_idents: Vec<Ident> = (0..arg_count)
        .map(|index| Ident::new(&format!("__arg{}", index), Span::call_site()))
        .collect();

    let take_args = arg_types.iter().zip(&arg_idents).enumerate().map(|(index, (ty, ident))| {
        quote! {
            let #ident = ::beanflow_core::reflect::invoke::take_arg::<#ty>(#method_str, #index, __args.next())?;
        }
    });

    let returns = match &method.sig.output {
        ReturnType::Default => quote! {},
        ReturnType::Type(_, ty) => quote! { .returns::<#ty>() },
    };

    quote! {
        ::beanflow_core::reflect::MethodInfo::new(#method_str, |__bean, __args| {
            ::beanflow_core::reflect::invoke::check_arity(#method_str, &__args, #arg_count)?;
            #[allow(unused_mut, unused_variables)]
            let mut __args = __args.into_iter();
            #(#take_args)*
            let __this = ::beanflow_core::reflect::invoke::receiver_mut::<Self>(__bean, #method_str)?;
            Ok(::beanflow_core::reflect::invoke::box_return(__this.#method_name(#(#arg_idents),*)))
        })
        #(.param::<#arg_types>())*
        #returns
        #(.annotated(#annotations))*
    }
}

/// 生成方法元数据函数的名称
///
/// 同一类型的多个 impl 块各自生成一个函数。方法名在类型内唯一，
/// 每个名称带上长度前缀后拼接，不同的方法集合不会得到相同的函数名
fn methods_fn_name(method_names: &[String]) -> String {
    let encoded: String = method_names
        .iter()
        .map(|name| format!("{}{}", name.len(), name))
        .collect();
    format!("__beanflow_methods_{}", encoded)
}

/// reflect_methods impl 块属性宏
///
/// 注册 impl 块中带 `#[annotate]` 的 `&self` / `&mut self` 方法，并清理方法上的 #[annotate] / #[reflect] 属性
pub(crate) fn reflect_methods_impl(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(item as ItemImpl);

    if let Some((_, path, _)) = &input.trait_ {
        abort!(path, "#[reflect_methods] can only be used on inherent impl blocks");
    }
    if !input.generics.params.is_empty() {
        abort!(input.generics, "#[reflect_methods] does not support generic impl blocks");
    }

    let self_ty = input.self_ty.clone();
    let mut method_names = Vec::new();
    let mut method_infos = Vec::new();

    for item in input.items.iter_mut() {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        let annotations = get_annotations(&method.attrs);
        let options = get_reflect_options(&method.attrs);
        strip_reflect_attrs(&mut method.attrs);

        if options.extends || options.proxy {
            abort!(method.sig.ident.span(), "only #[reflect(skip)] is allowed on methods");
        }
        // 只有带注解的方法会被分派，其余方法不生成调用器，也就不受 Send + Sync 约束
        if options.skip || annotations.is_empty() {
            continue;
        }

        if let Some(reason) = unsupported_reason(method) {
            abort!(
                method.sig.ident.span(),
                "annotated method '{}' cannot be registered: {}",
                method.sig.ident,
                reason;
                help = "take `&self` or `&mut self` and use owned argument and return types, or add #[reflect(skip)]"
            );
        }

        method_names.push(method.sig.ident.to_string());
        method_infos.push(method_info(method, &annotations));
    }

    if method_infos.is_empty() {
        return TokenStream::from(quote! { #input });
    }

    let methods_fn = Ident::new(&methods_fn_name(&method_names), Span::call_site());

    let expanded = quote! {
        #input

        impl #self_ty {
            #[doc(hidden)]
            #[allow(non_snake_case)]
            fn #methods_fn() -> ::std::vec::Vec<::beanflow_core::reflect::MethodInfo> {
                ::std::vec![
                    #(#method_infos),*
                ]
            }
        }

        // 提交方法元数据到 inventory
        ::beanflow_core::inventory::submit! {
            ::beanflow_core::reflect::MethodRegistration {
                owner: || ::std::any::TypeId::of::<#self_ty>(),
                methods: <#self_ty>::#methods_fn,
            }
        }
    };

    TokenStream::from(expanded)
}
