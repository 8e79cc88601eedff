use proc_macro_error::abort;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Token};

/// 从 #[annotate(...)] 属性中提取注解表达式
/// 支持格式: #[annotate(Inject)] 或 #[annotate(Value("key"), Primary)]，可以重复出现
pub(crate) fn get_annotations(attrs: &[Attribute]) -> Vec<Expr> {
    let mut annotations = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("annotate") {
            match attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
                Ok(exprs) => annotations.extend(exprs),
                Err(err) => abort!(err.span(), "invalid #[annotate] attribute: {}", err),
            }
        }
    }
    annotations
}

/// #[reflect(...)] 中的选项
#[derive(Default)]
pub(crate) struct ReflectOptions {
    pub skip: bool,
    pub extends: bool,
    pub proxy: bool,
}

/// 从属性中提取 #[reflect(...)] 选项
/// 支持格式: #[reflect(skip)]、#[reflect(extends)]、#[reflect(proxy)]
pub(crate) fn get_reflect_options(attrs: &[Attribute]) -> ReflectOptions {
    let mut options = ReflectOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }

        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
            } else if meta.path.is_ident("extends") {
                options.extends = true;
            } else if meta.path.is_ident("proxy") {
                options.proxy = true;
            } else {
                return Err(meta.error("expected one of: skip, extends, proxy"));
            }
            Ok(())
        });

        if let Err(err) = parsed {
            abort!(err.span(), "invalid #[reflect] attribute: {}", err);
        }
    }
    options
}

/// 去掉 #[annotate] 和 #[reflect] 属性（属性宏需要自己清理）
pub(crate) fn strip_reflect_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !attr.path().is_ident("annotate") && !attr.path().is_ident("reflect"));
}
