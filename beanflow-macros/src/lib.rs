mod annotation_impl;
mod attribute_helpers;
mod reflect_impl;
mod reflect_methods_attr;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

/// Reflect 派生宏
///
/// 为结构体生成类型元数据（注解、字段、父类型），并注册到全局类型注册表，
/// 使函数式后置处理器可以按注解扫描该类型
///
/// 用法：
/// ```ignore
/// #[derive(Reflect)]
/// #[annotate(Service)]              // 可选：类型注解，可以重复
/// #[reflect(proxy)]                 // 可选：代理类型，需要实现 TargetTypeAware
/// struct UserService {
///     #[reflect(extends)]           // 可选：嵌入的父类型（最多一个），必须也派生 Reflect
///     base: BaseService,
///
///     #[annotate(Value("app.name"))] // 可选：字段注解
///     name: String,
///
///     #[reflect(skip)]              // 可选：不出现在字段枚举中
///     cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(annotate, reflect))]
#[proc_macro_error]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    reflect_impl::derive_reflect_impl(input)
}

/// Annotation 派生宏
///
/// 让任意类型可以作为注解使用。注解类型上的 `#[annotate(...)]` 是元注解，
/// 按注解查找时会被一并搜索
///
/// 用法：
/// ```ignore
/// #[derive(Debug, Annotation)]
/// pub struct Component;
///
/// #[derive(Debug, Annotation)]
/// #[annotate(Component)]  // Service 被视为 Component
/// pub struct Service;
///
/// #[derive(Debug, Annotation)]
/// pub struct Value(pub &'static str);
/// ```
#[proc_macro_derive(Annotation, attributes(annotate))]
#[proc_macro_error]
pub fn derive_annotation(input: TokenStream) -> TokenStream {
    annotation_impl::derive_annotation_impl(input)
}

/// reflect_methods 属性宏
///
/// 用于可反射类型的 impl 块，注册带有 `#[annotate]` 的方法。被注册的方法必须满足：
/// - 接收者为 `&self` 或 `&mut self`
/// - 参数和返回值都是拥有所有权的类型（`Send + Sync + 'static`）
///
/// 没有注解的方法不会被注册，签名不受限制；带注解却不满足条件的方法会产生编译错误。
/// `#[reflect(skip)]` 可以让带注解的方法不参与注册
///
/// # 用法
///
/// ```ignore
/// #[derive(Reflect)]
/// struct UserService {
///     name: String,
/// }
///
/// #[reflect_methods]
/// impl UserService {
///     pub fn new() -> Self { ... }            // 跳过：没有注解
///
///     #[annotate(Init("CHANGED"))]
///     pub fn rename(&mut self, name: String) {
///         self.name = name;
///     }
///
///     pub fn name(&self) -> &str { &self.name } // 跳过：没有注解
///
///     #[reflect(skip)]
///     #[annotate(Init("IGNORED"))]
///     pub fn internal(&mut self, name: String) {} // 跳过
/// }
/// ```
#[proc_macro_attribute]
#[proc_macro_error]
pub fn reflect_methods(attr: TokenStream, item: TokenStream) -> TokenStream {
    reflect_methods_attr::reflect_methods_impl(attr, item)
}
