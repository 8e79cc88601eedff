//! 编译期反射
//!
//! 后置处理器需要的反射能力：解析代理背后的真实类型、查找注解、
//! 枚举字段和方法、读写字段、调用方法。
//!
//! Rust 没有运行时反射，元数据由 `beanflow-macros` 在编译期生成：
//!
//! ```ignore
//! use beanflow_macros::{reflect_methods, Annotation, Reflect};
//!
//! #[derive(Debug, Annotation)]
//! pub struct Inject;
//!
//! #[derive(Reflect, Default)]
//! #[annotate(Inject)]
//! pub struct UserService {
//!     #[annotate(Inject)]
//!     name: String,
//! }
//!
//! #[reflect_methods]
//! impl UserService {
//!     #[annotate(Inject)]
//!     pub fn set_name(&mut self, name: String) {
//!         self.name = name;
//!     }
//! }
//! ```

mod annotation;
pub mod invoke;
mod member;
mod registry;
mod type_info;

pub use annotation::{Annotation, Annotations};
pub use member::{
    fields, find_annotation, for_each_field, for_each_method, get_field, get_field_mut,
    invoke_method, methods, set_field, AnnotatedElement, Field, Method, TargetType,
};
pub use registry::{
    resolve_concrete_type, MethodRegistration, TypeRegistration, TypeRegistry,
};
pub use type_info::{
    FieldInfo, MethodInfo, MethodInvoker, ParentLink, Reflect, TargetTypeAware, TypeInfo,
    TypeInfoBuilder,
};
