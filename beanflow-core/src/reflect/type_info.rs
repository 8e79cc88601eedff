//! 类型元数据
//!
//! `TypeInfo` 描述一个 Bean 类型的注解、字段、方法，以及它通过
//! `#[reflect(extends)]` 嵌入的父类型。元数据在编译期由 `#[derive(Reflect)]`
//! 生成，首次访问时构建一次，之后只读。

use std::any::{Any, TypeId};
use std::fmt;

use super::annotation::{Annotation, Annotations};
use super::registry::MethodRegistration;
use crate::bean::{BeanObject, DynValue};
use crate::error::ReflectResult;
use crate::utils::naming::simple_type_name;

/// 可反射的类型
///
/// 通常通过 `#[derive(Reflect)]` 实现
pub trait Reflect: Any + Send + Sync {
    /// 类型的元数据
    fn type_info() -> &'static TypeInfo
    where
        Self: Sized;
}

/// 代理类型实现此 trait 以暴露被代理对象的真实类型
///
/// 配合 `#[reflect(proxy)]` 使用，`resolve_concrete_type` 会返回目标类型
pub trait TargetTypeAware {
    fn target_type_id(&self) -> TypeId;
}

/// 类型擦除后的字段访问器
pub(crate) trait ErasedAccessor: Send + Sync {
    fn get<'a>(&self, owner: &'a BeanObject) -> Option<&'a BeanObject>;

    fn get_mut<'a>(&self, owner: &'a mut BeanObject) -> Option<&'a mut BeanObject>;

    fn value_type(&self) -> &'static str;
}

struct Accessor<T, V> {
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
}

impl<T, V> ErasedAccessor for Accessor<T, V>
where
    T: Any + Send + Sync,
    V: Any + Send + Sync,
{
    fn get<'a>(&self, owner: &'a BeanObject) -> Option<&'a BeanObject> {
        let owner = owner.downcast_ref::<T>()?;
        Some((self.get)(owner) as &BeanObject)
    }

    fn get_mut<'a>(&self, owner: &'a mut BeanObject) -> Option<&'a mut BeanObject> {
        let owner = owner.downcast_mut::<T>()?;
        Some((self.get_mut)(owner) as &mut BeanObject)
    }

    fn value_type(&self) -> &'static str {
        std::any::type_name::<V>()
    }
}

/// 字段元数据
pub struct FieldInfo {
    name: &'static str,
    annotations: Annotations,
    accessor: Box<dyn ErasedAccessor>,
}

impl FieldInfo {
    /// 通过一对访问函数描述类型 `T` 上类型为 `V` 的字段
    ///
    /// 访问函数定义在类型所在的模块里，因此私有字段也可以访问
    pub fn new<T, V>(name: &'static str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self
    where
        T: Any + Send + Sync,
        V: Any + Send + Sync,
    {
        Self {
            name,
            annotations: Annotations::new(),
            accessor: Box::new(Accessor { get, get_mut }),
        }
    }

    /// 添加注解
    pub fn annotated(mut self, annotation: impl Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// 字段值的类型名称
    pub fn value_type(&self) -> &'static str {
        self.accessor.value_type()
    }

    pub(crate) fn accessor(&self) -> &dyn ErasedAccessor {
        self.accessor.as_ref()
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("value_type", &self.value_type())
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// 反射调用入口：接收声明类型的实例和参数列表
pub type MethodInvoker = fn(&mut BeanObject, Vec<DynValue>) -> ReflectResult<DynValue>;

/// 方法元数据
pub struct MethodInfo {
    name: &'static str,
    params: Vec<&'static str>,
    return_type: &'static str,
    annotations: Annotations,
    invoker: MethodInvoker,
}

impl MethodInfo {
    pub fn new(name: &'static str, invoker: MethodInvoker) -> Self {
        Self {
            name,
            params: Vec::new(),
            return_type: std::any::type_name::<()>(),
            annotations: Annotations::new(),
            invoker,
        }
    }

    /// 追加一个参数类型
    pub fn param<P: Any>(mut self) -> Self {
        self.params.push(std::any::type_name::<P>());
        self
    }

    /// 设置返回值类型
    pub fn returns<R: Any>(mut self) -> Self {
        self.return_type = std::any::type_name::<R>();
        self
    }

    /// 添加注解
    pub fn annotated(mut self, annotation: impl Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn params(&self) -> &[&'static str] {
        &self.params
    }

    pub fn return_type(&self) -> &'static str {
        self.return_type
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub(crate) fn invoker(&self) -> MethodInvoker {
        self.invoker
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .field("annotations", &self.annotations)
            .finish()
    }
}

/// 指向嵌入父类型的链接（`#[reflect(extends)]` 字段）
pub struct ParentLink {
    field: &'static str,
    info: fn() -> &'static TypeInfo,
    accessor: Box<dyn ErasedAccessor>,
}

impl ParentLink {
    /// 承载父类型的字段名
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// 父类型的元数据
    pub fn info(&self) -> &'static TypeInfo {
        (self.info)()
    }

    pub(crate) fn accessor(&self) -> &dyn ErasedAccessor {
        self.accessor.as_ref()
    }
}

type ProxyTargetFn = fn(&BeanObject) -> Option<TypeId>;

/// 类型元数据
pub struct TypeInfo {
    name: &'static str,
    type_id: TypeId,
    annotations: Annotations,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    parent: Option<ParentLink>,
    proxy_target: Option<ProxyTargetFn>,
}

impl TypeInfo {
    /// 为类型 `T` 创建构建器
    pub fn builder<T: Any + Send + Sync>() -> TypeInfoBuilder {
        TypeInfoBuilder {
            info: TypeInfo {
                name: std::any::type_name::<T>(),
                type_id: TypeId::of::<T>(),
                annotations: Annotations::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                parent: None,
                proxy_target: None,
            },
        }
    }

    /// 完整类型路径
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 去掉模块路径后的类型名
    pub fn simple_name(&self) -> &'static str {
        simple_type_name(self.name)
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// 类型上直接声明的注解
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// 本类型声明的字段（不含父类型）
    pub fn declared_fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// 本类型声明的方法（不含父类型）
    pub fn declared_methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// 是否是代理类型
    pub fn is_proxy(&self) -> bool {
        self.proxy_target.is_some()
    }

    /// 代理对象的目标类型
    pub(crate) fn proxy_target_of(&self, bean: &BeanObject) -> Option<TypeId> {
        self.proxy_target.and_then(|resolve| resolve(bean))
    }

    /// 自身及所有父类型，从自身开始
    pub fn hierarchy(&'static self) -> impl Iterator<Item = &'static TypeInfo> {
        std::iter::successors(Some(self), |info| info.parent().map(ParentLink::info))
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("annotations", &self.annotations)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .field("parent", &self.parent.as_ref().map(|p| p.field))
            .field("proxy", &self.is_proxy())
            .finish()
    }
}

/// `TypeInfo` 构建器
pub struct TypeInfoBuilder {
    info: TypeInfo,
}

impl TypeInfoBuilder {
    /// 添加类型注解
    pub fn annotation(mut self, annotation: impl Annotation) -> Self {
        self.info.annotations.push(annotation);
        self
    }

    /// 添加字段
    pub fn field(mut self, field: FieldInfo) -> Self {
        self.info.fields.push(field);
        self
    }

    /// 添加方法
    pub fn method(mut self, method: MethodInfo) -> Self {
        self.info.methods.push(method);
        self
    }

    /// 声明嵌入的父类型
    ///
    /// 父类型的字段和方法会出现在本类型的枚举结果中，位于本类型成员之后
    pub fn extends<T, P>(
        mut self,
        field: &'static str,
        get: fn(&T) -> &P,
        get_mut: fn(&mut T) -> &mut P,
    ) -> Self
    where
        T: Any + Send + Sync,
        P: Reflect,
    {
        self.info.parent = Some(ParentLink {
            field,
            info: P::type_info,
            accessor: Box::new(Accessor { get, get_mut }),
        });
        self
    }

    /// 标记为代理类型
    pub fn proxy<T: TargetTypeAware + Any + Send + Sync>(mut self) -> Self {
        self.info.proxy_target = Some(proxy_target::<T>);
        self
    }

    /// 完成构建
    ///
    /// `#[reflect_methods]` 注册的方法在这里合并进来，同一个 impl 块内保持声明顺序
    pub fn build(mut self) -> TypeInfo {
        let type_id = self.info.type_id;
        for registration in inventory::iter::<MethodRegistration> {
            if (registration.owner)() == type_id {
                self.info.methods.extend((registration.methods)());
            }
        }

        tracing::trace!(
            "Built type info for '{}': {} annotation(s), {} field(s), {} method(s)",
            self.info.name,
            self.info.annotations.len(),
            self.info.fields.len(),
            self.info.methods.len()
        );

        self.info
    }
}

fn proxy_target<T: TargetTypeAware + Any + Send + Sync>(bean: &BeanObject) -> Option<TypeId> {
    bean.downcast_ref::<T>().map(T::target_type_id)
}
