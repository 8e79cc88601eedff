//! 目标类型与成员句柄
//!
//! `Field` / `Method` 记录了从目标类型到声明类型所经过的 extends 链，
//! 因此可以直接在最外层的 Bean 上读写继承来的字段、调用继承来的方法。

use std::any::{Any, TypeId};
use std::fmt;

use super::annotation::{Annotation, Annotations};
use super::type_info::{FieldInfo, MethodInfo, ParentLink, Reflect, TypeInfo};
use crate::bean::{BeanObject, DynValue};
use crate::error::{ReflectError, ReflectResult, Result};

/// 可以查找注解的元素：类型、字段或方法
pub trait AnnotatedElement {
    /// 按宿主的规则查找注解 `A`
    fn find_annotation<A: Annotation>(&self) -> Option<&'static A>;

    /// 是否存在注解 `A`
    fn has_annotation<A: Annotation>(&self) -> bool {
        self.find_annotation::<A>().is_some()
    }
}

/// Bean 去掉代理之后的真实类型
///
/// 没有派生 `Reflect` 的类型也有 `TargetType`，只是没有元数据，
/// 因此不会匹配任何注解，也没有字段和方法
#[derive(Clone, Copy)]
pub struct TargetType {
    type_id: TypeId,
    info: Option<&'static TypeInfo>,
}

impl TargetType {
    /// 可反射类型 `T` 的目标类型
    pub fn of<T: Reflect>() -> Self {
        Self::from_info(T::type_info())
    }

    pub fn from_info(info: &'static TypeInfo) -> Self {
        Self {
            type_id: info.type_id(),
            info: Some(info),
        }
    }

    /// 没有元数据的类型
    pub fn unregistered(type_id: TypeId) -> Self {
        Self {
            type_id,
            info: None,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn info(&self) -> Option<&'static TypeInfo> {
        self.info
    }

    /// 类型名称，未注册的类型返回 `"<unregistered>"`
    pub fn name(&self) -> &'static str {
        self.info.map_or("<unregistered>", TypeInfo::simple_name)
    }

    /// 是否就是类型 `T`
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// 直接声明在该类型上的注解
    pub fn annotations(&self) -> &'static Annotations {
        self.info
            .map_or(Annotations::empty(), |info| info.annotations())
    }
}

impl AnnotatedElement for TargetType {
    /// 先查本类型（含元注解），再沿 extends 链向上查找
    fn find_annotation<A: Annotation>(&self) -> Option<&'static A> {
        self.info?
            .hierarchy()
            .find_map(|info| info.annotations().find_merged::<A>())
    }
}

impl fmt::Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetType")
            .field("name", &self.name())
            .field("registered", &self.info.is_some())
            .finish()
    }
}

impl PartialEq for TargetType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TargetType {}

/// 从外层对象走到声明类型实例的路径
type LinkPath = Vec<&'static ParentLink>;

fn walk<'a>(path: &[&'static ParentLink], bean: &'a BeanObject) -> Option<&'a BeanObject> {
    path.iter()
        .try_fold(bean, |current, link| link.accessor().get(current))
}

fn walk_mut<'a>(path: &[&'static ParentLink], bean: &'a mut BeanObject) -> Option<&'a mut BeanObject> {
    let mut current = bean;
    for link in path {
        current = link.accessor().get_mut(current)?;
    }
    Some(current)
}

/// 字段句柄
#[derive(Clone)]
pub struct Field {
    info: &'static FieldInfo,
    declaring_type: &'static TypeInfo,
    path: LinkPath,
}

impl Field {
    pub fn name(&self) -> &'static str {
        self.info.name()
    }

    /// 声明该字段的类型（继承来的字段是父类型）
    pub fn declaring_type(&self) -> &'static TypeInfo {
        self.declaring_type
    }

    pub fn info(&self) -> &'static FieldInfo {
        self.info
    }

    pub fn value_type(&self) -> &'static str {
        self.info.value_type()
    }

    pub fn annotations(&self) -> &'static Annotations {
        self.info.annotations()
    }

    /// 是否是通过 extends 继承来的字段
    pub fn is_inherited(&self) -> bool {
        !self.path.is_empty()
    }

    fn slot<'a>(&self, bean: &'a BeanObject) -> ReflectResult<&'a BeanObject> {
        walk(&self.path, bean)
            .and_then(|owner| self.info.accessor().get(owner))
            .ok_or_else(|| self.receiver_mismatch())
    }

    fn slot_mut<'a>(&self, bean: &'a mut BeanObject) -> ReflectResult<&'a mut BeanObject> {
        walk_mut(&self.path, bean)
            .and_then(|owner| self.info.accessor().get_mut(owner))
            .ok_or_else(|| self.receiver_mismatch())
    }

    fn receiver_mismatch(&self) -> ReflectError {
        ReflectError::ReceiverMismatch {
            member: self.name(),
            expected: self.declaring_type.name(),
        }
    }

    fn type_mismatch<V: Any>(&self) -> ReflectError {
        ReflectError::FieldTypeMismatch {
            owner: self.declaring_type.simple_name(),
            field: self.name(),
            actual: self.value_type(),
            requested: std::any::type_name::<V>(),
        }
    }
}

impl AnnotatedElement for Field {
    fn find_annotation<A: Annotation>(&self) -> Option<&'static A> {
        self.info.annotations().find_merged::<A>()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name())
            .field("declaring_type", &self.declaring_type.simple_name())
            .field("value_type", &self.value_type())
            .finish()
    }
}

/// 方法句柄
#[derive(Clone)]
pub struct Method {
    info: &'static MethodInfo,
    declaring_type: &'static TypeInfo,
    path: LinkPath,
}

impl Method {
    pub fn name(&self) -> &'static str {
        self.info.name()
    }

    pub fn declaring_type(&self) -> &'static TypeInfo {
        self.declaring_type
    }

    pub fn info(&self) -> &'static MethodInfo {
        self.info
    }

    pub fn params(&self) -> &'static [&'static str] {
        self.info.params()
    }

    pub fn annotations(&self) -> &'static Annotations {
        self.info.annotations()
    }

    pub fn is_inherited(&self) -> bool {
        !self.path.is_empty()
    }
}

impl AnnotatedElement for Method {
    fn find_annotation<A: Annotation>(&self) -> Option<&'static A> {
        self.info.annotations().find_merged::<A>()
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name())
            .field("declaring_type", &self.declaring_type.simple_name())
            .field("params", &self.params())
            .finish()
    }
}

/// 查找元素上的注解 `A`
pub fn find_annotation<A: Annotation>(element: &impl AnnotatedElement) -> Option<&'static A> {
    element.find_annotation::<A>()
}

/// 目标类型的所有字段：先本类型声明顺序，再沿 extends 链向上
pub fn fields(target_type: &TargetType) -> Vec<Field> {
    let mut result = Vec::new();
    let Some(mut info) = target_type.info() else {
        return result;
    };

    let mut path = LinkPath::new();
    loop {
        result.extend(info.declared_fields().iter().map(|field| Field {
            info: field,
            declaring_type: info,
            path: path.clone(),
        }));

        match info.parent() {
            Some(link) => {
                path.push(link);
                info = link.info();
            }
            None => break,
        }
    }

    result
}

/// 目标类型的所有方法，顺序规则与 [`fields`] 相同
///
/// 父类型中与子类型同名的方法不会被去重：两者作用在不同的实例上
pub fn methods(target_type: &TargetType) -> Vec<Method> {
    let mut result = Vec::new();
    let Some(mut info) = target_type.info() else {
        return result;
    };

    let mut path = LinkPath::new();
    loop {
        result.extend(info.declared_methods().iter().map(|method| Method {
            info: method,
            declaring_type: info,
            path: path.clone(),
        }));

        match info.parent() {
            Some(link) => {
                path.push(link);
                info = link.info();
            }
            None => break,
        }
    }

    result
}

/// 依次访问目标类型的每个字段，访问者返回错误时立即停止
pub fn for_each_field<F>(target_type: &TargetType, mut visitor: F) -> Result<()>
where
    F: FnMut(&Field) -> Result<()>,
{
    fields(target_type).iter().try_for_each(|field| visitor(field))
}

/// 依次访问目标类型的每个方法，访问者返回错误时立即停止
pub fn for_each_method<F>(target_type: &TargetType, mut visitor: F) -> Result<()>
where
    F: FnMut(&Method) -> Result<()>,
{
    methods(target_type).iter().try_for_each(|method| visitor(method))
}

/// 读取字段值
pub fn get_field<'a, V: Any>(field: &Field, bean: &'a BeanObject) -> ReflectResult<&'a V> {
    field
        .slot(bean)?
        .downcast_ref::<V>()
        .ok_or_else(|| field.type_mismatch::<V>())
}

/// 获取字段的可变引用
pub fn get_field_mut<'a, V: Any>(field: &Field, bean: &'a mut BeanObject) -> ReflectResult<&'a mut V> {
    let mismatch = field.type_mismatch::<V>();
    field
        .slot_mut(bean)?
        .downcast_mut::<V>()
        .ok_or(mismatch)
}

/// 写入字段值
pub fn set_field<V: Any>(field: &Field, bean: &mut BeanObject, value: V) -> ReflectResult<()> {
    *get_field_mut::<V>(field, bean)? = value;
    tracing::trace!(
        "Set field '{}::{}'",
        field.declaring_type().simple_name(),
        field.name()
    );
    Ok(())
}

/// 反射调用方法
///
/// 参数按声明顺序传入，每个参数必须与声明的类型完全一致
pub fn invoke_method(method: &Method, bean: &mut BeanObject, args: Vec<DynValue>) -> ReflectResult<DynValue> {
    let owner = walk_mut(&method.path, bean).ok_or(ReflectError::ReceiverMismatch {
        member: method.name(),
        expected: method.declaring_type.name(),
    })?;

    tracing::trace!(
        "Invoking method '{}::{}' with {} argument(s)",
        method.declaring_type.simple_name(),
        method.name(),
        args.len()
    );

    (method.info.invoker())(owner, args)
}
