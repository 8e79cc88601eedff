//! 类型注册表
//!
//! `#[derive(Reflect)]` 通过 inventory 提交 [`TypeRegistration`]，
//! `#[reflect_methods]` 提交 [`MethodRegistration`]。全局注册表在首次访问时
//! 收集所有提交项，按 `TypeId` 建立索引。

use std::any::{Any, TypeId};
use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::member::TargetType;
use super::type_info::{MethodInfo, TypeInfo};
use crate::bean::BeanObject;

/// 类型元数据提交项 - 用于 inventory 收集
pub struct TypeRegistration {
    pub type_info: fn() -> &'static TypeInfo,
}

inventory::collect!(TypeRegistration);

/// 方法元数据提交项 - 用于 inventory 收集
///
/// 在 `TypeInfoBuilder::build` 中按 `owner` 合并到对应类型
pub struct MethodRegistration {
    pub owner: fn() -> TypeId,
    pub methods: fn() -> Vec<MethodInfo>,
}

inventory::collect!(MethodRegistration);

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::from_inventory);

/// 按 `TypeId` 索引的类型元数据
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeId, &'static TypeInfo>,
}

impl TypeRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 全局注册表，包含所有派生了 `Reflect` 的类型
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    /// 从 inventory 收集所有提交的类型
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for registration in inventory::iter::<TypeRegistration> {
            registry.register((registration.type_info)());
        }
        tracing::debug!("Type registry initialized with {} type(s)", registry.len());
        registry
    }

    /// 注册类型，同一类型重复注册时保留后者
    pub fn register(&mut self, info: &'static TypeInfo) {
        if self.types.insert(info.type_id(), info).is_some() {
            tracing::warn!("Type '{}' registered more than once", info.name());
        }
    }

    pub fn get(&self, type_id: TypeId) -> Option<&'static TypeInfo> {
        self.types.get(&type_id).copied()
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.types.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// 解析 Bean 的真实类型
    ///
    /// 代理类型解析为它的目标类型；目标类型未注册时返回没有元数据的 `TargetType`
    pub fn resolve(&self, bean: &BeanObject) -> TargetType {
        let type_id = Any::type_id(bean);

        let Some(info) = self.get(type_id) else {
            return TargetType::unregistered(type_id);
        };

        match info.proxy_target_of(bean) {
            Some(target_id) => {
                tracing::trace!("Unwrapped proxy '{}'", info.simple_name());
                self.get(target_id)
                    .map(TargetType::from_info)
                    .unwrap_or_else(|| TargetType::unregistered(target_id))
            }
            None => TargetType::from_info(info),
        }
    }
}

/// 使用全局注册表解析 Bean 的真实类型
pub fn resolve_concrete_type(bean: &BeanObject) -> TargetType {
    TypeRegistry::global().resolve(bean)
}
