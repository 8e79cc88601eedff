//! 注解模型
//!
//! Rust 没有运行时注解，这里的注解就是普通的值：任何实现了 [`Annotation`]
//! 的类型都可以挂在类型、字段或方法上。`#[derive(Annotation)]` 会生成实现，
//! 并把注解类型自身上的 `#[annotate(...)]` 记录为元注解。

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::fmt;

/// 注解 trait
///
/// # 示例
///
/// ```ignore
/// use beanflow_macros::Annotation;
///
/// #[derive(Debug, Annotation)]
/// pub struct Inject;
///
/// // 元注解：标注了 #[annotate(Inject)] 的注解类型会被 find_merged::<Inject>() 找到
/// #[derive(Debug, Annotation)]
/// #[annotate(Inject)]
/// pub struct InjectConfig {
///     pub key: &'static str,
/// }
/// ```
pub trait Annotation: Any + Send + Sync + fmt::Debug {
    /// 用于向下转型
    fn as_any(&self) -> &dyn Any;

    /// 注解类型上声明的元注解
    fn meta_annotations(&self) -> &'static Annotations {
        Annotations::empty()
    }

    /// 注解类型名称（用于日志）
    fn annotation_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// 有序的注解集合
#[derive(Default)]
pub struct Annotations {
    items: Vec<Box<dyn Annotation>>,
}

static EMPTY: Annotations = Annotations::new();

impl Annotations {
    /// 创建空集合
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// 共享的空集合
    pub fn empty() -> &'static Annotations {
        &EMPTY
    }

    /// 追加注解（构建器风格）
    pub fn with(mut self, annotation: impl Annotation) -> Self {
        self.push(annotation);
        self
    }

    /// 追加注解
    pub fn push(&mut self, annotation: impl Annotation) {
        self.items.push(Box::new(annotation));
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Annotation> {
        self.items.iter().map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 只查找直接声明的注解
    pub fn find<A: Annotation>(&self) -> Option<&A> {
        self.items
            .iter()
            .find_map(|a| a.as_any().downcast_ref::<A>())
    }

    /// 是否直接声明了注解 `A`
    pub fn contains<A: Annotation>(&self) -> bool {
        self.find::<A>().is_some()
    }

    /// 先查直接声明的注解，再深度优先查找元注解
    ///
    /// 每种注解类型的元注解只展开一次，互相标注的注解不会导致无限递归
    pub fn find_merged<A: Annotation>(&self) -> Option<&A> {
        let mut visited = HashSet::new();
        search_merged::<A>(self, &mut visited)
    }
}

fn search_merged<'a, A: Annotation>(
    annotations: &'a Annotations,
    visited: &mut HashSet<TypeId>,
) -> Option<&'a A> {
    if let Some(found) = annotations.find::<A>() {
        return Some(found);
    }

    for annotation in annotations.iter() {
        if !visited.insert(annotation.as_any().type_id()) {
            continue;
        }
        if let Some(found) = search_merged::<A>(annotation.meta_annotations(), visited) {
            return Some(found);
        }
    }

    None
}

impl fmt::Debug for Annotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}
