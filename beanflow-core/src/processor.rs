//! 函数式 BeanPostProcessor
//!
//! 用普通函数描述"初始化前"对 Bean 的修改，不必为每个处理逻辑实现
//! [`BeanPostProcessor`]。处理器可以按类型、字段或方法上的注解分派，
//! 也可以用 [`and_then`](FunctionalPostProcessor::and_then) 串联。
//!
//! # 示例
//!
//! ```ignore
//! use beanflow_core::prelude::*;
//!
//! let processor = FunctionalPostProcessor::by_field_annotation::<Value, _>(|bean, field, value| {
//!     set_field(field, bean, value.0.to_string())?;
//!     Ok(())
//! })
//! .and_then(FunctionalPostProcessor::by_method_annotation::<Init, _>(|bean, method, _| {
//!     invoke_method(method, bean, Vec::new())?;
//!     Ok(())
//! }))
//! .with_name("valueProcessor");
//!
//! registry.register(processor);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::bean::{Bean, BeanObject};
use crate::bean_post_processor::BeanPostProcessor;
use crate::error::Result;
use crate::reflect::{
    find_annotation, for_each_field, for_each_method, methods, resolve_concrete_type, Annotation,
    Field, Method, TargetType,
};
use crate::utils::naming::simple_type_name;

/// 默认处理器名称
pub const DEFAULT_NAME: &str = "FunctionalPostProcessor";

/// 默认优先级，与 [`BeanPostProcessor::order`] 的默认值一致
pub const DEFAULT_ORDER: i32 = 1000;

type TransformFn = dyn Fn(Bean, &TargetType) -> Result<Option<Bean>> + Send + Sync;

/// 函数式 BeanPostProcessor
///
/// 包装一个 `Fn(Bean, &TargetType) -> Result<Option<Bean>>`：
/// - `Ok(Some(bean))`: 原 Bean 或替换后的 Bean，继续处理
/// - `Ok(None)`: 停止处理该 Bean
///
/// 克隆只增加函数的引用计数
#[derive(Clone)]
pub struct FunctionalPostProcessor {
    name: String,
    order: i32,
    transform: Arc<TransformFn>,
}

impl FunctionalPostProcessor {
    /// 从函数创建处理器
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Bean, &TargetType) -> Result<Option<Bean>> + Send + Sync + 'static,
    {
        Self {
            name: DEFAULT_NAME.to_string(),
            order: DEFAULT_ORDER,
            transform: Arc::new(f),
        }
    }

    /// 设置名称（用于日志和按名称禁用）
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置优先级（数字越小越先执行）
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    /// 对已解析出真实类型的 Bean 执行处理
    pub fn transform(&self, bean: Bean, target_type: &TargetType) -> Result<Option<Bean>> {
        (self.transform)(bean, target_type)
    }

    /// 串联处理器
    ///
    /// 先执行 `self`，结果为 `Some` 时再把新的 Bean 和同一个目标类型交给 `next`；
    /// `self` 返回 `None` 时 `next` 不会执行。组合后的处理器沿用 `self` 的名称和优先级。
    pub fn and_then(self, next: FunctionalPostProcessor) -> Self {
        let first = self.transform;
        let second = next.transform;
        let first_name = self.name.clone();

        Self::from_fn(move |bean, target_type| match first(bean, target_type)? {
            Some(bean) => second(bean, target_type),
            None => {
                tracing::debug!(
                    "'{}' returned no bean for '{}', skipping the rest of the chain",
                    first_name,
                    target_type.name()
                );
                Ok(None)
            }
        })
        .with_name(self.name)
        .with_order(self.order)
    }

    /// 按类型注解分派
    ///
    /// 目标类型（含元注解和 extends 父类型）上存在注解 `A` 时返回 `f(bean, annotation)`，
    /// 否则原样返回 Bean
    pub fn by_class_annotation<A, F>(f: F) -> Self
    where
        A: Annotation,
        F: Fn(Bean, &A) -> Result<Option<Bean>> + Send + Sync + 'static,
    {
        Self::from_fn(move |bean, target_type| match find_annotation::<A>(target_type) {
            Some(annotation) => {
                tracing::debug!(
                    "Type '{}' annotated with @{}",
                    target_type.name(),
                    simple_type_name(annotation.annotation_name())
                );
                f(bean, annotation)
            }
            None => Ok(Some(bean)),
        })
    }

    /// 按字段注解分派
    ///
    /// 对目标类型的每个带注解 `A` 的字段（包括继承来的字段）调用一次 `f`，
    /// 总是返回同一个 Bean
    pub fn by_field_annotation<A, F>(f: F) -> Self
    where
        A: Annotation,
        F: Fn(&mut BeanObject, &Field, &A) -> Result<()> + Send + Sync + 'static,
    {
        Self::from_fn(move |mut bean, target_type| {
            for_each_field(target_type, |field| match find_annotation::<A>(field) {
                Some(annotation) => {
                    tracing::debug!(
                        "Field '{}::{}' annotated with @{}",
                        field.declaring_type().simple_name(),
                        field.name(),
                        simple_type_name(annotation.annotation_name())
                    );
                    f(bean.as_mut(), field, annotation)
                }
                None => Ok(()),
            })?;
            Ok(Some(bean))
        })
    }

    /// 按方法注解分派
    ///
    /// 对目标类型的每个带注解 `A` 的方法（包括继承来的方法）调用一次 `f`，
    /// 总是返回同一个 Bean
    pub fn by_method_annotation<A, F>(f: F) -> Self
    where
        A: Annotation,
        F: Fn(&mut BeanObject, &Method, &A) -> Result<()> + Send + Sync + 'static,
    {
        Self::from_fn(move |mut bean, target_type| {
            for_each_method(target_type, |method| match find_annotation::<A>(method) {
                Some(annotation) => {
                    tracing::debug!(
                        "Method '{}::{}' annotated with @{}",
                        method.declaring_type().simple_name(),
                        method.name(),
                        simple_type_name(annotation.annotation_name())
                    );
                    f(bean.as_mut(), method, annotation)
                }
                None => Ok(()),
            })?;
            Ok(Some(bean))
        })
    }

    /// 按方法注解折叠
    ///
    /// 按枚举顺序对每个带注解 `A` 的方法执行 `bean = f(bean, method, annotation)`，
    /// 返回最后的 Bean。某一步返回 `None` 时立即停止并返回 `None`
    pub fn by_method_annotation_with_result<A, F>(f: F) -> Self
    where
        A: Annotation,
        F: Fn(Bean, &Method, &A) -> Result<Option<Bean>> + Send + Sync + 'static,
    {
        Self::from_fn(move |bean, target_type| {
            let mut current = bean;

            for method in methods(target_type) {
                let Some(annotation) = find_annotation::<A>(&method) else {
                    continue;
                };

                match f(current, &method, annotation)? {
                    Some(next) => current = next,
                    None => {
                        tracing::debug!(
                            "Method '{}::{}' returned no bean, stopping",
                            method.declaring_type().simple_name(),
                            method.name()
                        );
                        return Ok(None);
                    }
                }
            }

            Ok(Some(current))
        })
    }
}

impl BeanPostProcessor for FunctionalPostProcessor {
    fn post_process_before_initialization(&self, bean: Bean, bean_name: &str) -> Result<Option<Bean>> {
        let target_type = resolve_concrete_type(&*bean);
        tracing::trace!(
            "'{}' processing bean '{}' (type: {})",
            self.name,
            bean_name,
            target_type.name()
        );
        self.transform(bean, &target_type)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> i32 {
        self.order
    }
}

impl fmt::Debug for FunctionalPostProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalPostProcessor")
            .field("name", &self.name)
            .field("order", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{into_bean, DynValue};
    use crate::error::ReflectResult;
    use crate::reflect::{set_field, FieldInfo, MethodInfo, TypeInfo};
    use once_cell::sync::Lazy;
    use parking_lot::Mutex;
    use std::any::{Any, TypeId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Inject(&'static str);

    impl Annotation for Inject {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Missing;

    impl Annotation for Missing {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct Service {
        primary: String,
        plain: String,
        secondary: String,
    }

    fn invoke_noop(_bean: &mut BeanObject, _args: Vec<DynValue>) -> ReflectResult<DynValue> {
        Ok(Box::new(()))
    }

    static SERVICE_INFO: Lazy<TypeInfo> = Lazy::new(|| {
        TypeInfo::builder::<Service>()
            .annotation(Inject("service"))
            .field(
                FieldInfo::new::<Service, String>("primary", |s| &s.primary, |s| &mut s.primary)
                    .annotated(Inject("a")),
            )
            .field(FieldInfo::new::<Service, String>("plain", |s| &s.plain, |s| &mut s.plain))
            .field(
                FieldInfo::new::<Service, String>("secondary", |s| &s.secondary, |s| &mut s.secondary)
                    .annotated(Inject("b")),
            )
            .method(MethodInfo::new("start", invoke_noop).annotated(Inject("start")))
            .method(MethodInfo::new("helper", invoke_noop))
            .method(MethodInfo::new("stop", invoke_noop).annotated(Inject("stop")))
            .build()
    });

    fn service_type() -> TargetType {
        TargetType::from_info(&SERVICE_INFO)
    }

    fn append(suffix: &'static str) -> FunctionalPostProcessor {
        FunctionalPostProcessor::from_fn(move |bean, _| {
            let mut value = bean.downcast::<String>().map_err(|_| anyhow::anyhow!("not a string"))?;
            value.push_str(suffix);
            Ok(Some(value as Bean))
        })
    }

    fn run(processor: &FunctionalPostProcessor, bean: Bean) -> Option<Bean> {
        let target_type = TargetType::unregistered(Any::type_id(&*bean));
        processor.transform(bean, &target_type).unwrap()
    }

    fn as_string(bean: Option<Bean>) -> String {
        *bean.unwrap().downcast::<String>().unwrap()
    }

    #[test]
    fn test_defaults_and_builder() {
        let processor = append("x");
        assert_eq!(processor.name(), DEFAULT_NAME);
        assert_eq!(processor.order(), DEFAULT_ORDER);

        let processor = processor.with_name("suffix").with_order(5);
        assert_eq!(BeanPostProcessor::name(&processor), "suffix");
        assert_eq!(BeanPostProcessor::order(&processor), 5);
    }

    #[test]
    fn test_and_then_runs_in_order() {
        let processor = append("a").and_then(append("b"));
        assert_eq!(as_string(run(&processor, into_bean(String::new()))), "ab");
    }

    #[test]
    fn test_and_then_is_associative() {
        let left = append("a").and_then(append("b")).and_then(append("c"));
        let right = append("a").and_then(append("b").and_then(append("c")));

        assert_eq!(as_string(run(&left, into_bean(String::new()))), "abc");
        assert_eq!(as_string(run(&right, into_bean(String::new()))), "abc");
    }

    #[test]
    fn test_and_then_keeps_first_name_and_order() {
        let processor = append("a")
            .with_name("first")
            .with_order(1)
            .and_then(append("b").with_name("second").with_order(2));

        assert_eq!(processor.name(), "first");
        assert_eq!(processor.order(), 1);
    }

    #[test]
    fn test_and_then_short_circuits_on_none() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let stop = FunctionalPostProcessor::from_fn(|_, _| Ok(None));
        let next = FunctionalPostProcessor::from_fn(move |bean, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(bean))
        });

        let result = run(&stop.and_then(next), into_bean(String::from("bean")));

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_and_then_propagates_errors() {
        let failing = FunctionalPostProcessor::from_fn(|_, _| Err(anyhow::anyhow!("boom")));
        let processor = failing.and_then(append("never"));

        let bean = into_bean(String::new());
        let target_type = TargetType::unregistered(TypeId::of::<String>());
        let err = processor.transform(bean, &target_type).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_class_annotation_absent_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let processor = FunctionalPostProcessor::by_class_annotation::<Missing, _>(move |bean, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(bean))
        });

        let bean: Bean = Box::new(Service::default());
        let address = &*bean as *const BeanObject as *const ();
        let result = processor.transform(bean, &service_type()).unwrap().unwrap();

        assert_eq!(&*result as *const BeanObject as *const (), address);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_class_annotation_present_dispatches() {
        let processor = FunctionalPostProcessor::by_class_annotation::<Inject, _>(|_, annotation| {
            Ok(Some(into_bean(annotation.0.to_string())))
        });

        let result = processor
            .transform(Box::new(Service::default()), &service_type())
            .unwrap();
        assert_eq!(as_string(result), "service");
    }

    #[test]
    fn test_unregistered_type_has_no_annotations() {
        let processor = FunctionalPostProcessor::by_class_annotation::<Inject, _>(|_, _| Ok(None));
        let result = run(&processor, into_bean(String::from("plain")));
        assert_eq!(as_string(result), "plain");
    }

    #[test]
    fn test_field_annotation_visits_each_annotated_field() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let seen = visited.clone();
        let processor = FunctionalPostProcessor::by_field_annotation::<Inject, _>(move |bean, field, inject| {
            seen.lock().push(field.name());
            set_field(field, bean, format!("injected-{}", inject.0))?;
            Ok(())
        });

        let bean: Bean = Box::new(Service::default());
        let address = &*bean as *const BeanObject as *const ();
        let result = processor.transform(bean, &service_type()).unwrap().unwrap();

        assert_eq!(&*result as *const BeanObject as *const (), address);
        assert_eq!(*visited.lock(), vec!["primary", "secondary"]);

        let service = result.downcast::<Service>().unwrap();
        assert_eq!(service.primary, "injected-a");
        assert_eq!(service.plain, "");
        assert_eq!(service.secondary, "injected-b");
    }

    #[test]
    fn test_field_callback_error_propagates() {
        let processor = FunctionalPostProcessor::by_field_annotation::<Inject, _>(|bean, field, _| {
            set_field(field, bean, 42_u32)?;
            Ok(())
        });

        let err = processor
            .transform(Box::new(Service::default()), &service_type())
            .unwrap_err();
        assert!(err.to_string().contains("primary"));
    }

    #[test]
    fn test_method_annotation_visits_each_annotated_method() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let seen = visited.clone();
        let processor = FunctionalPostProcessor::by_method_annotation::<Inject, _>(move |_, method, inject| {
            seen.lock().push((method.name(), inject.0));
            Ok(())
        });

        let result = processor
            .transform(Box::new(Service::default()), &service_type())
            .unwrap();

        assert!(result.is_some());
        assert_eq!(*visited.lock(), vec![("start", "start"), ("stop", "stop")]);
    }

    #[test]
    fn test_member_annotation_absent_keeps_same_bean() {
        let calls = Arc::new(AtomicUsize::new(0));
        let field_calls = calls.clone();
        let method_calls = calls.clone();
        let by_field = FunctionalPostProcessor::by_field_annotation::<Missing, _>(move |_, _, _| {
            field_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let by_method = FunctionalPostProcessor::by_method_annotation::<Missing, _>(move |_, _, _| {
            method_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let bean: Bean = Box::new(Service::default());
        let address = &*bean as *const BeanObject as *const ();

        let bean = by_field.transform(bean, &service_type()).unwrap().unwrap();
        assert_eq!(&*bean as *const BeanObject as *const (), address);

        let bean = by_method.transform(bean, &service_type()).unwrap().unwrap();
        assert_eq!(&*bean as *const BeanObject as *const (), address);

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(bean.is::<Service>());
    }

    #[test]
    fn test_annotation_name_for_logs() {
        assert_eq!(simple_type_name(Inject("a").annotation_name()), "Inject");
        assert_eq!(simple_type_name(Missing.annotation_name()), "Missing");
    }

    #[test]
    fn test_method_annotation_with_result_folds_in_order() {
        let processor =
            FunctionalPostProcessor::by_method_annotation_with_result::<Inject, _>(|bean, method, _| {
                let trail = match bean.downcast::<String>() {
                    Ok(trail) => format!("{}>{}", trail, method.name()),
                    Err(_) => method.name().to_string(),
                };
                Ok(Some(into_bean(trail)))
            });

        let result = processor
            .transform(Box::new(Service::default()), &service_type())
            .unwrap();
        assert_eq!(as_string(result), "start>stop");
    }

    #[test]
    fn test_method_annotation_with_result_stops_on_none() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let processor =
            FunctionalPostProcessor::by_method_annotation_with_result::<Inject, _>(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            });

        let result = processor
            .transform(Box::new(Service::default()), &service_type())
            .unwrap();

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_method_annotation_with_result_no_match_passes_through() {
        let processor =
            FunctionalPostProcessor::by_method_annotation_with_result::<Missing, _>(|_, _, _| Ok(None));

        let result = processor
            .transform(Box::new(Service::default()), &service_type())
            .unwrap();
        assert!(result.unwrap().is::<Service>());
    }

    #[test]
    fn test_after_initialization_passes_through() {
        let processor = FunctionalPostProcessor::from_fn(|_, _| Ok(None));
        let result = processor
            .post_process_after_initialization(into_bean(1_u8), "number")
            .unwrap();
        assert!(result.is_some());
    }
}
