//! BeanPostProcessor - Bean 工厂扩展机制
//!
//! 宿主容器在每个 Bean 初始化前后调用一次处理链，类似 Spring 的 BeanPostProcessor。
//! 处理器返回 `None` 表示放弃该 Bean，链上后续的处理器不再执行。

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use parking_lot::RwLock;

use crate::bean::Bean;
use crate::config::ProcessorSettings;
use crate::error::Result;

/// BeanPostProcessor trait
///
/// 在 Bean 初始化的不同阶段提供钩子，允许自定义修改 Bean 实例
///
/// 使用场景：
/// - 代理替换
/// - Bean 包装
/// - 属性注入增强
/// - 验证等
///
/// 大多数情况下不需要直接实现此 trait，使用
/// [`FunctionalPostProcessor`](crate::processor::FunctionalPostProcessor) 传入函数即可。
///
/// # 示例
///
/// ```ignore
/// use beanflow_core::prelude::*;
///
/// pub struct LoggingBeanPostProcessor;
///
/// impl BeanPostProcessor for LoggingBeanPostProcessor {
///     fn post_process_before_initialization(
///         &self,
///         bean: Bean,
///         bean_name: &str,
///     ) -> Result<Option<Bean>> {
///         tracing::info!("Before initialization: {}", bean_name);
///         Ok(Some(bean))
///     }
/// }
/// ```
pub trait BeanPostProcessor: Send + Sync {
    /// 在 Bean 初始化回调之前调用
    ///
    /// # 返回
    /// - `Some(bean)`: 原始 Bean 或替换后的 Bean，继续初始化
    /// - `None`: 不再继续处理该 Bean
    fn post_process_before_initialization(&self, bean: Bean, _bean_name: &str) -> Result<Option<Bean>> {
        Ok(Some(bean))
    }

    /// 在 Bean 初始化回调之后调用，返回值语义同上
    fn post_process_after_initialization(&self, bean: Bean, _bean_name: &str) -> Result<Option<Bean>> {
        Ok(Some(bean))
    }

    /// 获取处理器的名称（用于日志和配置）
    fn name(&self) -> &str {
        "BeanPostProcessor"
    }

    /// 获取处理器的优先级（数字越小优先级越高）
    fn order(&self) -> i32 {
        1000
    }
}

/// 处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BeforeInitialization,
    AfterInitialization,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::BeforeInitialization => write!(f, "before initialization"),
            Phase::AfterInitialization => write!(f, "after initialization"),
        }
    }
}

/// BeanPostProcessor 注册表
///
/// 宿主容器持有一个注册表，在每个 Bean 的初始化点调用
/// [`apply_before_initialization`](Self::apply_before_initialization)。
/// 处理器按 `order` 升序执行，相同 `order` 保持注册顺序。
pub struct BeanPostProcessorRegistry {
    processors: RwLock<Vec<Arc<dyn BeanPostProcessor>>>,
    settings: ProcessorSettings,
}

impl BeanPostProcessorRegistry {
    /// 创建新的注册表
    pub fn new() -> Self {
        Self::with_settings(ProcessorSettings::default())
    }

    /// 使用指定配置创建注册表
    pub fn with_settings(settings: ProcessorSettings) -> Self {
        Self {
            processors: RwLock::new(Vec::new()),
            settings,
        }
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    /// 添加 BeanPostProcessor
    pub fn add(&self, processor: Arc<dyn BeanPostProcessor>) {
        let mut processors = self.processors.write();
        tracing::info!(
            "Registering BeanPostProcessor '{}' (order: {})",
            processor.name(),
            processor.order()
        );
        processors.push(processor);

        // 按优先级排序（order 值越小优先级越高），稳定排序保持注册顺序
        processors.sort_by_key(|p| p.order());
    }

    /// 添加 BeanPostProcessor（按值）
    pub fn register<P: BeanPostProcessor + 'static>(&self, processor: P) {
        self.add(Arc::new(processor));
    }

    /// 获取所有 BeanPostProcessor（按执行顺序）
    pub fn processors(&self) -> Vec<Arc<dyn BeanPostProcessor>> {
        self.processors.read().clone()
    }

    pub fn len(&self) -> usize {
        self.processors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.read().is_empty()
    }

    /// 应用 BeanPostProcessor.postProcessBeforeInitialization
    pub fn apply_before_initialization(&self, bean: Bean, bean_name: &str) -> Result<Option<Bean>> {
        self.apply(Phase::BeforeInitialization, bean, bean_name)
    }

    /// 应用 BeanPostProcessor.postProcessAfterInitialization
    pub fn apply_after_initialization(&self, bean: Bean, bean_name: &str) -> Result<Option<Bean>> {
        self.apply(Phase::AfterInitialization, bean, bean_name)
    }

    fn apply(&self, phase: Phase, bean: Bean, bean_name: &str) -> Result<Option<Bean>> {
        if !self.settings.enabled {
            tracing::trace!("Post-processing disabled, passing '{}' through", bean_name);
            return Ok(Some(bean));
        }

        // 先取快照再执行，处理器内部可以继续注册新的处理器
        let processors = self.processors();
        let mut current = bean;

        for processor in processors.iter() {
            if self.settings.is_disabled(processor.name()) {
                tracing::trace!("Skipping disabled BeanPostProcessor '{}'", processor.name());
                continue;
            }

            let result = match phase {
                Phase::BeforeInitialization => {
                    processor.post_process_before_initialization(current, bean_name)
                }
                Phase::AfterInitialization => {
                    processor.post_process_after_initialization(current, bean_name)
                }
            }
            .with_context(|| {
                format!(
                    "BeanPostProcessor '{}' failed {} of bean '{}'",
                    processor.name(),
                    phase,
                    bean_name
                )
            })?;

            match result {
                Some(next) => current = next,
                None => {
                    tracing::debug!(
                        "BeanPostProcessor '{}' stopped processing of bean '{}' {}",
                        processor.name(),
                        bean_name,
                        phase
                    );
                    return Ok(None);
                }
            }
        }

        Ok(Some(current))
    }
}

impl Default for BeanPostProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BeanPostProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .processors
            .read()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        f.debug_struct("BeanPostProcessorRegistry")
            .field("processors", &names)
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{downcast_bean, into_bean};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 在字符串 Bean 后追加自己的标签
    struct Append {
        label: &'static str,
        order: i32,
    }

    impl BeanPostProcessor for Append {
        fn post_process_before_initialization(&self, bean: Bean, _bean_name: &str) -> Result<Option<Bean>> {
            let mut value = downcast_bean::<String>(bean)
                .map_err(|_| anyhow::anyhow!("not a string"))?;
            value.push_str(self.label);
            Ok(Some(value as Bean))
        }

        fn name(&self) -> &str {
            self.label
        }

        fn order(&self) -> i32 {
            self.order
        }
    }

    struct Reject;

    impl BeanPostProcessor for Reject {
        fn post_process_before_initialization(&self, _bean: Bean, _bean_name: &str) -> Result<Option<Bean>> {
            Ok(None)
        }

        fn name(&self) -> &str {
            "reject"
        }

        fn order(&self) -> i32 {
            10
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl BeanPostProcessor for Counting {
        fn post_process_before_initialization(&self, bean: Bean, _bean_name: &str) -> Result<Option<Bean>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Some(bean))
        }

        fn order(&self) -> i32 {
            20
        }
    }

    fn run(registry: &BeanPostProcessorRegistry) -> Option<String> {
        registry
            .apply_before_initialization(into_bean(String::new()), "bean")
            .unwrap()
            .map(|bean| *downcast_bean::<String>(bean).unwrap())
    }

    #[test]
    fn test_processors_run_in_order() {
        let registry = BeanPostProcessorRegistry::new();
        registry.register(Append { label: "c", order: 300 });
        registry.register(Append { label: "a", order: 100 });
        registry.register(Append { label: "b", order: 200 });

        assert_eq!(run(&registry).as_deref(), Some("abc"));
    }

    #[test]
    fn test_equal_order_keeps_registration_order() {
        let registry = BeanPostProcessorRegistry::new();
        registry.register(Append { label: "x", order: 1 });
        registry.register(Append { label: "y", order: 1 });

        assert_eq!(run(&registry).as_deref(), Some("xy"));
    }

    #[test]
    fn test_none_stops_the_chain() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = BeanPostProcessorRegistry::new();
        registry.register(Reject);
        registry.register(Counting(Arc::clone(&counter)));

        assert_eq!(run(&registry), None);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_error_carries_processor_and_bean_name() {
        let registry = BeanPostProcessorRegistry::new();
        registry.register(Append { label: "a", order: 1 });

        let err = registry
            .apply_before_initialization(into_bean(1_u8), "numberBean")
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("'a'"));
        assert!(message.contains("'numberBean'"));
        assert!(message.contains("not a string"));
    }

    #[test]
    fn test_after_initialization_defaults_to_pass_through() {
        let registry = BeanPostProcessorRegistry::new();
        registry.register(Reject);

        let bean = registry
            .apply_after_initialization(into_bean(String::from("kept")), "bean")
            .unwrap();
        assert!(bean.is_some());
    }

    #[test]
    fn test_disabled_registry_passes_through() {
        let registry = BeanPostProcessorRegistry::with_settings(ProcessorSettings {
            enabled: false,
            ..ProcessorSettings::default()
        });
        registry.register(Reject);

        assert_eq!(run(&registry).as_deref(), Some(""));
    }

    #[test]
    fn test_disabled_processor_is_skipped() {
        let registry = BeanPostProcessorRegistry::with_settings(ProcessorSettings {
            enabled: true,
            disabled: vec!["reject".to_string()],
        });
        registry.register(Reject);
        registry.register(Append { label: "a", order: 50 });

        assert_eq!(run(&registry).as_deref(), Some("a"));
        assert_eq!(registry.len(), 2);
    }
}
