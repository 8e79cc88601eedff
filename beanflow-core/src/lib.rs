// beanflow-core: 函数式的 Bean 后置处理
//
// 用普通函数代替 BeanPostProcessor 实现，支持：
// - 代理对象解析为真实类型
// - 按类型、字段、方法上的注解分派
// - 处理器串联（and_then）
// - 编译期生成的类型元数据（通过宏）

pub mod bean;
pub mod bean_post_processor;
pub mod config;
pub mod error;
pub mod logging;
pub mod processor;
pub mod reflect;
pub mod utils;

// 重新导出常用类型
pub use bean::{downcast_bean, into_bean, Bean, BeanObject, DynValue};
pub use bean_post_processor::{BeanPostProcessor, BeanPostProcessorRegistry, Phase};
pub use config::{LoggingSettings, ProcessorSettings, Settings};
pub use error::{ConfigError, ReflectError, ReflectResult, Result};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use processor::FunctionalPostProcessor;
pub use reflect::{
    find_annotation, for_each_field, for_each_method, get_field, get_field_mut, invoke_method,
    resolve_concrete_type, set_field, AnnotatedElement, Annotation, Annotations, Field, Method,
    Reflect, TargetType, TargetTypeAware, TypeInfo, TypeRegistry,
};

// 导出 inventory 和 once_cell，供宏使用
pub use inventory;
pub use once_cell;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::bean::{into_bean, Bean, BeanObject, DynValue};
    pub use crate::bean_post_processor::{BeanPostProcessor, BeanPostProcessorRegistry};
    pub use crate::config::Settings;
    pub use crate::error::Result;
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::processor::FunctionalPostProcessor;
    pub use crate::reflect::{
        find_annotation, for_each_field, for_each_method, get_field, get_field_mut,
        invoke_method, resolve_concrete_type, set_field, AnnotatedElement, Annotation, Field,
        Method, Reflect, TargetType, TargetTypeAware,
    };
    // Re-export anyhow for convenience
    pub use anyhow::{anyhow, Context};
}
