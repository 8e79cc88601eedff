use beanflow_core::prelude::*;
use beanflow_macros::{reflect_methods, Annotation, Reflect};

// ==================== 注解定义 ====================

/// 标记需要被替换的 Bean
#[derive(Debug, Annotation)]
struct Replaceable;

/// 字段注入 - 把值写入字段
#[derive(Debug, Annotation)]
struct Value(&'static str);

/// 方法注入 - 用值调用方法
#[derive(Debug, Annotation)]
struct Setter(&'static str);

// ==================== Bean 定义 ====================

trait Greeting: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Reflect)]
struct StaticGreeting {
    message: String,
}

impl Greeting for StaticGreeting {
    fn greet(&self) -> String {
        self.message.clone()
    }
}

#[derive(Reflect)]
#[annotate(Replaceable)]
struct LegacyGreeting {
    message: String,
}

impl Greeting for LegacyGreeting {
    fn greet(&self) -> String {
        self.message.clone()
    }
}

#[derive(Reflect, Debug)]
struct DatabaseConfig {
    #[annotate(Value("CHANGED"))]
    url: String,

    pool_size: u32,
}

#[derive(Reflect, Debug)]
struct UserService {
    name: String,
}

#[reflect_methods]
impl UserService {
    #[annotate(Setter("CHANGED"))]
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

fn describe(bean: Option<Bean>) -> String {
    let Some(bean) = bean else {
        return "<removed>".to_string();
    };

    if let Some(greeting) = bean.downcast_ref::<StaticGreeting>() {
        return format!("StaticGreeting -> {}", greeting.greet());
    }
    if let Some(greeting) = bean.downcast_ref::<LegacyGreeting>() {
        return format!("LegacyGreeting -> {}", greeting.greet());
    }
    if let Some(config) = bean.downcast_ref::<DatabaseConfig>() {
        return format!("{:?}", config);
    }
    if let Some(service) = bean.downcast_ref::<UserService>() {
        return format!("{:?}", service);
    }
    "<unknown>".to_string()
}

fn load_settings() -> anyhow::Result<Settings> {
    // 查找配置文件
    let config_paths = ["demos/processor-demo/application.toml", "application.toml"];

    let settings = match config_paths.iter().find(|path| std::path::Path::new(path).exists()) {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    Ok(settings.apply_env()?)
}

fn main() -> anyhow::Result<()> {
    let settings = load_settings()?;
    settings.logging_config()?.apply_env().init()?;

    println!("\n╔════════════════════════════════════════════════════╗");
    println!("║     Beanflow - Functional Post Processors          ║");
    println!("╚════════════════════════════════════════════════════╝\n");

    let registry = BeanPostProcessorRegistry::with_settings(settings.processors.clone());

    // 1. 按类型替换：所有 StaticGreeting 都换成新的实例
    registry.register(
        FunctionalPostProcessor::from_fn(|bean, target_type| {
            if target_type.is::<StaticGreeting>() {
                return Ok(Some(into_bean(StaticGreeting {
                    message: "CHANGED".to_string(),
                })));
            }
            Ok(Some(bean))
        })
        .with_name("greetingReplacer")
        .with_order(10),
    );

    // 2. 按类型注解替换
    registry.register(
        FunctionalPostProcessor::by_class_annotation::<Replaceable, _>(|_, _| {
            Ok(Some(into_bean(StaticGreeting {
                message: "CHANGED".to_string(),
            })))
        })
        .with_name("replaceableProcessor")
        .with_order(20),
    );

    // 3 + 4. 字段注入和方法注入串联成一个处理器
    registry.register(
        FunctionalPostProcessor::by_field_annotation::<Value, _>(|bean, field, value| {
            set_field(field, bean, value.0.to_string())?;
            Ok(())
        })
        .and_then(FunctionalPostProcessor::by_method_annotation::<Setter, _>(
            |bean, method, setter| {
                invoke_method(method, bean, vec![into_bean(setter.0.to_string())])?;
                Ok(())
            },
        ))
        .with_name("injectionProcessor")
        .with_order(30),
    );

    tracing::info!("Registered {} processor(s)", registry.len());

    let beans: Vec<(&str, Bean)> = vec![
        (
            "staticGreeting",
            into_bean(StaticGreeting {
                message: "NOT_CHANGED".to_string(),
            }),
        ),
        (
            "legacyGreeting",
            into_bean(LegacyGreeting {
                message: "NOT_CHANGED".to_string(),
            }),
        ),
        (
            "databaseConfig",
            into_bean(DatabaseConfig {
                url: "NOT_CHANGED".to_string(),
                pool_size: 8,
            }),
        ),
        (
            "userService",
            into_bean(UserService {
                name: "NOT_CHANGED".to_string(),
            }),
        ),
    ];

    for (bean_name, bean) in beans {
        let processed = registry.apply_before_initialization(bean, bean_name)?;
        println!("📦 {:<16} {}", bean_name, describe(processed));
    }

    println!();
    Ok(())
}
