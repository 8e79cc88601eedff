//! 受管对象（Bean）的类型别名
//!
//! 后置处理阶段 Bean 由处理链独占持有，因此使用 `Box` 而不是 `Arc`：
//! 字段注入、方法调用都可以直接拿到 `&mut`，不需要内部可变性。

use std::any::Any;

/// Bean 的借用形式，反射操作统一以它作为接收者
pub type BeanObject = dyn Any + Send + Sync;

/// 正在初始化的 Bean 实例
pub type Bean = Box<BeanObject>;

/// 反射调用的参数与返回值
pub type DynValue = Box<BeanObject>;

/// 把任意值装箱成 Bean
pub fn into_bean<T: Any + Send + Sync>(value: T) -> Bean {
    Box::new(value)
}

/// 把 Bean 还原为具体类型，类型不符时原样返回 Bean
pub fn downcast_bean<T: Any + Send + Sync>(bean: Bean) -> std::result::Result<Box<T>, Bean> {
    bean.downcast::<T>()
}
