//! 反射调用的辅助函数
//!
//! 供 `#[reflect_methods]` 生成的调用入口使用，也可以在手写的
//! [`MethodInfo`](super::MethodInfo) 里直接调用。

use std::any::Any;

use crate::bean::{BeanObject, DynValue};
use crate::error::{ReflectError, ReflectResult};

/// 把接收者转换为声明类型的可变引用
pub fn receiver_mut<'a, T: Any>(bean: &'a mut BeanObject, method: &'static str) -> ReflectResult<&'a mut T> {
    bean.downcast_mut::<T>()
        .ok_or(ReflectError::ReceiverMismatch {
            member: method,
            expected: std::any::type_name::<T>(),
        })
}

/// 检查参数个数
pub fn check_arity(method: &'static str, args: &[DynValue], expected: usize) -> ReflectResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ReflectError::ArgumentCount {
            method,
            expected,
            actual: args.len(),
        })
    }
}

/// 取出第 `index` 个参数并转换为 `T`
pub fn take_arg<T: Any>(method: &'static str, index: usize, arg: Option<DynValue>) -> ReflectResult<T> {
    let mismatch = ReflectError::ArgumentType {
        method,
        index,
        expected: std::any::type_name::<T>(),
    };
    let arg = arg.ok_or_else(|| mismatch.clone())?;
    arg.downcast::<T>().map(|value| *value).map_err(|_| mismatch)
}

/// 把返回值装箱
pub fn box_return<R: Any + Send + Sync>(value: R) -> DynValue {
    Box::new(value)
}
