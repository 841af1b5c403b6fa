//! 组件工厂抽象
//!
//! 提供组件实例创建和创建后拦截的函数类型

use crate::error::DependencyResult;
use crate::instance::Instance;
use crate::parameter::Parameters;
use std::any::Any;
use std::sync::Arc;

/// 组件工厂函数类型
///
/// 接收按依赖声明顺序组装好的参数列表。
pub type Factory = Arc<dyn Fn(Parameters) -> DependencyResult<Instance> + Send + Sync>;

/// 组件拦截器函数类型
///
/// 在工厂创建实例之后按顺序调用，可以包装或替换实例。
pub type Interceptor = Arc<dyn Fn(Instance) -> DependencyResult<Instance> + Send + Sync>;

/// 从返回具体类型的闭包创建工厂
pub fn factory_fn<T, F>(factory: F) -> Factory
where
    T: Any + Send + Sync,
    F: Fn(Parameters) -> DependencyResult<T> + Send + Sync + 'static,
{
    Arc::new(move |parameters| factory(parameters).map(|value| Arc::new(value) as Instance))
}

/// 每次都返回同一实例的工厂
pub fn instance_factory(instance: Instance) -> Factory {
    Arc::new(move |_| Ok(instance.clone()))
}

/// 从闭包创建拦截器
pub fn interceptor_fn<F>(interceptor: F) -> Interceptor
where
    F: Fn(Instance) -> DependencyResult<Instance> + Send + Sync + 'static,
{
    Arc::new(interceptor)
}
