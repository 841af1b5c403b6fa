//! 组件策略与生命周期抽象接口

use crate::dependency::Dependency;
use crate::factory::{Factory, Interceptor};
use crate::instance::Resolution;
use crate::key::ComponentKey;
use std::fmt::Debug;

/// 组件策略 trait
///
/// 四个操作都是可选的，默认实现原样传递输入。组件模型按组合顺序依次应用各个策略，
/// 后组合的策略可以覆盖之前的结果。
pub trait ComponentPolicy: Send + Sync + Debug {
    /// 根据当前键计算有效的组件键
    fn effective_key(&self, key: Option<ComponentKey>) -> Option<ComponentKey> {
        key
    }

    /// 根据当前工厂计算有效的组件工厂
    fn effective_factory(&self, factory: Option<Factory>) -> Option<Factory> {
        factory
    }

    /// 收集组件依赖
    fn collect_dependencies(&self, _dependencies: &mut Vec<Dependency>) {}

    /// 收集组件拦截器
    fn collect_interceptors(&self, _interceptors: &mut Vec<Interceptor>) {}
}

/// 生命周期策略 trait
///
/// 决定一次解析使用的实例。`factory` 的参数表示本次创建的实例之后是否可以
/// 直接替换组件的提供者。
pub trait Lifestyle: ComponentPolicy {
    fn resolve(&self, factory: &dyn Fn(bool) -> Resolution) -> Resolution;
}
