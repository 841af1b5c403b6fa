//! 组件提供者抽象接口

use crate::instance::{Instance, Resolution};
use crate::key::ComponentKey;
use crate::resolver::ResolutionContext;
use std::sync::Arc;

/// 组件组合器 trait
///
/// 负责按键查找组件。返回 `None` 表示没有任何提供者能够处理此键，
/// 与解析出的任何实例都不同。
pub trait Composer: Send + Sync {
    fn resolve(&self, key: &ComponentKey, context: ResolutionContext) -> Option<Resolution>;
}

/// 组件提供者函数类型
///
/// 接收解析上下文和用于解析嵌套依赖的组合器。
pub type Provider =
    Arc<dyn Fn(&ResolutionContext, &Arc<dyn Composer>) -> Option<Resolution> + Send + Sync>;

/// 总是返回同一实例的提供者
pub fn value_provider(instance: Instance) -> Provider {
    Arc::new(move |_, _| Some(Resolution::Ready(instance.clone())))
}
