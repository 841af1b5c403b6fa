//! 组件基础接口定义
//!
//! 可注册的具体类型必须实现此 trait

use crate::dependency::Dependency;
use crate::error::DependencyResult;
use crate::instance::Instance;
use crate::key::ServiceId;
use crate::parameter::Parameters;
use std::sync::Arc;

/// 可注入组件 trait
///
/// 依赖在类型上静态声明，容器按声明顺序解析后通过 [`Parameters`] 传给 [`Injectable::create`]。
pub trait Injectable: Send + Sync + Sized + 'static {
    /// 类型自身声明的依赖
    fn dependencies() -> Option<Vec<Dependency>> {
        None
    }

    /// 从基础类型继承的依赖声明
    fn inherited_dependencies() -> Option<Vec<Dependency>> {
        None
    }

    /// 类型实现的服务协议
    fn services() -> Vec<ServiceId> {
        Vec::new()
    }

    /// 使用依赖注入构建组件实例
    fn create(parameters: Parameters) -> DependencyResult<Self>;

    /// 转换为容器保存的实例
    ///
    /// 以服务协议注册的组件可以重写此方法，例如保存 `Arc<dyn Engine>`。
    fn into_instance(self) -> Instance {
        Arc::new(self)
    }
}
