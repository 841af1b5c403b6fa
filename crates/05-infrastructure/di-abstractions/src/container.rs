//! 依赖注入容器配置

use serde::{Deserialize, Serialize};
use std::fmt;

/// 容器标识
///
/// 解析节点用它记录负责解析的容器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(uuid::Uuid);

impl ContainerId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 未指定生命周期策略时使用的默认生命周期
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifestyleKind {
    #[default]
    Singleton,
    Transient,
}

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用循环依赖检测
    pub enable_circular_dependency_detection: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 是否在注册前验证组件模型
    pub enable_component_validation: bool,
    /// 默认生命周期
    pub default_lifestyle: LifestyleKind,
    /// 单例创建完成后是否用实例替换原提供者
    pub replace_resolved_singletons: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_circular_dependency_detection: true,
            max_resolution_depth: 100,
            enable_component_validation: true,
            default_lifestyle: LifestyleKind::Singleton,
            replace_resolved_singletons: true,
        }
    }
}
