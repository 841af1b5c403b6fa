//! 依赖解析错误类型

use crate::resolver::DependencyResolution;
use std::sync::Arc;
use thiserror::Error;

/// 依赖注入错误类型
///
/// 可以克隆，以便在共享的 future 之间传递同一个失败结果。
#[derive(Error, Debug, Clone)]
pub enum DependencyError {
    /// 无法满足的依赖，携带失败的解析节点
    #[error("无法解析一个或多个依赖")]
    Unresolved { dependency: Arc<DependencyResolution> },

    #[error("循环依赖检测到: {chain}")]
    CircularDependency {
        chain: String,
        dependency: Arc<DependencyResolution>,
    },

    #[error("超过最大解析深度 {max_depth}: {chain}")]
    DepthExceeded { max_depth: usize, chain: String },

    #[error("组件创建失败: {component}, 原因: {message}")]
    ComponentCreationFailed { component: String, message: String },

    #[error("参数 {index} 不是{expected}")]
    ParameterMismatch { index: usize, expected: &'static str },

    #[error("类型转换失败: 期望 {expected}")]
    TypeMismatch { expected: &'static str },
}

impl DependencyError {
    /// 创建依赖无法解析错误
    pub fn unresolved(dependency: Arc<DependencyResolution>) -> Self {
        Self::Unresolved { dependency }
    }

    /// 创建组件创建失败错误
    pub fn creation_failed(component: impl ToString, message: impl Into<String>) -> Self {
        Self::ComponentCreationFailed {
            component: component.to_string(),
            message: message.into(),
        }
    }

    /// 导致失败的解析节点
    pub fn dependency(&self) -> Option<&Arc<DependencyResolution>> {
        match self {
            Self::Unresolved { dependency } | Self::CircularDependency { dependency, .. } => {
                Some(dependency)
            }
            _ => None,
        }
    }
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
