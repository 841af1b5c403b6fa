//! 组件实例与解析结果

use crate::error::{DependencyError, DependencyResult};
use futures::future::{self, BoxFuture, FutureExt};
use std::any::Any;
use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;

/// 类型擦除的组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 异步解析中的组件实例
pub type InstanceFuture = BoxFuture<'static, DependencyResult<Instance>>;

/// 一次解析的结果：立即可用、等待中或失败
///
/// 实现了 [`IntoFuture`]，可以直接 `.await`。
pub enum Resolution {
    Ready(Instance),
    Pending(InstanceFuture),
    Failed(DependencyError),
}

impl Resolution {
    pub fn from_result(result: DependencyResult<Instance>) -> Self {
        match result {
            Ok(instance) => Self::Ready(instance),
            Err(error) => Self::Failed(error),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// 立即可用的实例
    pub fn ready(&self) -> Option<&Instance> {
        match self {
            Self::Ready(instance) => Some(instance),
            _ => None,
        }
    }

    /// 同步失败的错误
    pub fn error(&self) -> Option<&DependencyError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl IntoFuture for Resolution {
    type Output = DependencyResult<Instance>;
    type IntoFuture = InstanceFuture;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(instance) => future::ready(Ok(instance)).boxed(),
            Self::Pending(pending) => pending,
            Self::Failed(error) => future::ready(Err(error)).boxed(),
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Resolution::Ready"),
            Self::Pending(_) => f.write_str("Resolution::Pending"),
            Self::Failed(error) => f.debug_tuple("Resolution::Failed").field(error).finish(),
        }
    }
}

/// 将实例转换为具体类型
pub fn downcast_instance<T: Any + Send + Sync>(instance: Instance) -> DependencyResult<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| DependencyError::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })
}
