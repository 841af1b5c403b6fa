//! 工厂参数
//!
//! 依赖解析完成后按声明顺序组装成 [`Parameters`] 传给工厂

use crate::error::{DependencyError, DependencyResult};
use crate::instance::{downcast_instance, Instance, InstanceFuture};
use futures::future::{self, FutureExt};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 单个工厂参数
pub enum Parameter {
    /// 已解析的实例或字面值
    Value(Instance),
    /// `promise` 修饰的依赖
    Promise(InstanceFuture),
    /// `lazy` 修饰的依赖
    Lazy(LazyDependency),
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Parameter::Value"),
            Self::Promise(_) => f.write_str("Parameter::Promise"),
            Self::Lazy(_) => f.write_str("Parameter::Lazy"),
        }
    }
}

/// 延迟解析的依赖
///
/// 创建时不做任何解析，每次调用 [`LazyDependency::resolve`] 才向容器请求实例。
#[derive(Clone)]
pub struct LazyDependency {
    resolver: Arc<dyn Fn() -> InstanceFuture + Send + Sync>,
}

impl LazyDependency {
    pub fn new<F>(resolver: F) -> Self
    where
        F: Fn() -> InstanceFuture + Send + Sync + 'static,
    {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// 总是返回同一字面值的延迟依赖
    pub fn ready(instance: Instance) -> Self {
        Self::new(move || future::ready(Ok(instance.clone())).boxed())
    }

    pub fn resolve(&self) -> InstanceFuture {
        (self.resolver)()
    }

    pub async fn resolve_as<T: Any + Send + Sync>(&self) -> DependencyResult<Arc<T>> {
        downcast_instance(self.resolve().await?)
    }
}

impl fmt::Debug for LazyDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyDependency")
    }
}

/// 工厂参数列表
#[derive(Debug, Default)]
pub struct Parameters {
    slots: Vec<Option<Parameter>>,
}

impl Parameters {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self {
            slots: parameters.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, index: usize) -> DependencyResult<&Parameter> {
        self.slots
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(DependencyError::ParameterMismatch {
                index,
                expected: "可用参数",
            })
    }

    /// 已解析的实例
    pub fn instance(&self, index: usize) -> DependencyResult<Instance> {
        match self.slot(index)? {
            Parameter::Value(instance) => Ok(instance.clone()),
            _ => Err(DependencyError::ParameterMismatch {
                index,
                expected: "已解析的值",
            }),
        }
    }

    /// 已解析的实例并转换为具体类型
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> DependencyResult<Arc<T>> {
        downcast_instance(self.instance(index)?)
    }

    /// 延迟依赖
    pub fn lazy(&self, index: usize) -> DependencyResult<LazyDependency> {
        match self.slot(index)? {
            Parameter::Lazy(lazy) => Ok(lazy.clone()),
            _ => Err(DependencyError::ParameterMismatch {
                index,
                expected: "延迟依赖",
            }),
        }
    }

    /// 取出参数，之后该位置不再可用
    pub fn take(&mut self, index: usize) -> DependencyResult<Parameter> {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(DependencyError::ParameterMismatch {
                index,
                expected: "可用参数",
            })
    }

    /// 取出 `promise` 参数
    pub fn take_promise(&mut self, index: usize) -> DependencyResult<InstanceFuture> {
        match self.take(index)? {
            Parameter::Promise(promise) => Ok(promise),
            other => {
                self.slots[index] = Some(other);
                Err(DependencyError::ParameterMismatch {
                    index,
                    expected: "future",
                })
            }
        }
    }
}

impl FromIterator<Parameter> for Parameters {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
