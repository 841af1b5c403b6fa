//! 组件依赖声明

use crate::instance::Instance;
use crate::key::{ClassId, ComponentKey, ServiceId};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 依赖目标
#[derive(Clone)]
pub enum DependencyTarget {
    /// 需要通过容器解析的键
    Key(ComponentKey),
    /// 直接使用的字面值
    Value(Instance),
}

/// 依赖修饰符
///
/// 两个修饰符相互独立，可以组合使用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// 延迟解析：参数为一个调用时才解析的函数
    pub lazy: bool,
    /// 参数为一个 future
    pub promise: bool,
}

/// 组件依赖
#[derive(Clone)]
pub struct Dependency {
    target: DependencyTarget,
    modifiers: Modifiers,
}

impl Dependency {
    /// 依赖指定键的组件
    pub fn on(key: impl Into<ComponentKey>) -> Self {
        Self {
            target: DependencyTarget::Key(key.into()),
            modifiers: Modifiers::default(),
        }
    }

    /// 直接使用字面值
    pub fn using<T: Any + Send + Sync>(value: T) -> Self {
        Self::using_instance(Arc::new(value))
    }

    pub fn using_instance(instance: Instance) -> Self {
        Self {
            target: DependencyTarget::Value(instance),
            modifiers: Modifiers::default(),
        }
    }

    pub fn lazy(mut self) -> Self {
        self.modifiers.lazy = true;
        self
    }

    pub fn promise(mut self) -> Self {
        self.modifiers.promise = true;
        self
    }

    pub fn target(&self) -> &DependencyTarget {
        &self.target
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// 被依赖的键，字面值依赖返回 `None`
    pub fn key(&self) -> Option<&ComponentKey> {
        match &self.target {
            DependencyTarget::Key(key) => Some(key),
            DependencyTarget::Value(_) => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.target, DependencyTarget::Value(_))
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Dependency");
        match &self.target {
            DependencyTarget::Key(key) => debug.field("key", key),
            DependencyTarget::Value(_) => debug.field("value", &"<literal>"),
        };
        debug.field("modifiers", &self.modifiers).finish()
    }
}

impl From<ComponentKey> for Dependency {
    fn from(key: ComponentKey) -> Self {
        Self::on(key)
    }
}

impl From<ServiceId> for Dependency {
    fn from(service: ServiceId) -> Self {
        Self::on(service)
    }
}

impl From<ClassId> for Dependency {
    fn from(class: ClassId) -> Self {
        Self::on(class)
    }
}

impl From<&str> for Dependency {
    fn from(name: &str) -> Self {
        Self::on(name)
    }
}
