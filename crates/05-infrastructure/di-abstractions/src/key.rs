//! 组件键
//!
//! 组件通过键注册和查找。键可以是服务协议、具体类型或普通名称。

use crate::component::Injectable;
use crate::dependency::Dependency;
use crate::error::DependencyResult;
use crate::instance::Instance;
use crate::parameter::Parameters;
use infrastructure_common::TypeInfo;
use std::fmt;

/// 服务协议描述符
///
/// 通常描述一个 `dyn Trait` 类型，例如 `ServiceId::of::<dyn Engine>()`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId(TypeInfo);

impl ServiceId {
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self(TypeInfo::of::<S>())
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.0
    }

    pub fn name(&self) -> &'static str {
        self.0.short_name()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 具体类型描述符
///
/// 由 [`Injectable`] 实现生成，携带构造函数、声明的依赖以及实现的服务协议。
#[derive(Clone, Copy)]
pub struct ClassId {
    info: TypeInfo,
    construct: fn(Parameters) -> DependencyResult<Instance>,
    dependencies: fn() -> Option<Vec<Dependency>>,
    services: fn() -> Vec<ServiceId>,
}

impl ClassId {
    pub fn of<T: Injectable>() -> Self {
        Self {
            info: TypeInfo::of::<T>(),
            construct: construct_instance::<T>,
            dependencies: declared_dependencies::<T>,
            services: T::services,
        }
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.info
    }

    pub fn name(&self) -> &'static str {
        self.info.short_name()
    }

    /// 使用解析好的参数构造实例
    pub fn construct(&self, parameters: Parameters) -> DependencyResult<Instance> {
        (self.construct)(parameters)
    }

    /// 类型声明的依赖，自身声明优先于继承的声明
    pub fn declared_dependencies(&self) -> Option<Vec<Dependency>> {
        (self.dependencies)()
    }

    /// 是否实现了指定服务协议
    pub fn conforms_to(&self, service: &ServiceId) -> bool {
        (self.services)().contains(service)
    }
}

fn construct_instance<T: Injectable>(parameters: Parameters) -> DependencyResult<Instance> {
    T::create(parameters).map(T::into_instance)
}

fn declared_dependencies<T: Injectable>() -> Option<Vec<Dependency>> {
    T::dependencies().or_else(T::inherited_dependencies)
}

impl PartialEq for ClassId {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info
    }
}

impl Eq for ClassId {}

impl std::hash::Hash for ClassId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.info.hash(state);
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassId").field(&self.info.path).finish()
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 组件键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKey {
    /// 服务协议
    Service(ServiceId),
    /// 具体类型
    Class(ClassId),
    /// 普通名称
    Name(String),
}

impl ComponentKey {
    pub fn service<S: ?Sized + 'static>() -> Self {
        Self::Service(ServiceId::of::<S>())
    }

    pub fn class<T: Injectable>() -> Self {
        Self::Class(ClassId::of::<T>())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn as_service(&self) -> Option<&ServiceId> {
        match self {
            Self::Service(service) => Some(service),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassId> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(service) => service.fmt(f),
            Self::Class(class) => class.fmt(f),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<ServiceId> for ComponentKey {
    fn from(service: ServiceId) -> Self {
        Self::Service(service)
    }
}

impl From<ClassId> for ComponentKey {
    fn from(class: ClassId) -> Self {
        Self::Class(class)
    }
}

impl From<&str> for ComponentKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ComponentKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}
