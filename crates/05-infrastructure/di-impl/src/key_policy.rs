//! 组件键策略
//!
//! 保存组件的键、服务协议、具体类型、工厂和显式依赖，
//! 未设置的部分由其他字段推导。

use di_abstractions::{
    ClassId, ComponentKey, ComponentPolicy, Dependency, Factory, ServiceId,
};
use infrastructure_common::{ComponentError, ComponentResult};
use std::fmt;
use std::sync::Arc;

/// 组件键策略
#[derive(Clone, Default)]
pub struct ComponentKeyPolicy {
    key: Option<ComponentKey>,
    service: Option<ServiceId>,
    class: Option<ClassId>,
    factory: Option<Factory>,
    dependencies: Option<Vec<Dependency>>,
}

impl ComponentKeyPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&ComponentKey> {
        self.key.as_ref()
    }

    pub fn service(&self) -> Option<&ServiceId> {
        self.service.as_ref()
    }

    pub fn class(&self) -> Option<&ClassId> {
        self.class.as_ref()
    }

    pub fn factory(&self) -> Option<&Factory> {
        self.factory.as_ref()
    }

    pub fn dependencies(&self) -> Option<&[Dependency]> {
        self.dependencies.as_deref()
    }

    pub fn set_key(&mut self, key: impl Into<ComponentKey>) {
        self.key = Some(key.into());
    }

    /// 设置服务协议，不是服务协议的键会被拒绝
    pub fn set_service(&mut self, service: impl Into<ComponentKey>) -> ComponentResult<()> {
        match service.into() {
            ComponentKey::Service(service) => {
                self.service = Some(service);
                Ok(())
            }
            other => Err(ComponentError::invalid_value(other, "服务协议")),
        }
    }

    /// 设置具体类型，不是具体类型的键会被拒绝
    pub fn set_class(&mut self, class: impl Into<ComponentKey>) -> ComponentResult<()> {
        match class.into() {
            ComponentKey::Class(class) => {
                self.set_class_id(class);
                Ok(())
            }
            other => Err(ComponentError::invalid_value(other, "具体类型")),
        }
    }

    pub(crate) fn set_class_id(&mut self, class: ClassId) {
        self.class = Some(class);
    }

    pub fn set_factory(&mut self, factory: Factory) {
        self.factory = Some(factory);
    }

    pub fn set_dependencies(&mut self, dependencies: impl IntoIterator<Item = Dependency>) {
        self.dependencies = Some(dependencies.into_iter().collect());
    }

    pub fn with_key(mut self, key: impl Into<ComponentKey>) -> Self {
        self.set_key(key);
        self
    }

    pub fn with_service(mut self, service: impl Into<ComponentKey>) -> ComponentResult<Self> {
        self.set_service(service)?;
        Ok(self)
    }

    pub fn with_class(mut self, class: impl Into<ComponentKey>) -> ComponentResult<Self> {
        self.set_class(class)?;
        Ok(self)
    }

    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.set_factory(factory);
        self
    }

    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = Dependency>) -> Self {
        self.set_dependencies(dependencies);
        self
    }
}

impl ComponentPolicy for ComponentKeyPolicy {
    /// 优先级：显式键 > 服务协议 > 具体类型
    fn effective_key(&self, key: Option<ComponentKey>) -> Option<ComponentKey> {
        self.key
            .clone()
            .or_else(|| self.service.map(ComponentKey::Service))
            .or_else(|| self.class.map(ComponentKey::Class))
            .or(key)
    }

    fn effective_factory(&self, factory: Option<Factory>) -> Option<Factory> {
        self.factory
            .clone()
            .or_else(|| {
                self.class
                    .map(|class| Arc::new(move |parameters| class.construct(parameters)) as Factory)
            })
            .or(factory)
    }

    /// 显式设置的依赖不会回退到类型声明的依赖
    fn collect_dependencies(&self, dependencies: &mut Vec<Dependency>) {
        let declared = match &self.dependencies {
            Some(explicit) => explicit.clone(),
            None => self
                .class
                .and_then(|class| class.declared_dependencies())
                .unwrap_or_default(),
        };
        dependencies.extend(declared);
    }
}

impl fmt::Debug for ComponentKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentKeyPolicy")
            .field("key", &self.key)
            .field("service", &self.service)
            .field("class", &self.class)
            .field("factory", &self.factory.as_ref().map(|_| "<function>"))
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
