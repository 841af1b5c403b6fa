//! 组件模型
//!
//! 按顺序组合多个组件策略，得到一个有效键、一个有效工厂、合并后的依赖列表
//! 以及至多一个生命周期策略。

use crate::key_policy::ComponentKeyPolicy;
use crate::lifestyle::{SingletonLifestyle, TransientLifestyle};
use di_abstractions::{
    ClassId, ComponentKey, ComponentPolicy, Dependency, Factory, Interceptor, Lifestyle, ServiceId,
};
use infrastructure_common::{ComponentError, ComponentResult};
use std::sync::Arc;

/// 组件模型可以组合的策略
#[derive(Debug, Clone)]
pub enum Policy {
    /// 裸键，只在简写形式 `[类型]` 和 `[键, 类型]` 中有效
    Key(ComponentKey),
    KeyPolicy(ComponentKeyPolicy),
    Lifestyle(Arc<dyn Lifestyle>),
    /// 其他组件模型，其策略会被展开合并
    Model(ComponentModel),
    Custom(Arc<dyn ComponentPolicy>),
}

impl Policy {
    pub fn transient() -> Self {
        Self::Lifestyle(Arc::new(TransientLifestyle))
    }

    pub fn singleton() -> Self {
        Self::Lifestyle(Arc::new(SingletonLifestyle::new()))
    }

    pub fn lifestyle(lifestyle: impl Lifestyle + 'static) -> Self {
        Self::Lifestyle(Arc::new(lifestyle))
    }

    pub fn custom(policy: impl ComponentPolicy + 'static) -> Self {
        Self::Custom(Arc::new(policy))
    }
}

impl From<ComponentKey> for Policy {
    fn from(key: ComponentKey) -> Self {
        Self::Key(key)
    }
}

impl From<ServiceId> for Policy {
    fn from(service: ServiceId) -> Self {
        Self::Key(service.into())
    }
}

impl From<ClassId> for Policy {
    fn from(class: ClassId) -> Self {
        Self::Key(class.into())
    }
}

impl From<&str> for Policy {
    fn from(name: &str) -> Self {
        Self::Key(name.into())
    }
}

impl From<ComponentKeyPolicy> for Policy {
    fn from(policy: ComponentKeyPolicy) -> Self {
        Self::KeyPolicy(policy)
    }
}

impl From<ComponentModel> for Policy {
    fn from(model: ComponentModel) -> Self {
        Self::Model(model)
    }
}

#[derive(Debug, Clone)]
enum ComposedPolicy {
    Key(Arc<ComponentKeyPolicy>),
    Lifestyle(Arc<dyn Lifestyle>),
    Custom(Arc<dyn ComponentPolicy>),
}

impl ComposedPolicy {
    fn effective_key(&self, key: Option<ComponentKey>) -> Option<ComponentKey> {
        match self {
            Self::Key(policy) => policy.effective_key(key),
            Self::Lifestyle(lifestyle) => lifestyle.effective_key(key),
            Self::Custom(policy) => policy.effective_key(key),
        }
    }

    fn effective_factory(&self, factory: Option<Factory>) -> Option<Factory> {
        match self {
            Self::Key(policy) => policy.effective_factory(factory),
            Self::Lifestyle(lifestyle) => lifestyle.effective_factory(factory),
            Self::Custom(policy) => policy.effective_factory(factory),
        }
    }

    fn collect_dependencies(&self, dependencies: &mut Vec<Dependency>) {
        match self {
            Self::Key(policy) => policy.collect_dependencies(dependencies),
            Self::Lifestyle(lifestyle) => lifestyle.collect_dependencies(dependencies),
            Self::Custom(policy) => policy.collect_dependencies(dependencies),
        }
    }

    fn collect_interceptors(&self, interceptors: &mut Vec<Interceptor>) {
        match self {
            Self::Key(policy) => policy.collect_interceptors(interceptors),
            Self::Lifestyle(lifestyle) => lifestyle.collect_interceptors(interceptors),
            Self::Custom(policy) => policy.collect_interceptors(interceptors),
        }
    }
}

/// 组件模型
#[derive(Debug, Clone, Default)]
pub struct ComponentModel {
    policies: Vec<ComposedPolicy>,
    lifestyle: Option<Arc<dyn Lifestyle>>,
}

impl ComponentModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用给定策略创建组件模型
    pub fn with_policies<I>(policies: I) -> ComponentResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Policy>,
    {
        let mut model = Self::new();
        model.configure(policies)?;
        Ok(model)
    }

    /// 以具体类型作为键的组件模型
    pub fn of_class(class: ClassId) -> Self {
        Self::keyed(class, class)
    }

    /// 以指定键注册具体类型的组件模型
    pub fn keyed(key: impl Into<ComponentKey>, class: ClassId) -> Self {
        let mut policy = ComponentKeyPolicy::new().with_key(key);
        policy.set_class_id(class);
        Self {
            policies: vec![ComposedPolicy::Key(Arc::new(policy))],
            lifestyle: None,
        }
    }

    /// 按顺序组合策略
    ///
    /// 出错时模型保持不变。
    pub fn configure<I>(&mut self, policies: I) -> ComponentResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Policy>,
    {
        let policies: Vec<Policy> = policies.into_iter().map(Into::into).collect();
        let policies = match shorthand(&policies) {
            Some(policy) => vec![Policy::KeyPolicy(policy)],
            None => policies,
        };

        let mut composed = self.policies.clone();
        let mut lifestyle = self.lifestyle.clone();
        for policy in policies {
            match policy {
                Policy::Key(key) => return Err(ComponentError::not_a_policy(key)),
                Policy::KeyPolicy(policy) => composed.push(ComposedPolicy::Key(Arc::new(policy))),
                Policy::Lifestyle(adopted) => {
                    adopt_lifestyle(&mut lifestyle, &adopted)?;
                    composed.push(ComposedPolicy::Lifestyle(adopted));
                }
                Policy::Model(model) => {
                    for policy in model.policies {
                        if let ComposedPolicy::Lifestyle(adopted) = &policy {
                            adopt_lifestyle(&mut lifestyle, adopted)?;
                        }
                        composed.push(policy);
                    }
                }
                Policy::Custom(policy) => composed.push(ComposedPolicy::Custom(policy)),
            }
        }

        self.policies = composed;
        self.lifestyle = lifestyle;
        Ok(())
    }

    /// 组合后的有效键
    pub fn component_key(&self) -> Option<ComponentKey> {
        self.effective_key(None)
    }

    /// 组合后的有效工厂
    pub fn component_factory(&self) -> Option<Factory> {
        self.effective_factory(None)
    }

    /// 所有策略收集到的依赖
    pub fn dependencies(&self) -> Vec<Dependency> {
        let mut dependencies = Vec::new();
        self.collect_dependencies(&mut dependencies);
        dependencies
    }

    /// 所有策略收集到的拦截器
    pub fn interceptors(&self) -> Vec<Interceptor> {
        let mut interceptors = Vec::new();
        self.collect_interceptors(&mut interceptors);
        interceptors
    }

    pub fn lifestyle(&self) -> Option<Arc<dyn Lifestyle>> {
        self.lifestyle.clone()
    }

    /// 组合的组件键策略
    pub fn key_policies(&self) -> impl Iterator<Item = &ComponentKeyPolicy> {
        self.policies.iter().filter_map(|policy| match policy {
            ComposedPolicy::Key(policy) => Some(policy.as_ref()),
            _ => None,
        })
    }

    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }
}

impl ComponentPolicy for ComponentModel {
    fn effective_key(&self, key: Option<ComponentKey>) -> Option<ComponentKey> {
        self.policies
            .iter()
            .fold(key, |key, policy| policy.effective_key(key))
    }

    fn effective_factory(&self, factory: Option<Factory>) -> Option<Factory> {
        self.policies
            .iter()
            .fold(factory, |factory, policy| policy.effective_factory(factory))
    }

    fn collect_dependencies(&self, dependencies: &mut Vec<Dependency>) {
        for policy in &self.policies {
            policy.collect_dependencies(dependencies);
        }
    }

    fn collect_interceptors(&self, interceptors: &mut Vec<Interceptor>) {
        for policy in &self.policies {
            policy.collect_interceptors(interceptors);
        }
    }
}

fn shorthand(policies: &[Policy]) -> Option<ComponentKeyPolicy> {
    let (key, class) = match policies {
        [Policy::Key(ComponentKey::Class(class))] => (ComponentKey::Class(*class), *class),
        [Policy::Key(key), Policy::Key(ComponentKey::Class(class))] => (key.clone(), *class),
        _ => return None,
    };
    ComponentKeyPolicy::new().with_key(key).with_class(class).ok()
}

fn adopt_lifestyle(
    current: &mut Option<Arc<dyn Lifestyle>>,
    adopted: &Arc<dyn Lifestyle>,
) -> ComponentResult<()> {
    if current.is_some() {
        return Err(ComponentError::MultipleLifestyles);
    }
    *current = Some(adopted.clone());
    Ok(())
}
