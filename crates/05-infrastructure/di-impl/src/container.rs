//! IoC 容器
//!
//! 将组件模型安装为提供者，并按声明顺序解析组件依赖。
//! 同步可得的依赖直接传给工厂，异步依赖全部完成后才调用工厂。

use crate::lifestyle::{SingletonLifestyle, TransientLifestyle};
use crate::model::{ComponentModel, Policy};
use crate::registry::{ProviderHandle, ProviderRegistry};
use crate::validation::{ComponentValidator, DefaultComponentValidator};
use async_trait::async_trait;
use di_abstractions::{
    downcast_instance, value_provider, Composer, ComponentKey, ContainerConfig, ContainerId,
    Dependency, DependencyError, DependencyResolution, DependencyResult, DependencyTarget,
    Factory, Instance, InstanceFuture, Interceptor, LazyDependency, Lifestyle, LifestyleKind,
    Parameter, Provider, Resolution, ResolutionContext,
};
use futures::future::{try_join_all, FutureExt};
use infrastructure_common::{RegistrationError, RegistrationResult};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::future::IntoFuture;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// 组件注册单元
///
/// 把一组相关组件的注册逻辑打包，通过 [`IocContainer::install`] 安装。
#[async_trait]
pub trait Registration: Send + Sync {
    async fn register(&self, container: &IocContainer) -> RegistrationResult<()>;
}

#[async_trait]
impl Registration for ComponentModel {
    async fn register(&self, container: &IocContainer) -> RegistrationResult<()> {
        container.register_model(self.clone()).await.map(|_| ())
    }
}

/// IoC 容器
pub struct IocContainer {
    id: ContainerId,
    config: ContainerConfig,
    registry: Arc<ProviderRegistry>,
    validator: Arc<dyn ComponentValidator>,
}

impl IocContainer {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self::create(config, ProviderRegistry::new(), Arc::new(DefaultComponentValidator))
    }

    /// 替换组件验证器
    pub fn with_validator(mut self, validator: Arc<dyn ComponentValidator>) -> Self {
        self.validator = validator;
        self
    }

    fn create(
        config: ContainerConfig,
        registry: Arc<ProviderRegistry>,
        validator: Arc<dyn ComponentValidator>,
    ) -> Self {
        let id = ContainerId::new();
        debug!("创建容器: {}", id);
        Self {
            id,
            config,
            registry,
            validator,
        }
    }

    /// 创建子容器
    ///
    /// 子容器先查找自己的组件，找不到时交给本容器。
    pub fn child(&self) -> Self {
        let parent: Arc<dyn Composer> = self.registry.clone();
        Self::create(
            self.config.clone(),
            ProviderRegistry::with_parent(parent),
            self.validator.clone(),
        )
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// 使用给定策略注册组件
    pub async fn register<I>(&self, policies: I) -> RegistrationResult<ComponentModel>
    where
        I: IntoIterator,
        I::Item: Into<Policy>,
    {
        let model = ComponentModel::with_policies(policies)?;
        self.register_model(model).await
    }

    /// 验证并注册组件模型
    ///
    /// 验证失败时不安装任何提供者，验证器给出的失败结果原样返回。
    pub async fn register_model(&self, model: ComponentModel) -> RegistrationResult<ComponentModel> {
        if self.config.enable_component_validation {
            self.validator.validate(&model).await?;
        }
        self.install_model(&model)?;
        Ok(model)
    }

    /// 跳过验证直接安装组件模型
    pub fn install_model(&self, model: &ComponentModel) -> RegistrationResult<ProviderHandle> {
        let key = model.component_key().ok_or_else(|| RegistrationError::Installation {
            key: String::from("<unknown>"),
            message: String::from("无法确定组件的键"),
        })?;
        let factory = model.component_factory().ok_or_else(|| RegistrationError::Installation {
            key: key.to_string(),
            message: String::from("无法确定组件的工厂"),
        })?;
        let lifestyle = model.lifestyle().unwrap_or_else(|| self.default_lifestyle());
        let dependencies = model.dependencies();
        let interceptors = model.interceptors();

        info!(
            "注册组件: {} (生命周期: {:?}, 依赖: {})",
            key,
            lifestyle,
            dependencies.len()
        );

        let binding = Arc::new(ComponentBinding {
            owner: self.id,
            key: key.clone(),
            factory,
            lifestyle,
            dependencies,
            interceptors,
            config: self.config.clone(),
            registry: Arc::downgrade(&self.registry),
            handle: Mutex::new(None),
        });
        let handle = self.registry.install(key, binding.clone().into_provider());
        *binding.handle.lock() = Some(handle.clone());
        Ok(handle)
    }

    /// 安装注册单元
    pub async fn install(&self, registration: &dyn Registration) -> RegistrationResult<()> {
        registration.register(self).await
    }

    /// 直接安装提供者
    pub fn provide(&self, key: impl Into<ComponentKey>, provider: Provider) -> ProviderHandle {
        self.registry.install(key.into(), provider)
    }

    /// 把已有实例注册为组件
    pub fn provide_instance(&self, key: impl Into<ComponentKey>, instance: Instance) -> ProviderHandle {
        self.provide(key, value_provider(instance))
    }

    /// 解析组件
    ///
    /// 没有任何提供者能处理此键时返回 [`DependencyError::Unresolved`]。
    pub fn resolve(&self, key: impl Into<ComponentKey>) -> Resolution {
        let key = key.into();
        debug!("解析组件: {}", key);
        match self.registry.resolve(&key, ResolutionContext::Root(key.clone())) {
            Some(resolution) => resolution,
            None => {
                warn!("组件未注册: {}", key);
                let node = DependencyResolution::root(key);
                node.claim(self.id);
                node.complete();
                Resolution::Failed(DependencyError::unresolved(node))
            }
        }
    }

    /// 解析组件并转换为具体类型
    pub async fn resolve_as<T: Any + Send + Sync>(
        &self,
        key: impl Into<ComponentKey>,
    ) -> DependencyResult<Arc<T>> {
        let instance = self.resolve(key).await?;
        downcast_instance(instance)
    }

    /// 本容器是否有此键的提供者，不检查父容器
    pub fn is_registered(&self, key: impl Into<ComponentKey>) -> bool {
        let key = key.into();
        self.registry.contains(&key)
    }

    fn default_lifestyle(&self) -> Arc<dyn Lifestyle> {
        match self.config.default_lifestyle {
            LifestyleKind::Singleton => Arc::new(SingletonLifestyle::new()),
            LifestyleKind::Transient => Arc::new(TransientLifestyle),
        }
    }
}

impl Default for IocContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IocContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IocContainer")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

/// 已安装组件的解析逻辑
struct ComponentBinding {
    owner: ContainerId,
    key: ComponentKey,
    factory: Factory,
    lifestyle: Arc<dyn Lifestyle>,
    dependencies: Vec<Dependency>,
    interceptors: Vec<Interceptor>,
    config: ContainerConfig,
    registry: Weak<ProviderRegistry>,
    handle: Mutex<Option<ProviderHandle>>,
}

impl ComponentBinding {
    fn into_provider(self: Arc<Self>) -> Provider {
        Arc::new(move |context: &ResolutionContext, composer: &Arc<dyn Composer>| {
            Some(self.provide(context, composer))
        })
    }

    fn provide(self: &Arc<Self>, context: &ResolutionContext, composer: &Arc<dyn Composer>) -> Resolution {
        let node = match self.enter(context) {
            Ok(node) => node,
            Err(error) => return Resolution::Failed(error),
        };
        self.lifestyle
            .resolve(&|replace| self.construct(&node, composer, replace))
    }

    /// 取得本次解析的节点，同时检查循环依赖和解析深度
    fn enter(&self, context: &ResolutionContext) -> DependencyResult<Arc<DependencyResolution>> {
        let node = match context {
            ResolutionContext::Root(key) => DependencyResolution::root(key.clone()),
            ResolutionContext::Dependency(node) => {
                if self.config.enable_circular_dependency_detection {
                    if let Some(parent) = node.parent() {
                        if parent.is_resolving_key(node.key(), self.owner) {
                            let chain = node.describe_chain();
                            warn!("检测到循环依赖: {}", chain);
                            return Err(DependencyError::CircularDependency {
                                chain,
                                dependency: node.clone(),
                            });
                        }
                    }
                }
                if node.depth() > self.config.max_resolution_depth {
                    let chain = node.describe_chain();
                    warn!("超过最大解析深度 {}: {}", self.config.max_resolution_depth, chain);
                    return Err(DependencyError::DepthExceeded {
                        max_depth: self.config.max_resolution_depth,
                        chain,
                    });
                }
                node.clone()
            }
        };
        node.claim(self.owner);
        Ok(node)
    }

    fn construct(
        self: &Arc<Self>,
        node: &Arc<DependencyResolution>,
        composer: &Arc<dyn Composer>,
        replace: bool,
    ) -> Resolution {
        let mut parameters: Vec<Option<Parameter>> = Vec::with_capacity(self.dependencies.len());
        let mut pending: Vec<(usize, InstanceFuture)> = Vec::new();

        for (index, dependency) in self.dependencies.iter().enumerate() {
            let modifiers = dependency.modifiers();
            let parameter = match dependency.target() {
                DependencyTarget::Value(value) if modifiers.lazy => {
                    Parameter::Lazy(LazyDependency::ready(value.clone()))
                }
                DependencyTarget::Value(value) if modifiers.promise => {
                    Parameter::Promise(Resolution::Ready(value.clone()).into_future())
                }
                DependencyTarget::Value(value) => Parameter::Value(value.clone()),
                DependencyTarget::Key(key) if modifiers.lazy => {
                    let parent = node.clone();
                    let key = key.clone();
                    // 单例实例可能持有延迟依赖，强引用会让注册表无法释放
                    let composer = Arc::downgrade(composer);
                    Parameter::Lazy(LazyDependency::new(move || {
                        let child = DependencyResolution::child(&parent, key.clone());
                        match composer.upgrade() {
                            Some(composer) => resolve_dependency(&child, &composer).into_future(),
                            None => {
                                debug!("容器已释放，延迟依赖无法解析: {}", child.describe_chain());
                                Resolution::Failed(DependencyError::unresolved(child)).into_future()
                            }
                        }
                    }))
                }
                DependencyTarget::Key(key) => {
                    let child = DependencyResolution::child(node, key.clone());
                    match resolve_dependency(&child, composer) {
                        resolution if modifiers.promise => Parameter::Promise(resolution.into_future()),
                        Resolution::Ready(instance) => Parameter::Value(instance),
                        Resolution::Pending(future) => {
                            pending.push((index, future));
                            parameters.push(None);
                            continue;
                        }
                        Resolution::Failed(error) => {
                            node.complete();
                            return Resolution::Failed(error);
                        }
                    }
                }
            };
            parameters.push(Some(parameter));
        }

        if pending.is_empty() {
            return Resolution::from_result(self.create_instance(node, parameters, replace));
        }

        debug!("等待 {} 个异步依赖: {}", pending.len(), self.key);
        let binding = self.clone();
        let node = node.clone();
        Resolution::Pending(
            async move {
                let (indices, futures): (Vec<usize>, Vec<InstanceFuture>) =
                    pending.into_iter().unzip();
                let settled = match try_join_all(futures).await {
                    Ok(settled) => settled,
                    Err(error) => {
                        node.complete();
                        return Err(error);
                    }
                };
                for (index, instance) in indices.into_iter().zip(settled) {
                    parameters[index] = Some(Parameter::Value(instance));
                }
                binding.create_instance(&node, parameters, replace)
            }
            .boxed(),
        )
    }

    fn create_instance(
        &self,
        node: &DependencyResolution,
        parameters: Vec<Option<Parameter>>,
        replace: bool,
    ) -> DependencyResult<Instance> {
        let result = (self.factory)(parameters.into_iter().flatten().collect()).and_then(|instance| {
            self.interceptors
                .iter()
                .try_fold(instance, |instance, interceptor| interceptor(instance))
        });
        node.complete();

        let instance = result.map_err(|error| {
            warn!("组件创建失败: {}, 原因: {}", self.key, error);
            error
        })?;
        debug!("组件创建完成: {}", self.key);

        if replace && self.config.replace_resolved_singletons {
            self.replace_with(instance.clone());
        }
        Ok(instance)
    }

    /// 用实例提供者替换当前提供者
    fn replace_with(&self, instance: Instance) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut handle = self.handle.lock();
        let Some(current) = handle.take() else {
            return;
        };
        if current.uninstall() {
            registry.install(self.key.clone(), value_provider(instance));
            info!("单例组件已替换为实例提供者: {}", self.key);
        }
    }
}

/// 通过组合器解析单个依赖
fn resolve_dependency(
    dependency: &Arc<DependencyResolution>,
    composer: &Arc<dyn Composer>,
) -> Resolution {
    composer
        .resolve(
            dependency.key(),
            ResolutionContext::Dependency(dependency.clone()),
        )
        .unwrap_or_else(|| {
            debug!("依赖无法解析: {}", dependency.describe_chain());
            Resolution::Failed(DependencyError::unresolved(dependency.clone()))
        })
}
