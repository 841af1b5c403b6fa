//! IoC 容器端到端测试
use async_trait::async_trait;
use di_abstractions::{
    ClassId, Composer, ComponentKey, Dependency, DependencyError, DependencyResult, Injectable,
    Instance, LazyDependency, Parameters, Resolution, ResolutionContext, ServiceId,
};
use di_impl::{
    ComponentKeyPolicy, ComponentModel, ComponentValidator, IocContainer, Policy, Registration,
};
use futures::future::FutureExt;
use infrastructure_common::{RegistrationResult, ValidationFailure};
use std::future::IntoFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

trait Engine: Send + Sync {
    fn horsepower(&self) -> u32;
}

trait Car: Send + Sync {}

#[derive(Debug)]
struct V12 {
    horsepower: u32,
}

impl Engine for V12 {
    fn horsepower(&self) -> u32 {
        self.horsepower
    }
}

impl Injectable for V12 {
    fn services() -> Vec<ServiceId> {
        vec![ServiceId::of::<dyn Engine>()]
    }

    fn create(_parameters: Parameters) -> DependencyResult<Self> {
        Ok(V12 { horsepower: 789 })
    }
}

#[derive(Debug)]
struct Ferrari {
    model: Arc<String>,
    engine: Arc<V12>,
}

impl Car for Ferrari {}

impl Injectable for Ferrari {
    fn dependencies() -> Option<Vec<Dependency>> {
        Some(vec![
            Dependency::using(String::from("Enzo")),
            Dependency::on(ServiceId::of::<dyn Engine>()),
        ])
    }

    fn services() -> Vec<ServiceId> {
        vec![ServiceId::of::<dyn Car>()]
    }

    fn create(parameters: Parameters) -> DependencyResult<Self> {
        Ok(Ferrari {
            model: parameters.get(0)?,
            engine: parameters.get(1)?,
        })
    }
}

/// 延迟获取汽车的报废场
struct Junkyard {
    car: LazyDependency,
}

impl Injectable for Junkyard {
    fn dependencies() -> Option<Vec<Dependency>> {
        Some(vec![Dependency::on(ServiceId::of::<dyn Car>()).lazy()])
    }

    fn create(parameters: Parameters) -> DependencyResult<Self> {
        Ok(Junkyard {
            car: parameters.lazy(0)?,
        })
    }
}

struct Drivetrain;

#[async_trait]
impl Registration for Drivetrain {
    async fn register(&self, container: &IocContainer) -> RegistrationResult<()> {
        container
            .register([
                Policy::from(ServiceId::of::<dyn Engine>()),
                Policy::from(ClassId::of::<V12>()),
            ])
            .await?;
        container
            .register([
                Policy::from(ServiceId::of::<dyn Car>()),
                Policy::from(ClassId::of::<Ferrari>()),
            ])
            .await?;
        Ok(())
    }
}

fn car() -> ComponentKey {
    ComponentKey::service::<dyn Car>()
}

fn engine() -> ComponentKey {
    ComponentKey::service::<dyn Engine>()
}

#[tokio::test]
async fn test_resolves_ferrari_with_engine() -> anyhow::Result<()> {
    let container = IocContainer::new();
    container.install(&Drivetrain).await?;

    let ferrari = container.resolve_as::<Ferrari>(car()).await?;
    assert_eq!(ferrari.model.as_str(), "Enzo");
    assert_eq!(ferrari.engine.horsepower(), 789);
    Ok(())
}

#[tokio::test]
async fn test_singleton_resolves_same_instance() -> anyhow::Result<()> {
    let container = IocContainer::new();
    container.install(&Drivetrain).await?;

    let first = container.resolve_as::<Ferrari>(car()).await?;
    let second = container.resolve_as::<Ferrari>(car()).await?;
    assert!(Arc::ptr_eq(&first, &second));
    Ok(())
}

#[tokio::test]
async fn test_missing_engine_is_reported() -> anyhow::Result<()> {
    let container = IocContainer::new();
    container
        .register([
            Policy::from(ServiceId::of::<dyn Car>()),
            Policy::from(ClassId::of::<Ferrari>()),
        ])
        .await?;

    let error = container.resolve(car()).await.unwrap_err();
    assert_eq!(error.to_string(), "无法解析一个或多个依赖");
    let dependency = error.dependency().expect("应该携带失败的依赖");
    assert_eq!(dependency.key(), &engine());
    assert_eq!(dependency.describe_chain(), "Car -> Engine");
    Ok(())
}

#[tokio::test]
async fn test_unregistered_component_is_reported() {
    let container = IocContainer::new();
    let error = container.resolve(engine()).await.unwrap_err();
    assert!(matches!(error, DependencyError::Unresolved { .. }));
    assert_eq!(error.dependency().map(|d| d.key().clone()), Some(engine()));
}

#[tokio::test]
async fn test_circular_dependencies_are_detected() -> anyhow::Result<()> {
    let container = IocContainer::new();
    for (key, dependency) in [("chicken", "egg"), ("egg", "chicken")] {
        let policy = ComponentKeyPolicy::new()
            .with_key(key)
            .with_dependencies([Dependency::on(dependency)])
            .with_factory(di_abstractions::factory_fn(|_| Ok(())));
        container.register([policy]).await?;
    }

    let error = container.resolve("chicken").await.unwrap_err();
    assert!(matches!(
        &error,
        DependencyError::CircularDependency { chain, .. } if chain == "chicken -> egg -> chicken"
    ));
    Ok(())
}

#[tokio::test]
async fn test_lazy_dependency_resolves_on_demand() -> anyhow::Result<()> {
    let container = IocContainer::new();
    container
        .register_model(ComponentModel::of_class(ClassId::of::<Junkyard>()))
        .await?;

    let junkyard = container.resolve_as::<Junkyard>(ClassId::of::<Junkyard>()).await?;
    assert!(junkyard.car.resolve().await.is_err());

    container.install(&Drivetrain).await?;
    let ferrari = junkyard.car.resolve_as::<Ferrari>().await?;
    let again = junkyard.car.resolve_as::<Ferrari>().await?;
    assert!(Arc::ptr_eq(&ferrari, &again));
    Ok(())
}

#[tokio::test]
async fn test_async_provider_delays_construction() -> anyhow::Result<()> {
    let container = IocContainer::new();
    container
        .register([
            Policy::from(ServiceId::of::<dyn Car>()),
            Policy::from(ClassId::of::<Ferrari>()),
        ])
        .await?;
    let started = Arc::new(AtomicUsize::new(0));
    let counter = started.clone();
    container.provide(
        engine(),
        Arc::new(move |_: &ResolutionContext, _: &Arc<dyn Composer>| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(Resolution::Pending(
                async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(Arc::new(V12 { horsepower: 800 }) as Instance)
                }
                .boxed(),
            ))
        }),
    );

    let first = container.resolve(car());
    let second = container.resolve(car());
    assert!(first.is_pending());
    let (first, second) = tokio::join!(first.into_future(), second.into_future());
    let first = di_abstractions::downcast_instance::<Ferrari>(first?)?;
    let second = di_abstractions::downcast_instance::<Ferrari>(second?)?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.engine.horsepower(), 800);
    assert_eq!(started.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_validation_failure_is_forwarded() {
    struct RejectAll;

    #[async_trait]
    impl ComponentValidator for RejectAll {
        async fn validate(&self, _model: &ComponentModel) -> Result<(), ValidationFailure> {
            let mut failure = ValidationFailure::new("ComponentModel");
            failure.required("Owner", "组件必须有负责人");
            Err(failure)
        }
    }

    let container = IocContainer::new().with_validator(Arc::new(RejectAll));
    let error = container.install(&Drivetrain).await.unwrap_err();
    let failure = error.validation_failure().expect("应该是验证失败");
    assert_eq!(failure.key_errors("Owner").len(), 1);
    assert!(!container.is_registered(engine()));
}
