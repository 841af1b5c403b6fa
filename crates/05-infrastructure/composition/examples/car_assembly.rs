//! 容器装配示例
//!
//! 演示如何用注册单元装配组件，并通过服务协议解析组件

use async_trait::async_trait;
use di_abstractions::{
    ClassId, Dependency, DependencyResult, Injectable, LazyDependency, Parameters, ServiceId,
};
use di_impl::{ComponentModel, IocContainer, Policy, Registration};
use infrastructure_common::RegistrationResult;
use infrastructure_composition::{ContainerBuilder, LoggingConfig};
use std::sync::Arc;

// 示例：服务协议
pub trait Engine: Send + Sync {
    fn describe(&self) -> String;
}

pub trait Car: Send + Sync {}

#[derive(Debug)]
pub struct V12;

impl Engine for V12 {
    fn describe(&self) -> String {
        "V12, 789 马力".to_string()
    }
}

impl Injectable for V12 {
    fn services() -> Vec<ServiceId> {
        vec![ServiceId::of::<dyn Engine>()]
    }

    fn create(_parameters: Parameters) -> DependencyResult<Self> {
        Ok(V12)
    }
}

#[derive(Debug)]
pub struct Ferrari {
    engine: Arc<V12>,
}

impl Car for Ferrari {}

impl Injectable for Ferrari {
    fn dependencies() -> Option<Vec<Dependency>> {
        Some(vec![Dependency::on(ServiceId::of::<dyn Engine>())])
    }

    fn services() -> Vec<ServiceId> {
        vec![ServiceId::of::<dyn Car>()]
    }

    fn create(parameters: Parameters) -> DependencyResult<Self> {
        Ok(Ferrari {
            engine: parameters.get(0)?,
        })
    }
}

// 示例：只在需要时才取车的展厅
pub struct Showroom {
    car: LazyDependency,
}

impl Injectable for Showroom {
    fn dependencies() -> Option<Vec<Dependency>> {
        Some(vec![Dependency::on(ServiceId::of::<dyn Car>()).lazy()])
    }

    fn create(parameters: Parameters) -> DependencyResult<Self> {
        Ok(Showroom {
            car: parameters.lazy(0)?,
        })
    }
}

struct Dealership;

#[async_trait]
impl Registration for Dealership {
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
        container
            .register([
                Policy::from(ComponentModel::of_class(ClassId::of::<Showroom>())),
                Policy::transient(),
            ])
            .await?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let container = ContainerBuilder::new()
        .add_optional_config_file("config/container.toml")
        .add_env_prefix("IOC")
        .with_logging(LoggingConfig::development())
        .add_registration(Dealership)
        .build()
        .await?;

    let showroom = container
        .resolve_as::<Showroom>(ClassId::of::<Showroom>())
        .await?;
    let ferrari = showroom.car.resolve_as::<Ferrari>().await?;
    println!("展厅里的车: {}", ferrari.engine.describe());

    let again = container.resolve_as::<Ferrari>(ServiceId::of::<dyn Car>()).await?;
    println!("同一辆车: {}", Arc::ptr_eq(&ferrari, &again));
    Ok(())
}
