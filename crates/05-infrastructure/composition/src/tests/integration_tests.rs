//! 容器构建器集成测试

use super::super::builder::{ContainerBuilder, LoggingConfig};
use async_trait::async_trait;
use di_abstractions::{
    factory_fn, ContainerConfig, Dependency, DependencyError, LifestyleKind, Parameters,
};
use di_impl::{ComponentKeyPolicy, ComponentModel, ComponentValidator, IocContainer, Registration};
use infrastructure_common::{InfrastructureError, RegistrationResult, ValidationFailure};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Once;
use tempfile::NamedTempFile;
use tokio::fs;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init()
            .ok(); // 忽略初始化失败的错误
    });
}

/// 引擎和汽车的注册单元
struct Garage;

#[async_trait]
impl Registration for Garage {
    async fn register(&self, container: &IocContainer) -> RegistrationResult<()> {
        container
            .register([ComponentKeyPolicy::new()
                .with_key("engine")
                .with_factory(factory_fn(|_| Ok(String::from("V12"))))])
            .await?;
        container
            .register([ComponentKeyPolicy::new()
                .with_key("car")
                .with_dependencies([Dependency::on("engine")])
                .with_factory(factory_fn(|parameters: Parameters| {
                    let engine = parameters.get::<String>(0)?;
                    Ok(format!("Ferrari {}", engine))
                }))])
            .await?;
        Ok(())
    }
}

async fn json_config(value: serde_json::Value) -> NamedTempFile {
    let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    fs::write(file.path(), value.to_string()).await.unwrap();
    file
}

/// 测试注册单元在构建时安装
#[tokio::test]
async fn test_build_installs_registrations() {
    init_test_logger();

    let container = ContainerBuilder::new()
        .add_registration(Garage)
        .build()
        .await
        .expect("构建容器应该成功");

    let car = container.resolve_as::<String>("car").await.unwrap();
    assert_eq!(car.as_str(), "Ferrari V12");
    assert_eq!(container.config(), &ContainerConfig::default());
}

/// 测试从配置文件加载容器配置
#[tokio::test]
async fn test_build_with_config_file() {
    let file = json_config(json!({
        "container": {
            "default_lifestyle": "transient",
            "max_resolution_depth": 16
        }
    }))
    .await;

    let container = ContainerBuilder::new()
        .add_config_file(file.path())
        .expect("添加配置文件应该成功")
        .add_registration(Garage)
        .build()
        .await
        .unwrap();

    assert_eq!(container.config().default_lifestyle, LifestyleKind::Transient);
    assert_eq!(container.config().max_resolution_depth, 16);

    let first = container.resolve_as::<String>("car").await.unwrap();
    let second = container.resolve_as::<String>("car").await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

/// 测试环境变量覆盖配置文件
#[tokio::test]
async fn test_environment_overrides_config_file() {
    let file = json_config(json!({ "container": { "max_resolution_depth": 16 } })).await;
    std::env::set_var("IOCBUILDERTEST_CONTAINER__MAX_RESOLUTION_DEPTH", "4");

    let result = ContainerBuilder::new()
        .add_config_file(file.path())
        .expect("添加配置文件应该成功")
        .add_env_prefix("IOCBUILDERTEST")
        .build()
        .await;

    std::env::remove_var("IOCBUILDERTEST_CONTAINER__MAX_RESOLUTION_DEPTH");
    let container = result.expect("构建容器应该成功");
    assert_eq!(container.config().max_resolution_depth, 4);
}

/// 测试显式配置优先于配置源
#[tokio::test]
async fn test_explicit_config_wins() {
    let file = json_config(json!({ "container": { "max_resolution_depth": 16 } })).await;
    let config = ContainerConfig {
        max_resolution_depth: 2,
        ..ContainerConfig::default()
    };

    let container = ContainerBuilder::new()
        .add_config_file(file.path())
        .unwrap()
        .with_config(config)
        .build()
        .await
        .unwrap();
    assert_eq!(container.config().max_resolution_depth, 2);
}

/// 测试配置文件不存在时的错误处理
#[tokio::test]
async fn test_missing_config_file_error_handling() {
    let non_existent_path = PathBuf::from("non_existent_container.json");

    let result = ContainerBuilder::new().add_config_file(&non_existent_path);
    match result.err() {
        Some(InfrastructureError::BootstrapFailed { message }) => {
            assert!(
                message.contains("配置文件不存在"),
                "错误消息应该包含文件不存在信息"
            );
        }
        _ => panic!("应该是 BootstrapFailed 错误"),
    }

    let container = ContainerBuilder::new()
        .add_optional_config_file(&non_existent_path)
        .build()
        .await
        .expect("可选配置文件缺失时应该使用默认配置");
    assert_eq!(container.config(), &ContainerConfig::default());
}

/// 测试无效配置值
#[tokio::test]
async fn test_invalid_config_value() {
    let file = json_config(json!({ "container": { "default_lifestyle": "pooled" } })).await;
    let result = ContainerBuilder::new()
        .add_config_file(file.path())
        .unwrap()
        .build()
        .await;
    assert!(matches!(result, Err(InfrastructureError::ConfigError { .. })));
}

/// 测试注册失败时构建失败
#[tokio::test]
async fn test_validation_failure_aborts_build() {
    struct RequireNamedKeys;

    #[async_trait]
    impl ComponentValidator for RequireNamedKeys {
        async fn validate(&self, model: &ComponentModel) -> Result<(), ValidationFailure> {
            let mut failure = ValidationFailure::new("ComponentModel");
            if model.component_key().map(|key| key.to_string()) != Some(String::from("engine")) {
                failure.type_mismatch("Key", format!("{:?}", model.component_key()), "只允许 engine");
            }
            failure.into_result()
        }
    }

    let result = ContainerBuilder::new()
        .with_validator(Arc::new(RequireNamedKeys))
        .add_registration(Garage)
        .build()
        .await;

    match result {
        Err(InfrastructureError::RegistrationError { source }) => {
            let failure = source.validation_failure().expect("应该是验证失败");
            assert_eq!(failure.key_errors("Key").len(), 1);
        }
        other => panic!("意外的结果: {:?}", other.map(|_| ())),
    }
}

/// 测试日志初始化
#[tokio::test]
async fn test_logging_initialization() {
    init_test_logger();

    // 全局日志已初始化，再次初始化会失败
    let result = ContainerBuilder::new()
        .with_logging(LoggingConfig::development())
        .build()
        .await;
    assert!(matches!(result, Err(InfrastructureError::BootstrapFailed { .. })));
}

/// 测试构建后的循环依赖检测
#[tokio::test]
async fn test_built_container_detects_cycles() {
    let container = ContainerBuilder::new().build().await.unwrap();
    for (key, dependency) in [("left", "right"), ("right", "left")] {
        container
            .register([ComponentKeyPolicy::new()
                .with_key(key)
                .with_dependencies([Dependency::on(dependency)])
                .with_factory(factory_fn(|_| Ok(())))])
            .await
            .unwrap();
    }

    let error = container.resolve("left").await.unwrap_err();
    assert!(matches!(error, DependencyError::CircularDependency { .. }));
}
