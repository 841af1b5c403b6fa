//! # 容器组合层
//!
//! 负责把配置加载、日志初始化和组件注册组合成一个可用的 IoC 容器。
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{ContainerBuilder, LoggingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = ContainerBuilder::new()
//!         .add_optional_config_file("config/container.toml")
//!         .add_env_prefix("IOC")
//!         .with_logging(LoggingConfig::development())
//!         .build()
//!         .await?;
//!
//!     let engine: std::sync::Arc<String> = container.resolve_as("engine").await?;
//!     println!("引擎: {}", engine);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config_sources;

#[cfg(test)]
mod tests;

// 重新导出主要类型
pub use builder::{ContainerBuilder, LoggingConfig};
pub use config_sources::{ConfigSourceDescriptor, ConfigSourceType, ContainerConfigLoader};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
