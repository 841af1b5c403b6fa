//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义组件注册和依赖解析的核心类型与接口。
//!
//! ## 核心接口
//!
//! - [`ComponentKey`] - 组件键（服务协议、具体类型或名称）
//! - [`Injectable`] - 可注册的具体类型
//! - [`Dependency`] - 依赖声明及修饰符
//! - [`ComponentPolicy`] / [`Lifestyle`] - 组件策略
//! - [`DependencyResolution`] - 依赖解析链
//! - [`Composer`] / [`Provider`] - 组件查找

pub mod component;
pub mod container;
pub mod dependency;
pub mod error;
pub mod factory;
pub mod instance;
pub mod key;
pub mod parameter;
pub mod policy;
pub mod registry;
pub mod resolver;

pub use component::*;
pub use container::*;
pub use dependency::*;
pub use error::*;
pub use factory::*;
pub use instance::*;
pub use key::*;
pub use parameter::*;
pub use policy::*;
pub use registry::*;
pub use resolver::*;
