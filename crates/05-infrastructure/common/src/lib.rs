//! # Infrastructure Common
//!
//! IoC 容器各层共享的错误类型和类型元数据。
//!
//! ## 核心内容
//!
//! - [`ComponentError`] - 组件策略配置错误
//! - [`ValidationFailure`] - 组件模型验证失败
//! - [`RegistrationError`] - 组件注册错误
//! - [`TypeInfo`] - 类型元数据

pub mod errors;
pub mod metadata;

pub use errors::*;
pub use metadata::*;
