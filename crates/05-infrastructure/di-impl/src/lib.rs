//! # 依赖注入具体实现
//!
//! 提供组件策略组合、生命周期策略、提供者注册表和 IoC 容器实现

pub mod container;
pub mod key_policy;
pub mod lifestyle;
pub mod model;
pub mod registry;
pub mod validation;

pub use container::{IocContainer, Registration};
pub use key_policy::ComponentKeyPolicy;
pub use lifestyle::{SingletonLifestyle, TransientLifestyle};
pub use model::{ComponentModel, Policy};
pub use registry::{ProviderHandle, ProviderRegistry};
pub use validation::{ComponentValidator, DefaultComponentValidator};
