//! 组件模型验证

use crate::key_policy::ComponentKeyPolicy;
use crate::model::ComponentModel;
use async_trait::async_trait;
use di_abstractions::{ComponentKey, ComponentPolicy};
use infrastructure_common::ValidationFailure;
use tracing::{debug, warn};

/// 组件验证器 trait
///
/// 容器在安装组件前调用，返回的失败结果会原样交给注册调用方。
#[async_trait]
pub trait ComponentValidator: Send + Sync {
    async fn validate(&self, model: &ComponentModel) -> Result<(), ValidationFailure>;
}

/// 默认组件验证器
///
/// - 组件键策略的具体类型必须是具体类型
/// - 组件模型必须能确定键和工厂
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultComponentValidator;

impl DefaultComponentValidator {
    pub fn new() -> Self {
        Self
    }

    /// 验证单个组件键策略
    pub fn validate_key_policy(&self, policy: &ComponentKeyPolicy) -> ValidationFailure {
        let mut validation = ValidationFailure::new("ComponentKeyPolicy");
        let Some(class) = policy.class() else {
            return validation;
        };
        // 服务协议字段和服务协议键指向同一协议时只检查一次
        let mut services = Vec::with_capacity(2);
        services.extend(policy.service());
        if let Some(ComponentKey::Service(service)) = policy.key() {
            if !services.contains(&service) {
                services.push(service);
            }
        }
        for service in services {
            if !class.conforms_to(service) {
                validation.type_mismatch(
                    "Class",
                    class,
                    format!("{} 没有实现服务协议 {}", class, service),
                );
            }
        }
        validation
    }
}

#[async_trait]
impl ComponentValidator for DefaultComponentValidator {
    async fn validate(&self, model: &ComponentModel) -> Result<(), ValidationFailure> {
        let mut validation = ValidationFailure::new("ComponentModel");
        for policy in model.key_policies() {
            let child = self.validate_key_policy(policy);
            if !child.is_valid() {
                validation.add_child(child);
            }
        }

        if model.effective_key(None).is_none() {
            validation.required("Key", "无法确定组件的键");
        }
        if model.effective_factory(None).is_none() {
            validation.required("Factory", "无法确定组件的工厂");
        }

        if validation.is_valid() {
            debug!("组件验证通过: {:?}", model.component_key());
        } else {
            warn!("组件验证失败: {}", validation);
        }
        validation.into_result()
    }
}
