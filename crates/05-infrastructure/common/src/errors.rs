//! 错误类型定义

use thiserror::Error;

/// 组件策略配置错误类型
///
/// 在配置组件策略时同步返回，对本次配置调用是致命的。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    #[error("{value} 不是{expected}")]
    InvalidPolicyValue {
        value: String,
        expected: &'static str,
    },

    #[error("{value} 不是 ComponentPolicy")]
    NotAPolicy { value: String },

    #[error("只允许一个生命周期策略")]
    MultipleLifestyles,
}

impl ComponentError {
    /// 创建策略字段取值无效错误
    pub fn invalid_value(value: impl ToString, expected: &'static str) -> Self {
        Self::InvalidPolicyValue {
            value: value.to_string(),
            expected,
        }
    }

    /// 创建非组件策略错误
    pub fn not_a_policy(value: impl ToString) -> Self {
        Self::NotAPolicy {
            value: value.to_string(),
        }
    }
}

/// 验证错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("必需字段缺失: {field_name}, {message}")]
    RequiredFieldMissing { field_name: String, message: String },

    #[error("字段类型不匹配: {field_name}, 值: {value}, {message}")]
    TypeMismatch {
        field_name: String,
        value: String,
        message: String,
    },
}

impl ValidationError {
    /// 出错的字段名称
    pub fn field_name(&self) -> &str {
        match self {
            Self::RequiredFieldMissing { field_name, .. } | Self::TypeMismatch { field_name, .. } => {
                field_name
            }
        }
    }

    /// 错误描述
    pub fn message(&self) -> &str {
        match self {
            Self::RequiredFieldMissing { message, .. } | Self::TypeMismatch { message, .. } => message,
        }
    }
}

/// 验证失败结果
///
/// 记录被验证对象自身的错误以及各个子对象（例如组件模型中的每个策略）的失败结果。
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("组件验证失败: {target}, {} 个错误, {} 个子验证失败", .errors.len(), .children.len())]
pub struct ValidationFailure {
    target: String,
    errors: Vec<ValidationError>,
    children: Vec<ValidationFailure>,
}

impl ValidationFailure {
    /// 为指定的验证对象创建空的验证结果
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            errors: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 记录必需字段缺失
    pub fn required(&mut self, field_name: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::RequiredFieldMissing {
            field_name: field_name.into(),
            message: message.into(),
        });
    }

    /// 记录字段类型不匹配
    pub fn type_mismatch(
        &mut self,
        field_name: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) {
        self.errors.push(ValidationError::TypeMismatch {
            field_name: field_name.into(),
            value: value.to_string(),
            message: message.into(),
        });
    }

    /// 添加子对象的验证失败
    pub fn add_child(&mut self, child: ValidationFailure) {
        self.children.push(child);
    }

    /// 自身及所有子对象均无错误
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.children.iter().all(ValidationFailure::is_valid)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn children(&self) -> &[ValidationFailure] {
        &self.children
    }

    /// 获取指定字段上的错误
    pub fn key_errors(&self, field_name: &str) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|error| error.field_name() == field_name)
            .collect()
    }

    /// 有效时返回 `Ok(())`，否则返回自身作为错误
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// 组件注册错误类型
#[derive(Error, Debug, Clone)]
pub enum RegistrationError {
    #[error("组件配置失败: {source}")]
    Configuration {
        #[from]
        source: ComponentError,
    },

    #[error("{source}")]
    Validation {
        #[from]
        source: ValidationFailure,
    },

    #[error("组件注册失败: {key}, 原因: {message}")]
    Installation { key: String, message: String },
}

impl RegistrationError {
    /// 验证失败时返回原始的验证结果
    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation { source } => Some(source),
            _ => None,
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("注册错误: {source}")]
    RegistrationError {
        #[from]
        source: RegistrationError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ComponentResult<T> = Result<T, ComponentError>;
pub type RegistrationResult<T> = Result<T, RegistrationError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
