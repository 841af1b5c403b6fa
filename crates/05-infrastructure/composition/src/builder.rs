//! 容器构建器

use crate::config_sources::ContainerConfigLoader;
use di_abstractions::ContainerConfig;
use di_impl::{ComponentValidator, IocContainer, Registration};
use infrastructure_common::{InfrastructureError, InfrastructureResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 容器构建器
///
/// 使用建造者模式加载配置、初始化日志并安装注册单元
pub struct ContainerBuilder {
    /// 配置加载器
    loader: ContainerConfigLoader,
    /// 显式指定的配置，优先于配置源
    config: Option<ContainerConfig>,
    /// 组件验证器
    validator: Option<Arc<dyn ComponentValidator>>,
    /// 注册单元
    registrations: Vec<Box<dyn Registration>>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ContainerBuilder {
    /// 创建新的容器构建器
    pub fn new() -> Self {
        Self {
            loader: ContainerConfigLoader::new(),
            config: None,
            validator: None,
            registrations: Vec::new(),
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 添加配置文件，文件必须存在
    pub fn add_config_file<P: AsRef<Path>>(mut self, path: P) -> InfrastructureResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InfrastructureError::BootstrapFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }

        info!("添加配置文件: {}", path.display());
        self.loader = self.loader.add_file(path, true);
        Ok(self)
    }

    /// 添加可选配置文件
    pub fn add_optional_config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.add_file(path, false);
        self
    }

    /// 添加环境变量配置源
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量配置源，前缀: {}", prefix);
        self.loader = self.loader.add_env_prefix(prefix);
        self
    }

    /// 指定配置节点，默认为 `container`
    pub fn with_config_section<S: Into<String>>(mut self, section: S) -> Self {
        self.loader = self.loader.with_section(section);
        self
    }

    /// 直接指定容器配置，不再读取配置源
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 替换组件验证器
    pub fn with_validator(mut self, validator: Arc<dyn ComponentValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// 添加注册单元
    pub fn add_registration<R: Registration + 'static>(mut self, registration: R) -> Self {
        debug!("添加注册单元");
        self.registrations.push(Box::new(registration));
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建容器
    pub async fn build(self) -> InfrastructureResult<IocContainer> {
        // 只有在明确配置了日志时才初始化日志
        // 避免在测试环境中重复初始化
        if self.logging_enabled {
            self.initialize_logging()?;
        }
        info!("开始构建容器");

        let config = match self.config {
            Some(config) => config,
            None => self.loader.load()?,
        };
        debug!("容器配置: {:?}", config);

        let mut container = IocContainer::with_config(config);
        if let Some(validator) = self.validator {
            container = container.with_validator(validator);
        }

        for registration in &self.registrations {
            container.install(registration.as_ref()).await?;
        }

        info!(
            "容器构建完成，安装了 {} 个注册单元",
            self.registrations.len()
        );
        Ok(container)
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> InfrastructureResult<()> {
        let filter = EnvFilter::try_new(self.logging_config.filter_directive()).map_err(|e| {
            InfrastructureError::BootstrapFailed {
                message: format!("日志过滤规则无效: {}", e),
            }
        })?;
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids)
            .with_file(self.logging_config.show_file)
            .with_line_number(self.logging_config.show_line_number);

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 过滤规则，例如 `di_impl=debug`，设置后覆盖日志级别
    pub filter: Option<String>,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            filter: None,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            filter: None,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            filter: None,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    pub fn with_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn filter_directive(&self) -> String {
        self.filter
            .clone()
            .unwrap_or_else(|| self.level.as_str().to_lowercase())
    }
}
