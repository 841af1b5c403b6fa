//! 容器配置源
//!
//! 通过 `config` crate 从配置文件和环境变量加载 [`ContainerConfig`]，
//! 后添加的配置源优先。

use di_abstractions::ContainerConfig;
use infrastructure_common::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 默认配置节点
pub const DEFAULT_SECTION: &str = "container";

/// 配置源类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSourceType {
    /// TOML 文件
    Toml,
    /// JSON 文件
    Json,
    /// YAML 文件
    Yaml,
    /// 环境变量
    Environment,
}

impl ConfigSourceType {
    /// 根据文件扩展名推断类型，未知扩展名按 TOML 处理
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Toml,
        }
    }

    fn file_format(&self) -> Option<config::FileFormat> {
        match self {
            Self::Toml => Some(config::FileFormat::Toml),
            Self::Json => Some(config::FileFormat::Json),
            Self::Yaml => Some(config::FileFormat::Yaml),
            Self::Environment => None,
        }
    }
}

/// 配置源描述
#[derive(Debug, Clone)]
pub struct ConfigSourceDescriptor {
    /// 配置源类型
    pub source_type: ConfigSourceType,
    /// 文件路径或环境变量前缀
    pub location: String,
    /// 文件不存在时是否报错
    pub required: bool,
}

/// 容器配置加载器
#[derive(Debug, Clone)]
pub struct ContainerConfigLoader {
    sources: Vec<ConfigSourceDescriptor>,
    section: String,
}

impl ContainerConfigLoader {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            section: DEFAULT_SECTION.to_string(),
        }
    }

    /// 添加配置文件，格式由扩展名决定
    pub fn add_file<P: AsRef<Path>>(mut self, path: P, required: bool) -> Self {
        let path = path.as_ref();
        let descriptor = ConfigSourceDescriptor {
            source_type: ConfigSourceType::from_path(path),
            location: path.to_string_lossy().to_string(),
            required,
        };
        debug!("添加配置文件: {} ({:?})", path.display(), descriptor.source_type);
        self.sources.push(descriptor);
        self
    }

    /// 添加环境变量配置源
    ///
    /// 例如前缀 `IOC` 时，`IOC_CONTAINER__MAX_RESOLUTION_DEPTH` 对应
    /// `container.max_resolution_depth`。
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        let prefix = prefix.into();
        debug!("添加环境变量配置源，前缀: {}", prefix);
        self.sources.push(ConfigSourceDescriptor {
            source_type: ConfigSourceType::Environment,
            location: prefix,
            required: false,
        });
        self
    }

    /// 指定配置节点
    pub fn with_section<S: Into<String>>(mut self, section: S) -> Self {
        self.section = section.into();
        self
    }

    pub fn sources(&self) -> &[ConfigSourceDescriptor] {
        &self.sources
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// 加载容器配置
    ///
    /// 配置节点不存在时使用默认配置，节点中缺少的字段同样取默认值。
    pub fn load(&self) -> ConfigResult<ContainerConfig> {
        let mut builder = config::Config::builder();
        for source in &self.sources {
            builder = match source.source_type.file_format() {
                Some(format) => {
                    let path = PathBuf::from(&source.location);
                    if source.required && !path.exists() {
                        return Err(ConfigError::FileNotFound {
                            path: source.location.clone(),
                        });
                    }
                    builder.add_source(
                        config::File::from(path)
                            .format(format)
                            .required(source.required),
                    )
                }
                None => builder.add_source(
                    config::Environment::with_prefix(&source.location)
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                ),
            };
        }

        let settings = builder.build().map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;

        match settings.get::<ContainerConfig>(&self.section) {
            Ok(config) => {
                info!("已加载容器配置: {}", self.section);
                Ok(config)
            }
            Err(config::ConfigError::NotFound(_)) => {
                debug!("配置节点不存在，使用默认配置: {}", self.section);
                Ok(ContainerConfig::default())
            }
            Err(e) => Err(ConfigError::ParseError {
                source: Box::new(e),
            }),
        }
    }
}

impl Default for ContainerConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
