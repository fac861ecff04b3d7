use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// 抠图服务 API Key 所在的环境变量
pub const API_KEY_ENV: &str = "REMOVE_BG_API_KEY";

/// 可选的配置文件（不存在时完全使用默认值 + 环境变量）
const CONFIG_FILE: &str = "config.toml";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
    fn default_port() -> u16 {
        3000
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（未设置 RUST_LOG 时生效）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// 日志格式：full | json
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
    fn default_format() -> String {
        "full".to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}

/// 上游抠图（分割）服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// 上游端点
    #[serde(default = "SegmentationConfig::default_endpoint")]
    pub endpoint: String,
    /// 上游请求超时（秒），覆盖连接 + 读取全过程
    #[serde(default = "SegmentationConfig::default_timeout")]
    pub timeout_secs: u64,
    /// 输出宽度（直接拉伸，不保持宽高比）
    #[serde(default = "SegmentationConfig::default_width")]
    pub target_width: u32,
    /// 输出高度
    #[serde(default = "SegmentationConfig::default_height")]
    pub target_height: u32,
}

impl SegmentationConfig {
    fn default_endpoint() -> String {
        "https://api.remove.bg/v1.0/removebg".to_string()
    }
    fn default_timeout() -> u64 {
        60
    }
    fn default_width() -> u32 {
        1200
    }
    fn default_height() -> u32 {
        1300
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            timeout_secs: Self::default_timeout(),
            target_width: Self::default_width(),
            target_height: Self::default_height(),
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 是否启用 CORS
    #[serde(default)]
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_headers: Vec<String>,
    /// 是否允许携带凭证（Cookie/Authorization）
    #[serde(default)]
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 收到退出信号后等待在途请求完成的最长时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        30
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 加载配置：可选的 config.toml，再由 `APP_` 前缀环境变量覆盖。
    ///
    /// 嵌套字段用双下划线分隔，例如 `APP_SERVER__PORT=8080`、
    /// `APP_SEGMENTATION__TIMEOUT_SECS=30`。
    pub fn load() -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// 上游抠图服务凭证。
///
/// 启动时从环境变量读取一次，之后只读；缺失是合法状态，由需要它的接口自行判定。
#[derive(Clone, Default)]
pub struct ApiCredential(Option<Arc<str>>);

impl ApiCredential {
    /// 空白值视为缺失
    pub fn new(raw: Option<String>) -> Self {
        Self(
            raw.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(Arc::from),
        )
    }

    pub fn missing() -> Self {
        Self(None)
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok())
    }

    pub fn expose(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("ApiCredential(***)"),
            None => f.write_str("ApiCredential(<missing>)"),
        }
    }
}
