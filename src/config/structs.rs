use serde::{Deserialize, Serialize};

use crate::utils::code::{DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 服务器地址、端口、CPU 数量
/// - store: 键值存储后端（redis / memory）
/// - shortener: 短码生成参数
/// - enrichment: AI 分析（provider、抓取、超时）
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub shortener: ShortenerConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LL，分隔符：__
    /// 示例：LL__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LL")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    #[default]
    Redis,
    Memory,
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redis => write!(f, "redis"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// 键值存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(rename = "type")]
    #[serde(default)]
    pub store_type: StoreType,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Prepended to every key. Empty keeps the bare `{code}` / `stats:{code}` layout.
    #[serde(default)]
    pub key_prefix: String,
}

/// 短码生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenerConfig {
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

impl ShortenerConfig {
    /// Configured length clamped into the range the digest can serve.
    pub fn effective_code_length(&self) -> usize {
        self.code_length.clamp(1, MAX_CODE_LENGTH)
    }
}

/// AI 分析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_enrichment_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_enrichment_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_enrichment_model")]
    pub model: String,
    #[serde(default = "default_enrichment_timeout")]
    pub timeout_secs: u64,
    /// 是否抓取页面正文作为提示词上下文
    #[serde(default = "default_fetch_context")]
    pub fetch_context: bool,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    /// 关闭时等待后台分析任务的最长时间
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

impl EnrichmentConfig {
    /// The API key, ignoring blank values coming from empty env vars.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/0".to_string()
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_enrichment_enabled() -> bool {
    true
}

fn default_enrichment_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_enrichment_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_enrichment_timeout() -> u64 {
    20
}

fn default_fetch_context() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    5
}

fn default_max_context_chars() -> usize {
    2000
}

fn default_shutdown_grace() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            redis_url: default_redis_url(),
            key_prefix: String::new(),
        }
    }
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: default_enrichment_enabled(),
            api_key: None,
            endpoint: default_enrichment_endpoint(),
            model: default_enrichment_model(),
            timeout_secs: default_enrichment_timeout(),
            fetch_context: default_fetch_context(),
            fetch_timeout_secs: default_fetch_timeout(),
            max_context_chars: default_max_context_chars(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.store_type, StoreType::Redis);
        assert_eq!(config.shortener.code_length, 6);
        assert!(config.enrichment.enabled);
        assert!(config.enrichment.api_key().is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_code_length_is_clamped() {
        let mut shortener = ShortenerConfig::default();
        shortener.code_length = 0;
        assert_eq!(shortener.effective_code_length(), 1);
        shortener.code_length = 64;
        assert_eq!(shortener.effective_code_length(), MAX_CODE_LENGTH);
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let mut enrichment = EnrichmentConfig::default();
        enrichment.api_key = Some("   ".to_string());
        assert!(enrichment.api_key().is_none());
        enrichment.api_key = Some("secret".to_string());
        assert_eq!(enrichment.api_key(), Some("secret"));
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[server]"));
        assert!(sample.contains("[enrichment]"));
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.store.store_type, StoreType::Redis);
    }

    #[test]
    fn test_store_type_parses_lowercase() {
        let parsed: StoreConfig = toml::from_str("type = \"memory\"").unwrap();
        assert_eq!(parsed.store_type, StoreType::Memory);
        assert_eq!(parsed.redis_url, "redis://127.0.0.1:6379/0");
    }
}
