use std::fmt;

#[derive(Debug, Clone)]
pub enum LinklensError {
    Validation(String),
    NotFound(String),
    Store(String),
    StoreConnection(String),
    Enrichment(String),
    Serialization(String),
    Config(String),
}

impl LinklensError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinklensError::Validation(_) => "E001",
            LinklensError::NotFound(_) => "E002",
            LinklensError::Store(_) => "E003",
            LinklensError::StoreConnection(_) => "E004",
            LinklensError::Enrichment(_) => "E005",
            LinklensError::Serialization(_) => "E006",
            LinklensError::Config(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinklensError::Validation(_) => "Validation Error",
            LinklensError::NotFound(_) => "Resource Not Found",
            LinklensError::Store(_) => "Store Operation Error",
            LinklensError::StoreConnection(_) => "Store Connection Error",
            LinklensError::Enrichment(_) => "Enrichment Error",
            LinklensError::Serialization(_) => "Serialization Error",
            LinklensError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinklensError::Validation(msg)
            | LinklensError::NotFound(msg)
            | LinklensError::Store(msg)
            | LinklensError::StoreConnection(msg)
            | LinklensError::Enrichment(msg)
            | LinklensError::Serialization(msg)
            | LinklensError::Config(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            LinklensError::Validation(_) => StatusCode::BAD_REQUEST,
            LinklensError::NotFound(_) => StatusCode::NOT_FOUND,
            // HTTP 路由不会暴露分析错误（调度器内部消化），目前只有 check-provider 会遇到
            LinklensError::Enrichment(_) => StatusCode::BAD_GATEWAY,
            LinklensError::Store(_)
            | LinklensError::StoreConnection(_)
            | LinklensError::Serialization(_)
            | LinklensError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否为存储层错误（含连接错误）
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            LinklensError::Store(_) | LinklensError::StoreConnection(_)
        )
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinklensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinklensError {}

// 便捷的构造函数
impl LinklensError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinklensError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinklensError::NotFound(msg.into())
    }

    pub fn store<T: Into<String>>(msg: T) -> Self {
        LinklensError::Store(msg.into())
    }

    pub fn store_connection<T: Into<String>>(msg: T) -> Self {
        LinklensError::StoreConnection(msg.into())
    }

    pub fn enrichment<T: Into<String>>(msg: T) -> Self {
        LinklensError::Enrichment(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinklensError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinklensError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<redis::RedisError> for LinklensError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
            LinklensError::StoreConnection(err.to_string())
        } else {
            LinklensError::Store(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LinklensError {
    fn from(err: serde_json::Error) -> Self {
        LinklensError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for LinklensError {
    fn from(err: std::io::Error) -> Self {
        LinklensError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinklensError>;
