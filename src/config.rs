//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CONCIERGE__*` 覆盖（双下划线表示嵌套，如 `CONCIERGE__ORCHESTRATOR__DISPATCH_BUDGET_MS=3000`）。

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::OrchestratorError;
use crate::payment::{Gateway, Pricing};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub orchestrator: OrchestratorSection,
    pub session: SessionSection,
    pub pricing: Pricing,
    pub payment: PaymentSection,
    pub catalog: CatalogSection,
}

/// [orchestrator] 段：分派预算与进度事件通道容量
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSection {
    /// 整次分派的墙钟预算（毫秒）；不设则等待所有 Agent 完成
    #[serde(default)]
    pub dispatch_budget_ms: Option<u64>,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    64
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            dispatch_budget_ms: None,
            event_capacity: default_event_capacity(),
        }
    }
}

/// [session] 段：新会话的默认客户与位置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_customer")]
    pub default_customer: String,
    #[serde(default = "default_location")]
    pub default_location: String,
}

fn default_customer() -> String {
    "CUST001".to_string()
}

fn default_location() -> String {
    "Mumbai".to_string()
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            default_customer: default_customer(),
            default_location: default_location(),
        }
    }
}

/// [payment] 段：按顺序尝试的网关列表
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSection {
    #[serde(default = "default_gateways")]
    pub gateways: Vec<Gateway>,
}

fn default_gateways() -> Vec<Gateway> {
    vec![
        Gateway::new("Razorpay", 0.3, 1200),
        Gateway::new("PayU", 0.3, 800),
        Gateway::new("UPI Direct", 1.0, 700),
    ]
}

impl Default for PaymentSection {
    fn default() -> Self {
        Self {
            gateways: default_gateways(),
        }
    }
}

/// [catalog] 段：商品 / 门店 / 客户数据文件（JSON），未设置时使用内置数据
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogSection {
    pub path: Option<PathBuf>,
}

/// 默认配置文件的候选位置（取第一个存在的）
const DEFAULT_CONFIG_FILES: [&str; 3] = [
    "config/default.toml",
    "../config/default.toml",
    "default.toml",
];

/// 加载配置，三层叠加，后者覆盖前者：
/// 默认配置文件 → 调用方指定的文件（存在时）→ 环境变量 CONCIERGE__*
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, OrchestratorError> {
    let default_file = DEFAULT_CONFIG_FILES
        .into_iter()
        .map(Path::new)
        .find(|p| p.exists());

    let sources = default_file
        .map(Path::to_path_buf)
        .into_iter()
        .chain(config_path.filter(|p| p.exists()));

    let builder = sources.fold(config::Config::builder(), |builder, path| {
        tracing::debug!(path = %path.display(), "loading config file");
        builder.add_source(config::File::from(path).required(false))
    });

    let cfg: AppConfig = builder
        .add_source(
            config::Environment::with_prefix("CONCIERGE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;
    Ok(cfg)
}
