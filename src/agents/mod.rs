//! Agent 契约与默认实现
//!
//! 所有 Agent 实现 Agent trait（kind / execute），由 AgentRegistry 按类型注册与查找，
//! AgentExecutor 在调用时计时、捕获错误与 panic，并校验返回的结果类型。
//! 注册集合在进程启动时确定，运行期不可发现新 Agent。

pub mod catalog;
pub mod executor;
pub mod fulfillment;
pub mod inventory;
pub mod loyalty;
pub mod payment;
pub mod recommendation;
pub mod registry;
pub mod support;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{AgentError, CartItem, Channel, ProgressSink};
use crate::payment::PaymentReceipt;

pub use catalog::Catalog;
pub use executor::{AgentExecutor, Invocation};
pub use fulfillment::{DeliveryKind, DeliveryOption, FulfillmentAgent, FulfillmentPlan};
pub use inventory::{Alternative, InventoryAgent, InventoryStatus, StoreStock};
pub use loyalty::{LoyaltyAgent, LoyaltySummary};
pub use payment::PaymentAgent;
pub use recommendation::{RecommendationAgent, RecommendedProduct, Recommendations};
pub use registry::AgentRegistry;
pub use support::{SupportAgent, SupportReply, SupportTopic};

/// 六类 Agent 的稳定标识
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Recommendation,
    Inventory,
    Payment,
    Fulfillment,
    Loyalty,
    Support,
}

impl AgentKind {
    pub const ALL: [AgentKind; 6] = [
        AgentKind::Recommendation,
        AgentKind::Inventory,
        AgentKind::Payment,
        AgentKind::Fulfillment,
        AgentKind::Loyalty,
        AgentKind::Support,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            AgentKind::Recommendation => "recommendation",
            AgentKind::Inventory => "inventory",
            AgentKind::Payment => "payment",
            AgentKind::Fulfillment => "fulfillment",
            AgentKind::Loyalty => "loyalty",
            AgentKind::Support => "support",
        }
    }

    /// 日志与活动面板里显示的名称
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::Recommendation => "Recommendation Agent",
            AgentKind::Inventory => "Inventory Agent",
            AgentKind::Payment => "Payment Agent",
            AgentKind::Fulfillment => "Fulfillment Agent",
            AgentKind::Loyalty => "Loyalty Agent",
            AgentKind::Support => "Support Agent",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Agent 看到的只读快照；同一次运行内所有 Agent 共享同一份
#[derive(Debug, Clone)]
pub struct AgentInput {
    pub session_id: String,
    pub customer_id: String,
    pub channel: Channel,
    pub request: String,
    pub liked_products: Vec<String>,
    pub cart: Vec<CartItem>,
    pub location: String,
    /// 进度事件（Agent 内部的细粒度进度，如支付网关尝试）
    pub events: ProgressSink,
}

impl AgentInput {
    /// 小写后的请求文本，关键词判断统一用它
    pub fn request_lower(&self) -> String {
        self.request.to_lowercase()
    }
}

/// 每类 Agent 的结构化结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum AgentOutput {
    Recommendation(Recommendations),
    Inventory(InventoryStatus),
    Payment(PaymentReceipt),
    Fulfillment(FulfillmentPlan),
    Loyalty(LoyaltySummary),
    Support(SupportReply),
}

impl AgentOutput {
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentOutput::Recommendation(_) => AgentKind::Recommendation,
            AgentOutput::Inventory(_) => AgentKind::Inventory,
            AgentOutput::Payment(_) => AgentKind::Payment,
            AgentOutput::Fulfillment(_) => AgentKind::Fulfillment,
            AgentOutput::Loyalty(_) => AgentKind::Loyalty,
            AgentOutput::Support(_) => AgentKind::Support,
        }
    }
}

/// Agent trait：类型标识 + 异步执行（输入为只读快照）
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    async fn execute(&self, input: &AgentInput) -> Result<AgentOutput, AgentError>;
}
