//! 共享状态：一次编排运行内唯一的可变记录
//!
//! 由调用方的会话快照 + 本轮请求构造，整个运行期间归分派器独占。
//! Agent 只拿到只读快照（AgentInput），所有对 SharedState 的写入都由主控任务在汇合后完成。

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{
    AgentInput, AgentKind, AgentOutput, FulfillmentPlan, InventoryStatus, LoyaltySummary,
    Recommendations, SupportReply,
};
use crate::core::{AgentError, OrchestratorError, ProgressSink};
use crate::payment::PaymentReceipt;
use crate::session::{ConversationMessage, SessionSnapshot};
use crate::synth::NextAction;

/// 当前渠道
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Mobile,
    Whatsapp,
    #[default]
    Web,
    Store,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Mobile => "mobile",
            Channel::Whatsapp => "whatsapp",
            Channel::Web => "web",
            Channel::Store => "store",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mobile" => Ok(Channel::Mobile),
            "whatsapp" => Ok(Channel::Whatsapp),
            "web" => Ok(Channel::Web),
            "store" => Ok(Channel::Store),
            other => Err(OrchestratorError::InvalidChannel(other.to_string())),
        }
    }
}

/// 购物车条目。同一 product_id + size 允许重复出现，下游按条目独立计算，不做合并。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_size")]
    pub size: String,
}

fn default_quantity() -> u32 {
    1
}

fn default_size() -> String {
    "40".to_string()
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, quantity: u32, size: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            size: size.into(),
        }
    }
}

/// 审计日志条目状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Processing,
    Success,
    Failed,
}

/// 一次 Agent 调用的审计记录：开始时追加（processing），结束时原地更新一次
#[derive(Clone, Debug, Serialize)]
pub struct AgentCall {
    pub agent: AgentKind,
    pub status: CallStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    pub result: Option<AgentOutput>,
    pub error: Option<String>,
}

/// 只追加的审计日志
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<AgentCall>,
}

impl AuditLog {
    /// 追加一条 processing 记录，返回其下标
    pub fn begin(&mut self, agent: AgentKind) -> usize {
        self.entries.push(AgentCall {
            agent,
            status: CallStatus::Processing,
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: None,
            result: None,
            error: None,
        });
        self.entries.len() - 1
    }

    /// 标记成功；条目已结束（或下标无效）时返回 false
    pub fn succeed(&mut self, index: usize, elapsed: Duration, output: AgentOutput) -> bool {
        let Some(entry) = self.open_entry(index) else {
            return false;
        };
        entry.status = CallStatus::Success;
        entry.finished_at = Some(Utc::now());
        entry.duration_ms = Some(elapsed.as_millis() as u64);
        entry.result = Some(output);
        true
    }

    pub fn fail(&mut self, index: usize, elapsed: Duration, error: &AgentError) -> bool {
        let Some(entry) = self.open_entry(index) else {
            return false;
        };
        entry.status = CallStatus::Failed;
        entry.finished_at = Some(Utc::now());
        entry.duration_ms = Some(elapsed.as_millis() as u64);
        entry.error = Some(error.to_string());
        true
    }

    fn open_entry(&mut self, index: usize) -> Option<&mut AgentCall> {
        self.entries
            .get_mut(index)
            .filter(|e| e.status == CallStatus::Processing)
    }

    /// 仍处于 processing 的条目下标
    pub fn pending(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.status == CallStatus::Processing)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn contains(&self, agent: AgentKind) -> bool {
        self.entries.iter().any(|e| e.agent == agent)
    }

    pub fn entries(&self) -> &[AgentCall] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 每类 Agent 一个结果槽；同一运行内重复写入为覆盖
#[derive(Clone, Debug, Default, Serialize)]
pub struct AgentResults {
    pub recommendations: Option<Recommendations>,
    pub inventory: Option<InventoryStatus>,
    pub payment: Option<PaymentReceipt>,
    pub fulfillment: Option<FulfillmentPlan>,
    pub loyalty: Option<LoyaltySummary>,
    pub support: Option<SupportReply>,
}

impl AgentResults {
    pub fn merge(&mut self, output: AgentOutput) {
        match output {
            AgentOutput::Recommendation(v) => self.recommendations = Some(v),
            AgentOutput::Inventory(v) => self.inventory = Some(v),
            AgentOutput::Payment(v) => self.payment = Some(v),
            AgentOutput::Fulfillment(v) => self.fulfillment = Some(v),
            AgentOutput::Loyalty(v) => self.loyalty = Some(v),
            AgentOutput::Support(v) => self.support = Some(v),
        }
    }

    pub fn is_filled(&self, kind: AgentKind) -> bool {
        match kind {
            AgentKind::Recommendation => self.recommendations.is_some(),
            AgentKind::Inventory => self.inventory.is_some(),
            AgentKind::Payment => self.payment.is_some(),
            AgentKind::Fulfillment => self.fulfillment.is_some(),
            AgentKind::Loyalty => self.loyalty.is_some(),
            AgentKind::Support => self.support.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        AgentKind::ALL.iter().all(|k| !self.is_filled(*k))
    }
}

/// 一次编排运行的共享状态
#[derive(Clone, Debug, Serialize)]
pub struct SharedState {
    pub session_id: String,
    pub customer_id: String,
    pub channel: Channel,

    /// 本轮请求，运行期间只读
    request: String,
    /// 之前的对话（只追加）
    pub messages: Vec<ConversationMessage>,
    pub intent: Option<String>,

    pub liked_products: Vec<String>,
    pub cart: Vec<CartItem>,
    pub location: String,

    pub agents_needed: Vec<AgentKind>,
    pub audit: AuditLog,
    pub results: AgentResults,

    pub response: String,
    pub next_action: Option<NextAction>,
    pub error: Option<String>,
}

impl SharedState {
    pub fn new(snapshot: SessionSnapshot, request: impl Into<String>, channel: Channel) -> Self {
        Self {
            session_id: snapshot.session_id,
            customer_id: snapshot.customer_id,
            channel,
            request: request.into(),
            messages: snapshot.conversation,
            intent: None,
            liked_products: snapshot.liked_products,
            cart: snapshot.cart,
            location: snapshot.location,
            agents_needed: Vec::new(),
            audit: AuditLog::default(),
            results: AgentResults::default(),
            response: String::new(),
            next_action: None,
            error: None,
        }
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    /// 构造所有 Agent 共用的只读快照
    pub fn agent_input(&self, events: ProgressSink) -> AgentInput {
        AgentInput {
            session_id: self.session_id.clone(),
            customer_id: self.customer_id.clone(),
            channel: self.channel,
            request: self.request.clone(),
            liked_products: self.liked_products.clone(),
            cart: self.cart.clone(),
            location: self.location.clone(),
            events,
        }
    }
}
