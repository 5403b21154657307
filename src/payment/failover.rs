//! 支付网关故障转移状态机
//!
//! Idle → Attempting(i) → {Succeeded | FailedAttempt(i)}，失败且仍有网关时进入 Attempting(i+1)，
//! 最终停在 Succeeded 或 AllFailed。每个网关本次最多尝试一次，重试历史按时间顺序完整返回。
//! AllFailed 是正常业务结果，不作为错误上抛。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{ProgressEvent, ProgressSink};
use crate::payment::{DrawSource, Gateway};

/// 单次网关尝试的结果
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failed,
}

/// 重试历史中的一条记录
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RetryRecord {
    pub gateway: String,
    pub outcome: AttemptOutcome,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// 请求里没有付款意图，只报出金额
    Pending,
    Completed,
    Failed,
}

/// 支付 Agent 写入结果槽的内容
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentReceipt {
    pub success: bool,
    pub status: PaymentState,
    pub amount: f64,
    pub gateway: Option<String>,
    pub transaction_id: Option<String>,
    pub retry_history: Vec<RetryRecord>,
    /// 已尝试网关的标称延迟之和
    pub total_time_ms: Option<u64>,
    pub message: String,
}

impl PaymentReceipt {
    pub fn pending(amount: f64) -> Self {
        Self {
            success: false,
            status: PaymentState::Pending,
            amount,
            gateway: None,
            transaction_id: None,
            retry_history: Vec::new(),
            total_time_ms: None,
            message: "Ready to process payment".to_string(),
        }
    }

    /// 展示用的耗时，如 "2.7s"
    pub fn total_time_display(&self) -> Option<String> {
        self.total_time_ms
            .map(|ms| format!("{:.1}s", ms as f64 / 1000.0))
    }
}

/// 状态机的状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailoverState {
    Idle,
    Attempting(usize),
    FailedAttempt(usize),
    Succeeded(usize),
    AllFailed,
}

/// 对一组有序网关执行故障转移
#[derive(Debug, Clone)]
pub struct FailoverProtocol {
    gateways: Vec<Gateway>,
}

impl FailoverProtocol {
    pub fn new(gateways: Vec<Gateway>) -> Self {
        Self { gateways }
    }

    pub fn gateways(&self) -> &[Gateway] {
        &self.gateways
    }

    /// 扣款：金额由调用方在首次尝试前算好，重试过程中不再变化
    pub async fn charge(
        &self,
        amount: f64,
        draws: &dyn DrawSource,
        events: &ProgressSink,
    ) -> PaymentReceipt {
        let mut state = FailoverState::Idle;
        let mut history: Vec<RetryRecord> = Vec::with_capacity(self.gateways.len());
        let mut total_ms = 0u64;

        loop {
            state = match state {
                FailoverState::Idle => {
                    if self.gateways.is_empty() {
                        FailoverState::AllFailed
                    } else {
                        FailoverState::Attempting(0)
                    }
                }
                FailoverState::Attempting(i) => {
                    let gateway = &self.gateways[i];
                    tracing::info!(gateway = %gateway.name, attempt = i + 1, "payment attempt");

                    tokio::time::sleep(gateway.latency()).await;
                    total_ms += gateway.latency_ms;

                    let ok = draws.draw() < gateway.success_rate;
                    let outcome = if ok {
                        AttemptOutcome::Success
                    } else {
                        AttemptOutcome::Failed
                    };
                    let timestamp = Utc::now();
                    history.push(RetryRecord {
                        gateway: gateway.name.clone(),
                        outcome,
                        timestamp,
                    });
                    events.emit(ProgressEvent::GatewayAttempt {
                        gateway: gateway.name.clone(),
                        outcome,
                        at: timestamp,
                    });

                    if ok {
                        FailoverState::Succeeded(i)
                    } else {
                        tracing::warn!(gateway = %gateway.name, "payment attempt failed");
                        FailoverState::FailedAttempt(i)
                    }
                }
                FailoverState::FailedAttempt(i) => {
                    if i + 1 < self.gateways.len() {
                        FailoverState::Attempting(i + 1)
                    } else {
                        FailoverState::AllFailed
                    }
                }
                FailoverState::Succeeded(i) => {
                    let gateway = &self.gateways[i];
                    return PaymentReceipt {
                        success: true,
                        status: PaymentState::Completed,
                        amount,
                        gateway: Some(gateway.name.clone()),
                        transaction_id: Some(transaction_id(draws)),
                        retry_history: history,
                        total_time_ms: Some(total_ms),
                        message: format!("Payment successful via {}!", gateway.name),
                    };
                }
                FailoverState::AllFailed => {
                    return PaymentReceipt {
                        success: false,
                        status: PaymentState::Failed,
                        amount,
                        gateway: None,
                        transaction_id: None,
                        retry_history: history,
                        total_time_ms: Some(total_ms),
                        message: "All payment methods failed. Please try again later.".to_string(),
                    };
                }
            };
        }
    }
}

/// `TXN` + 六位数字，取自同一随机源，便于测试复现
fn transaction_id(draws: &dyn DrawSource) -> String {
    let n = 100_000 + (draws.draw() * 900_000.0) as u32;
    format!("TXN{}", n.min(999_999))
}
