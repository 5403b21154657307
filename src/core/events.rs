//! 编排进度事件：供实时推送通道（WebSocket 等）消费
//!
//! 基于 broadcast 通道，发送永不阻塞；没有订阅者或订阅者过慢（Lagged）都不影响编排进度。

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::agents::AgentKind;
use crate::payment::AttemptOutcome;

/// 单个进度事件（可序列化为 JSON 供前端展示）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// 意图识别完成，列出本次要调用的 Agent（为空表示走寒暄直出）
    Routed {
        session_id: String,
        agents: Vec<AgentKind>,
    },
    AgentStarted {
        agent: AgentKind,
        at: DateTime<Utc>,
    },
    AgentFinished {
        agent: AgentKind,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    AgentFailed {
        agent: AgentKind,
        duration_ms: u64,
        error: String,
        at: DateTime<Utc>,
    },
    /// 支付 Agent 内部的单次网关尝试
    GatewayAttempt {
        gateway: String,
        outcome: AttemptOutcome,
        at: DateTime<Utc>,
    },
    /// 最终回复已生成
    ResponseReady {
        session_id: String,
        at: DateTime<Utc>,
    },
}

/// 进度事件发送端；未启用时所有 emit 都是空操作
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<broadcast::Sender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn subscribe(&self) -> Option<broadcast::Receiver<ProgressEvent>> {
        self.tx.as_ref().map(|tx| tx.subscribe())
    }

    /// 发送事件；无订阅者时 send 返回 Err，直接忽略
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let sink = ProgressSink::new(4);
        sink.emit(ProgressEvent::ResponseReady {
            session_id: "S1".into(),
            at: Utc::now(),
        });
        ProgressSink::disabled().emit(ProgressEvent::ResponseReady {
            session_id: "S1".into(),
            at: Utc::now(),
        });
        assert!(ProgressSink::disabled().subscribe().is_none());
    }

    #[tokio::test]
    async fn test_slow_subscriber_never_blocks_sender() {
        let sink = ProgressSink::new(2);
        let mut rx = sink.subscribe().unwrap();
        for _ in 0..10 {
            sink.emit(ProgressEvent::Routed {
                session_id: "S1".into(),
                agents: vec![AgentKind::Loyalty],
            });
        }
        // 容量 2：前面的事件被覆盖，订阅者收到 Lagged 而非阻塞发送端
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(ProgressEvent::AgentFinished {
            agent: AgentKind::Inventory,
            duration_ms: 12,
            at: Utc::now(),
        })
        .unwrap();
        assert_eq!(json["type"], "agent_finished");
        assert_eq!(json["agent"], "inventory");
    }
}
