//! Agent 调用包装器
//!
//! invoke(agent, input) 计时并执行 Agent，把 Err / panic / 结果类型不符统一转为 AgentError；
//! 每次调用输出结构化审计日志（JSON）。审计日志条目的写入由分派器在主控任务中完成。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;

use crate::agents::{Agent, AgentInput, AgentKind, AgentOutput};
use crate::core::AgentError;

/// 一次调用的结果
#[derive(Debug)]
pub struct Invocation {
    pub kind: AgentKind,
    pub elapsed: Duration,
    pub outcome: Result<AgentOutput, AgentError>,
}

pub struct AgentExecutor;

impl AgentExecutor {
    /// 执行单个 Agent；不会 panic，也不会返回 Err 之外的失败形式
    pub async fn invoke(agent: Arc<dyn Agent>, input: Arc<AgentInput>) -> Invocation {
        let kind = agent.kind();
        let start = Instant::now();
        tracing::info!(agent = %kind, "{} called", kind.display_name());

        let caught = AssertUnwindSafe(agent.execute(&input)).catch_unwind().await;
        let outcome = match caught {
            Ok(Ok(output)) if output.kind() == kind => Ok(output),
            Ok(Ok(output)) => Err(AgentError::MismatchedOutput {
                expected: kind,
                actual: output.kind(),
            }),
            Ok(Err(e)) => Err(e),
            Err(payload) => Err(AgentError::Panicked(panic_message(payload.as_ref()))),
        };

        let elapsed = start.elapsed();
        let audit = serde_json::json!({
            "event": "agent_audit",
            "agent": kind.id(),
            "ok": outcome.is_ok(),
            "duration_ms": elapsed.as_millis() as u64,
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        match &outcome {
            Ok(_) => tracing::info!(audit = %audit, "{} completed", kind.display_name()),
            Err(e) => tracing::warn!(audit = %audit, "{} failed: {}", kind.display_name(), e),
        }

        Invocation {
            kind,
            elapsed,
            outcome,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::agents::SupportReply;
    use crate::core::{Channel, ProgressSink};

    struct Panicking;

    #[async_trait]
    impl Agent for Panicking {
        fn kind(&self) -> AgentKind {
            AgentKind::Inventory
        }

        async fn execute(&self, _input: &AgentInput) -> Result<AgentOutput, AgentError> {
            panic!("stock table missing");
        }
    }

    struct WrongShape;

    #[async_trait]
    impl Agent for WrongShape {
        fn kind(&self) -> AgentKind {
            AgentKind::Loyalty
        }

        async fn execute(&self, _input: &AgentInput) -> Result<AgentOutput, AgentError> {
            Ok(AgentOutput::Support(SupportReply::ready()))
        }
    }

    fn input() -> Arc<AgentInput> {
        Arc::new(AgentInput {
            session_id: "S1".into(),
            customer_id: "CUST001".into(),
            channel: Channel::Web,
            request: "help".into(),
            liked_products: vec![],
            cart: vec![],
            location: "Mumbai".into(),
            events: ProgressSink::disabled(),
        })
    }

    #[tokio::test]
    async fn test_panic_becomes_agent_error() {
        let inv = AgentExecutor::invoke(Arc::new(Panicking), input()).await;
        assert_eq!(inv.kind, AgentKind::Inventory);
        assert_eq!(
            inv.outcome.unwrap_err(),
            AgentError::Panicked("stock table missing".into())
        );
    }

    #[tokio::test]
    async fn test_mismatched_output_is_rejected() {
        let inv = AgentExecutor::invoke(Arc::new(WrongShape), input()).await;
        assert!(matches!(
            inv.outcome,
            Err(AgentError::MismatchedOutput {
                expected: AgentKind::Loyalty,
                actual: AgentKind::Support
            })
        ));
    }
}
