//! 错误类型：Agent 级错误与运行级错误
//!
//! Agent 级错误（AgentError）只记录到审计日志，绝不中断本次运行；
//! 运行级错误（OrchestratorError）由编排器包装成 RunFailure 交给调用方，附带统一的致歉文案。

use thiserror::Error;

use crate::agents::AgentKind;

/// 运行级失败时返回给用户的统一文案
pub const APOLOGY: &str =
    "I'm sorry, something went wrong while handling your request. Please try again in a moment.";

/// 单个 Agent 调用失败的原因（隔离处理，不影响其它 Agent）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("{0}")]
    Failed(String),

    #[error("agent panicked: {0}")]
    Panicked(String),

    /// Agent 返回了不属于自己的结果类型
    #[error("agent {expected} returned {actual} output")]
    MismatchedOutput {
        expected: AgentKind,
        actual: AgentKind,
    },

    #[error("dispatch budget of {0}ms exceeded")]
    BudgetExceeded(u64),
}

impl AgentError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// 编排器自身的错误（分类、分派、合成、配置）
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("agent not registered: {0}")]
    UnregisteredAgent(AgentKind),

    #[error("invalid channel: {0}")]
    InvalidChannel(String),

    #[error("agent task join failed: {0}")]
    TaskJoin(String),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("catalog error: {0}")]
    Catalog(String),
}

/// 运行失败：调用方只会拿到安全文案与底层错误，不会拿到半成品状态
#[derive(Error, Debug)]
#[error("{message}")]
pub struct RunFailure {
    pub message: &'static str,
    #[source]
    pub source: OrchestratorError,
}

impl From<OrchestratorError> for RunFailure {
    fn from(source: OrchestratorError) -> Self {
        Self {
            message: APOLOGY,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_failure_carries_apology_and_source() {
        let failure = RunFailure::from(OrchestratorError::UnregisteredAgent(AgentKind::Payment));
        assert_eq!(failure.to_string(), APOLOGY);
        assert!(failure.source.to_string().contains("payment"));
    }

    #[test]
    fn test_agent_error_display() {
        let err = AgentError::MismatchedOutput {
            expected: AgentKind::Loyalty,
            actual: AgentKind::Support,
        };
        assert_eq!(err.to_string(), "agent loyalty returned support output");
        assert_eq!(
            AgentError::BudgetExceeded(250).to_string(),
            "dispatch budget of 250ms exceeded"
        );
    }
}
