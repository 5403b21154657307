//! 编排器：一次请求的主控流程
//!
//! 意图识别 → (无 Agent：寒暄直出 | 有 Agent：并发分派 → 回复合成) → 下一步提示。
//! 运行级错误统一包装成 RunFailure（致歉文案 + 底层错误），不会把半成品状态交给调用方。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::agents::{AgentRegistry, Catalog};
use crate::config::{AppConfig, OrchestratorSection};
use crate::core::{
    AgentCall, AgentResults, Channel, Dispatcher, OrchestratorError, ProgressEvent, ProgressSink,
    RunFailure, SharedState,
};
use crate::router::{IntentClassifier, SmallTalk};
use crate::session::{ConversationMessage, SessionSnapshot};
use crate::synth::{self, NextAction};

/// 一次成功运行的结果：最终 SharedState 及其便捷访问
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    state: SharedState,
}

impl RunOutcome {
    pub fn response(&self) -> &str {
        &self.state.response
    }

    pub fn audit_log(&self) -> &[AgentCall] {
        self.state.audit.entries()
    }

    pub fn results(&self) -> &AgentResults {
        &self.state.results
    }

    pub fn intent(&self) -> Option<&str> {
        self.state.intent.as_deref()
    }

    pub fn next_action(&self) -> Option<NextAction> {
        self.state.next_action
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn into_state(self) -> SharedState {
        self.state
    }

    /// 本轮新增的两条对话（用户 + 助手），由调用方追加到会话存储
    pub fn new_turns(&self) -> Vec<ConversationMessage> {
        vec![
            ConversationMessage::user(self.state.request(), self.state.channel),
            ConversationMessage::assistant(&self.state.response, self.state.channel),
        ]
    }
}

pub struct Orchestrator {
    classifier: IntentClassifier,
    dispatcher: Dispatcher,
    events: ProgressSink,
}

impl Orchestrator {
    pub fn new(registry: AgentRegistry, cfg: &OrchestratorSection) -> Self {
        let events = ProgressSink::new(cfg.event_capacity);
        let dispatcher = Dispatcher::new(registry)
            .with_budget(cfg.dispatch_budget_ms.map(Duration::from_millis))
            .with_events(events.clone());
        Self {
            classifier: IntentClassifier::new(),
            dispatcher,
            events,
        }
    }

    /// 按配置装配默认六个 Agent；配置了 catalog.path 时从文件加载数据
    pub fn from_config(cfg: &AppConfig) -> Result<Self, OrchestratorError> {
        let catalog = match &cfg.catalog.path {
            Some(path) => Catalog::from_json_file(path)?,
            None => Catalog::builtin(),
        };
        let registry = AgentRegistry::with_defaults(cfg, Arc::new(catalog));
        Ok(Self::new(registry, &cfg.orchestrator))
    }

    /// 替换意图规则表
    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// 订阅进度事件；慢订阅者只会丢事件（Lagged），不会拖慢编排
    pub fn subscribe(&self) -> Option<broadcast::Receiver<ProgressEvent>> {
        self.events.subscribe()
    }

    pub async fn run(
        &self,
        snapshot: SessionSnapshot,
        request: &str,
        channel: Channel,
    ) -> Result<RunOutcome, RunFailure> {
        let mut state = SharedState::new(snapshot, request, channel);

        let agents = self.classifier.classify(request, &state);
        tracing::info!(session = %state.session_id, agents = ?agents, "intent classified");
        self.events.emit(ProgressEvent::Routed {
            session_id: state.session_id.clone(),
            agents: agents.clone(),
        });
        state.agents_needed = agents.clone();

        match agents.first() {
            None => {
                let talk = SmallTalk::detect(request);
                state.intent = Some(talk.label().to_string());
                state.response = synth::canned_reply(talk).to_string();
            }
            Some(first) => {
                state.intent = Some(first.id().to_string());
                let report = self
                    .dispatcher
                    .dispatch(&mut state, &agents)
                    .await
                    .map_err(|e| {
                        tracing::error!(session = %state.session_id, error = %e, "run failed");
                        RunFailure::from(e)
                    })?;
                if report.timed_out {
                    tracing::warn!(
                        session = %state.session_id,
                        completed = report.completed,
                        launched = report.launched.len(),
                        "responding with partial results"
                    );
                }
                state.response = synth::render(&state);
            }
        }

        state.next_action = synth::next_action(&state);
        self.events.emit(ProgressEvent::ResponseReady {
            session_id: state.session_id.clone(),
            at: Utc::now(),
        });

        Ok(RunOutcome { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(AgentRegistry::new(), &OrchestratorSection::default())
    }

    #[tokio::test]
    async fn test_greeting_path_is_idempotent() {
        let orch = orchestrator();
        let snapshot = SessionSnapshot::new("CUST001", "Mumbai").with_session_id("SESSION_fixed");

        let first = orch.run(snapshot.clone(), "hello", Channel::Web).await.unwrap();
        let second = orch.run(snapshot, "hello", Channel::Web).await.unwrap();

        assert_eq!(first.response(), second.response());
        assert_eq!(first.intent(), Some("greeting"));
        assert!(first.audit_log().is_empty());
        assert!(first.results().is_empty());
    }

    #[tokio::test]
    async fn test_general_small_talk() {
        let outcome = orchestrator()
            .run(SessionSnapshot::new("CUST001", "Mumbai"), "good morning", Channel::Mobile)
            .await
            .unwrap();
        assert_eq!(outcome.intent(), Some("general"));
        assert_eq!(outcome.response(), synth::canned_reply(SmallTalk::General));
        assert!(outcome.next_action().is_none());
    }

    #[tokio::test]
    async fn test_missing_agent_is_run_failure() {
        let err = orchestrator()
            .run(SessionSnapshot::new("CUST001", "Mumbai"), "checkout", Channel::Web)
            .await
            .unwrap_err();
        assert_eq!(err.message, crate::core::APOLOGY);
        assert!(matches!(err.source, OrchestratorError::UnregisteredAgent(_)));
    }

    #[tokio::test]
    async fn test_new_turns_pair_request_and_reply() {
        let outcome = orchestrator()
            .run(SessionSnapshot::new("CUST001", "Mumbai"), "thanks!", Channel::Whatsapp)
            .await
            .unwrap();
        let turns = outcome.new_turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "thanks!");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, outcome.response());
        assert_eq!(turns[1].channel, Channel::Whatsapp);
    }
}
