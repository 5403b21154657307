//! 分派器：并发执行选中的 Agent 并合并结果
//!
//! 主控任务为每个 Agent 先追加一条 processing 审计记录再 spawn，
//! 汇合时按完成顺序把结果写回 SharedState。Agent 只拿到只读快照，
//! 所有写入都发生在主控任务里，因此业务字段无需加锁。
//!
//! 可选的整体预算（dispatch_budget）到期后中止剩余任务，
//! 把它们的审计记录标为失败，并保留已经合并的部分结果。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::agents::{AgentExecutor, AgentKind, AgentRegistry, Invocation};
use crate::core::{AgentError, OrchestratorError, ProgressEvent, ProgressSink, SharedState};

/// 一次分派的概况
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// 实际启动的 Agent（按启动顺序）
    pub launched: Vec<AgentKind>,
    /// 在预算内结束（成功或失败）的数量
    pub completed: usize,
    pub timed_out: bool,
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: AgentRegistry,
    budget: Option<Duration>,
    events: ProgressSink,
}

impl Dispatcher {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            budget: None,
            events: ProgressSink::disabled(),
        }
    }

    pub fn with_budget(mut self, budget: Option<Duration>) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_events(mut self, events: ProgressSink) -> Self {
        self.events = events;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// 并发执行 kinds 中的 Agent，全部结束（或预算到期）后返回
    ///
    /// 重复的类型以及本次运行已调用过的类型会被跳过，每个 Agent 每轮至多一条审计记录。
    /// 任一类型未注册时在启动任何任务之前返回错误，state 保持不变。
    pub async fn dispatch(
        &self,
        state: &mut SharedState,
        kinds: &[AgentKind],
    ) -> Result<DispatchReport, OrchestratorError> {
        let mut selected: Vec<AgentKind> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !selected.contains(kind) && !state.audit.contains(*kind) {
                selected.push(*kind);
            }
        }
        let agents = self.registry.resolve(&selected)?;

        let input = Arc::new(state.agent_input(self.events.clone()));
        let started = Instant::now();
        let deadline = self.budget.map(|b| started + b);

        let mut tasks: JoinSet<(usize, Invocation)> = JoinSet::new();
        for agent in agents {
            let kind = agent.kind();
            let index = state.audit.begin(kind);
            self.events.emit(ProgressEvent::AgentStarted {
                agent: kind,
                at: Utc::now(),
            });
            let input = input.clone();
            tasks.spawn(async move { (index, AgentExecutor::invoke(agent, input).await) });
        }
        tracing::info!(session = %state.session_id, agents = ?selected, "dispatching agents");

        let mut completed = 0usize;
        let mut timed_out = false;
        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        timed_out = true;
                        break;
                    }
                },
                None => tasks.join_next().await,
            };
            let Some(joined) = next else {
                break;
            };
            let (index, invocation) =
                joined.map_err(|e| OrchestratorError::TaskJoin(e.to_string()))?;
            self.apply(state, index, invocation);
            completed += 1;
        }

        if timed_out {
            tasks.abort_all();
            self.expire_pending(state, started.elapsed());
        }

        Ok(DispatchReport {
            launched: selected,
            completed,
            timed_out,
        })
    }

    /// 把一次调用的结果写回审计记录与结果槽
    fn apply(&self, state: &mut SharedState, index: usize, invocation: Invocation) {
        let Invocation {
            kind,
            elapsed,
            outcome,
        } = invocation;
        let duration_ms = elapsed.as_millis() as u64;

        match outcome {
            Ok(output) => {
                if state.audit.succeed(index, elapsed, output.clone()) {
                    tracing::debug!(agent = %kind, "merging result");
                    state.results.merge(output);
                    self.events.emit(ProgressEvent::AgentFinished {
                        agent: kind,
                        duration_ms,
                        at: Utc::now(),
                    });
                }
            }
            Err(error) => {
                if state.audit.fail(index, elapsed, &error) {
                    self.events.emit(ProgressEvent::AgentFailed {
                        agent: kind,
                        duration_ms,
                        error: error.to_string(),
                        at: Utc::now(),
                    });
                }
            }
        }
    }

    fn expire_pending(&self, state: &mut SharedState, elapsed: Duration) {
        let budget_ms = self.budget.unwrap_or(elapsed).as_millis() as u64;
        let error = AgentError::BudgetExceeded(budget_ms);
        let pending = state.audit.pending();

        for index in &pending {
            let kind = state.audit.entries()[*index].agent;
            if state.audit.fail(*index, elapsed, &error) {
                tracing::warn!(agent = %kind, budget_ms, "agent aborted: dispatch budget exceeded");
                self.events.emit(ProgressEvent::AgentFailed {
                    agent: kind,
                    duration_ms: elapsed.as_millis() as u64,
                    error: error.to_string(),
                    at: Utc::now(),
                });
            }
        }

        state.error = Some(format!(
            "dispatch budget of {}ms exceeded; {} agent(s) did not finish",
            budget_ms,
            pending.len()
        ));
    }
}
