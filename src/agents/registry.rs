//! Agent 注册表
//!
//! 按 AgentKind 存储 Arc<dyn Agent>，支持 register / get / resolve；
//! with_defaults 按配置装配六个默认 Agent（进程启动时一次性完成）。

use std::collections::HashMap;
use std::sync::Arc;

use crate::agents::{
    Agent, AgentKind, Catalog, FulfillmentAgent, InventoryAgent, LoyaltyAgent, PaymentAgent,
    RecommendationAgent, SupportAgent,
};
use crate::config::AppConfig;
use crate::core::OrchestratorError;
use crate::payment::{DrawSource, SeededDraws};

/// Agent 注册表：每个 AgentKind 至多一个实现，后注册的覆盖先注册的
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: HashMap<AgentKind, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 装配默认六个 Agent；支付随机源使用熵初始化
    pub fn with_defaults(cfg: &AppConfig, catalog: Arc<Catalog>) -> Self {
        Self::with_defaults_and_draws(cfg, catalog, Arc::new(SeededDraws::from_entropy()))
    }

    /// 同 with_defaults，但由调用方注入支付随机源（测试 / 回放）
    pub fn with_defaults_and_draws(
        cfg: &AppConfig,
        catalog: Arc<Catalog>,
        draws: Arc<dyn DrawSource>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(RecommendationAgent::new(catalog.clone()));
        registry.register(InventoryAgent::new(catalog.clone()));
        registry.register(PaymentAgent::new(
            cfg.payment.gateways.clone(),
            cfg.pricing.clone(),
            draws,
        ));
        registry.register(FulfillmentAgent::new(cfg.pricing.clone()));
        registry.register(LoyaltyAgent::new(catalog, cfg.pricing.clone()));
        registry.register(SupportAgent);
        registry
    }

    pub fn register(&mut self, agent: impl Agent + 'static) {
        self.register_arc(Arc::new(agent));
    }

    pub fn register_arc(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.kind(), agent);
    }

    pub fn get(&self, kind: AgentKind) -> Option<Arc<dyn Agent>> {
        self.agents.get(&kind).cloned()
    }

    /// 按顺序取出一组 Agent；任一未注册即整体失败（分派前检查，不产生半成品状态）
    pub fn resolve(&self, kinds: &[AgentKind]) -> Result<Vec<Arc<dyn Agent>>, OrchestratorError> {
        kinds
            .iter()
            .map(|k| self.get(*k).ok_or(OrchestratorError::UnregisteredAgent(*k)))
            .collect()
    }

    /// 已注册的类型（按 AgentKind 顺序）
    pub fn kinds(&self) -> Vec<AgentKind> {
        let mut kinds: Vec<_> = self.agents.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
