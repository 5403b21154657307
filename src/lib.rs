//! Concierge - Rust 多智能体导购编排引擎
//!
//! 模块划分：
//! - **agents**: Agent 契约、注册表、调用包装器与六个默认 Agent（推荐 / 库存 / 支付 / 履约 / 积分 / 售后）
//! - **cli**: 演示二进制的命令行参数
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 共享状态、错误、进度事件、并发分派器与主控编排器
//! - **observability**: 日志初始化
//! - **payment**: 支付网关故障转移状态机
//! - **router**: 关键词意图识别（规则表）
//! - **session**: 会话快照（调用方加载 / 持久化）
//! - **synth**: 回复合成（分段渲染 + 寒暄直出）

pub mod agents;
pub mod cli;
pub mod config;
pub mod core;
pub mod observability;
pub mod payment;
pub mod router;
pub mod session;
pub mod synth;

pub use crate::core::{Orchestrator, RunFailure, RunOutcome};
pub use agents::{Agent, AgentKind, AgentRegistry};
pub use session::SessionSnapshot;
