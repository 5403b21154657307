//! 支付：网关定义、金额计算、成功率抽样与故障转移状态机
//!
//! - **gateway**: 网关列表、计价规则、可注入的随机源
//! - **failover**: 按顺序逐个尝试网关，首个成功即停止，完整保留重试历史

pub mod failover;
pub mod gateway;

pub use failover::{
    AttemptOutcome, FailoverProtocol, FailoverState, PaymentReceipt, PaymentState, RetryRecord,
};
pub use gateway::{DrawSource, Gateway, Pricing, ScriptedDraws, SeededDraws};
