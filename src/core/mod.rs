//! 核心编排层：共享状态、错误、进度事件、并发分派、主控编排

pub mod dispatcher;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod state;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{AgentError, OrchestratorError, RunFailure, APOLOGY};
pub use events::{ProgressEvent, ProgressSink};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use state::{AgentCall, AgentResults, AuditLog, CallStatus, CartItem, Channel, SharedState};
