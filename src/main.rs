//! Concierge - Rust 多智能体导购编排引擎
//!
//! 入口：初始化日志、加载配置、装配编排器，处理命令行给出的一条请求，
//! 打印回复与 Agent 审计日志。
//!
//! 用法：concierge [--channel web] [--cart VH001:40] [--like VH001] [--config path] <request...>

use anyhow::Context;
use clap::Parser;
use concierge::cli::CliArgs;
use concierge::config::{load_config, AppConfig};
use concierge::{observability, Orchestrator, SessionSnapshot};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cli = CliArgs::parse();
    let cfg = match load_config(cli.config.clone()) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("config load failed, using defaults: {}", e);
            AppConfig::default()
        }
    };

    let orchestrator = Orchestrator::from_config(&cfg).context("Failed to build orchestrator")?;

    // 进度事件打到日志（实时推送层的替身）
    if let Some(mut rx) = orchestrator.subscribe() {
        tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                if let Ok(json) = serde_json::to_string(&event) {
                    tracing::debug!(target: "concierge::progress", "{}", json);
                }
            }
        });
    }

    let request = cli.request_text();
    let snapshot = SessionSnapshot::new(&cfg.session.default_customer, &cfg.session.default_location)
        .with_cart(cli.cart)
        .with_liked_products(cli.liked);

    match orchestrator.run(snapshot, &request, cli.channel).await {
        Ok(outcome) => {
            println!("{}\n", outcome.response());
            let audit = serde_json::to_string_pretty(outcome.audit_log())
                .context("Failed to serialize audit log")?;
            println!("{}", audit);
        }
        Err(failure) => {
            tracing::error!(error = %failure.source, "run failed");
            println!("{}", failure.message);
        }
    }

    Ok(())
}
