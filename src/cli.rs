//! 命令行参数（concierge 演示二进制）

use std::path::PathBuf;

use clap::Parser;

use crate::core::{CartItem, Channel};

/// 处理一条导购请求，打印回复与 Agent 审计日志
#[derive(Parser, Debug, Clone)]
#[command(name = "concierge", version, about, long_about = None)]
pub struct CliArgs {
    /// 请求来源渠道：mobile / whatsapp / web / store
    #[arg(long, default_value = "web", value_parser = parse_channel)]
    pub channel: Channel,

    /// 购物车条目 PRODUCT[:SIZE]，可重复
    #[arg(long = "cart", value_name = "PRODUCT[:SIZE]", value_parser = parse_cart_item)]
    pub cart: Vec<CartItem>,

    /// 喜欢的商品 ID，可重复
    #[arg(long = "like", value_name = "PRODUCT")]
    pub liked: Vec<String>,

    /// 额外的配置文件
    #[arg(short, long, env = "CONCIERGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// 请求文本；为空时按 "hello" 处理
    #[arg(trailing_var_arg = true)]
    pub request: Vec<String>,
}

impl CliArgs {
    pub fn request_text(&self) -> String {
        if self.request.is_empty() {
            "hello".to_string()
        } else {
            self.request.join(" ")
        }
    }
}

fn parse_channel(s: &str) -> Result<Channel, String> {
    s.parse().map_err(|e: crate::core::OrchestratorError| e.to_string())
}

/// `VH001` 或 `VH001:42`，数量固定为 1，尺码默认 40
fn parse_cart_item(s: &str) -> Result<CartItem, String> {
    let (product, size) = s.split_once(':').unwrap_or((s, "40"));
    if product.is_empty() || size.is_empty() {
        return Err(format!("expected PRODUCT[:SIZE], got {:?}", s));
    }
    Ok(CartItem::new(product, 1, size))
}
