//! 网关定义、计价与随机源
//!
//! 每次网关尝试的成败是对该网关成功率的一次抽样；抽样来源通过 DrawSource 注入，
//! 生产环境用熵初始化的 StdRng，测试用固定种子或脚本化序列。

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::CartItem;

/// 单个支付网关：名称、标称成功率、单次尝试的标称延迟
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub name: String,
    pub success_rate: f64,
    pub latency_ms: u64,
}

impl Gateway {
    pub fn new(name: impl Into<String>, success_rate: f64, latency_ms: u64) -> Self {
        Self {
            name: name.into(),
            success_rate,
            latency_ms,
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// [pricing] 段：统一单价与空购物车时的演示金额
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pricing {
    #[serde(default = "default_unit_price")]
    pub unit_price: f64,
    #[serde(default = "default_amount")]
    pub default_amount: f64,
}

fn default_unit_price() -> f64 {
    2500.0
}

fn default_amount() -> f64 {
    3950.0
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            unit_price: default_unit_price(),
            default_amount: default_amount(),
        }
    }
}

impl Pricing {
    /// 购物车总价（单价 × 数量，重复条目各自计入）；空购物车为 0
    pub fn cart_value(&self, cart: &[CartItem]) -> f64 {
        cart.iter()
            .map(|item| self.unit_price * f64::from(item.quantity))
            .sum()
    }

    /// 本次应扣款金额；空购物车时回落到默认金额
    pub fn charge_amount(&self, cart: &[CartItem]) -> f64 {
        if cart.is_empty() {
            self.default_amount
        } else {
            self.cart_value(cart)
        }
    }
}

/// 随机源：返回 [0, 1) 内的一个数
pub trait DrawSource: Send + Sync {
    fn draw(&self) -> f64;
}

/// 基于 StdRng 的随机源；固定种子时结果可复现
#[derive(Debug)]
pub struct SeededDraws {
    rng: Mutex<StdRng>,
}

impl SeededDraws {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl DrawSource for SeededDraws {
    fn draw(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
        rng.gen::<f64>()
    }
}

/// 按给定序列依次返回；序列耗尽后一直返回 `exhausted`
#[derive(Debug)]
pub struct ScriptedDraws {
    values: Mutex<VecDeque<f64>>,
    exhausted: f64,
}

impl ScriptedDraws {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
            exhausted: 0.0,
        }
    }

    pub fn with_exhausted(mut self, value: f64) -> Self {
        self.exhausted = value;
        self
    }
}

impl DrawSource for ScriptedDraws {
    fn draw(&self) -> f64 {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.pop_front().unwrap_or(self.exhausted)
    }
}
