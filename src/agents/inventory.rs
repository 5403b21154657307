//! 库存 Agent：查库存、找附近门店、缺货时给出替代品

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::agents::{Agent, AgentInput, AgentKind, AgentOutput, Catalog};
use crate::core::{AgentError, CartItem};

const DEFAULT_PRODUCT: &str = "VH001";
const DEFAULT_SIZE: &str = "40";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStock {
    pub name: String,
    pub distance: String,
    pub stock: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub similarity: f64,
}

/// 库存查询结果；`store` 仅在单品有货时给出
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStatus {
    pub available: bool,
    pub product_id: Option<String>,
    pub size: Option<String>,
    pub store: Option<StoreStock>,
    pub can_reserve: bool,
    pub nearby_stores: Vec<StoreStock>,
    pub alternatives: Vec<Alternative>,
    pub unavailable_items: Vec<String>,
    pub restock_eta: Option<String>,
    pub message: String,
}

impl InventoryStatus {
    fn in_stock(message: impl Into<String>) -> Self {
        Self {
            available: true,
            product_id: None,
            size: None,
            store: None,
            can_reserve: false,
            nearby_stores: Vec::new(),
            alternatives: Vec::new(),
            unavailable_items: Vec::new(),
            restock_eta: None,
            message: message.into(),
        }
    }
}

pub struct InventoryAgent {
    catalog: Arc<Catalog>,
}

impl InventoryAgent {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// 单品库存。VH999 或 ID 含 "out" 的商品模拟缺货。
    fn check_stock(&self, product_id: &str, size: &str) -> InventoryStatus {
        let out_of_stock = product_id == "VH999" || product_id.to_lowercase().contains("out");
        if out_of_stock {
            let mut status = InventoryStatus::in_stock(format!("Size {} unavailable at your location", size));
            status.available = false;
            status.product_id = Some(product_id.to_string());
            status.size = Some(size.to_string());
            status.nearby_stores = self.nearby_stores().into_iter().take(2).collect();
            status.alternatives = self.alternatives(product_id).into_iter().take(2).collect();
            status.restock_eta = Some("3 days".to_string());
            return status;
        }

        let (stock, can_reserve) = if product_id == DEFAULT_PRODUCT { (3, true) } else { (5, false) };
        let store = self.catalog.stores.first().map(|s| StoreStock {
            name: s.name.clone(),
            distance: s.distance.clone(),
            stock,
        });
        let message = match &store {
            Some(s) => format!("In stock at {}", s.name),
            None => "In stock".to_string(),
        };

        let mut status = InventoryStatus::in_stock(message);
        status.product_id = Some(product_id.to_string());
        status.size = Some(size.to_string());
        status.store = store;
        status.can_reserve = can_reserve;
        status
    }

    fn nearby_stores(&self) -> Vec<StoreStock> {
        self.catalog
            .stores
            .iter()
            .map(|s| StoreStock {
                name: s.name.clone(),
                distance: s.distance.clone(),
                stock: 3,
            })
            .collect()
    }

    fn alternatives(&self, product_id: &str) -> Vec<Alternative> {
        self.catalog
            .products
            .iter()
            .filter(|p| p.product_id != product_id)
            .take(3)
            .map(|p| Alternative {
                product_id: p.product_id.clone(),
                name: p.name.clone(),
                price: p.price,
                similarity: 0.85,
            })
            .collect()
    }

    /// 购物车逐条检查（重复条目各查一次）
    fn check_cart(&self, cart: &[CartItem]) -> InventoryStatus {
        let unavailable: Vec<String> = cart
            .iter()
            .filter(|item| !self.check_stock(&item.product_id, &item.size).available)
            .map(|item| item.product_id.clone())
            .collect();

        let all_available = unavailable.is_empty();
        let mut status = InventoryStatus::in_stock(if all_available {
            "All items available"
        } else {
            "Some items unavailable"
        });
        status.available = all_available;
        status.unavailable_items = unavailable;
        status
    }
}

#[async_trait]
impl Agent for InventoryAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Inventory
    }

    async fn execute(&self, input: &AgentInput) -> Result<AgentOutput, AgentError> {
        let request = input.request_lower();

        let status = if request.contains("stock") || request.contains("available") {
            match input.cart.first() {
                Some(item) => self.check_stock(&item.product_id, &item.size),
                None => self.check_stock(DEFAULT_PRODUCT, DEFAULT_SIZE),
            }
        } else if request.contains("store") || request.contains("nearby") {
            let stores = self.nearby_stores();
            let mut status =
                InventoryStatus::in_stock(format!("{} stores near {}", stores.len(), input.location));
            status.nearby_stores = stores;
            status
        } else if !input.cart.is_empty() {
            self.check_cart(&input.cart)
        } else {
            InventoryStatus::in_stock("All items in stock")
        };

        Ok(AgentOutput::Inventory(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Channel, ProgressSink};

    async fn run(request: &str, cart: Vec<CartItem>) -> InventoryStatus {
        let agent = InventoryAgent::new(Arc::new(Catalog::builtin()));
        let input = AgentInput {
            session_id: "S1".into(),
            customer_id: "CUST001".into(),
            channel: Channel::Store,
            request: request.into(),
            liked_products: vec![],
            cart,
            location: "Mumbai".into(),
            events: ProgressSink::disabled(),
        };
        match agent.execute(&input).await.unwrap() {
            AgentOutput::Inventory(s) => s,
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_default_product_in_stock() {
        let status = run("is it in stock?", vec![]).await;
        assert!(status.available);
        let store = status.store.unwrap();
        assert_eq!(store.name, "Bandra Store");
        assert_eq!(store.stock, 3);
        assert!(status.can_reserve);
    }

    #[tokio::test]
    async fn test_out_of_stock_offers_alternatives() {
        let status = run("available in 42?", vec![CartItem::new("VH999", 1, "42")]).await;
        assert!(!status.available);
        assert_eq!(status.message, "Size 42 unavailable at your location");
        assert_eq!(status.nearby_stores.len(), 2);
        assert_eq!(status.alternatives.len(), 2);
        assert_eq!(status.restock_eta.as_deref(), Some("3 days"));
    }

    #[tokio::test]
    async fn test_cart_check_flags_each_duplicate_line() {
        let status = run(
            "add to order",
            vec![
                CartItem::new("VH-OUT", 1, "40"),
                CartItem::new("VH-OUT", 1, "40"),
                CartItem::new("VH002", 1, "40"),
            ],
        )
        .await;
        assert!(!status.available);
        assert_eq!(status.unavailable_items, vec!["VH-OUT", "VH-OUT"]);
    }

    #[tokio::test]
    async fn test_nearby_stores() {
        let status = run("any store nearby", vec![]).await;
        assert_eq!(status.nearby_stores.len(), 3);
        assert_eq!(status.message, "3 stores near Mumbai");
    }
}
