//! 商品 / 门店 / 客户数据
//!
//! 默认使用内置演示数据；配置了 [catalog].path 时从 JSON 文件加载，
//! 文件中缺失或为空的段落回落到内置数据。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::OrchestratorError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub store_id: String,
    pub name: String,
    pub location: String,
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    #[serde(default)]
    pub loyalty_points: u32,
    #[serde(default)]
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    stores: Vec<Store>,
    #[serde(default)]
    customers: Vec<Customer>,
}

/// 只读数据表，由多个 Agent 共享（Arc<Catalog>）
#[derive(Debug, Clone)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub stores: Vec<Store>,
    pub customers: Vec<Customer>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            products: vec![
                product("VH001", "Classic Blue Formal Shirt", 2500.0, "Formal Shirts", &["wedding", "formal", "office"], 0.95),
                product("VH002", "Navy Blue Silk Tie", 800.0, "Ties", &["formal", "wedding"], 0.85),
                product("VH003", "Brown Leather Belt", 1200.0, "Belts", &["formal", "casual"], 0.78),
            ],
            stores: vec![
                store("S001", "Bandra Store", "Mumbai", "2km"),
                store("S002", "Powai Store", "Mumbai", "5km"),
                store("S003", "Andheri Store", "Mumbai", "7km"),
            ],
            customers: vec![Customer {
                customer_id: "CUST001".to_string(),
                name: "Rahul Sharma".to_string(),
                loyalty_points: 500,
                tier: Some("Gold".to_string()),
            }],
        }
    }

    /// 从 JSON 文件加载：`{"products": [...], "stores": [...], "customers": [...]}`
    pub fn from_json_file(path: &Path) -> Result<Self, OrchestratorError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| OrchestratorError::Catalog(format!("{}: {}", path.display(), e)))?;
        let file: CatalogFile = serde_json::from_str(&raw)
            .map_err(|e| OrchestratorError::Catalog(format!("{}: {}", path.display(), e)))?;

        let builtin = Self::builtin();
        Ok(Self {
            products: non_empty_or(file.products, builtin.products),
            stores: non_empty_or(file.stores, builtin.stores),
            customers: non_empty_or(file.customers, builtin.customers),
        })
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.product_id == product_id)
    }

    pub fn customer(&self, customer_id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.customer_id == customer_id)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn non_empty_or<T>(loaded: Vec<T>, fallback: Vec<T>) -> Vec<T> {
    if loaded.is_empty() {
        fallback
    } else {
        loaded
    }
}

fn product(id: &str, name: &str, price: f64, category: &str, tags: &[&str], score: f64) -> Product {
    Product {
        product_id: id.to_string(),
        name: name.to_string(),
        brand: "Van Heusen".to_string(),
        price,
        category: category.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        match_score: score,
    }
}

fn store(id: &str, name: &str, location: &str, distance: &str) -> Store {
    Store {
        store_id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        distance: distance.to_string(),
    }
}
