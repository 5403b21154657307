//! 推荐 Agent：根据喜欢的商品 / 购物车 / 热度给出搭配建议

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::agents::catalog::Product;
use crate::agents::{Agent, AgentInput, AgentKind, AgentOutput, Catalog};
use crate::core::AgentError;

/// 最多保留的推荐条数
const MAX_RECOMMENDATIONS: usize = 5;

/// 与衬衫搭配的品类
const COMPLEMENTARY_CATEGORIES: [&str; 3] = ["Ties", "Belts", "Trousers"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedProduct {
    pub product_id: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub category: String,
    pub tags: Vec<String>,
    pub match_score: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub items: Vec<RecommendedProduct>,
    pub total_found: usize,
}

pub struct RecommendationAgent {
    catalog: Arc<Catalog>,
}

impl RecommendationAgent {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// 喜欢过本品牌（VH 开头）商品时推荐互补品类；无匹配时取前三个
    fn matching(&self, product_ids: &[&str]) -> Vec<&Product> {
        let likes_brand = product_ids.iter().any(|pid| pid.starts_with("VH"));
        let matched: Vec<&Product> = if likes_brand {
            self.catalog
                .products
                .iter()
                .filter(|p| COMPLEMENTARY_CATEGORIES.contains(&p.category.as_str()))
                .collect()
        } else {
            Vec::new()
        };

        if matched.is_empty() {
            self.catalog.products.iter().take(3).collect()
        } else {
            matched
        }
    }

    fn trending(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.catalog.products.iter().collect();
        products.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
        products
    }
}

fn reasoning(product: &Product, input: &AgentInput) -> String {
    if !input.liked_products.is_empty() {
        "Pairs perfectly with your liked items".to_string()
    } else if !input.cart.is_empty() {
        "Completes your look".to_string()
    } else {
        let tags: Vec<&str> = product.tags.iter().take(2).map(String::as_str).collect();
        format!("Popular choice for {}", tags.join(", "))
    }
}

#[async_trait]
impl Agent for RecommendationAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Recommendation
    }

    async fn execute(&self, input: &AgentInput) -> Result<AgentOutput, AgentError> {
        let picked = if !input.liked_products.is_empty() {
            let ids: Vec<&str> = input.liked_products.iter().map(String::as_str).collect();
            self.matching(&ids)
        } else if !input.cart.is_empty() {
            let ids: Vec<&str> = input.cart.iter().map(|i| i.product_id.as_str()).collect();
            self.matching(&ids)
        } else {
            self.trending()
        };

        let total_found = picked.len();
        let items = picked
            .into_iter()
            .take(MAX_RECOMMENDATIONS)
            .map(|p| RecommendedProduct {
                product_id: p.product_id.clone(),
                name: p.name.clone(),
                brand: p.brand.clone(),
                price: p.price,
                category: p.category.clone(),
                tags: p.tags.clone(),
                match_score: p.match_score,
                reasoning: reasoning(p, input),
            })
            .collect();

        Ok(AgentOutput::Recommendation(Recommendations { items, total_found }))
    }
}
