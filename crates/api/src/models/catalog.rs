//! Catalog domain types: products, categories, brands, banners, coupons.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use sundry_core::{BannerId, BrandId, CategoryId, CouponId, Money, ProductId};

/// A purchasable product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// List price in the store currency.
    pub price: Money,
    /// Discounted price; when set, this is the effective price.
    pub sale_price: Option<Money>,
    /// Remaining purchasable units. Never negative.
    pub stock: i32,
    pub category_id: CategoryId,
    pub brand_id: Option<BrandId>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price a buyer actually pays right now.
    #[must_use]
    pub fn effective_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }
}

/// Product list entry with joined category/brand names and review aggregate.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Money,
    pub sale_price: Option<Money>,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_name: String,
    pub brand_name: Option<String>,
    /// Average rating over all reviews, if any.
    pub avg_rating: Option<Decimal>,
    pub review_count: i64,
}

/// A product category. One level of nesting via `parent_id`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with its children, for the public category tree.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

/// Build a one-level tree from a flat category list.
///
/// Categories whose parent is missing from the input (e.g. the parent was
/// deactivated) are promoted to roots rather than dropped.
#[must_use]
pub fn build_category_tree(categories: Vec<Category>) -> Vec<CategoryNode> {
    let root_ids: std::collections::HashSet<_> = categories
        .iter()
        .filter(|c| c.parent_id.is_none())
        .map(|c| c.id)
        .collect();

    let (children, roots): (Vec<_>, Vec<_>) = categories
        .into_iter()
        .partition(|c| c.parent_id.is_some_and(|p| root_ids.contains(&p)));

    let mut nodes: Vec<CategoryNode> = roots
        .into_iter()
        .map(|category| CategoryNode {
            category,
            children: Vec::new(),
        })
        .collect();

    for child in children {
        if let Some(parent_id) = child.parent_id
            && let Some(node) = nodes.iter_mut().find(|n| n.category.id == parent_id)
        {
            node.children.push(child);
        }
    }

    nodes
}

/// A product brand.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A promotional banner for the storefront landing surface.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A discount code. Exactly one of `percent_off`/`amount_off` is set.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub percent_off: Option<Decimal>,
    pub amount_off: Option<Money>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn category(id: i32, parent: Option<i32>) -> Category {
        Category {
            id: CategoryId::new(id),
            name: format!("cat-{id}"),
            slug: format!("cat-{id}"),
            description: None,
            parent_id: parent.map(CategoryId::new),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_prefers_sale() {
        let mut product = Product {
            id: ProductId::new(1),
            name: "Widget".into(),
            slug: "widget".into(),
            description: String::new(),
            price: Money::new(Decimal::from_str("10.00").unwrap()),
            sale_price: None,
            stock: 5,
            category_id: CategoryId::new(1),
            brand_id: None,
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(product.effective_price(), product.price);

        product.sale_price = Some(Money::new(Decimal::from_str("8.00").unwrap()));
        assert_eq!(product.effective_price().to_string(), "8.00");
    }

    #[test]
    fn test_build_category_tree() {
        let tree = build_category_tree(vec![
            category(1, None),
            category(2, Some(1)),
            category(3, Some(1)),
            category(4, None),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children.len(), 2);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_orphan_categories_promoted_to_roots() {
        // Parent 9 is not in the list at all
        let tree = build_category_tree(vec![category(2, Some(9))]);
        assert_eq!(tree.len(), 1);
        assert!(tree[0].children.is_empty());
    }
}
