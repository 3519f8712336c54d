//! Product catalog.
//!
//! The assortment is fixed reference data built once at startup and shared
//! behind an `Arc`; nothing here mutates after construction. Listing goes
//! through [`CatalogQuery`], which applies search, category filter, and sort
//! in that order.

use std::sync::Arc;

use rupite_greens_core::{Price, ProductBadge, ProductCategory, ProductId, Weight};
use rust_decimal::Decimal;
use serde::Deserialize;

// ====== Product ======

/// A single catalog entry.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub rating: f32,
    pub reviews: u32,
    pub category: ProductCategory,
    pub badge: Option<ProductBadge>,
    pub description: String,
    pub ingredients: Vec<String>,
    pub weight: Weight,
    pub in_stock: bool,
    pub stock_quantity: u32,
}

// ====== Listing queries ======

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Alphabetical by name, case-insensitive. The default.
    #[default]
    Name,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Best-rated first.
    Rating,
}

/// A composed listing query. Search narrows by name and description,
/// category filters exactly, and the sort runs last. Ties keep catalog
/// order.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<ProductCategory>,
    pub sort: SortKey,
}

// ====== Catalog ======

/// In-memory product directory, cheap to clone and share across handlers.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
}

impl Catalog {
    /// Build the standard assortment.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            products: Arc::new(builtin_products()),
        }
    }

    /// Look up a single product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Every product, in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Run a listing query: filter by search and category, then sort.
    #[must_use]
    pub fn list(&self, query: &CatalogQuery) -> Vec<&Product> {
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|product| {
                let matches_search = needle.as_ref().is_none_or(|needle| {
                    product.name.to_lowercase().contains(needle)
                        || product.description.to_lowercase().contains(needle)
                });
                let matches_category = query
                    .category
                    .is_none_or(|category| product.category == category);
                matches_search && matches_category
            })
            .collect();

        match query.sort {
            SortKey::Name => {
                matches.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            }
            SortKey::PriceLow => matches.sort_by(|a, b| a.price.amount.cmp(&b.price.amount)),
            SortKey::PriceHigh => matches.sort_by(|a, b| b.price.amount.cmp(&a.price.amount)),
            SortKey::Rating => matches.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }

        matches
    }
}

// ====== Fixed assortment ======

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=300&width=300";

fn ingredients(items: &[&str]) -> Vec<String> {
    items.iter().map(|&item| item.to_owned()).collect()
}

#[allow(clippy::too_many_lines)]
fn builtin_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new(1),
            name: "Класически краставички".to_owned(),
            price: Price::bgn(Decimal::new(890, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.8,
            reviews: 124,
            category: ProductCategory::Gherkins,
            badge: Some(ProductBadge::Bestseller),
            description: "Традиционни български краставички, приготвени по автентична рецепта. \
                          Хрупкави и ароматни, идеални за всяка трапеза."
                .to_owned(),
            ingredients: ingredients(&["Краставички", "Вода", "Оцет", "Сол", "Захар", "Копър"]),
            weight: Weight::parse("720г"),
            in_stock: true,
            stock_quantity: 45,
        },
        Product {
            id: ProductId::new(2),
            name: "Лютеница домашна".to_owned(),
            price: Price::bgn(Decimal::new(1250, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.9,
            reviews: 89,
            category: ProductCategory::Lyutenitsa,
            badge: Some(ProductBadge::New),
            description: "Домашна лютеница с богат вкус и аромат. Приготвена от най-качествени \
                          червени чушки и домати."
                .to_owned(),
            ingredients: ingredients(&[
                "Червени чушки",
                "Домати",
                "Лук",
                "Чесън",
                "Олио",
                "Сол",
                "Захар",
            ]),
            weight: Weight::parse("550г"),
            in_stock: true,
            stock_quantity: 32,
        },
        Product {
            id: ProductId::new(3),
            name: "Смесени зеленчуци".to_owned(),
            price: Price::bgn(Decimal::new(1090, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.7,
            reviews: 156,
            category: ProductCategory::Mixed,
            badge: Some(ProductBadge::Popular),
            description: "Цветна смес от сезонни зеленчуци, богата на витамини и минерали."
                .to_owned(),
            ingredients: ingredients(&["Карфиол", "Моркови", "Зеле", "Чушки", "Оцет", "Сол"]),
            weight: Weight::parse("680г"),
            in_stock: true,
            stock_quantity: 28,
        },
        Product {
            id: ProductId::new(4),
            name: "Туршия от карфиол".to_owned(),
            price: Price::bgn(Decimal::new(950, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.6,
            reviews: 78,
            category: ProductCategory::Vegetables,
            badge: None,
            description: "Нежен карфиол в ароматна туршия, богат на витамини и полезни вещества."
                .to_owned(),
            ingredients: ingredients(&["Карфиол", "Вода", "Оцет", "Сол", "Лаврови листа"]),
            weight: Weight::parse("650г"),
            in_stock: true,
            stock_quantity: 22,
        },
        Product {
            id: ProductId::new(5),
            name: "Кисели краставички".to_owned(),
            price: Price::bgn(Decimal::new(790, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.8,
            reviews: 203,
            category: ProductCategory::Gherkins,
            badge: None,
            description: "Традиционни кисели краставички с неповторим вкус и аромат.".to_owned(),
            ingredients: ingredients(&["Краставички", "Вода", "Сол", "Чесън", "Копър"]),
            weight: Weight::parse("700г"),
            in_stock: true,
            stock_quantity: 67,
        },
        Product {
            id: ProductId::new(6),
            name: "Туршия от зеле".to_owned(),
            price: Price::bgn(Decimal::new(650, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.5,
            reviews: 92,
            category: ProductCategory::Vegetables,
            badge: None,
            description: "Хрупкаво зеле в традиционна туршия, богато на витамин C.".to_owned(),
            ingredients: ingredients(&["Зеле", "Моркови", "Вода", "Оцет", "Сол"]),
            weight: Weight::parse("750г"),
            in_stock: true,
            stock_quantity: 41,
        },
        Product {
            id: ProductId::new(7),
            name: "Лютеница с орехи".to_owned(),
            price: Price::bgn(Decimal::new(1490, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.9,
            reviews: 67,
            category: ProductCategory::Lyutenitsa,
            badge: Some(ProductBadge::Premium),
            description: "Премиум лютеница обогатена с орехи за неповторим вкус и текстура."
                .to_owned(),
            ingredients: ingredients(&[
                "Червени чушки",
                "Домати",
                "Орехи",
                "Лук",
                "Чесън",
                "Олио",
            ]),
            weight: Weight::parse("500г"),
            in_stock: true,
            stock_quantity: 18,
        },
        Product {
            id: ProductId::new(8),
            name: "Туршия от моркови".to_owned(),
            price: Price::bgn(Decimal::new(850, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.4,
            reviews: 45,
            category: ProductCategory::Vegetables,
            badge: None,
            description: "Сладки моркови в ароматна туршия, богати на бета-каротин.".to_owned(),
            ingredients: ingredients(&[
                "Моркови",
                "Вода",
                "Оцет",
                "Сол",
                "Захар",
                "Лаврови листа",
            ]),
            weight: Weight::parse("600г"),
            in_stock: true,
            stock_quantity: 35,
        },
        Product {
            id: ProductId::new(9),
            name: "Пикантни чушки".to_owned(),
            price: Price::bgn(Decimal::new(1190, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.7,
            reviews: 134,
            category: ProductCategory::Peppers,
            badge: None,
            description: "Остри чушки за любителите на пикантните вкусове.".to_owned(),
            ingredients: ingredients(&["Остри чушки", "Вода", "Оцет", "Сол", "Чесън"]),
            weight: Weight::parse("450г"),
            in_stock: true,
            stock_quantity: 29,
        },
        Product {
            id: ProductId::new(10),
            name: "Туршия от цвекло".to_owned(),
            price: Price::bgn(Decimal::new(750, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.3,
            reviews: 56,
            category: ProductCategory::Vegetables,
            badge: None,
            description: "Сочно цвекло в традиционна туршия с наситен цвят и вкус.".to_owned(),
            ingredients: ingredients(&["Цвекло", "Вода", "Оцет", "Сол", "Захар"]),
            weight: Weight::parse("650г"),
            in_stock: false,
            stock_quantity: 0,
        },
        Product {
            id: ProductId::new(11),
            name: "Айвар класик".to_owned(),
            price: Price::bgn(Decimal::new(1350, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.8,
            reviews: 98,
            category: ProductCategory::Lyutenitsa,
            badge: None,
            description: "Класически айвар с богат вкус на печени чушки и патладжани.".to_owned(),
            ingredients: ingredients(&[
                "Червени чушки",
                "Патладжани",
                "Лук",
                "Чесън",
                "Олио",
                "Сол",
            ]),
            weight: Weight::parse("480г"),
            in_stock: true,
            stock_quantity: 24,
        },
        Product {
            id: ProductId::new(12),
            name: "Смесена салата".to_owned(),
            price: Price::bgn(Decimal::new(990, 2)),
            image: PLACEHOLDER_IMAGE.to_owned(),
            rating: 4.6,
            reviews: 112,
            category: ProductCategory::Mixed,
            badge: None,
            description: "Разнообразна салата от сезонни зеленчуци в ароматна туршия.".to_owned(),
            ingredients: ingredients(&[
                "Домати",
                "Краставички",
                "Чушки",
                "Лук",
                "Оцет",
                "Олио",
                "Сол",
            ]),
            weight: Weight::parse("620г"),
            in_stock: true,
            stock_quantity: 33,
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(products: &[&Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_builtin_has_full_assortment() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.products().len(), 12);
        assert!(catalog.contains(ProductId::new(1)));
        assert!(!catalog.contains(ProductId::new(99)));
    }

    #[test]
    fn test_get_returns_product() {
        let catalog = Catalog::builtin();
        let product = catalog.get(ProductId::new(7)).unwrap();
        assert_eq!(product.name, "Лютеница с орехи");
        assert_eq!(product.price.amount, Decimal::new(1490, 2));
        assert_eq!(product.weight.kilograms(), Decimal::new(5, 1));
    }

    #[test]
    fn test_only_beet_pickle_is_out_of_stock() {
        let catalog = Catalog::builtin();
        let out: Vec<i32> = catalog
            .products()
            .iter()
            .filter(|p| !p.in_stock)
            .map(|p| p.id.as_i32())
            .collect();
        assert_eq!(out, vec![10]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = Catalog::builtin();
        let query = CatalogQuery {
            search: Some("ЛЮТЕНИЦА".to_owned()),
            ..CatalogQuery::default()
        };
        assert_eq!(ids(&catalog.list(&query)), vec![2, 7]);
    }

    #[test]
    fn test_search_covers_description() {
        let catalog = Catalog::builtin();
        let query = CatalogQuery {
            search: Some("карфиол".to_owned()),
            ..CatalogQuery::default()
        };
        // Id 4 matches in both name and description, nothing else matches.
        assert_eq!(ids(&catalog.list(&query)), vec![4]);
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let catalog = Catalog::builtin();
        let query = CatalogQuery {
            search: Some("   ".to_owned()),
            ..CatalogQuery::default()
        };
        assert_eq!(catalog.list(&query).len(), 12);
    }

    #[test]
    fn test_category_filter() {
        let catalog = Catalog::builtin();
        let query = CatalogQuery {
            category: Some(ProductCategory::Lyutenitsa),
            ..CatalogQuery::default()
        };
        let listed = catalog.list(&query);
        assert_eq!(listed.len(), 3);
        assert!(
            listed
                .iter()
                .all(|p| p.category == ProductCategory::Lyutenitsa)
        );
    }

    #[test]
    fn test_search_and_category_compose() {
        let catalog = Catalog::builtin();
        let query = CatalogQuery {
            search: Some("туршия".to_owned()),
            category: Some(ProductCategory::Vegetables),
            sort: SortKey::PriceLow,
        };
        assert_eq!(ids(&catalog.list(&query)), vec![6, 10, 8, 4]);
    }

    #[test]
    fn test_sort_name_is_default() {
        let catalog = Catalog::builtin();
        let listed = catalog.list(&CatalogQuery::default());
        assert_eq!(listed.first().unwrap().name, "Айвар класик");
    }

    #[test]
    fn test_sort_price_bounds() {
        let catalog = Catalog::builtin();
        let cheapest_first = catalog.list(&CatalogQuery {
            sort: SortKey::PriceLow,
            ..CatalogQuery::default()
        });
        assert_eq!(cheapest_first.first().unwrap().id, ProductId::new(6));

        let dearest_first = catalog.list(&CatalogQuery {
            sort: SortKey::PriceHigh,
            ..CatalogQuery::default()
        });
        assert_eq!(dearest_first.first().unwrap().id, ProductId::new(7));
    }

    #[test]
    fn test_sort_rating_is_stable_on_ties() {
        let catalog = Catalog::builtin();
        let listed = catalog.list(&CatalogQuery {
            sort: SortKey::Rating,
            ..CatalogQuery::default()
        });
        // Ids 2 and 7 share the top rating; catalog order breaks the tie.
        assert_eq!(ids(&listed)[..2], [2, 7]);
    }

    #[test]
    fn test_sort_key_deserializes_kebab_case() {
        let key: SortKey = serde_json::from_str("\"price-low\"").unwrap();
        assert_eq!(key, SortKey::PriceLow);
    }
}
