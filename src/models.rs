use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub title: String,
    /// Free text, compared against `Category::name` with [`same_category`].
    pub category: String,
    pub price: f64,
}

impl Product {
    pub fn in_category(&self, category_name: &str) -> bool {
        same_category(&self.category, category_name)
    }
}

/// Category names match case-insensitively, ignoring surrounding whitespace.
pub fn same_category(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Everything fetched at startup. Never mutated after it is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            categories,
            products,
        }
    }

    pub fn products_in<'a>(&'a self, category_name: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |p| p.in_category(category_name))
    }
}

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// One element of `GET /products/categories`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub slug: String,
    pub name: String,
    pub url: String,
}

/// Body of `GET /products`. Paging fields (`total`, `skip`, `limit`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductsEnvelope {
    pub products: Vec<ProductRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    pub category: String,
    pub price: f64,
}

impl From<CategoryRecord> for Category {
    fn from(r: CategoryRecord) -> Self {
        Self {
            slug: r.slug,
            name: r.name,
            url: r.url,
        }
    }
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Self {
            title: r.title,
            category: r.category,
            price: r.price,
        }
    }
}
