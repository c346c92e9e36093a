use rust_decimal::Decimal;
use tracing::info;

use kiosk_core::domain::product::{Product, ProductId};
use kiosk_core::domain::user::{KioskUser, UserRole};

use crate::connection::DbPool;
use crate::repositories::{
    ProductRepository, RepositoryError, SqlProductRepository, SqlUserRepository, UserRepository,
};

const DEFAULT_PRODUCT_IMAGE: &str =
    "https://images.unsplash.com/photo-1509042239860-f550ce710b93?w=300&h=300&fit=crop";

#[derive(Debug, Clone, Copy)]
struct ProductSeed {
    id: &'static str,
    name: &'static str,
    price: i64,
    quantity: u32,
    description: &'static str,
    image: Option<&'static str>,
    category: &'static str,
    ingredients: &'static str,
    allergens: &'static str,
}

const PRODUCT_SEEDS: &[ProductSeed] = &[
    ProductSeed {
        id: "prod-coffee",
        name: "Coffee",
        price: 50,
        quantity: 20,
        description: "Freshly brewed hot coffee. Rich and aromatic espresso-based beverage perfect for your morning or afternoon boost. Made from premium quality beans.",
        image: Some("https://images.unsplash.com/photo-1509042239860-f550ce710b93?w=300&h=300&fit=crop"),
        category: "Beverages",
        ingredients: "Coffee beans, Water",
        allergens: "None",
    },
    ProductSeed {
        id: "prod-tea",
        name: "Tea",
        price: 40,
        quantity: 25,
        description: "Soothing hot tea with a delicate flavor. Choose between various blends including black tea, green tea, and herbal infusions. A perfect refreshment anytime.",
        image: None,
        category: "Beverages",
        ingredients: "Tea leaves, Water",
        allergens: "None",
    },
    ProductSeed {
        id: "prod-sandwich",
        name: "Sandwich",
        price: 100,
        quantity: 15,
        description: "Delicious multi-layered sandwich loaded with fresh vegetables, premium meats, and our special sauce. Made fresh daily with quality ingredients.",
        image: Some("https://images.unsplash.com/photo-1528735602780-2552fd46c7af?w=300&h=300&fit=crop"),
        category: "Food",
        ingredients: "Bread, lettuce, tomato, cheese, ham",
        allergens: "Gluten, Dairy",
    },
    ProductSeed {
        id: "prod-chips",
        name: "Chips",
        price: 30,
        quantity: 40,
        description: "Crispy and crunchy snack with perfect seasoning. Light and airy potato chips with salt and vinegar flavor. Great for snacking anytime.",
        image: Some("https://images.unsplash.com/photo-1528825871115-3581a5387919?w=300&h=300&fit=crop"),
        category: "Snacks",
        ingredients: "Potatoes, vegetable oil, salt",
        allergens: "None",
    },
    ProductSeed {
        id: "prod-juice",
        name: "Juice",
        price: 60,
        quantity: 30,
        description: "Fresh and refreshing fruit juice. Packed with natural vitamins and minerals from freshly squeezed fruits. Perfect for a healthy refreshment.",
        image: Some("https://images.unsplash.com/photo-1600271886742-f049cd451bba?w=300&h=300&fit=crop"),
        category: "Beverages",
        ingredients: "Mixed fruits, water",
        allergens: "None",
    },
    ProductSeed {
        id: "prod-cookie",
        name: "Cookie",
        price: 20,
        quantity: 50,
        description: "Sweet and delicious cookie with a perfect balance of texture. Soft on the inside with a crispy edge. Contains chocolate chips throughout.",
        image: Some("https://images.unsplash.com/photo-1499636136210-6f4ee915583e?w=300&h=300&fit=crop"),
        category: "Snacks",
        ingredients: "Flour, sugar, butter, chocolate chips, eggs",
        allergens: "Gluten, Eggs, Dairy",
    },
    ProductSeed {
        id: "prod-mineral-water",
        name: "Mineral Water",
        price: 25,
        quantity: 60,
        description: "Pure and refreshing mineral water. Naturally filtered and packed with essential minerals. Perfect for staying hydrated throughout the day.",
        image: Some("https://images.unsplash.com/photo-1502741224143-90386d7f8c82?w=300&h=300&fit=crop"),
        category: "Beverages",
        ingredients: "Filtered mineral water",
        allergens: "None",
    },
    ProductSeed {
        id: "prod-donut",
        name: "Donut",
        price: 35,
        quantity: 35,
        description: "Glazed donut with a soft and fluffy interior. Perfectly balanced sweetness with a light sugar coating. A delightful treat that melts in your mouth.",
        image: Some("https://images.unsplash.com/photo-1598103442097-8b74394b95c6?w=300&h=300&fit=crop"),
        category: "Snacks",
        ingredients: "Flour, sugar, eggs, milk, yeast",
        allergens: "Gluten, Eggs, Dairy",
    },
];

#[derive(Debug, Clone, Copy)]
struct UserSeed {
    admission_number: &'static str,
    name: &'static str,
    department: &'static str,
    wallet_balance: i64,
    role: UserRole,
    email: &'static str,
}

const USER_SEEDS: &[UserSeed] = &[
    UserSeed {
        admission_number: "19332",
        name: "John Doe",
        department: "CSE",
        wallet_balance: 500,
        role: UserRole::User,
        email: "john@example.com",
    },
    UserSeed {
        admission_number: "STU002",
        name: "Jane Smith",
        department: "ECE",
        wallet_balance: 750,
        role: UserRole::User,
        email: "jane@example.com",
    },
    UserSeed {
        admission_number: "STU003",
        name: "Raj Kumar",
        department: "MECH",
        wallet_balance: 600,
        role: UserRole::User,
        email: "raj@example.com",
    },
    UserSeed {
        admission_number: "STU004",
        name: "Priya Sharma",
        department: "CSE",
        wallet_balance: 800,
        role: UserRole::User,
        email: "priya@example.com",
    },
    UserSeed {
        admission_number: "ADMIN001",
        name: "Admin User",
        department: "Admin",
        wallet_balance: 10_000,
        role: UserRole::Admin,
        email: "admin@example.com",
    },
];

impl ProductSeed {
    fn to_product(self) -> Product {
        let mut product =
            Product::new(self.id, self.name, Decimal::new(self.price, 0), self.quantity)
                .with_category(self.category);
        product.description = Some(self.description.to_string());
        product.image = Some(self.image.unwrap_or(DEFAULT_PRODUCT_IMAGE).to_string());
        product.ingredients = Some(self.ingredients.to_string());
        product.allergens = Some(self.allergens.to_string());
        product
    }
}

impl UserSeed {
    fn to_user(self) -> KioskUser {
        KioskUser {
            admission_number: self.admission_number.to_string(),
            name: self.name.to_string(),
            department: Some(self.department.to_string()),
            wallet_balance: Decimal::new(self.wallet_balance, 0),
            role: self.role,
            email: Some(self.email.to_string()),
        }
    }
}

/// Demo canteen catalog and accounts.
///
/// Products are upserted by name: an existing row keeps its id and current
/// stock, everything else is refreshed. Users are replaced wholesale.
pub struct CanteenSeedDataset;

impl CanteenSeedDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let products = SqlProductRepository::new(pool.clone());
        let users = SqlUserRepository::new(pool.clone());

        let mut products_upserted = Vec::with_capacity(PRODUCT_SEEDS.len());
        let mut stock_preserved = 0;
        for seed in PRODUCT_SEEDS {
            let mut product = seed.to_product();
            if let Some(existing) = products.find_by_name(seed.name).await? {
                product.id = existing.id;
                product.sku = existing.sku;
                product.quantity = existing.quantity;
                stock_preserved += 1;
            }
            products.save(product).await?;
            products_upserted.push(seed.name);
        }

        users.replace_all(USER_SEEDS.iter().map(|seed| seed.to_user()).collect()).await?;
        info!(
            event_name = "db.seed.loaded",
            products = products_upserted.len(),
            stock_preserved,
            users = USER_SEEDS.len(),
            "canteen seed dataset loaded"
        );

        Ok(SeedResult {
            products_upserted,
            stock_preserved,
            users_added: USER_SEEDS.iter().map(|seed| seed.admission_number).collect(),
        })
    }

    /// Verify that seed data exists and matches the contract.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let products = SqlProductRepository::new(pool.clone());
        let users = SqlUserRepository::new(pool.clone());
        let mut checks = Vec::new();

        for seed in PRODUCT_SEEDS {
            let present = products
                .find_by_name(seed.name)
                .await?
                .map(|product| product.price == Decimal::new(seed.price, 0))
                .unwrap_or(false);
            checks.push((seed.name, present));
        }

        for seed in USER_SEEDS {
            let present = users
                .find_by_admission_number(seed.admission_number)
                .await?
                .map(|user| user.role == seed.role)
                .unwrap_or(false);
            checks.push((seed.admission_number, present));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }

    pub fn product_ids() -> impl Iterator<Item = ProductId> {
        PRODUCT_SEEDS.iter().map(|seed| ProductId(seed.id.to_string()))
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub products_upserted: Vec<&'static str>,
    pub stock_preserved: usize,
    pub users_added: Vec<&'static str>,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
