//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::carts::CartRepository;
use crate::db::catalog::CatalogRepository;
use crate::db::users::UserRepository;
use crate::db::wishlists::WishlistRepository;
use crate::db::{CartReader, CatalogReader, CatalogWriter, UserReader, WishlistReader};
use crate::services::storage::StorageService;

/// The data sources handlers read from.
#[derive(Clone)]
pub struct Repositories {
    pub catalog: Arc<dyn CatalogReader>,
    pub catalog_writer: Arc<dyn CatalogWriter>,
    pub carts: Arc<dyn CartReader>,
    pub wishlists: Arc<dyn WishlistReader>,
    pub users: Arc<dyn UserReader>,
}

impl Repositories {
    /// `PostgreSQL` repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        let catalog = Arc::new(CatalogRepository::new(pool.clone()));
        Self {
            catalog: catalog.clone(),
            catalog_writer: catalog,
            carts: Arc::new(CartRepository::new(pool.clone())),
            wishlists: Arc::new(WishlistRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and image storage.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    repositories: Repositories,
    storage: StorageService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(pool: PgPool, repositories: Repositories, storage: StorageService) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                repositories,
                storage,
            }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Catalog lookups.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogReader {
        self.inner.repositories.catalog.as_ref()
    }

    /// Catalog changes from the admin area.
    #[must_use]
    pub fn catalog_writer(&self) -> &dyn CatalogWriter {
        self.inner.repositories.catalog_writer.as_ref()
    }

    /// Cart lookups.
    #[must_use]
    pub fn carts(&self) -> &dyn CartReader {
        self.inner.repositories.carts.as_ref()
    }

    /// Wishlist lookups.
    #[must_use]
    pub fn wishlists(&self) -> &dyn WishlistReader {
        self.inner.repositories.wishlists.as_ref()
    }

    /// Account lookups.
    #[must_use]
    pub fn users(&self) -> &dyn UserReader {
        self.inner.repositories.users.as_ref()
    }

    /// Product image storage.
    #[must_use]
    pub fn storage(&self) -> &StorageService {
        &self.inner.storage
    }
}
