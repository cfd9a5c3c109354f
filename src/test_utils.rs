//! Shared test utilities.
//!
//! Fixtures insert rows directly so that they leave no audit entries behind; tests that
//! count log rows only see what the code under test wrote.

use crate::{
    api::{self, state::AppState},
    core::{
        leaflet_order::{self, NewLeafletOrder},
        notify::Notifier,
        order::OrderInput,
        session,
        types::{ProfitType, Role},
        user,
    },
    entities::{city, distributor, leaflet, leaflet_order as leaflet_order_entity, worker},
    errors::Result,
    storage::FileStore,
};
use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::{Arc, Mutex};

/// Secret used for every token signed in tests.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Password given to every account made by [`create_test_user`].
pub const TEST_PASSWORD: &str = "password123";

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a leaflet with the given stock.
pub async fn create_test_leaflet(
    db: &DatabaseConnection,
    name: &str,
    stock: i64,
) -> Result<leaflet::Model> {
    let now = Utc::now();
    Ok(leaflet::ActiveModel {
        name: Set(name.to_string()),
        value: Set(stock),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn create_test_city(db: &DatabaseConnection, name: &str) -> Result<city::Model> {
    Ok(city::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn create_test_distributor(
    db: &DatabaseConnection,
    name: &str,
) -> Result<distributor::Model> {
    Ok(distributor::ActiveModel {
        name: Set(name.to_string()),
        phone: Set("+7 900 111-22-33".to_string()),
        city_id: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Inserts an active worker.
///
/// # Defaults
/// * specialty: "окна"
pub async fn create_test_worker(db: &DatabaseConnection, name: &str) -> Result<worker::Model> {
    Ok(worker::ActiveModel {
        name: Set(name.to_string()),
        phone: Set("+7 900 444-55-66".to_string()),
        city_id: Set(None),
        specialty: Set("окна".to_string()),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

/// Creates an account with [`TEST_PASSWORD`].
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    role: Role,
) -> Result<crate::entities::user::Model> {
    user::create_user(db, username, TEST_PASSWORD, role, "", "tester").await
}

/// A database with one leaflet, one city and one distributor.
pub struct LifecycleFixture {
    pub db: DatabaseConnection,
    pub leaflet: leaflet::Model,
    pub city: city::Model,
    pub distributor: distributor::Model,
}

impl LifecycleFixture {
    /// Order parameters for the fixture's leaflet, city and distributor.
    ///
    /// # Defaults
    /// * `profit_type`: MKD
    /// * `square_number`: "A-1"
    pub fn order_params(&self, quantity: i64) -> NewLeafletOrder {
        NewLeafletOrder {
            profit_type: ProfitType::Mkd,
            quantity,
            leaflet_id: self.leaflet.id,
            city_id: self.city.id,
            distributor_id: self.distributor.id,
            square_number: "A-1".to_string(),
        }
    }
}

/// Sets up a [`LifecycleFixture`] whose leaflet holds `stock` copies.
pub async fn setup_lifecycle(stock: i64) -> Result<LifecycleFixture> {
    let db = setup_test_db().await?;
    let leaflet = create_test_leaflet(&db, "Натяжные потолки", stock).await?;
    let city = create_test_city(&db, "Москва").await?;
    let distributor = create_test_distributor(&db, "Анна").await?;
    Ok(LifecycleFixture {
        db,
        leaflet,
        city,
        distributor,
    })
}

/// Creates an MKD order through the lifecycle, as user "tester".
pub async fn create_test_leaflet_order(
    fx: &LifecycleFixture,
    quantity: i64,
) -> Result<leaflet_order_entity::Model> {
    leaflet_order::create_leaflet_order(&fx.db, fx.order_params(quantity), "tester").await
}

/// Order input with no worker, city or price.
pub fn order_input(scheduled_at: DateTime<Utc>) -> OrderInput {
    OrderInput {
        client_name: "Иван Петров".to_string(),
        phone: "+7 900 000-00-00".to_string(),
        address: "ул. Ленина, 1".to_string(),
        city_id: None,
        worker_id: None,
        scheduled_at,
        description: "Замер окон".to_string(),
        price: None,
    }
}

/// File store rooted in a fresh temporary directory.
pub fn temp_file_store() -> FileStore {
    FileStore::new(std::env::temp_dir().join(format!("leaflet-admin-{}", uuid::Uuid::new_v4())))
}

/// Notifier that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[allow(clippy::unwrap_used)]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    #[allow(clippy::unwrap_used)]
    async fn notify(&self, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Router over a fresh database plus handles to inspect its side effects.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Signs an access token for a new account with `role`.
    pub async fn token_for(&self, username: &str, role: Role) -> Result<String> {
        let account = create_test_user(&self.state.db, username, role).await?;
        session::issue_access_token(TEST_JWT_SECRET, &account)
    }
}

pub async fn setup_test_app() -> Result<TestApp> {
    let db = setup_test_db().await?;
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(
        db,
        TEST_JWT_SECRET,
        temp_file_store(),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    Ok(TestApp {
        router: api::router(state.clone()),
        state,
        notifier,
    })
}

/// Serves the test app on an ephemeral local port and returns its base URL.
#[allow(clippy::unwrap_used)]
pub async fn serve_test_app(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
