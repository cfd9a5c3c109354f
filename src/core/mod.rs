/// Audit log events and queries
pub mod audit;
/// City reference data
pub mod city;
/// Leaflet distributors
pub mod distributor;
/// Monthly revenue goals
pub mod goal;
/// Leaflet templates and stock
pub mod leaflet;
/// Leaflet order lifecycle
pub mod leaflet_order;
/// Outbound chat notifications
pub mod notify;
/// Customer service orders
pub mod order;
/// Access and refresh tokens
pub mod session;
/// Dashboard statistics
pub mod stats;
/// Shared enums stored as strings
pub mod types;
/// Dashboard accounts
pub mod user;
/// Service workers
pub mod worker;
