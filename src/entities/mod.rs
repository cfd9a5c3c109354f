//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod city;
pub mod distributor;
pub mod document;
pub mod goal;
pub mod leaflet;
pub mod leaflet_order;
pub mod log;
pub mod order;
pub mod refresh_token;
pub mod user;
pub mod worker;

// Re-export specific types to avoid conflicts
pub use city::{Column as CityColumn, Entity as City, Model as CityModel};
pub use distributor::{
    Column as DistributorColumn, Entity as Distributor, Model as DistributorModel,
};
pub use document::{Column as DocumentColumn, Entity as Document, Model as DocumentModel};
pub use goal::{Column as GoalColumn, Entity as Goal, Model as GoalModel};
pub use leaflet::{Column as LeafletColumn, Entity as Leaflet, Model as LeafletModel};
pub use leaflet_order::{
    Column as LeafletOrderColumn, Entity as LeafletOrder, Model as LeafletOrderModel,
};
pub use log::{Column as LogColumn, Entity as Log, Model as LogModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use refresh_token::{
    Column as RefreshTokenColumn, Entity as RefreshToken, Model as RefreshTokenModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use worker::{Column as WorkerColumn, Entity as Worker, Model as WorkerModel};
