pub mod auth;
pub mod city;
pub mod distributor;
pub mod goal;
pub mod leaflet;
pub mod leaflet_order;
pub mod log;
pub mod notification;
pub mod order;
pub mod stats;
pub mod user;
pub mod worker;
