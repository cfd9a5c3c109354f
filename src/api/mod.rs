//! HTTP JSON API used by the dashboards and the notification bot.

/// Caller authentication and role checks
pub mod auth;
/// Request handlers, one module per resource
pub mod controller;
/// Wire types shared with API clients
pub mod dto;
/// Error to HTTP response mapping
pub mod error;
/// Shared handler state
pub mod state;

use crate::api::{
    controller::{
        auth as auth_ctl, city, distributor, goal, leaflet, leaflet_order, log, notification,
        order, stats, user, worker,
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

fn v1() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth_ctl::login))
        .route("/auth/refresh", post(auth_ctl::refresh))
        .route("/auth/logout", post(auth_ctl::logout))
        .route("/auth/me", get(auth_ctl::me))
        .route("/users", get(user::list_users).post(user::create_user))
        .route("/users/{id}", axum::routing::delete(user::delete_user))
        .route("/cities", get(city::list_cities).post(city::create_city))
        .route(
            "/cities/{id}",
            get(city::get_city)
                .put(city::rename_city)
                .delete(city::delete_city),
        )
        .route(
            "/leaflets",
            get(leaflet::list_leaflets).post(leaflet::create_leaflet),
        )
        .route(
            "/leaflets/{id}",
            get(leaflet::get_leaflet)
                .put(leaflet::rename_leaflet)
                .delete(leaflet::delete_leaflet),
        )
        .route("/leaflets/{id}/restock", post(leaflet::restock_leaflet))
        .route(
            "/distributors",
            get(distributor::list_distributors).post(distributor::create_distributor),
        )
        .route(
            "/distributors/{id}",
            get(distributor::get_distributor)
                .put(distributor::update_distributor)
                .delete(distributor::deactivate_distributor),
        )
        .route(
            "/workers",
            get(worker::list_workers).post(worker::create_worker),
        )
        .route(
            "/workers/{id}",
            get(worker::get_worker)
                .put(worker::update_worker)
                .delete(worker::deactivate_worker),
        )
        .route(
            "/leaflet-orders",
            get(leaflet_order::list_leaflet_orders).post(leaflet_order::create_leaflet_order),
        )
        .route(
            "/leaflet-orders/{id}",
            get(leaflet_order::get_leaflet_order),
        )
        .route(
            "/leaflet-orders/{id}/complete",
            post(leaflet_order::complete_leaflet_order),
        )
        .route(
            "/leaflet-orders/{id}/quantity",
            patch(leaflet_order::edit_quantity),
        )
        .route(
            "/leaflet-orders/{id}/submit",
            post(leaflet_order::submit_for_payment),
        )
        .route(
            "/leaflet-orders/{id}/payment-proof",
            post(leaflet_order::upload_payment_proof)
                .layer(DefaultBodyLimit::max(leaflet_order::MAX_PROOF_BYTES)),
        )
        .route("/orders", get(order::list_orders).post(order::create_order))
        .route(
            "/orders/{id}",
            get(order::get_order)
                .put(order::update_order)
                .delete(order::delete_order),
        )
        .route("/orders/{id}/state", patch(order::change_state))
        .route("/goals", get(goal::list_goals).post(goal::create_goal))
        .route(
            "/goals/{id}",
            get(goal::get_goal)
                .put(goal::update_goal)
                .delete(goal::delete_goal),
        )
        .route("/logs", get(log::list_logs))
        .route("/stats/distribution", get(stats::distribution))
        .route("/stats/orders", get(stats::orders))
        .route("/stats/goals", get(stats::goals))
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", v1())
        .route(
            "/api/telegram",
            get(notification::pending).patch(notification::mark_notified),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
