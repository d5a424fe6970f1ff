//! Dashboard route handler.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Response,
};
use tracing::instrument;

use isra_cafe_core::OrderStatus;

use super::{AdminView, MessageQuery, render};
use crate::db::OrderRepository;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Order count for one status.
#[derive(Debug, Clone)]
pub struct StatusCountView {
    pub status: String,
    pub label: String,
    pub count: i64,
}

/// Orders the kitchen still has to finish.
fn open_order_count(counts: &[(OrderStatus, i64)]) -> i64 {
    counts
        .iter()
        .filter(|(status, _)| status.is_open())
        .map(|(_, count)| count)
        .sum()
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminView,
    pub current_path: String,
    pub counts: Vec<StatusCountView>,
    /// Orders placed or in preparation.
    pub open_orders: i64,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Greeting and order counts by status.
///
/// GET /
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Response {
    let mut error = query.error;

    let counts = match OrderRepository::new(state.pool()).count_by_status().await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!(error = %e, "Failed to count orders");
            error = Some("Order counts are unavailable right now".to_owned());
            Vec::new()
        }
    };
    let open_orders = open_order_count(&counts);
    let counts = counts
        .into_iter()
        .map(|(status, count)| StatusCountView {
            status: status.as_str().to_owned(),
            label: status.label().to_owned(),
            count,
        })
        .collect();

    render(&DashboardTemplate {
        admin_user: AdminView::from(&admin),
        current_path: "/".to_owned(),
        counts,
        open_orders,
        error,
        success: query.success,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_order_count_covers_kitchen_statuses() {
        let counts = [
            (OrderStatus::PaymentPending, 4),
            (OrderStatus::OrderPlaced, 3),
            (OrderStatus::OrderInPreparation, 2),
            (OrderStatus::Completed, 10),
            (OrderStatus::Cancelled, 1),
        ];
        assert_eq!(open_order_count(&counts), 5);
        assert_eq!(open_order_count(&[]), 0);
    }
}
