//! # Return-URL Listener
//!
//! The payment page sends the customer back to `<origin>/success?session_id=…`
//! or to the cancel page. A short-lived local server catches that redirect so
//! the CLI can pick up the session id and start confirming the payment.
//!
//! | Method | Path | Outcome |
//! |--------|------|---------|
//! | GET | `/success` | `CheckoutReturn::Completed` |
//! | GET | `/cancel` | `CheckoutReturn::Cancelled` |
//! | GET | `/cart` | `CheckoutReturn::Cancelled` |

use anyhow::Context;
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// How the customer came back from the payment page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutReturn {
    Completed { session_id: Option<String> },
    Cancelled,
}

#[derive(Clone)]
struct CallbackState {
    tx: mpsc::Sender<CheckoutReturn>,
}

impl CallbackState {
    /// Only the first return counts; reloads of the page are ignored
    fn report(&self, outcome: CheckoutReturn) {
        if self.tx.try_send(outcome).is_err() {
            debug!("Checkout return already recorded");
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReturnParams {
    session_id: Option<String>,
}

/// Router catching the processor's redirect
pub fn create_router(tx: mpsc::Sender<CheckoutReturn>) -> Router {
    Router::new()
        .route("/success", get(checkout_success))
        .route("/cancel", get(checkout_cancel))
        .route("/cart", get(checkout_cancel))
        .layer(TraceLayer::new_for_http())
        .with_state(CallbackState { tx })
}

async fn checkout_success(
    State(state): State<CallbackState>,
    Query(params): Query<ReturnParams>,
) -> Html<String> {
    let session_id = params.session_id.filter(|s| !s.trim().is_empty());
    info!(
        "Customer returned from payment page: session={}",
        session_id.as_deref().unwrap_or("none")
    );
    state.report(CheckoutReturn::Completed { session_id });

    Html(page(
        "Payment received",
        "Checking your payment, you can return to the terminal.",
    ))
}

async fn checkout_cancel(State(state): State<CallbackState>) -> Html<String> {
    info!("Customer cancelled on payment page");
    state.report(CheckoutReturn::Cancelled);

    Html(page(
        "Payment cancelled",
        "No charges were made. Your cart is unchanged.",
    ))
}

fn page(title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{title}</title></head>
<body style="font-family: system-ui; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0;">
    <div style="padding: 60px; text-align: center;">
        <h1>{title}</h1>
        <p style="color: #666;">{message}</p>
    </div>
</body>
</html>
"#
    )
}

/// Serve on `addr` until the customer comes back, then shut down
pub async fn wait_for_return(addr: SocketAddr) -> anyhow::Result<CheckoutReturn> {
    let (tx, mut rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot listen for the payment return on {}", addr))?;
    info!("Listening for the payment return on http://{}", addr);

    let server = tokio::spawn(async move {
        axum::serve(listener, create_router(tx))
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
    });

    let outcome = rx
        .recv()
        .await
        .context("Return listener stopped before the customer came back")?;

    shutdown_tx.send(()).ok();
    // The browser may hold its connection open; don't wait on it for long
    if tokio::time::timeout(Duration::from_secs(2), server).await.is_err() {
        debug!("Return listener still draining, leaving it behind");
    }

    Ok(outcome)
}
