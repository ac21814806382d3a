//! OAuth redirect handler.
//!
//! Raindrop.io sends the user back to the registered redirect URI with either a
//! `code` or an `error` query parameter. The handler mounted by
//! [`redirect_router`] answers the browser with a short HTML page and forwards
//! the outcome to the hosting application over a channel, so nothing is stored
//! on the client.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use std::future::IntoFuture;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::{AuthorizationRedirect, RaindropError, Result};

/// Outcome of one authorization redirect.
pub type RedirectOutcome = Result<String>;

#[derive(Clone)]
struct RedirectState {
    outcomes: mpsc::Sender<RedirectOutcome>,
}

/// Router serving the redirect handler at `path`.
pub fn redirect_router(path: &str, outcomes: mpsc::Sender<RedirectOutcome>) -> Router {
    Router::new()
        .route(path, get(authorization_code_handler))
        .with_state(RedirectState { outcomes })
}

async fn authorization_code_handler(
    State(state): State<RedirectState>,
    Query(redirect): Query<AuthorizationRedirect>,
) -> (StatusCode, Html<String>) {
    let outcome = redirect.into_code();

    let reply = match &outcome {
        Ok(code) => {
            tracing::info!("Received authorization code");
            (
                StatusCode::OK,
                Html(format!(
                    "<h1>You've been authorized</h1><p>{}</p>",
                    escape_html(code)
                )),
            )
        }
        Err(e) => {
            tracing::error!("Authorization redirect failed: {}", e);
            let status = match e {
                RaindropError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
                _ => StatusCode::from_u16(AuthorizationRedirect::MALFORMED_STATUS)
                    .unwrap_or(StatusCode::BAD_REQUEST),
            };
            (
                status,
                Html(format!(
                    "<h1>Authorization failed</h1><p>{}</p>",
                    escape_html(&e.to_string())
                )),
            )
        }
    };

    if state.outcomes.try_send(outcome).is_err() {
        tracing::warn!("Nobody is waiting for the authorization code");
    }

    reply
}

/// Serve the redirect handler on `listener` until the first redirect arrives.
///
/// Returns the extracted code, or the redirect's error. Cancelling `shutdown`
/// stops the server and yields [`RaindropError::Cancelled`].
pub async fn wait_for_authorization_code(
    listener: TcpListener,
    path: &str,
    shutdown: CancellationToken,
) -> Result<String> {
    let (tx, mut rx) = mpsc::channel(1);
    let app = redirect_router(path, tx);

    tracing::info!("Waiting for the authorization redirect on {}", listener.local_addr()?);

    let stop = shutdown.child_token();
    let server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(stop.clone().cancelled_owned())
            .into_future(),
    );

    let outcome = tokio::select! {
        outcome = rx.recv() => outcome.unwrap_or(Err(RaindropError::Cancelled)),
        _ = shutdown.cancelled() => Err(RaindropError::Cancelled),
    };

    stop.cancel();
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!("Redirect server stopped with an error: {}", e),
        Err(e) => tracing::warn!("Redirect server task failed: {}", e),
    }

    outcome
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
