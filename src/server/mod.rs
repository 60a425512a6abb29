use axum::{routing::post, Router};
use config::ConfigError;
use log::info;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};

pub mod routes;
pub mod state;

use crate::config::{RelayConfig, Route};
use crate::error::RelayError;
use routes::{
    confirm_email_handler, get_recipe_handler, reset_password_handler, send_notification_handler,
};
pub use state::AppState;

/// Mount the given routes; fails if one of them needs a capability the
/// state was built without.
pub fn router(state: Arc<AppState>, enabled: &[Route]) -> Result<Router, RelayError> {
    let mut app = Router::new();

    for &route in enabled {
        if let Some(capability) = state.missing_capability(route) {
            return Err(ConfigError::Message(format!(
                "route {} requires {} to be configured",
                route.path(),
                capability
            ))
            .into());
        }

        let handler = match route {
            Route::SendNotification => post(send_notification_handler),
            Route::GetRecipe => post(get_recipe_handler),
            Route::ResetPassword => post(reset_password_handler),
            Route::ConfirmEmail => post(confirm_email_handler),
        };
        info!("Mounting POST {}", route.path());
        app = app.route(route.path(), handler);
    }

    Ok(app.with_state(state))
}

pub async fn serve(config: &RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Initializing state...");
    let state = AppState::from_config(config)?;
    let dispatcher = state.dispatcher.clone();
    let app = router(state, &config.routes.enabled)?;

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Recipe relay is running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(dispatcher) = dispatcher {
        dispatcher.drain(config.notification.shutdown_grace()).await;
    }

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        } else {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
