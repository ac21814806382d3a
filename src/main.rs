use raindrop_client::{server, ClientConfig, RaindropClient};
use reqwest::Url;
use std::env;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get configuration from environment variables
    let config = ClientConfig::from_env()?;
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let callback_path = Url::parse(&config.redirect_uri)?.path().to_string();

    let client = RaindropClient::new(config)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Open this URL to authorize the app: {}", client.authorization_url());

    // Ctrl+C aborts the wait for the redirect
    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let code = server::wait_for_authorization_code(listener, &callback_path, shutdown).await?;

    let credential = match client.exchange_code(&code, None).await {
        Ok(credential) => credential,
        Err(e) => {
            tracing::error!("Token exchange failed: {}", e);
            tracing::error!("Please verify:");
            tracing::error!("  - RAINDROP_CLIENT_ID and RAINDROP_CLIENT_SECRET are correct");
            tracing::error!("  - RAINDROP_REDIRECT_URI matches the app settings");
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Authorized; token {} expires in {:?} seconds",
        credential.token_preview(),
        credential.expires_in
    );

    let collections = client
        .get_root_collections(&credential.access_token, None)
        .await?;
    if !collections.result {
        tracing::warn!(
            "Raindrop.io rejected the request: {}",
            collections
                .error_message
                .as_deref()
                .unwrap_or("unknown error")
        );
    }

    for collection in &collections.items {
        println!("{:>10}  {} ({} raindrops)", collection.id, collection.title, collection.count);
    }

    Ok(())
}
