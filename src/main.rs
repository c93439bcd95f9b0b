/// Lodestone server binary
use lodestone::{config::ServerConfig, context::AppContext, error::YggResult, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> YggResult<()> {
    // Load configuration first so .env can set RUST_LOG
    let config = ServerConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                .unwrap_or_else(|_| "lodestone=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    let ctx = AppContext::new(config).await?;
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    __              __          __
   / /   ____  ____/ /__  _____/ /_____  ____  ___
  / /   / __ \/ __  / _ \/ ___/ __/ __ \/ __ \/ _ \
 / /___/ /_/ / /_/ /  __(__  ) /_/ /_/ / / / /  __/
/_____/\____/\__,_/\___/____/\__/\____/_/ /_/\___/

        Yggdrasil-compatible auth server v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
