use anyhow::Context;
use userstore::{Database, DbConfig, MemoryUserStore, PgUserStore, User, UserStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "userstore=debug,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    // stdout is reserved for the rendered user
    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    if std::env::var("USER_STORE").map(|v| v == "memory").unwrap_or(false) {
        tracing::info!("using in-memory store");
        return run(&MemoryUserStore::new()).await;
    }

    let config = DbConfig::from_env();
    tracing::debug!(?config, "database config");
    let db = Database::connect(config)
        .await
        .context("connect to database")?;

    let result = async {
        db.migrate().await.context("run migrations")?;
        run(&PgUserStore::new(db.clone())).await
    }
    .await;

    db.close().await;
    result
}

async fn run(store: &dyn UserStore) -> anyhow::Result<()> {
    let user = User::new("farah@email.com", "Farah", "Islam", None)?;
    user.save_to_db(store).await.context("save user")?;

    let user_from_db = User::load_by_email(store, "farah@email.com")
        .await
        .context("load user")?;
    println!("{}", user_from_db);
    Ok(())
}
