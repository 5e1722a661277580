use platepick::prelude::*;

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Demo accounts. Real deployments plug in their own `UserDirectory`.
const DEMO_USERS: &[(u64, &str)] = &[(1, "alice"), (2, "bob"), (3, "carol"), (4, "dave")];

fn demo_directory() -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();
    for (id, name) in DEMO_USERS {
        directory.insert(UserId(*id), *name);
    }
    directory
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(addr = %config.bind_addr, users = DEMO_USERS.len(), "starting room server");

    let builder = PlatepickServerBuilder::new().config(config);
    match OpenAiConfig::from_env() {
        Some(ai) => {
            tracing::info!(model = %ai.model, "AI suggestions enabled");
            let provider = WithFallback::new(OpenAiSuggester::new(ai)?);
            builder.build(provider, demo_directory()).await?.run().await?;
        }
        None => {
            tracing::info!("OPENAI_API_KEY not set, using the built-in catalog");
            builder
                .build(FallbackCatalog::default(), demo_directory())
                .await?
                .run()
                .await?;
        }
    }
    Ok(())
}
