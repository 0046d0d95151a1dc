use anyhow::Context;
use amocover_app::modules;
use amocover_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load AmoCover settings")?;
    amocover_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        provider = %settings.provider.base_url,
        api_key_configured = settings.provider.has_api_key(),
        "amocover-app bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &settings)?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = amocover_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}
