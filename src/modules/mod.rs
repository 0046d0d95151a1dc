pub mod covers;

use amocover_kernel::{settings::Settings, ModuleRegistry};

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    registry.register(covers::from_settings(&settings.provider)?)?;
    Ok(())
}
