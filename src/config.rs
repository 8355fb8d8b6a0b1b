use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::description::{ItemId, MenuDescription};
use crate::icon::{IconResolver, DEFAULT_ICON_SIZE};

fn default_icon_size() -> u32 {
    DEFAULT_ICON_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Edge length menu icons are resized to.
    #[serde(default = "default_icon_size")]
    pub icon_size: u32,

    /// JSON menu description to show instead of the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_file: Option<PathBuf>,

    /// Activating the item with this id exits the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quit_item: Option<ItemId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            icon_size: default_icon_size(),
            menu_file: None,
            quit_item: None,
        }
    }
}

impl Config {
    #[cfg(debug_assertions)]
    pub const FILENAME: &'static str = "tray-menu.debug.toml";
    #[cfg(not(debug_assertions))]
    pub const FILENAME: &'static str = "tray-menu.toml";

    pub fn path() -> anyhow::Result<PathBuf> {
        dirs::home_dir()
            .context("Could not determine home directory")
            .map(|dir| dir.join(".config"))
            .map(|dir| dir.join(Self::FILENAME))
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(config_file: &Path) -> anyhow::Result<Self> {
        if config_file.exists() {
            tracing::info!("Loading config from {}", config_file.display());

            let content = std::fs::read_to_string(config_file)?;
            toml::from_str(&content).map_err(Into::into)
        } else {
            tracing::info!(
                "Config file not found at {}, using default config",
                config_file.display()
            );

            Ok(Config::default())
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, config_file: &Path) -> anyhow::Result<()> {
        tracing::info!("Saving config to {}", config_file.display());

        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(config_file, toml::to_string(self)?)?;
        Ok(())
    }

    pub fn icon_resolver(&self) -> IconResolver {
        IconResolver::new(self.icon_size)
    }

    /// Reads `menu_file`, if one is configured.
    pub fn load_menu(&self) -> anyhow::Result<Option<MenuDescription>> {
        let Some(menu_file) = &self.menu_file else {
            return Ok(None);
        };

        tracing::info!("Loading menu from {}", menu_file.display());

        let content = std::fs::read_to_string(menu_file)
            .with_context(|| format!("Failed to read {}", menu_file.display()))?;
        let description = MenuDescription::from_json(&content)
            .with_context(|| format!("Invalid menu description in {}", menu_file.display()))?;

        Ok(Some(description))
    }
}
