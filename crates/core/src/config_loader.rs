use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging defaults, a TOML file, and
    /// `EQUITY_SNAP_`-prefixed environment variables (highest precedence).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn load(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("EQUITY_SNAP_").split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load("does-not-exist.toml").unwrap();
            assert_eq!(config.yahoo.symbol_suffix, ".NS");
            Ok(())
        });
    }

    #[test]
    fn test_load_merges_file_over_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [screener]
                base_url = "http://localhost:9000"

                [screener.pacing]
                min_delay_secs = 1
                max_delay_secs = 2
                "#,
            )?;
            let config = ConfigLoader::load("Config.toml").unwrap();
            assert_eq!(config.screener.base_url, "http://localhost:9000");
            assert_eq!(config.screener.pacing.min_delay_secs, 1);
            // Untouched sections keep their defaults.
            assert_eq!(config.yahoo.lookback_days, 2190);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("EQUITY_SNAP_STORAGE__ROOT", "/tmp/snapshots");
            let config = ConfigLoader::load("does-not-exist.toml").unwrap();
            assert_eq!(config.storage.root, "/tmp/snapshots");
            Ok(())
        });
    }
}
