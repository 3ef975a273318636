use anyhow::Result;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::env;
use tokio::sync::Mutex;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigOrigin {
    Default,
    Env,
    Runtime,
}

/// Process-wide configuration state, seeded from the embedded defaults.
///
/// Runtime overrides accumulate on top of the defaults until [`reset`] is
/// called; the runner resets at the start of every run so no stale state
/// leaks across invocations.
///
/// [`reset`]: ConfigManager::reset
pub struct ConfigManager {
    base_defs: IndexMap<String, Value>,
    overrides: IndexMap<String, Value>,
}

impl ConfigManager {
    fn new() -> Self {
        ConfigManager {
            base_defs: IndexMap::new(),
            overrides: IndexMap::new(),
        }
    }

    pub fn instance() -> &'static Mutex<ConfigManager> {
        &CONFIG_LOADER
    }

    pub fn init(&mut self) -> Result<()> {
        let config_map = self.read_config_yaml_file()?;
        self.base_defs.extend(config_map);
        Ok(())
    }

    /// Drop every cached and overridden value and re-read the defaults.
    pub fn reset(&mut self) -> Result<()> {
        self.base_defs.clear();
        self.overrides.clear();
        self.init()
    }

    pub fn set_config_value(&mut self, key: &str, value: Value) {
        self.overrides.insert(key.to_string(), value);
    }

    /// Resolve a configuration value, runtime overrides first, then the
    /// `PLAYDRIVE_<KEY>` environment, then the embedded defaults. A null
    /// default resolves to `None`.
    pub fn get_config_value<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<(T, ConfigOrigin)>> {
        if let Some(value) = self.overrides.get(key) {
            if value.is_null() {
                return Ok(None);
            }
            let value: T = serde_yaml::from_value(value.clone())?;
            return Ok(Some((value, ConfigOrigin::Runtime)));
        }

        if let Ok(raw) = env::var(format!("PLAYDRIVE_{key}")) {
            let value: T = serde_yaml::from_str(&raw)?;
            return Ok(Some((value, ConfigOrigin::Env)));
        }

        match self.base_defs.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => {
                let value: T = serde_yaml::from_value(value.clone())?;
                Ok(Some((value, ConfigOrigin::Default)))
            }
        }
    }

    fn read_config_yaml_file(&self) -> Result<IndexMap<String, Value>> {
        let yaml_content = include_str!("base.yaml");
        let value: Value = serde_yaml::from_str(yaml_content)?;

        let config_map = value
            .as_mapping()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("YAML root is not a mapping"))?
            .into_iter()
            .map(|(key, value)| {
                let key_str = key
                    .as_str()
                    .ok_or_else(|| anyhow::anyhow!("YAML key is not a string"))?
                    .to_string();
                Ok((key_str, value))
            })
            .collect::<Result<IndexMap<String, Value>>>()?;

        Ok(config_map)
    }
}

static CONFIG_LOADER: Lazy<Mutex<ConfigManager>> = Lazy::new(|| Mutex::new(ConfigManager::new()));
