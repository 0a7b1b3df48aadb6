use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::hmac_auth::credentials::CredentialStore;

pub const ENV_KEYS: &str = "TENANT_GATE_HMAC_KEYS";
pub const ENV_CLOCK_SKEW: &str = "TENANT_GATE_HMAC_ALLOWED_CLOCK_SKEW_SECONDS";
pub const ENV_NONCE_ENABLED: &str = "TENANT_GATE_HMAC_NONCE_ENABLED";
pub const ENV_ENABLED: &str = "TENANT_GATE_ENABLED";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub internal_api: InternalApiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Largest request body the gate will buffer for signing
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Internal tenant API: route toggle, adapter selection and HMAC settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InternalApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub adapter: AdapterKind,
    #[serde(default)]
    pub hmac: HmacConfig,
}

impl Default for InternalApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            adapter: AdapterKind::default(),
            hmac: HmacConfig::default(),
        }
    }
}

/// Tenant adapter implementation, resolved once at startup.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    #[default]
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HmacConfig {
    #[serde(default = "default_clock_skew")]
    pub allowed_clock_skew_seconds: i64,
    /// key id -> shared secret
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
    #[serde(default)]
    pub nonce: NonceConfig,
}

fn default_clock_skew() -> i64 {
    300
}

impl Default for HmacConfig {
    fn default() -> Self {
        Self {
            allowed_clock_skew_seconds: default_clock_skew(),
            keys: BTreeMap::new(),
            nonce: NonceConfig::default(),
        }
    }
}

/// How nonce records are keyed.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NonceScope {
    /// Nonces are unique per key id
    #[default]
    KeyAndNonce,
    /// Nonces are unique across all callers
    NonceOnly,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NonceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub scope: NonceScope,
    #[serde(default = "default_nonce_prefix")]
    pub prefix: String,
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
    #[serde(default = "default_purge_interval")]
    pub purge_interval_seconds: u64,
}

fn default_true() -> bool {
    true
}

fn default_nonce_prefix() -> String {
    "internal_nonce:".to_string()
}

fn default_store_timeout_ms() -> u64 {
    250
}

fn default_purge_interval() -> u64 {
    60
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scope: NonceScope::default(),
            prefix: default_nonce_prefix(),
            store_timeout_ms: default_store_timeout_ms(),
            purge_interval_seconds: default_purge_interval(),
        }
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`, apply environment overrides and validate.
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Override settings from environment-style variables.
    ///
    /// `TENANT_GATE_HMAC_KEYS` replaces the whole key set and uses the form
    /// `id1:secret1,id2:secret2`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_KEYS) {
            self.internal_api.hmac.keys = parse_key_list(&raw)?;
        }
        if let Some(raw) = lookup(ENV_CLOCK_SKEW) {
            self.internal_api.hmac.allowed_clock_skew_seconds = raw
                .trim()
                .parse()
                .with_context(|| format!("{} must be an integer", ENV_CLOCK_SKEW))?;
        }
        if let Some(raw) = lookup(ENV_NONCE_ENABLED) {
            self.internal_api.hmac.nonce.enabled = parse_bool(ENV_NONCE_ENABLED, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ENABLED) {
            self.internal_api.enabled = parse_bool(ENV_ENABLED, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let hmac = &self.internal_api.hmac;
        if hmac.allowed_clock_skew_seconds < 0 {
            bail!("allowed_clock_skew_seconds must not be negative");
        }
        if hmac.nonce.store_timeout_ms == 0 {
            bail!("nonce.store_timeout_ms must be greater than zero");
        }
        if hmac.nonce.purge_interval_seconds == 0 {
            bail!("nonce.purge_interval_seconds must be greater than zero");
        }
        CredentialStore::from_config(&hmac.keys)?;
        if self.internal_api.enabled && hmac.keys.is_empty() {
            tracing::warn!("internal API enabled without HMAC keys; every request will be rejected");
        }
        Ok(())
    }
}

fn parse_key_list(raw: &str) -> anyhow::Result<BTreeMap<String, String>> {
    let mut keys = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((key_id, secret)) = entry.split_once(':') else {
            bail!("{} entries must look like key_id:secret", ENV_KEYS);
        };
        let key_id = key_id.trim();
        if key_id.is_empty() || secret.is_empty() {
            bail!("{} contains an empty key id or secret", ENV_KEYS);
        }
        if keys.insert(key_id.to_string(), secret.to_string()).is_some() {
            bail!("{} lists key id '{}' more than once", ENV_KEYS, key_id);
        }
    }
    Ok(keys)
}

fn parse_bool(name: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{} must be a boolean, got '{}'", name, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: tenant_gate.log
use_json: false
rotation: never
gateway:
  host: 127.0.0.1
  port: 8080
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_yaml_str(MINIMAL).unwrap();
        let api = &config.internal_api;
        assert!(api.enabled);
        assert_eq!(api.adapter, AdapterKind::Memory);
        assert_eq!(api.hmac.allowed_clock_skew_seconds, 300);
        assert!(api.hmac.nonce.enabled);
        assert_eq!(api.hmac.nonce.scope, NonceScope::KeyAndNonce);
        assert_eq!(api.hmac.nonce.prefix, "internal_nonce:");
        assert_eq!(config.gateway.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = format!(
            "{}{}",
            MINIMAL,
            r#"
internal_api:
  enabled: true
  adapter: memory
  hmac:
    allowed_clock_skew_seconds: 120
    keys:
      svc-billing: s3cret
    nonce:
      enabled: false
      scope: nonce_only
"#
        );
        let config = AppConfig::from_yaml_str(&yaml).unwrap();
        let hmac = &config.internal_api.hmac;
        assert_eq!(hmac.allowed_clock_skew_seconds, 120);
        assert_eq!(hmac.keys.get("svc-billing").unwrap(), "s3cret");
        assert!(!hmac.nonce.enabled);
        assert_eq!(hmac.nonce.scope, NonceScope::NonceOnly);
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::from_yaml_str(MINIMAL).unwrap();
        config
            .apply_env_overrides(env(&[
                (ENV_KEYS, "svc-a:alpha, svc-b:be:ta"),
                (ENV_CLOCK_SKEW, "60"),
                (ENV_NONCE_ENABLED, "false"),
                (ENV_ENABLED, "0"),
            ]))
            .unwrap();
        let hmac = &config.internal_api.hmac;
        assert_eq!(hmac.keys.len(), 2);
        assert_eq!(hmac.keys.get("svc-b").unwrap(), "be:ta");
        assert_eq!(hmac.allowed_clock_skew_seconds, 60);
        assert!(!hmac.nonce.enabled);
        assert!(!config.internal_api.enabled);
    }

    #[test]
    fn test_env_duplicate_key_rejected() {
        let mut config = AppConfig::from_yaml_str(MINIMAL).unwrap();
        let err = config
            .apply_env_overrides(env(&[(ENV_KEYS, "svc-a:one,svc-a:two")]))
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_env_malformed_values_rejected() {
        let mut config = AppConfig::from_yaml_str(MINIMAL).unwrap();
        assert!(
            config
                .apply_env_overrides(env(&[(ENV_KEYS, "no-separator")]))
                .is_err()
        );
        assert!(
            config
                .apply_env_overrides(env(&[(ENV_NONCE_ENABLED, "maybe")]))
                .is_err()
        );
    }

    #[test]
    fn test_validate_rejects_negative_skew_and_empty_secret() {
        let mut config = AppConfig::from_yaml_str(MINIMAL).unwrap();
        config.internal_api.hmac.allowed_clock_skew_seconds = -1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::from_yaml_str(MINIMAL).unwrap();
        config
            .internal_api
            .hmac
            .keys
            .insert("svc-a".into(), String::new());
        assert!(config.validate().is_err());
    }
}
