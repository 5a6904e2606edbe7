//! Executor configuration, read from a JSON file.
//!
//! ```json
//! {
//!   "chains": [
//!     {
//!       "chain": "gnosis",
//!       "rpc": "https://rpc.gnosischain.com",
//!       "rolesMod": "0x1ffAdc16726dd4F91fF275b4bF50651801B06a86",
//!       "role": 1
//!     }
//!   ],
//!   "signer": { "privateKey": "$EVM_PRIVATE_KEY" },
//!   "polling": { "intervalMs": 2000, "attempts": 60 }
//! }
//! ```
//!
//! Secrets are either literal values or `$NAME` references to environment variables. Without a
//! `signer` section the key is read from `EVM_PRIVATE_KEY`, if set.

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use roles_chain_eip155::roles::ReceiptPolling;
use roles_types::chain::ChainId;
use serde::Deserialize;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable holding the signer key when the file has no `signer` section.
pub const PRIVATE_KEY_ENV: &str = "EVM_PRIVATE_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config lists no chains")]
    NoChains,
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
    #[error("invalid private key")]
    InvalidPrivateKey,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    chains: ChainsConfig,
    #[serde(default)]
    signer: Option<SignerConfig>,
    #[serde(default)]
    polling: PollingConfig,
}

/// One Roles Modifier deployment the executor may act through.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain: ChainId,
    pub rpc: Url,
    pub roles_mod: Address,
    pub role: u16,
    /// Role member used for simulation when no signer is available.
    #[serde(default)]
    pub account: Option<Address>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ChainsConfig(Vec<ChainConfig>);

impl Deref for ChainsConfig {
    type Target = [ChainConfig];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerConfig {
    private_key: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        let polling = ReceiptPolling::default();
        Self {
            interval_ms: polling.interval.as_millis() as u64,
            attempts: polling.attempts,
        }
    }
}

impl From<PollingConfig> for ReceiptPolling {
    fn from(config: PollingConfig) -> Self {
        ReceiptPolling {
            interval: Duration::from_millis(config.interval_ms),
            attempts: config.attempts,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(raw)?;
        if config.chains.is_empty() {
            return Err(ConfigError::NoChains);
        }
        Ok(config)
    }

    pub fn chains(&self) -> &ChainsConfig {
        &self.chains
    }

    pub fn polling(&self) -> ReceiptPolling {
        self.polling.into()
    }

    /// The configured signer, or the one from [`PRIVATE_KEY_ENV`]. `None` when neither is set.
    pub fn signer(&self) -> Result<Option<PrivateKeySigner>, ConfigError> {
        let key = match &self.signer {
            Some(signer) => resolve_secret(&signer.private_key)?,
            None => match std::env::var(PRIVATE_KEY_ENV) {
                Ok(key) => key,
                Err(_) => return Ok(None),
            },
        };
        key.trim()
            .parse::<PrivateKeySigner>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidPrivateKey)
    }
}

/// `$NAME` reads the environment variable `NAME`; anything else is taken literally.
fn resolve_secret(raw: &str) -> Result<String, ConfigError> {
    match raw.strip_prefix('$') {
        Some(name) => std::env::var(name).map_err(|_| ConfigError::MissingEnv(name.to_string())),
        None => Ok(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const KEY: &str = "0xa60429f7d6b751ca19d52302826b4a611893fbb138f0059f354b79846f2ab125";

    #[test]
    fn parses_chains_and_defaults() {
        let config = Config::from_json(
            r#"{
                "chains": [
                    {
                        "chain": "eip155:100",
                        "rpc": "http://localhost:8545",
                        "rolesMod": "0x1ffAdc16726dd4F91fF275b4bF50651801B06a86",
                        "role": 1,
                        "account": "0x216071B1B5681D67A75f7eEAF92CEC8262bE29f7"
                    }
                ]
            }"#,
        )
        .unwrap();
        let chain = &config.chains()[0];
        assert_eq!(chain.chain, ChainId::new("eip155", "100"));
        assert_eq!(
            chain.roles_mod,
            address!("0x1ffAdc16726dd4F91fF275b4bF50651801B06a86")
        );
        assert_eq!(chain.role, 1);
        assert_eq!(
            chain.account,
            Some(address!("0x216071B1B5681D67A75f7eEAF92CEC8262bE29f7"))
        );
        assert_eq!(config.polling(), ReceiptPolling::default());
    }

    #[test]
    fn accepts_network_names_and_polling() {
        let config = Config::from_json(
            r#"{
                "chains": [
                    { "chain": "ethereum", "rpc": "http://localhost:8545",
                      "rolesMod": "0x1ffAdc16726dd4F91fF275b4bF50651801B06a86", "role": 3 }
                ],
                "polling": { "intervalMs": 500, "attempts": 4 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.chains()[0].chain, ChainId::new("eip155", "1"));
        assert_eq!(config.chains()[0].account, None);
        assert_eq!(
            config.polling(),
            ReceiptPolling {
                interval: Duration::from_millis(500),
                attempts: 4
            }
        );
    }

    #[test]
    fn empty_chain_list_is_rejected() {
        assert!(matches!(
            Config::from_json(r#"{ "chains": [] }"#),
            Err(ConfigError::NoChains)
        ));
    }

    #[test]
    fn literal_signer_key() {
        let config = Config::from_json(&format!(
            r#"{{
                "chains": [
                    {{ "chain": "gnosis", "rpc": "http://localhost:8545",
                       "rolesMod": "0x1ffAdc16726dd4F91fF275b4bF50651801B06a86", "role": 1 }}
                ],
                "signer": {{ "privateKey": "{KEY}" }}
            }}"#
        ))
        .unwrap();
        let signer = config.signer().unwrap().unwrap();
        assert_eq!(
            signer.address(),
            KEY.parse::<PrivateKeySigner>().unwrap().address()
        );
    }

    #[test]
    fn unset_env_reference_is_reported() {
        assert!(matches!(
            resolve_secret("$ROLES_EXECUTOR_TEST_SURELY_UNSET"),
            Err(ConfigError::MissingEnv(name)) if name == "ROLES_EXECUTOR_TEST_SURELY_UNSET"
        ));
        assert_eq!(resolve_secret("0x01").unwrap(), "0x01");
    }
}
