use std::sync::LazyLock;

use bundler_primitives::Address;
use bundler_signer::Signer;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const SIGNING_KEY: &str = "signingKey";
const NODE_URL: &str = "nodeUrl";
const BUNDLER_URL: &str = "bundlerUrl";
const TEST_ERC20_TOKEN: &str = "testERC20Token";
const TEST_GAS: &str = "testGas";

static CONFIG: LazyLock<TestConfig> = LazyLock::new(|| TestConfig {
    // This is for testing only. DO NOT use in production.
    signing_key: "c6cbc5ffad570fdad0544d1b5358a36edeb98d163b6567912ac4754e144d4edb".to_string(),
    node_url: "http://localhost:8545".to_string(),
    bundler_url: "http://localhost:4337".to_string(),
    test_erc20_token: "0x3870419Ba2BBf0127060bCB37f69A1b1C090992B".to_string(),
    // https://github.com/stackup-wallet/contracts/blob/main/contracts/test/TestGas.sol
    test_gas: "0xc2e76Ee793a194Dd930C18c4cDeC93E7C75d567C".to_string(),
});

/// Endpoints and keys of the local end-to-end environment.
///
/// The instance returned by [`config`] is built once and never mutated.
/// Values are kept as plain strings, use the typed accessors to parse them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
    #[serde(rename = "signingKey")]
    pub signing_key: String,
    #[serde(rename = "nodeUrl")]
    pub node_url: String,
    #[serde(rename = "bundlerUrl")]
    pub bundler_url: String,
    #[serde(rename = "testERC20Token")]
    pub test_erc20_token: String,
    #[serde(rename = "testGas")]
    pub test_gas: String,
}

/// Returns the end-to-end test configuration.
pub fn config() -> &'static TestConfig {
    &CONFIG
}

impl TestConfig {
    /// Field names paired with their values, in declaration order.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            (SIGNING_KEY, self.signing_key.as_str()),
            (NODE_URL, self.node_url.as_str()),
            (BUNDLER_URL, self.bundler_url.as_str()),
            (TEST_ERC20_TOKEN, self.test_erc20_token.as_str()),
            (TEST_GAS, self.test_gas.as_str()),
        ]
    }

    /// Sanity checks the shape of every field. The configuration itself never calls this,
    /// it is up to consumers to decide whether malformed values are fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.fields() {
            if value.is_empty() {
                return Err(ConfigError::Empty(field));
            }
        }

        validate_signing_key(&self.signing_key)?;
        validate_url(NODE_URL, &self.node_url)?;
        validate_url(BUNDLER_URL, &self.bundler_url)?;
        parse_address(TEST_ERC20_TOKEN, &self.test_erc20_token)?;
        parse_address(TEST_GAS, &self.test_gas)?;

        Ok(())
    }

    pub fn signer(&self) -> anyhow::Result<Signer> {
        Signer::from_str(&self.signing_key)
    }

    pub fn test_erc20_token_address(&self) -> Result<Address, ConfigError> {
        parse_address(TEST_ERC20_TOKEN, &self.test_erc20_token)
    }

    pub fn test_gas_address(&self) -> Result<Address, ConfigError> {
        parse_address(TEST_GAS, &self.test_gas)
    }
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn validate_signing_key(key: &str) -> Result<(), ConfigError> {
    let key = key.strip_prefix("0x").unwrap_or(key);
    if key.len() != 64 || !is_hex(key) {
        return Err(ConfigError::InvalidSigningKey(SIGNING_KEY));
    }
    Ok(())
}

fn validate_url(field: &'static str, url: &str) -> Result<(), ConfigError> {
    let host = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match host {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: url.to_string(),
        }),
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    let Some(hex) = value.strip_prefix("0x") else {
        return Err(ConfigError::Missing0xPrefix(field));
    };
    if hex.len() != 40 || !is_hex(hex) {
        return Err(ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }

    let mut arr = [0u8; 20];
    bundler_primitives::hex::decode_to_slice(hex, &mut arr).map_err(|_| {
        ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
        }
    })?;
    Ok(Address::from(arr))
}
