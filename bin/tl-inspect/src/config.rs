// Copyright 2026 - developers of the `tlcat` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tlcat_codec::Schema;
use tlcat_crypto::{KeyError, PublicKey};

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV: &str = "TLCAT_CONFIG";

/// The contents of the optional configuration file.
///
/// ```toml
/// schema = ["mtproto.tl", "api.tl"]
///
/// [[keys]]
/// name = "production"
/// modulus = "c150023e..."
/// exponent = "010001"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Schema files, relative to the configuration file.
    pub schema: Vec<PathBuf>,
    pub keys: Vec<KeyConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyConfig {
    pub name: Option<String>,
    pub modulus: String,
    #[serde(default = "default_exponent")]
    pub exponent: String,
}

fn default_exponent() -> String {
    "010001".into()
}

impl KeyConfig {
    pub fn public_key(&self) -> Result<PublicKey, KeyError> {
        PublicKey::from_hex(&self.modulus, &self.exponent)
    }
}

impl Config {
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Reads the configuration, making schema paths relative to its file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let mut config = Self::parse(&fs::read_to_string(path)?)?;
        if let Some(dir) = path.parent() {
            config.schema = config.schema.iter().map(|p| dir.join(p)).collect();
        }
        Ok(config)
    }

    /// Loads every configured schema file, followed by the extra ones.
    pub fn load_schema(&self, extra: &[PathBuf]) -> Result<Schema, Box<dyn Error>> {
        let mut schema = Schema::new();
        for path in self.schema.iter().chain(extra) {
            let contents = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            schema
                .extend_tl(&contents)
                .map_err(|e| format!("{}: {}", path.display(), e))?;
            log::info!("loaded {}, {} constructors known", path.display(), schema.len());
        }
        Ok(schema)
    }
}
