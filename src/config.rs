// This file is part of the terraform-provider-meshstack project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provider configuration and logging setup

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use tf_provider::{AttributePath, Diagnostics};
use tf_provider::value::ValueString;

use crate::client::ClientConfig;
use crate::utils::known_str;

pub const ENDPOINT_VAR: &str = "MESHSTACK_ENDPOINT";
pub const API_KEY_VAR: &str = "MESHSTACK_API_KEY";
pub const API_SECRET_VAR: &str = "MESHSTACK_API_SECRET";
pub const LOG_LEVEL_VAR: &str = "MESHSTACK_LOG_LEVEL";
/// Set by the plugin framework when it already captures the logs
pub const PLUGIN_LOG_VAR: &str = "PLUGIN_LOG_FILE";

/// Provider block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderConfig<'a> {
    #[serde(borrow = "'a")]
    pub endpoint: ValueString<'a>,
    pub apikey: ValueString<'a>,
    pub apisecret: ValueString<'a>,
}

impl<'a> ProviderConfig<'a> {
    /// Resolve the client settings, falling back on the environment for unset attributes
    ///
    /// Every missing setting is reported, not only the first one.
    pub fn resolve<F>(&self, diags: &mut Diagnostics, lookup: F) -> Option<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut setting = |value: &ValueString<'_>, attribute: &'static str, var: &str| {
            let resolved = known_str(value)
                .map(str::to_owned)
                .or_else(|| lookup(var))
                .filter(|value| !value.is_empty());
            if resolved.is_none() {
                diags.error(
                    "Missing provider configuration",
                    format!("Set `{attribute}` in the provider block or the {var} environment variable"),
                    AttributePath::new(attribute),
                );
            }
            resolved
        };
        let endpoint = setting(&self.endpoint, "endpoint", ENDPOINT_VAR);
        let api_key = setting(&self.apikey, "apikey", API_KEY_VAR);
        let api_secret = setting(&self.apisecret, "apisecret", API_SECRET_VAR);

        Some(ClientConfig {
            endpoint: endpoint?,
            api_key: api_key?,
            api_secret: api_secret?,
        })
    }
}

/// Resolve against the process environment
pub fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Install the JSON log layer on stderr
///
/// Terraform owns stdout for the plugin handshake.
pub fn init_logging() {
    if std::env::var_os(PLUGIN_LOG_VAR).is_some() {
        return;
    }
    let filter = EnvFilter::try_from_env(LOG_LEVEL_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tf_provider::value::Value;

    use crate::utils::string_value;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn attributes_take_precedence_over_the_environment() {
        let config = ProviderConfig {
            endpoint: string_value("https://meshstack.example.com"),
            apikey: string_value("key"),
            apisecret: string_value("secret"),
        };
        let mut diags = Diagnostics::default();

        let resolved = config
            .resolve(&mut diags, env(&[(ENDPOINT_VAR, "https://other.example.com")]))
            .unwrap();
        assert_eq!(resolved.endpoint, "https://meshstack.example.com");
        assert!(diags.errors.is_empty());
    }

    #[test]
    fn unset_attributes_fall_back_on_the_environment() {
        let config = ProviderConfig {
            endpoint: Value::Null,
            apikey: string_value("key"),
            apisecret: Value::Unknown,
        };
        let mut diags = Diagnostics::default();

        let resolved = config
            .resolve(
                &mut diags,
                env(&[
                    (ENDPOINT_VAR, "https://meshstack.example.com"),
                    (API_SECRET_VAR, "secret"),
                ]),
            )
            .unwrap();
        assert_eq!(resolved.endpoint, "https://meshstack.example.com");
        assert_eq!(resolved.api_key, "key");
        assert_eq!(resolved.api_secret, "secret");
    }

    #[test]
    fn every_missing_setting_is_reported() {
        let mut diags = Diagnostics::default();

        assert!(ProviderConfig::default()
            .resolve(&mut diags, env(&[(API_KEY_VAR, "key"), (API_SECRET_VAR, "")]))
            .is_none());
        let paths: Vec<_> = diags.errors.iter().map(|diag| diag.attribute.clone()).collect();
        assert_eq!(
            paths,
            [AttributePath::new("endpoint"), AttributePath::new("apisecret")]
        );
    }
}
