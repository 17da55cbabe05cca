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

use serde::{Deserialize, Serialize};

use super::{ClientError, MeshStackClient};

pub const MEDIA_TYPE: &str = "application/vnd.meshcloud.api.meshintegration.v1-preview.hal+json";
const PATH: &str = "/api/meshobjects/meshintegrations";
const EMBEDDED_KEY: &str = "meshIntegrations";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub api_version: String,
    pub kind: String,
    pub metadata: IntegrationMetadata,
    pub spec: IntegrationSpec,
    #[serde(default)]
    pub status: IntegrationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationMetadata {
    pub uuid: String,
    pub owned_by_workspace: String,
    #[serde(default)]
    pub created_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSpec {
    pub display_name: String,
    pub config: IntegrationConfig,
}

/// Configuration of an integration
///
/// The settings depend on the integration type (`github`, `gitlab`, ...)
/// and are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IntegrationConfig {
    #[serde(rename = "type")]
    pub config_type: String,
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    #[serde(default)]
    pub is_built_in: bool,
}

impl MeshStackClient {
    pub async fn list_integrations(&self) -> Result<Vec<Integration>, ClientError> {
        self.list(PATH, MEDIA_TYPE, EMBEDDED_KEY, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn integration_settings_are_kept_verbatim() {
        let integration: Integration = serde_json::from_value(json!({
            "apiVersion": "v1-preview",
            "kind": "meshIntegration",
            "metadata": {"uuid": "int-1", "ownedByWorkspace": "platform"},
            "spec": {
                "displayName": "GitHub",
                "config": {
                    "type": "github",
                    "github": {"owner": "meshcloud", "baseUrl": "https://github.com"}
                }
            },
            "status": {"isBuiltIn": false}
        }))
        .unwrap();

        assert_eq!(integration.spec.config.config_type, "github");
        assert_eq!(
            integration.spec.config.settings["github"]["owner"],
            json!("meshcloud")
        );
        assert!(!integration.status.is_built_in);
    }
}
