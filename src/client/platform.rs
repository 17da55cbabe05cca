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

pub const MEDIA_TYPE: &str = "application/vnd.meshcloud.api.meshplatform.v2-preview.hal+json";
const PATH: &str = "/api/meshobjects/meshplatforms";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub api_version: String,
    pub kind: String,
    pub metadata: PlatformMetadata,
    pub spec: PlatformSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlatformMetadata {
    pub uuid: String,
    pub name: String,
    pub owned_by_workspace: String,
    #[serde(default)]
    pub created_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSpec {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub support_url: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub location_ref: LocationRef,
    #[serde(default)]
    pub contributing_workspaces: Vec<String>,
    #[serde(default)]
    pub availability: Availability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LocationRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default)]
    pub restriction: String,
    #[serde(default)]
    pub publication_state: String,
    #[serde(default)]
    pub restricted_to_workspaces: Vec<String>,
}

impl MeshStackClient {
    pub async fn read_platform(&self, uuid: &str) -> Result<Option<Platform>, ClientError> {
        self.get(&format!("{PATH}/{uuid}"), MEDIA_TYPE).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn platforms_decode_with_partial_specs() {
        let platform: Platform = serde_json::from_value(json!({
            "apiVersion": "v2-preview",
            "kind": "meshPlatform",
            "metadata": {
                "uuid": "c0ffee",
                "name": "aws-eu",
                "ownedByWorkspace": "cloud-foundation"
            },
            "spec": {
                "displayName": "AWS Europe",
                "locationRef": {"name": "aws"},
                "availability": {
                    "restriction": "PUBLIC",
                    "publicationState": "PUBLISHED"
                },
                "config": {"type": "aws", "aws": {"region": "eu-central-1"}}
            }
        }))
        .unwrap();

        assert_eq!(platform.metadata.name, "aws-eu");
        assert_eq!(platform.spec.location_ref.name, "aws");
        assert_eq!(platform.spec.availability.publication_state, "PUBLISHED");
        assert!(platform.spec.contributing_workspaces.is_empty());
    }
}
