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

use async_trait::async_trait;

use tf_provider::{AttributePath, DataSource, Diagnostics};
use tf_provider::schema::Schema;
use tf_provider::value::ValueEmpty;

use crate::client::SharedClient;
use crate::utils::{report, required_str, required_value, WithSchema};

use super::state::{DataSourceSchema, State};

#[derive(Debug, Clone)]
pub struct TenantDataSource {
    client: SharedClient,
}

impl TenantDataSource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for TenantDataSource {
    type State<'a> = State<'a>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(DataSourceSchema::schema())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let client = self.client.get(diags)?;
        let metadata = required_value(diags, &config.metadata, AttributePath::new("metadata"))?;
        let uuid_path = AttributePath::new("metadata").attribute("uuid");
        let uuid = required_str(diags, &metadata.uuid, uuid_path.clone())?;

        match client.read_tenant(uuid).await {
            Ok(Some(tenant)) => Some(State::from_remote(&tenant)),
            Ok(None) => {
                diags.error(
                    "Tenant not found",
                    format!("No tenant has uuid `{uuid}`"),
                    uuid_path,
                );
                None
            }
            Err(err) => {
                report(diags, "Failed to read tenant", err);
                None
            }
        }
    }
}
