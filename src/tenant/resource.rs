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
use tracing::{info, warn};

use tf_provider::{AttributePath, Diagnostics, Resource};
use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};

use crate::client::SharedClient;
use crate::utils::{report, WithSchema};

use super::state::{ResourceSchema, State};

#[derive(Debug, Clone)]
pub struct TenantResource {
    client: SharedClient,
}

impl TenantResource {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

impl<'a> State<'a> {
    fn forget_computed(&mut self) {
        if let Value::Value(metadata) = &mut self.metadata {
            metadata.uuid = Value::Unknown;
            metadata.created_on = Value::Unknown;
            metadata.marked_for_deletion_on = Value::Unknown;
            metadata.deleted_on = Value::Unknown;
        }
        if let Value::Value(spec) = &mut self.spec {
            if spec.local_id.is_null() {
                spec.local_id = Value::Unknown;
            }
            if spec.quotas.is_null() {
                spec.quotas = Value::Unknown;
            }
        }
        self.status = Value::Unknown;
    }
}

/// Tenants cannot be updated: changing the owners or the spec replaces them
pub(crate) fn plan_change<'a>(
    prior: &State<'a>,
    proposed: State<'a>,
) -> (State<'a>, Vec<AttributePath>) {
    let mut state = proposed;
    let mut trigger_replace = Vec::new();

    match (prior.metadata.as_ref_option(), state.metadata.as_ref_option()) {
        (Some(prior_metadata), Some(metadata)) => {
            if prior_metadata.owned_by_workspace != metadata.owned_by_workspace {
                trigger_replace
                    .push(AttributePath::new("metadata").attribute("owned_by_workspace"));
            }
            if prior_metadata.owned_by_project != metadata.owned_by_project {
                trigger_replace.push(AttributePath::new("metadata").attribute("owned_by_project"));
            }
        }
        _ => trigger_replace.push(AttributePath::new("metadata")),
    }
    if prior.spec != state.spec {
        trigger_replace.push(AttributePath::new("spec"));
    }

    if trigger_replace.is_empty() {
        state.metadata = prior.metadata.clone();
        state.status = prior.status.clone();
    } else {
        state.forget_computed();
    }
    (state, trigger_replace)
}

#[async_trait]
impl Resource for TenantResource {
    type State<'a> = State<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ResourceSchema::schema())
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::State<'a>) -> Option<()> {
        Some(())
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let Some(uuid) = state.uuid() else {
            diags.root_error_short("Tenant state has no uuid");
            return None;
        };
        match client.read_tenant(uuid).await {
            Ok(Some(tenant)) => Some((State::from_remote(&tenant), private_state)),
            Ok(None) => {
                warn!(uuid, "tenant was deleted outside of terraform");
                None
            }
            Err(err) => {
                report(diags, "Failed to read tenant", err);
                None
            }
        }
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        state.forget_computed();
        Some((state, Default::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        let (state, trigger_replace) = plan_change(&prior_state, proposed_state);
        Some((state, prior_private_state, trigger_replace))
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::PrivateState<'a>> {
        Some(prior_private_state)
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let request = planned_state.to_remote(diags)?;
        match client
            .create_tenant(&request.workspace, &request.project, &request.spec)
            .await
        {
            Ok(tenant) => {
                info!(uuid = %tenant.metadata.uuid, "tenant created");
                Some((State::from_remote(&tenant), planned_private_state))
            }
            Err(err) => {
                report(diags, "Failed to create tenant", err);
                None
            }
        }
    }

    /// Nothing can change in place
    async fn update<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        Some((planned_state, planned_private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let client = self.client.get(diags)?;
        let Some(uuid) = prior_state.uuid() else {
            diags.root_error_short("Tenant state has no uuid");
            return None;
        };
        match client.delete_tenant(uuid).await {
            Ok(()) => {
                info!(uuid, "tenant deletion requested");
                Some(())
            }
            Err(err) => {
                report(diags, "Failed to delete tenant", err);
                None
            }
        }
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        match client.read_tenant(&id).await {
            Ok(Some(tenant)) => Some((State::from_remote(&tenant), Default::default())),
            Ok(None) => {
                diags.root_error("Tenant not found", format!("No tenant has uuid `{id}`"));
                None
            }
            Err(err) => {
                report(diags, "Failed to import tenant", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tenant::{Quota, Tenant, TenantMetadata, TenantSpec};
    use crate::utils::string_value;

    use super::*;

    fn tenant() -> Tenant {
        Tenant {
            api_version: "v4-preview".to_owned(),
            kind: "meshTenant".to_owned(),
            metadata: TenantMetadata {
                uuid: "t-1".to_owned(),
                owned_by_workspace: "platform".to_owned(),
                owned_by_project: "dev".to_owned(),
                created_on: Some("2024-01-01T00:00:00Z".to_owned()),
                ..Default::default()
            },
            spec: TenantSpec {
                platform_identifier: "aws.eu-west-1".to_owned(),
                local_id: Some("123456789012".to_owned()),
                landing_zone_identifier: None,
                quotas: vec![Quota {
                    key: "vcpu".to_owned(),
                    value: 8,
                }],
            },
            status: Default::default(),
        }
    }

    #[test]
    fn unchanged_tenants_keep_their_state() {
        let prior = State::from_remote(&tenant());

        let (state, trigger_replace) = plan_change(&prior, prior.clone());

        assert!(trigger_replace.is_empty());
        assert_eq!(state, prior);
    }

    #[test]
    fn landing_zone_changes_replace_the_tenant() {
        let prior = State::from_remote(&tenant());
        let mut proposed = prior.clone();
        if let Value::Value(spec) = &mut proposed.spec {
            spec.landing_zone_identifier = string_value("sandbox");
        }

        let (state, trigger_replace) = plan_change(&prior, proposed);

        assert_eq!(trigger_replace, [AttributePath::new("spec")]);
        assert!(state.status.is_unknown());
        assert_eq!(state.uuid(), None);
    }

    #[test]
    fn moving_a_tenant_replaces_it() {
        let prior = State::from_remote(&tenant());
        let mut proposed = prior.clone();
        if let Value::Value(metadata) = &mut proposed.metadata {
            metadata.owned_by_project = string_value("prod");
        }

        let (_, trigger_replace) = plan_change(&prior, proposed);

        assert_eq!(
            trigger_replace,
            [AttributePath::new("metadata").attribute("owned_by_project")]
        );
    }
}
