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

use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::{info, warn};

use tf_provider::{AttributePath, Diagnostics, Resource};
use tf_provider::schema::Schema;
use tf_provider::value::ValueEmpty;

use crate::client::binding::BindingKind;
use crate::client::SharedClient;
use crate::utils::report;

use super::state::{schema, State};

/// Role binding resource, one per binding kind
#[derive(Debug)]
pub struct BindingResource<K> {
    client: SharedClient,
    kind: PhantomData<K>,
}

impl<K: BindingKind> BindingResource<K> {
    pub fn new(client: SharedClient) -> Self {
        Self {
            client,
            kind: PhantomData,
        }
    }
}

/// Bindings cannot be updated: every changed attribute triggers a replacement
pub(crate) fn changed_attributes(prior: &State, proposed: &State) -> Vec<AttributePath> {
    let mut changed = Vec::new();
    if prior.metadata != proposed.metadata {
        changed.push(AttributePath::new("metadata"));
    }
    if prior.role_ref != proposed.role_ref {
        changed.push(AttributePath::new("role_ref"));
    }
    if prior.target_ref != proposed.target_ref {
        changed.push(AttributePath::new("target_ref"));
    }
    if prior.subject != proposed.subject {
        changed.push(AttributePath::new("subject"));
    }
    changed
}

#[async_trait]
impl<K: BindingKind> Resource for BindingResource<K> {
    type State<'a> = State<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(schema::<K>())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        config.validate::<K>(diags);
        if diags.errors.is_empty() {
            Some(())
        } else {
            None
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let Some(name) = state.name() else {
            diags.root_error_short("Binding state has no name");
            return None;
        };
        match client.read_binding::<K>(name).await {
            Ok(Some(binding)) => Some((State::from_remote(&binding), private_state)),
            Ok(None) => {
                warn!(kind = K::KIND, name, "binding was deleted outside of terraform");
                None
            }
            Err(err) => {
                report(diags, "Failed to read binding", err);
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
        Some((proposed_state, Default::default()))
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
        let trigger_replace = changed_attributes(&prior_state, &proposed_state);
        Some((proposed_state, prior_private_state, trigger_replace))
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
        let binding = planned_state.to_remote::<K>(diags)?;
        match client.create_binding::<K>(&binding).await {
            Ok(binding) => {
                info!(kind = K::KIND, name = %binding.metadata.name, "binding created");
                Some((State::from_remote(&binding), planned_private_state))
            }
            Err(err) => {
                report(diags, "Failed to create binding", err);
                None
            }
        }
    }

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
        let Some(name) = prior_state.name() else {
            diags.root_error_short("Binding state has no name");
            return None;
        };
        match client.delete_binding::<K>(name).await {
            Ok(()) => {
                info!(kind = K::KIND, name, "binding deleted");
                Some(())
            }
            Err(err) => {
                report(diags, "Failed to delete binding", err);
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
        match client.read_binding::<K>(&id).await {
            Ok(Some(binding)) => Some((State::from_remote(&binding), Default::default())),
            Ok(None) => {
                diags.root_error(
                    "Binding not found",
                    format!("No {} is named `{id}`", K::KIND),
                );
                None
            }
            Err(err) => {
                report(diags, "Failed to import binding", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::binding::{Binding, ProjectGroupBinding, TargetRef};

    use super::*;

    fn binding(role: &str) -> State<'static> {
        State::from_remote(&Binding::new::<ProjectGroupBinding>(
            "dev-admins".to_owned(),
            role.to_owned(),
            TargetRef {
                name: "dev".to_owned(),
                owned_by_workspace: Some("platform".to_owned()),
            },
            "admins".to_owned(),
        ))
    }

    #[test]
    fn role_changes_replace_the_binding() {
        assert_eq!(
            changed_attributes(&binding("Project Admin"), &binding("Project Reader")),
            [AttributePath::new("role_ref")]
        );
        assert!(changed_attributes(&binding("Project Admin"), &binding("Project Admin")).is_empty());
    }
}
