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
use tokio_util::sync::CancellationToken;

use tf_provider::{AttributePath, Diagnostics, Resource};
use tf_provider::schema::Schema;
use tf_provider::value::{Value, ValueEmpty};

use crate::client::SharedClient;
use crate::poller::Poller;
use crate::utils::WithSchema;

use super::lifecycle::{self, WAIT_FOR_COMPLETION};
use super::state::ResourceState;

#[derive(Debug, Clone)]
pub struct BuildingBlockResource {
    client: SharedClient,
    poller: Poller,
    cancel: CancellationToken,
}

impl BuildingBlockResource {
    pub fn new(client: SharedClient, poller: Poller, cancel: CancellationToken) -> Self {
        Self {
            client,
            poller,
            cancel,
        }
    }
}

impl<'a> ResourceState<'a> {
    /// Mark every value computed by meshStack as unknown
    fn forget_computed(&mut self) {
        self.id = Value::Unknown;
        self.metadata = Value::Unknown;
        self.status = Value::Unknown;
        if let Value::Value(spec) = &mut self.spec {
            spec.combined_inputs = Value::Unknown;
        }
    }
}

/// Plan a change: building blocks cannot be updated, any change of the spec replaces them
pub(crate) fn plan_change<'a>(
    prior: &ResourceState<'a>,
    proposed: ResourceState<'a>,
) -> (ResourceState<'a>, Vec<AttributePath>) {
    let mut state = proposed;
    if state.wait_for_completion.is_null() {
        state.wait_for_completion = Value::Value(WAIT_FOR_COMPLETION);
    }

    let replaced = match (&prior.spec, &state.spec) {
        (Value::Value(prior_spec), Value::Value(spec)) => {
            prior_spec.configured() != spec.configured()
        }
        _ => true,
    };
    if replaced {
        state.forget_computed();
        return (state, vec![AttributePath::new("spec")]);
    }

    state.id = prior.id.clone();
    state.metadata = prior.metadata.clone();
    state.status = prior.status.clone();
    if let (Value::Value(spec), Value::Value(prior_spec)) = (&mut state.spec, &prior.spec) {
        spec.combined_inputs = prior_spec.combined_inputs.clone();
    }
    (state, vec![])
}

#[async_trait]
impl Resource for BuildingBlockResource {
    type State<'a> = ResourceState<'a>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ResourceState::schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        if let Value::Value(spec) = &config.spec {
            spec.validate(diags, AttributePath::new("spec"));
        }

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
        let state = lifecycle::read(client.as_ref(), diags, &state).await?;
        Some((state, private_state))
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let mut state = proposed_state;
        if state.wait_for_completion.is_null() {
            state.wait_for_completion = Value::Value(WAIT_FOR_COMPLETION);
        }
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
        let state = lifecycle::create(
            client.as_ref(),
            &self.poller,
            &self.cancel,
            diags,
            &planned_state,
        )
        .await?;
        Some((state, planned_private_state))
    }

    /// Only `wait_for_completion` can change in place, and it is not sent to meshStack
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
        lifecycle::destroy(
            client.as_ref(),
            &self.poller,
            &self.cancel,
            diags,
            &prior_state,
        )
        .await
    }

    async fn import<'a>(
        &self,
        diags: &mut Diagnostics,
        id: String,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let client = self.client.get(diags)?;
        let state = lifecycle::import(client.as_ref(), diags, &id).await?;
        Some((state, Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use crate::building_block::convert::tests::configured_spec;
    use crate::utils::string_value;

    use super::*;

    fn prior() -> ResourceState<'static> {
        let mut spec = configured_spec();
        spec.combined_inputs = Value::Value(Default::default());
        ResourceState {
            id: string_value("bb-1"),
            wait_for_completion: Value::Value(true),
            metadata: Value::Value(Default::default()),
            spec: Value::Value(spec),
            status: Value::Value(Default::default()),
        }
    }

    #[test]
    fn unchanged_specs_keep_computed_values() {
        let mut proposed = prior();
        proposed.wait_for_completion = Value::Value(false);

        let (state, trigger_replace) = plan_change(&prior(), proposed);

        assert!(trigger_replace.is_empty());
        assert_eq!(state.id, string_value("bb-1"));
        assert_eq!(state.wait_for_completion, Value::Value(false));
    }

    #[test]
    fn spec_changes_replace_the_building_block() {
        let mut proposed = prior();
        if let Value::Value(spec) = &mut proposed.spec {
            spec.display_name = string_value("renamed");
        }

        let (state, trigger_replace) = plan_change(&prior(), proposed);

        assert_eq!(trigger_replace, [AttributePath::new("spec")]);
        assert!(state.id.is_unknown());
        assert!(state.status.is_unknown());
    }

    #[test]
    fn combined_inputs_do_not_trigger_replacement() {
        let mut proposed = prior();
        if let Value::Value(spec) = &mut proposed.spec {
            spec.combined_inputs = Value::Unknown;
        }

        let (state, trigger_replace) = plan_change(&prior(), proposed);

        assert!(trigger_replace.is_empty());
        assert_eq!(
            state.spec.as_ref_option().unwrap().combined_inputs,
            Value::Value(Default::default())
        );
    }
}
