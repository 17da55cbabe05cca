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

//! Terraform and OpenTofu provider for meshStack
//!
//! The provider manages meshStack objects (workspaces, projects, tenants,
//! tag definitions, role bindings and building blocks) through the meshStack API.
//! Building blocks are the most involved: their inputs are typed values
//! ([`io_value`]) and their runs are awaited with a [`poller::Poller`].

pub mod binding;
pub mod building_block;
pub mod client;
pub mod config;
pub mod integration;
pub mod io_value;
pub mod platform;
pub mod poller;
pub mod project;
pub mod provider;
pub mod tag_definition;
pub mod tenant;
pub mod workspace;

mod utils;

pub use provider::MeshStackProvider;
