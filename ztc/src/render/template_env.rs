// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Template Environment (C5)
//!
//! A single `handlebars::Handlebars` registry shared for the duration of one
//! render. Each adapter's templates are registered under a name prefixed
//! with the adapter's own name (`<adapter>::<template>`), so an adapter may
//! reference a peer's template explicitly by namespace but never
//! accidentally collides with one. Templates render against plain
//! `serde_json::Value` contexts built from the context snapshot; the
//! environment itself performs no I/O beyond the one-time `register_template_string`
//! call at setup.

use handlebars::Handlebars;
use serde_json::Value;
use ztc_domain::ZtcError;

pub struct TemplateEnvironment<'reg> {
    handlebars: Handlebars<'reg>,
}

impl<'reg> TemplateEnvironment<'reg> {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        Self { handlebars }
    }

    /// Registers `template` under `<adapter_name>::<template_name>`.
    pub fn register(&mut self, adapter_name: &str, template_name: &str, template: &str) -> Result<(), ZtcError> {
        let qualified = qualify(adapter_name, template_name);
        self.handlebars
            .register_template_string(&qualified, template)
            .map_err(|e| ZtcError::RenderFailure {
                adapter: adapter_name.to_string(),
                reason: format!("template {template_name} failed to register: {e}"),
            })
    }

    /// Renders `<adapter_name>::<template_name>` against `context`.
    pub fn render(&self, adapter_name: &str, template_name: &str, context: &Value) -> Result<String, ZtcError> {
        let qualified = qualify(adapter_name, template_name);
        self.handlebars
            .render(&qualified, context)
            .map_err(|e| ZtcError::RenderFailure {
                adapter: adapter_name.to_string(),
                reason: format!("template {template_name} failed to render: {e}"),
            })
    }
}

impl<'reg> Default for TemplateEnvironment<'reg> {
    fn default() -> Self {
        Self::new()
    }
}

fn qualify(adapter_name: &str, template_name: &str) -> String {
    format!("{adapter_name}::{template_name}")
}
