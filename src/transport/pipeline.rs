// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
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

//! Pre-send transformer pipeline.
//!
//! A [`Pipeline`] is an ordered list of [`Transformer`] steps that rewrite the
//! outgoing body and headers. It is assembled once with [`PipelineBuilder`] and
//! replayed on a fresh [`TransformContext`] for every connection attempt.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, trace};

use crate::core::errors::RpcError;

/// Scratch space for one connection attempt.
#[derive(Debug, Clone)]
pub struct TransformContext {
    body: Option<String>,
    headers: HashMap<String, String>,
    skip_next: bool,
    should_continue: bool,
}

impl TransformContext {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            headers: HashMap::new(),
            skip_next: false,
            should_continue: true,
        }
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    pub fn clear_body(&mut self) {
        self.body = None;
    }

    /// Headers set so far, keyed by lowercase name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Adds a header, overwriting any previous value for `name`. Names are
    /// compared case-insensitively and stored lowercase, as HTTP sends them.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let mut name = name.into();
        name.make_ascii_lowercase();
        self.headers.insert(name, value.into());
    }

    /// Skips the step right after the current one, and only that step.
    pub fn skip_next(&mut self) {
        self.skip_next = true;
    }

    /// Stops the pipeline after the current step. The request is still sent.
    pub fn stop(&mut self) {
        self.should_continue = false;
    }

    pub fn should_continue(&self) -> bool {
        self.should_continue
    }

    /// Consumes the context, yielding the final body (if any) and headers.
    pub fn into_parts(self) -> (Option<String>, HashMap<String, String>) {
        (self.body, self.headers)
    }

    fn map_body(&mut self, f: impl FnOnce(&str) -> String) {
        if let Some(body) = self.body.take() {
            self.body = Some(f(&body));
        }
    }
}

/// One pipeline step.
pub trait Transformer: Send + Sync {
    /// Name reported in logs and in [`RpcError::Transformer`].
    fn name(&self) -> &str {
        "custom"
    }

    fn transform(&self, ctx: &mut TransformContext) -> Result<()>;
}

impl<F> Transformer for F
where
    F: Fn(&mut TransformContext) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        "closure"
    }

    fn transform(&self, ctx: &mut TransformContext) -> Result<()> {
        self(ctx)
    }
}

/// Form-urlencodes the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlEncode;

impl Transformer for UrlEncode {
    fn name(&self) -> &str {
        "url_encode"
    }

    fn transform(&self, ctx: &mut TransformContext) -> Result<()> {
        ctx.map_body(|body| url::form_urlencoded::byte_serialize(body.as_bytes()).collect());
        Ok(())
    }
}

/// Trims leading and trailing whitespace from the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trim;

impl Transformer for Trim {
    fn name(&self) -> &str {
        "trim"
    }

    fn transform(&self, ctx: &mut TransformContext) -> Result<()> {
        ctx.map_body(|body| body.trim().to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Prepend(pub String);

impl Transformer for Prepend {
    fn name(&self) -> &str {
        "prepend"
    }

    fn transform(&self, ctx: &mut TransformContext) -> Result<()> {
        ctx.map_body(|body| format!("{}{}", self.0, body));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Append(pub String);

impl Transformer for Append {
    fn name(&self) -> &str {
        "append"
    }

    fn transform(&self, ctx: &mut TransformContext) -> Result<()> {
        ctx.map_body(|body| format!("{}{}", body, self.0));
        Ok(())
    }
}

/// Stops the pipeline unless the precomputed condition holds.
#[derive(Debug, Clone, Copy)]
pub struct ContinueIf(pub bool);

impl Transformer for ContinueIf {
    fn name(&self) -> &str {
        "continue_if"
    }

    fn transform(&self, ctx: &mut TransformContext) -> Result<()> {
        if !self.0 {
            ctx.stop();
        }
        Ok(())
    }
}

/// Skips the following step when the precomputed condition holds.
#[derive(Debug, Clone, Copy)]
pub struct SkipNextIf(pub bool);

impl Transformer for SkipNextIf {
    fn name(&self) -> &str {
        "skip_next_if"
    }

    fn transform(&self, ctx: &mut TransformContext) -> Result<()> {
        if self.0 {
            ctx.skip_next();
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SetHeader {
    pub name: String,
    pub value: String,
}

impl Transformer for SetHeader {
    fn name(&self) -> &str {
        "set_header"
    }

    fn transform(&self, ctx: &mut TransformContext) -> Result<()> {
        ctx.set_header(self.name.clone(), self.value.clone());
        Ok(())
    }
}

/// An immutable, cheaply clonable chain of transformers.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn Transformer>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in registration order over a fresh context seeded with `body`.
    pub fn run(&self, body: impl Into<String>) -> Result<TransformContext, RpcError> {
        let mut ctx = TransformContext::new(body);

        for (index, step) in self.steps.iter().enumerate() {
            if !ctx.should_continue {
                debug!(index, "Pipeline stopped early");
                break;
            }
            if ctx.skip_next {
                ctx.skip_next = false;
                trace!(index, step = step.name(), "Skipping transformer");
                continue;
            }

            trace!(index, step = step.name(), "Applying transformer");
            step.transform(&mut ctx)
                .map_err(|source| RpcError::Transformer {
                    step: step.name().to_string(),
                    source,
                })?;
        }

        Ok(ctx)
    }
}

#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<Arc<dyn Transformer>>,
}

impl PipelineBuilder {
    pub fn step(mut self, step: impl Transformer + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn url_encode(self) -> Self {
        self.step(UrlEncode)
    }

    pub fn trim(self) -> Self {
        self.step(Trim)
    }

    pub fn prepend(self, prefix: impl Into<String>) -> Self {
        self.step(Prepend(prefix.into()))
    }

    pub fn append(self, suffix: impl Into<String>) -> Self {
        self.step(Append(suffix.into()))
    }

    pub fn continue_if(self, condition: bool) -> Self {
        self.step(ContinueIf(condition))
    }

    pub fn skip_next_if(self, condition: bool) -> Self {
        self.step(SkipNextIf(condition))
    }

    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.step(SetHeader {
            name: name.into(),
            value: value.into(),
        })
    }

    pub fn build(self) -> Pipeline {
        Pipeline { steps: self.steps }
    }
}
