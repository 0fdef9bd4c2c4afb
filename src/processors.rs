//! Context processors: named callables that contribute template variables.
//!
//! Processors are registered explicitly under dotted names and selected, in
//! order, by the `CONTEXT_PROCESSORS` setting.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::conf::Settings;
use crate::error::AppError;

pub const REQUEST_PROCESSOR: &str = "kay.context_processors.request";
pub const MEDIA_URL_PROCESSOR: &str = "kay.context_processors.media_url";

/// Template variables produced by a processor.
pub type Context = Map<String, Value>;

pub type Processor<R> = Arc<dyn Fn(&R) -> Context + Send + Sync>;

pub struct ProcessorRegistry<R> {
    entries: HashMap<String, Processor<R>>,
}

impl<R> Default for ProcessorRegistry<R> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<R> ProcessorRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: &str, processor: F) -> Self
    where
        F: Fn(&R) -> Context + Send + Sync + 'static,
    {
        self.entries.insert(name.to_string(), Arc::new(processor));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Build a chain from `names`, keeping their order.
    pub fn resolve(&self, names: &[String]) -> Result<ProcessorChain<R>, AppError> {
        let processors = names
            .iter()
            .map(|name| {
                self.entries
                    .get(name)
                    .map(|p| (name.clone(), Arc::clone(p)))
                    .ok_or_else(|| {
                        AppError::ImproperlyConfigured(format!(
                            "context processor '{name}' is not registered"
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProcessorChain { processors })
    }

    /// The chain named by `CONTEXT_PROCESSORS`.
    pub fn standard(&self, settings: &Settings) -> Result<ProcessorChain<R>, AppError> {
        self.resolve(&settings.context_processors()?)
    }
}

impl<R: Serialize + 'static> ProcessorRegistry<R> {
    /// Registry pre-loaded with the `request` and `media_url` processors.
    /// URL helpers belong to the routing layer, which registers its own.
    pub fn with_builtins(settings: &Settings) -> Self {
        let mut media = Context::new();
        for (key, setting) in [("media_url", "MEDIA_URL"), ("internal_media_url", "INTERNAL_MEDIA_URL")] {
            if let Ok(url) = settings.get_str(setting) {
                media.insert(key.to_string(), Value::String(url.to_string()));
            }
        }

        Self::new()
            .register(REQUEST_PROCESSOR, |request: &R| {
                let value = serde_json::to_value(request).unwrap_or_else(|e| {
                    warn!(error = %e, "request did not serialize; templates see null");
                    Value::Null
                });
                let mut ctx = Context::new();
                ctx.insert("request".to_string(), value);
                ctx
            })
            .register(MEDIA_URL_PROCESSOR, move |_: &R| media.clone())
    }
}

/// An ordered, resolved list of processors.
pub struct ProcessorChain<R> {
    processors: Vec<(String, Processor<R>)>,
}

impl<R> ProcessorChain<R> {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.processors.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Merge every processor's output into `context`; later processors win.
    pub fn apply(&self, request: &R, context: &mut Context) {
        for (_, processor) in &self.processors {
            context.extend(processor(request));
        }
    }
}

impl<R> Clone for ProcessorChain<R> {
    fn clone(&self) -> Self {
        Self { processors: self.processors.clone() }
    }
}
