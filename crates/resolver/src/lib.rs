#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Asset list resolution for envmap
//!
//! A [`ResolutionPipeline`] walks an ordered chain of
//! [`ResolverStrategy`]s (remote module, local bundle, fixed fallback) and
//! stops at the first one that produces identifiers. Each source is tried at
//! most once per request, the result is never empty, and concurrent
//! requests share the pending resolution instead of starting their own.

mod pipeline;
mod strategy;

pub use pipeline::{PipelineBuilder, ResolutionPipeline};
pub use strategy::{
    FallbackStrategy, LocalBundleStrategy, RemoteModuleStrategy, ResolverStrategy,
    StrategyOutcome,
};
