//! Apishim Core - request-time pipeline of the V2-to-V1 adapter
//!
//! For one inbound V2 request the pipeline runs in three stages:
//!
//! 1. [`V1Orchestrator`] maps the merged V2 parameters onto the document's V1
//!    calls and executes them in order, failing fast.
//! 2. [`FieldTransformer`] computes each field from the collected V1
//!    responses: stub, sandboxed template expression, or dot-path copy.
//! 3. [`ResponseBuilder`] deposits every field into a nested V2 document.
//!
//! ```rust,no_run
//! use apishim_core::{OrchestratorConfig, ResponseBuilder, V1Orchestrator, V2Params};
//! # async fn run(config: apishim_schemas::MappingConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = V1Orchestrator::new(OrchestratorConfig::new("http://legacy:8001"))?;
//! let mut params = V2Params::new();
//! params.insert("policyId".into(), "POL123".into());
//!
//! let responses = orchestrator.orchestrate(&config, &params).await?;
//! let document = ResponseBuilder::new().build(&config, &responses)?;
//! println!("{}", document);
//! # Ok(())
//! # }
//! ```
//!
//! Copyright (c) 2025 Apishim Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod orchestrator;
pub mod redaction;
pub mod response;
pub mod transform;
pub mod types;

pub use error::{Error, Result};
pub use orchestrator::{OrchestratorConfig, V1Orchestrator, V1OrchestratorError};
pub use response::{set_nested_value, ResponseBuilder, ResponseBuilderError};
pub use transform::{
    coerce, get_nested_value, CoercedValue, FieldTransformer, TransformationError,
};
pub use types::{RequestId, V1Responses, V2Params};
