//! VMFlow provisioning core
//!
//! Provider-agnostic pieces of a provisioning run:
//!
//! - **model**: remote resource representations
//! - **api**: client traits a provider implements (one sub-client per resource type)
//! - **operations**: one logged remote call per function
//! - **naming**: timestamp-suffixed resource names
//! - **plan** / **driver**: the ordered step list and the code that walks it
//!
//! ```text
//! list VMs -> create VNet -> create public IP -> create NIC -> create VM
//!          -> list VMs -> delete VM -> delete NIC -> delete public IP -> delete VNet
//! ```

pub mod api;
pub mod driver;
pub mod error;
pub mod model;
pub mod naming;
pub mod operations;
pub mod params;
pub mod plan;

// Re-exports
pub use api::{ComputeApi, ResourceApi, ResourceClients, ResourceGroupApi};
pub use driver::{Orchestrator, Provisioned};
pub use error::{CloudError, Result};
pub use model::{PowerAction, Resource, ResourceKind};
pub use naming::{ResourceNames, timestamp_suffix};
pub use plan::{ActionType, Plan, PlanSummary, RunReport, Step, StepFailure, StepRecord};
