//! Azure provider for VMFlow
//!
//! Implements the `vmflow-cloud` client traits against the Azure Resource
//! Manager REST API.
//!
//! # Authentication
//!
//! - `AZURE_ACCESS_TOKEN`: a pre-acquired bearer token
//! - `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`: service principal
//! - `az login`: the Azure CLI's session
//!
//! [`DefaultAzureCredential`] tries them in that order.
//!
//! # Example
//!
//! ```ignore
//! use vmflow_azure::{ArmClient, AzureClients, DefaultAzureCredential};
//! use vmflow_cloud::{ResourceClients, operations};
//!
//! let credential = DefaultAzureCredential::new();
//! let client = ArmClient::builder(subscription_id).connect(&credential).await?;
//! let clients = AzureClients::new(client);
//!
//! let vms = operations::list(clients.virtual_machines()).await?;
//! ```

pub mod arm;
pub mod credential;
pub mod error;
mod poller;
pub mod resources;

pub use arm::{ArmClient, ArmClientBuilder};
pub use credential::{
    AccessToken, AzureCliCredential, ClientSecretCredential, DefaultAzureCredential,
    StaticTokenCredential, TokenCredential, environment_credential,
};
pub use error::{AzureError, Result};
pub use resources::{ArmCollection, AzureClients};
