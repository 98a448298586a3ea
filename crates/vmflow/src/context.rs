//! Options and client construction shared by the commands

use crate::{CredentialSource, GlobalArgs};
use vmflow_azure::{
    ArmClient, AzureCliCredential, AzureClients, DefaultAzureCredential, TokenCredential,
    environment_credential,
};
use vmflow_config::RunOptions;

/// Settings file plus command-line overrides, resolved against the defaults
pub fn load_options(args: &GlobalArgs) -> anyhow::Result<RunOptions> {
    let mut settings = vmflow_config::load_or_default(args.config.as_deref())?;

    if let Some(resource_group) = &args.resource_group {
        settings.resource_group = Some(resource_group.clone());
    }
    if let Some(location) = &args.location {
        settings.location = Some(location.clone());
    }
    if let Some(cleanup) = args.cleanup {
        settings.cleanup = Some(cleanup);
    }
    if let Some(password) = &args.admin_password {
        settings.virtual_machine.admin_password = Some(password.clone());
    }

    Ok(settings.resolve()?)
}

pub async fn connect(
    args: &GlobalArgs,
    options: &RunOptions,
    subscription_id: &str,
) -> anyhow::Result<AzureClients> {
    let credential: Box<dyn TokenCredential> = match args.credential {
        CredentialSource::Default => Box::new(DefaultAzureCredential::new()),
        CredentialSource::Cli => Box::new(AzureCliCredential::new()),
        CredentialSource::Env => environment_credential()?,
    };

    let client = ArmClient::builder(subscription_id)
        .poll_interval(options.poll_interval)
        .connect(credential.as_ref())
        .await?;
    Ok(AzureClients::new(client))
}
