use colored::Colorize;
use vmflow_cloud::{Resource, ResourceClients, operations};

fn print_table<R: Resource>(resources: &[R]) {
    println!();
    println!("{}", format!("{} ({})", R::KIND, resources.len()).bold());
    if resources.is_empty() {
        println!("{}", "  none".dimmed());
        return;
    }

    println!(
        "{}",
        format!("  {:<32} {:<16} {:<12}", "NAME", "LOCATION", "STATE").bold()
    );
    for resource in resources {
        let state = resource.provisioning_state().unwrap_or("-");
        let state = if state.eq_ignore_ascii_case("succeeded") {
            state.green()
        } else {
            state.yellow()
        };
        println!(
            "  {:<32} {:<16} {}",
            resource.name().unwrap_or("-"),
            resource.location().unwrap_or("-"),
            state
        );
    }
}

pub async fn handle(clients: &dyn ResourceClients, all: bool) -> anyhow::Result<()> {
    println!("{}", "Listing resources...".blue());

    print_table(&operations::list(clients.virtual_machines()).await?);

    if all {
        print_table(&operations::list(clients.virtual_networks()).await?);
        print_table(&operations::list(clients.public_ip_addresses()).await?);
        print_table(&operations::list(clients.network_interfaces()).await?);
        print_table(&operations::list(clients.storage_accounts()).await?);
    }

    Ok(())
}
