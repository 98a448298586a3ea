use colored::Colorize;
use vmflow_cloud::{ResourceClients, operations};

pub async fn handle(clients: &dyn ResourceClients) -> anyhow::Result<()> {
    let ops = operations::list_operations(clients.compute()).await?;

    println!("{}", format!("Compute operations ({})", ops.len()).bold());
    for op in &ops {
        let description = op
            .display
            .as_ref()
            .and_then(|d| d.description.as_deref())
            .unwrap_or("");
        println!("  {}  {}", op.name.cyan(), description.dimmed());
    }

    Ok(())
}
