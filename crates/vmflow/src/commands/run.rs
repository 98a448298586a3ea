use crate::GlobalArgs;
use crate::context;
use colored::Colorize;
use vmflow_cloud::{Orchestrator, ResourceNames, RunReport};
use vmflow_config::RunOptions;

/// Full provisioning run.
///
/// Every failure is logged here and the command still exits 0; resources
/// created before the failing step are left in place.
pub async fn handle(
    args: &GlobalArgs,
    options: &RunOptions,
    subscription_id: &str,
) -> anyhow::Result<()> {
    if let Err(e) = execute(args, options, subscription_id).await {
        tracing::debug!("Run aborted: {:?}", e);
        eprintln!("{} {:#}", "✗ Run aborted:".red().bold(), e);
    }
    Ok(())
}

async fn execute(
    args: &GlobalArgs,
    options: &RunOptions,
    subscription_id: &str,
) -> anyhow::Result<()> {
    options.virtual_machine.require_admin_credential()?;
    let names = ResourceNames::now(&options.name_prefix, options.suffix_format);

    println!("{}", "Starting provisioning run...".blue());
    println!("Subscription:   {}", subscription_id.cyan());
    println!("Resource group: {}", options.resource_group.cyan());
    println!("Location:       {}", options.location.cyan());
    println!("Name suffix:    {}", names.suffix.cyan());
    println!("Cleanup:        {}", options.cleanup.to_string().cyan());
    println!();

    let clients = context::connect(args, options, subscription_id).await?;
    let orchestrator = Orchestrator::new(&clients, options, names)?;
    let report = orchestrator.run().await;

    print_report(&report);

    match report.failure {
        Some(failure) => Err(anyhow::Error::new(failure.error)
            .context(format!("step '{}' failed", failure.step))),
        None => Ok(()),
    }
}

fn print_report(report: &RunReport) {
    println!();
    for record in &report.completed {
        println!("  {} {}: {}", "✓".green(), record.step, record.message.dimmed());
    }
    if let Some(failure) = &report.failure {
        println!("  {} {}", "✗".red(), failure.step.to_string().red());
    }
    println!();

    let elapsed = report.duration_ms as f64 / 1000.0;
    if report.is_success() {
        println!(
            "{}",
            format!("✓ Run finished in {:.1}s", elapsed).green().bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "Run stopped after {} step(s) in {:.1}s",
                report.completed.len(),
                elapsed
            )
            .yellow()
        );
    }
}
