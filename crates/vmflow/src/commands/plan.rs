use colored::Colorize;
use vmflow_cloud::{Plan, ResourceNames, Step};
use vmflow_config::RunOptions;

pub fn handle(options: &RunOptions) -> anyhow::Result<()> {
    let names = ResourceNames::now(&options.name_prefix, options.suffix_format);
    let plan = Plan::for_run(options);

    println!("{}", "Run plan".bold());
    println!("Resource group: {}", options.resource_group.cyan());
    println!("Location:       {}", options.location.cyan());
    println!("Cleanup:        {}", options.cleanup.to_string().cyan());
    println!();

    for (index, step) in plan.steps.iter().enumerate() {
        let target = match step {
            Step::Create(kind) | Step::Delete(kind) => names.for_kind(*kind).to_string(),
            Step::EnsureResourceGroup => options.resource_group.clone(),
            Step::ListVirtualMachines => String::new(),
        };
        let label = match step {
            Step::Create(_) | Step::EnsureResourceGroup => step.to_string().green(),
            Step::Delete(_) => step.to_string().red(),
            Step::ListVirtualMachines => step.to_string().normal(),
        };
        println!("  {:>2}. {} {}", index + 1, label, target.cyan());
    }

    println!();
    println!("{}", plan.summary());

    if options.virtual_machine.admin_credential.is_none() {
        println!();
        println!(
            "{}",
            "⚠ No VM admin credential: set VMFLOW_ADMIN_PASSWORD or virtual_machine.ssh_public_key_path"
                .yellow()
        );
    }

    Ok(())
}
