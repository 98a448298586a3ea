use crate::VmCommands;
use colored::Colorize;
use vmflow_cloud::model::VirtualMachine;
use vmflow_cloud::{PowerAction, Resource, ResourceClients, operations};
use vmflow_config::RunOptions;

pub async fn handle(
    clients: &dyn ResourceClients,
    options: &RunOptions,
    command: VmCommands,
) -> anyhow::Result<()> {
    let rg = options.resource_group.as_str();

    let (name, action) = match command {
        VmCommands::Get { name } => {
            let vm = operations::get(clients.virtual_machines(), rg, &name).await?;
            print_vm(&vm);
            return Ok(());
        }
        VmCommands::Delete { name } => {
            operations::delete(clients.virtual_machines(), rg, &name).await?;
            println!("{}", format!("✓ Deleted virtual machine {}", name).green());
            return Ok(());
        }
        VmCommands::Start { name } => (name, PowerAction::Start),
        VmCommands::Stop { name } => (name, PowerAction::PowerOff),
        VmCommands::Restart { name } => (name, PowerAction::Restart),
        VmCommands::Deallocate { name } => (name, PowerAction::Deallocate),
    };

    operations::power_action(clients.compute(), rg, &name, action).await?;
    println!("{}", format!("✓ {} finished for {}", action, name).green());
    Ok(())
}

fn print_vm(vm: &VirtualMachine) {
    println!("{}", vm.name().unwrap_or("-").bold());
    println!("  ID:       {}", vm.id().unwrap_or("-").dimmed());
    println!("  Location: {}", vm.location().unwrap_or("-"));
    println!("  Size:     {}", vm.vm_size().unwrap_or("-"));
    println!("  State:    {}", vm.provisioning_state().unwrap_or("-"));
    for nic in vm.network_interface_ids() {
        println!("  NIC:      {}", nic.dimmed());
    }
}
