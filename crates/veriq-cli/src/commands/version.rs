//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - verified optimization and mapping of quantum circuits",
        style("veriq").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  veriq-ir       Circuit intermediate representation");
    println!("  veriq-qasm     OpenQASM 2.0 interchange");
    println!("  veriq-engine   Verification engine boundary");
    println!("  veriq-route    Placement and routing");
    println!("  veriq-compile  Verified pass pipeline");
    println!("  veriq-cli      Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
