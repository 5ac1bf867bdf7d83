//! Topologies command implementation.

use console::style;

const TOPOLOGIES: [(&str, &str); 6] = [
    ("lnn:N", "linear chain of N qubits"),
    ("ring:N", "chain of N qubits closed into a ring"),
    ("grid:RxC", "R by C grid, row-major"),
    ("tenerife", "5-qubit IBM Tenerife"),
    ("full:N", "all-to-all coupling of N qubits"),
    ("edges:<file.json>", "JSON array of [a, b] couplers"),
];

/// Execute the topologies command.
pub fn execute() {
    println!("{} Available topologies:\n", style("veriq").cyan().bold());
    for (name, about) in TOPOLOGIES {
        println!("  {:<20} {}", style(name).bold(), about);
    }
}
