use std::collections::HashMap;
use std::fs;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};

use circeq_check::{check, Verdict};
use circeq_circuit::Circuit;
use circeq_formula::SymbolTable;
use circeq_solver::VarisatSolver;

mod logging;

#[derive(Parser)]
#[command(name = "circeq", version, about = "A combinational equivalence checker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a circuit on a concrete input assignment.
    Simulate {
        file: String,
        /// Comma-separated `name=0|1` pairs; signals not listed default to false.
        #[arg(long, value_delimiter = ',')]
        input: Vec<String>,
    },
    /// Tseitin-encode a circuit and print the variable each signal was assigned.
    Transform {
        file: String,
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Check two circuits for combinational equivalence.
    Check { file1: String, file2: String },
    /// Tseitin-encode a circuit and print it in DIMACS CNF format.
    Dimacs {
        file: String,
        #[arg(long, default_value = "")]
        prefix: String,
    },
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32> {
    logging::init_logging();
    logging::banner();

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate { file, input } => simulate(&file, &input),
        Command::Transform { file, prefix } => transform(&file, &prefix),
        Command::Check { file1, file2 } => check_cmd(&file1, &file2),
        Command::Dimacs { file, prefix } => dimacs(&file, &prefix),
    }
}

fn read_circuit(path: &str) -> Result<Circuit> {
    let source = fs::read_to_string(path).with_context(|| format!("reading '{path}'"))?;
    circeq_parser::parse(&source).with_context(|| format!("parsing '{path}'"))
}

fn parse_assignment(pairs: &[String]) -> Result<HashMap<String, bool>> {
    let mut inputs = HashMap::new();
    for pair in pairs {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("expected 'name=0|1', found '{pair}'"))?;
        let value = match value {
            "0" => false,
            "1" => true,
            other => bail!("expected '0' or '1' for signal '{name}', found '{other}'"),
        };
        inputs.insert(name.to_string(), value);
    }
    Ok(inputs)
}

fn simulate(path: &str, input: &[String]) -> Result<i32> {
    let circuit = read_circuit(path)?;
    let inputs = parse_assignment(input)?;
    let outputs = circuit.simulate_total(&inputs);

    for name in circuit.outputs() {
        println!("{name} = {}", outputs[name] as u8);
    }
    Ok(0)
}

fn transform(path: &str, prefix: &str) -> Result<i32> {
    let circuit = read_circuit(path)?;
    let mut symtab = SymbolTable::new();
    let cnf = circeq_tseitin::transform_circuit(&circuit, prefix, &mut symtab);

    info!(
        "encoded {} variable(s), {} clause(s)",
        cnf.max_var_id(),
        cnf.len()
    );
    for name in circuit.signals() {
        if let Some(var) = symtab.get(&format!("{prefix}{name}")) {
            println!("{name} -> {}", var.to_dimacs());
        }
    }
    Ok(0)
}

fn check_cmd(path1: &str, path2: &str) -> Result<i32> {
    let c1 = read_circuit(path1)?;
    let c2 = read_circuit(path2)?;

    let mut solver = VarisatSolver::new();
    match check(&c1, &c2, &mut solver)? {
        Verdict::Equivalent => {
            println!("equivalent");
            Ok(0)
        }
        Verdict::Different(None) => {
            println!("different (interface mismatch)");
            Ok(1)
        }
        Verdict::Different(Some(ce)) => {
            println!("different");
            let mut names: Vec<_> = ce.inputs.keys().cloned().collect();
            names.sort();
            for name in names {
                println!("  {name} = {}", ce.inputs[&name] as u8);
            }
            Ok(1)
        }
    }
}

fn dimacs(path: &str, prefix: &str) -> Result<i32> {
    let circuit = read_circuit(path)?;
    let mut symtab = SymbolTable::new();
    let cnf = circeq_tseitin::transform_circuit(&circuit, prefix, &mut symtab);

    let stdout = std::io::stdout();
    circeq_dimacs::write_dimacs(&mut stdout.lock(), &cnf)?;
    Ok(0)
}
