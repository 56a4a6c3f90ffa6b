use clap::Parser;
use nrel_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result: anyhow::Result<commands::ProcessingStats> = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result.map_err(anyhow::Error::from),
            signal = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                let reason = match signal {
                    Ok(()) => "Processing interrupted by user".to_string(),
                    Err(e) => format!("Failed to listen for CTRL+C: {}", e),
                };
                Err(nrel_processor::Error::processing_interrupted(reason).into())
            }
        }
    });

    match result {
        Ok(stats) if stats.files_failed > 0 => process::exit(2),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("NREL Processor - Solar-Cell Measurement File Parser");
    println!("===================================================");
    println!();
    println!("Extract header metadata and curves from NREL JV-sweep and stability");
    println!("exports into notebook entry archives and Parquet tables.");
    println!();
    println!("USAGE:");
    println!("    nrel-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    parse       Parse measurement files and write entry archives");
    println!("    inspect     Parse a single file and print what was extracted");
    println!("    schema      Print the notebook entity catalogue");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    nrel-processor parse ./measurements -o ./archives --parquet");
    println!("    nrel-processor inspect S1_B2_D3_CU_px1_fwd_lt_lp1_01.txt --format json");
    println!("    nrel-processor schema NREL_JVmeasurement");
    println!();
    println!("For detailed help on any command, use:");
    println!("    nrel-processor <COMMAND> --help");
}
