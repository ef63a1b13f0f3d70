// ipkcp-bench: IPKCP Performance Benchmark Suite
// Measures evaluator, binary codec and end-to-end throughput of both bindings
mod cpu_monitor;
mod evaluator;
mod report;
mod roundtrip;

use clap::{Parser, Subcommand};
use report::print_results;
use std::process;

#[derive(Parser)]
#[command(name = "ipkcp-bench")]
#[command(about = "IPKCP Performance Benchmark Suite", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run all benchmark cases
    #[arg(short, long)]
    all: bool,

    /// Run specific case (shorthand for 'case' subcommand)
    #[arg(short = 'c', long = "case", value_name = "NAME")]
    case: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run specific benchmark case
    Case {
        /// Case name to run
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List all available benchmark cases
    List,
}

fn list_cases() {
    println!("\n=== Available Benchmark Cases ===\n");

    println!("EVALUATOR:");
    println!("  eval-flat           - One operator with 50 operands");
    println!("  eval-nested         - 40 levels of nested applications");
    println!("  codec-binary        - Decode + evaluate + encode a binary frame");
    println!();

    println!("ROUND TRIP (in-process daemon on 127.0.0.1):");
    println!("  datagram-roundtrip  - UDP request/response, one client");
    println!("  stream-roundtrip    - TCP HELLO then SOLVE requests, one client");
    println!();

    println!("COMPREHENSIVE:");
    println!("  quick               - Reduced iteration counts");
    println!("  full                - Every case");
    println!();

    println!("Usage:");
    println!("  ipkcp-bench -a                      # Run all benchmarks");
    println!("  ipkcp-bench -c eval-flat            # Run one case");
    println!("  ipkcp-bench case stream-roundtrip   # Run one case");
    println!("  ipkcp-bench list                    # Show this list");
}

fn run_evaluator(iterations: usize) {
    let results = vec![
        evaluator::bench_eval_flat(iterations),
        evaluator::bench_eval_nested(iterations),
        evaluator::bench_codec_binary(iterations),
    ];
    print_results("EVALUATOR THROUGHPUT", &results);
}

fn run_roundtrip(requests: usize) {
    let (datagram, _) = cpu_monitor::run_with_cpu_monitor("UDP round trip", || {
        roundtrip::bench_datagram_roundtrip(requests)
    });
    let (stream, _) = cpu_monitor::run_with_cpu_monitor("TCP round trip", || {
        roundtrip::bench_stream_roundtrip(requests)
    });
    print_results("ROUND TRIP THROUGHPUT", &[datagram, stream]);
}

fn run_quick_suite() {
    println!("\n=== QUICK BENCHMARK SUITE ===");
    run_evaluator(20_000);
    run_roundtrip(2_000);
    println!("\n✓ Quick benchmark suite completed!");
}

fn run_full_suite() {
    println!("\n=== FULL BENCHMARK SUITE ===");
    run_evaluator(500_000);
    println!("\n{}", "─".repeat(82));
    run_roundtrip(50_000);
    println!("\n✓ Full benchmark suite completed!");
}

fn run_case(name: &str) {
    match name {
        "eval-flat" => print_results("EVALUATOR", &[evaluator::bench_eval_flat(200_000)]),
        "eval-nested" => print_results("EVALUATOR", &[evaluator::bench_eval_nested(200_000)]),
        "codec-binary" => print_results("CODEC", &[evaluator::bench_codec_binary(200_000)]),

        "datagram-roundtrip" => {
            let (result, _) = cpu_monitor::run_with_cpu_monitor("UDP round trip", || {
                roundtrip::bench_datagram_roundtrip(20_000)
            });
            print_results("ROUND TRIP", &[result]);
        }
        "stream-roundtrip" => {
            let (result, _) = cpu_monitor::run_with_cpu_monitor("TCP round trip", || {
                roundtrip::bench_stream_roundtrip(20_000)
            });
            print_results("ROUND TRIP", &[result]);
        }

        "quick" => run_quick_suite(),
        "full" => run_full_suite(),

        _ => {
            eprintln!("Error: Unknown benchmark case '{}'", name);
            eprintln!("Run 'ipkcp-bench list' to see available cases");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.all {
        run_full_suite();
    } else if let Some(case_name) = cli.case {
        run_case(&case_name);
    } else {
        match cli.command {
            Some(Commands::Case { name }) => run_case(&name),
            Some(Commands::List) => list_cases(),
            None => {
                println!("\nNo benchmark specified. Use one of:");
                println!("  ipkcp-bench -a              # Run all benchmarks");
                println!("  ipkcp-bench -c <case>       # Run specific case");
                println!("  ipkcp-bench list            # List available cases");
                println!("\nFor a quick start, try: ipkcp-bench -c quick");
            }
        }
    }
}
