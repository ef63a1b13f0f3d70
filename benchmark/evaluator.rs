// evaluator.rs - In-process evaluator and codec throughput
use crate::report::ThroughputResult;
use ipkcp_core::binary::{self, BinaryRequest, BinaryResponse};
use ipkcp_core::evaluate;
use std::hint::black_box;
use std::time::Instant;

/// `(+ 1 2 3 ... n)`
pub fn flat_expression(operands: usize) -> String {
    let mut expr = String::from("(+");
    for i in 1..=operands {
        expr.push(' ');
        expr.push_str(&i.to_string());
    }
    expr.push(')');
    expr
}

/// `(+ 1 (+ 1 (+ 1 ... 1)))` nested `depth` levels
pub fn nested_expression(depth: usize) -> String {
    let mut expr = String::from("1");
    for _ in 0..depth {
        expr = format!("(+ 1 {})", expr);
    }
    expr
}

fn bench_expression(name: &str, expression: &str, iterations: usize) -> ThroughputResult {
    println!("\n=== Benchmarking {} ({} bytes) ===", name, expression.len());

    let input = expression.as_bytes();
    let mut failures = 0;
    let start = Instant::now();
    for _ in 0..iterations {
        if black_box(evaluate(black_box(input))).is_err() {
            failures += 1;
        }
    }

    ThroughputResult::new(name, iterations as u64, failures, start.elapsed())
}

pub fn bench_eval_flat(iterations: usize) -> ThroughputResult {
    bench_expression("Flat (50 operands)", &flat_expression(50), iterations)
}

pub fn bench_eval_nested(iterations: usize) -> ThroughputResult {
    bench_expression("Nested (depth 40)", &nested_expression(40), iterations)
}

/// Full binary request path without sockets: decode, evaluate, encode.
pub fn bench_codec_binary(iterations: usize) -> ThroughputResult {
    println!("\n=== Benchmarking Binary Codec Path ===");

    let start = Instant::now();
    let request = match binary::encode_request(&BinaryRequest::new(flat_expression(20))) {
        Ok(frame) => frame,
        Err(e) => {
            eprintln!("Error: cannot build request frame: {}", e);
            return ThroughputResult::new("Binary codec", 0, 1, start.elapsed());
        }
    };

    let mut failures = 0;
    let start = Instant::now();
    for _ in 0..iterations {
        let outcome = binary::decode_request(black_box(&request))
            .map(|req| BinaryResponse::from_outcome(evaluate(&req.expression)))
            .and_then(|resp| binary::encode_response(&resp));
        if black_box(outcome).is_err() {
            failures += 1;
        }
    }

    ThroughputResult::new("Binary codec", iterations as u64, failures, start.elapsed())
}
