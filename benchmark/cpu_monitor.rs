// cpu_monitor.rs - Process CPU usage sampled while a benchmark runs
use sysinfo::{ProcessRefreshKind, RefreshKind, System};
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::thread;
use std::time::Duration;

const SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

pub struct CpuStats {
    pub avg_cpu_percent: f32,
    pub peak_cpu_percent: f32,
    pub samples: usize,
}

fn sample_until(stop: Arc<AtomicBool>) -> CpuStats {
    let mut sys = System::new_with_specifics(
        RefreshKind::new().with_processes(ProcessRefreshKind::new().with_cpu())
    );
    let mut samples = vec![];

    if let Ok(pid) = sysinfo::get_current_pid() {
        sys.refresh_process(pid);
        while !stop.load(Ordering::Relaxed) {
            thread::sleep(SAMPLE_INTERVAL);
            sys.refresh_process(pid);
            if let Some(process) = sys.process(pid) {
                samples.push(process.cpu_usage());
            }
        }
    }

    let avg = if !samples.is_empty() {
        samples.iter().sum::<f32>() / samples.len() as f32
    } else {
        0.0
    };

    CpuStats {
        avg_cpu_percent: avg,
        peak_cpu_percent: samples.iter().copied().fold(0.0f32, f32::max),
        samples: samples.len(),
    }
}

/// Run a benchmark on the current thread while a sampler thread watches the process
pub fn run_with_cpu_monitor<F, R>(name: &str, benchmark_fn: F) -> (R, CpuStats)
where
    F: FnOnce() -> R,
{
    println!("\n=== Running {} with CPU monitoring ===", name);

    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = Arc::clone(&stop);
    let monitor_handle = thread::spawn(move || sample_until(stop_clone));

    let result = benchmark_fn();

    stop.store(true, Ordering::Relaxed);
    let cpu_stats = monitor_handle.join().unwrap_or(CpuStats {
        avg_cpu_percent: 0.0,
        peak_cpu_percent: 0.0,
        samples: 0,
    });

    println!("CPU Stats: avg={:.1}%, peak={:.1}%, samples={}",
        cpu_stats.avg_cpu_percent,
        cpu_stats.peak_cpu_percent,
        cpu_stats.samples
    );

    (result, cpu_stats)
}
