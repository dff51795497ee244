#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use ckks_poly_bench::{BenchConfig, CkksBackend, FsReportSink, Harness, PolynomialFamily};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "dhat-heap")]
    let _dhat = dhat::Profiler::new_heap();

    let config = BenchConfig::default();
    println!(
        "Evaluating {} points over [{}, {}), {} trials per polynomial",
        config.domain.size, config.domain.start, config.domain.end, config.trials
    );

    let backend = CkksBackend::new(config.security);
    let mut harness = Harness::new(backend, FsReportSink::default(), config)?;
    let families = [PolynomialFamily::chebyshev(), PolynomialFamily::minimax()];
    let reports = harness.run_suite(&families)?;

    for report in &reports {
        println!(
            "{}: {} polynomials written under results/{}_*",
            report.label,
            report.results.len(),
            report.prefix
        );
    }
    Ok(())
}
