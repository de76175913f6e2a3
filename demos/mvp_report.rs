//! Prints the memory-variance products of the common sketch configurations.
//!
//! Run with `RUST_LOG=mvp_engine=debug` to follow the searches.
use std::f64::consts::SQRT_2;

use mvp_engine::coefficients::{fgra_coefficients, gra_coefficients};
use mvp_engine::{Evaluator, Family, MvpResult, Query};
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[derive(Tabled)]
struct Row {
    family: Family,
    result: String,
    v: String,
    efficiency: String,
    coefficients: String,
}

fn main() -> mvp_engine::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let evaluator = Evaluator::default();
    let quarter = SQRT_2.sqrt();
    let queries = [
        (Family::LOWER_BOUND, Query::new().q(6.0)),
        (Family::LOWER_BOUND, Query::new().q(6.0).b(2.0)),
        (Family::LOWER_BOUND, Query::new().q(6.0).d(2)),
        (Family::LOWER_BOUND, Query::new().q(6.0).d(0).b(2.0)),
        (Family::LOWER_BOUND, Query::new().q(6.0).d(2).b(2.0)),
        (Family::LOWER_BOUND, Query::new().q(7.0).d(9).b(SQRT_2)),
        (Family::LOWER_BOUND, Query::new().q(8.0).d(16).b(quarter)),
        (Family::COMPRESSED_LOWER_BOUND, Query::new().d(0).b(2.0)),
        (Family::COMPRESSED_LOWER_BOUND, Query::new().d(2).b(2.0)),
        (Family::COMPRESSED_LOWER_BOUND, Query::new().d(9).b(SQRT_2)),
        (Family::COMPRESSED_LOWER_BOUND, Query::new().b(2.0)),
        (Family::GRA, Query::new().q(6.0).d(0).b(2.0).t(1.0)),
        (Family::GRA, Query::new().q(6.0).d(0).b(2.0)),
        (Family::GRA, Query::new().q(6.0).d(1).b(2.0).t(1.0)),
        (Family::GRA, Query::new().q(6.0).d(1).b(2.0)),
        (Family::GRA, Query::new().q(6.0).d(2).b(2.0).t(1.0)),
        (Family::GRA, Query::new().q(6.0).d(2).b(2.0)),
        (Family::GRA, Query::new().q(6.0).b(2.0)),
        (Family::GRA, Query::new().q(6.0)),
        (Family::GRA, Query::new().q(16.0).d(0).b(1.001)),
        (Family::FGRA, Query::new().q(6.0).t(1.0)),
        (Family::FGRA, Query::new().q(6.0)),
        (Family::MARTINGALE, Query::new().q(6.0)),
        (Family::MARTINGALE, Query::new().q(6.0).d(1).b(2.0)),
        (Family::MARTINGALE, Query::new().q(6.0).d(2)),
        (Family::MARTINGALE, Query::new().q(6.0).d(2).b(2.0)),
        (Family::MARTINGALE, Query::new().q(7.0).d(9).b(SQRT_2)),
        (Family::COMPRESSED_MARTINGALE, Query::new().d(0).b(2.0)),
        (Family::COMPRESSED_MARTINGALE, Query::new().d(2).b(2.0)),
        (Family::COMPRESSED_MARTINGALE, Query::new().b(2.0)),
    ];

    let rows: Vec<Row> = queries
        .iter()
        .map(|(family, query)| match evaluator.evaluate(*family, query) {
            Ok(result) => row(&evaluator, *family, &result),
            Err(err) => Row {
                family: *family,
                result: format!("error: {err}"),
                v: "-".to_string(),
                efficiency: "-".to_string(),
                coefficients: "-".to_string(),
            },
        })
        .collect();

    let table_config = Settings::default().with(Style::markdown());
    println!("{}", Table::new(rows).with(table_config));
    Ok(())
}

fn row(evaluator: &Evaluator, family: Family, result: &MvpResult) -> Row {
    let precision = evaluator.config().precision;
    let coefficients = match family {
        Family::Gra(_) => gra_coefficients(result, precision),
        Family::Fgra(_) => fgra_coefficients(result, precision).map(|eta| eta.to_vec()),
        _ => Ok(Vec::new()),
    };
    Row {
        family,
        result: result.to_string(),
        v: result
            .variance_factor()
            .map_or_else(|| "-".to_string(), |v| format!("{v:.6}")),
        efficiency: result
            .efficiency(evaluator.config())
            .map_or_else(|_| "-".to_string(), |e| format!("{e:.6}")),
        coefficients: match coefficients {
            Ok(eta) => eta
                .iter()
                .take(8)
                .map(|c| format!("{c:.4}"))
                .collect::<Vec<_>>()
                .join(" "),
            Err(err) => err.to_string(),
        },
    }
}
