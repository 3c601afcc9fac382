use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic survey with structured gaps, as CSV and Parquet.
#[derive(Parser, Debug)]
struct Args {
    /// Output path without extension.
    #[arg(long, default_value = "sample_data")]
    out: PathBuf,

    #[arg(long, default_value_t = 120)]
    rows: usize,

    /// Number of measurement columns.
    #[arg(long, default_value_t = 40)]
    measurements: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const SITES: [&str; 4] = ["north", "south", "east", "west"];

/// Chance that measurement `col` is missing for a row from `site`.
///
/// Every site drops a different band of columns, the last column is never
/// recorded and the first two are always complete.
fn missing_rate(site: usize, col: usize, n_cols: usize) -> f64 {
    if col + 1 == n_cols {
        return 1.0;
    }
    if col < 2 {
        return 0.0;
    }
    let band = n_cols / SITES.len();
    if col / band.max(1) == site {
        0.6
    } else {
        0.05
    }
}

struct Survey {
    ids: Vec<String>,
    sites: Vec<Option<String>>,
    measurements: Vec<Vec<Option<f64>>>,
}

fn generate(args: &Args, rng: &mut SimpleRng) -> Survey {
    let mut survey = Survey {
        ids: Vec::with_capacity(args.rows),
        sites: Vec::with_capacity(args.rows),
        measurements: vec![Vec::with_capacity(args.rows); args.measurements],
    };
    for row in 0..args.rows {
        let site = (rng.next_u64() % SITES.len() as u64) as usize;
        survey.ids.push(format!("P{row:04}"));
        // A handful of rows lose their site too.
        survey
            .sites
            .push((rng.next_f64() > 0.03).then(|| SITES[site].to_string()));
        for (col, values) in survey.measurements.iter_mut().enumerate() {
            let gone = rng.next_f64() < missing_rate(site, col, args.measurements);
            values.push((!gone).then(|| rng.gauss(10.0 + col as f64, 2.0)));
        }
    }
    survey
}

fn measurement_name(col: usize) -> String {
    format!("m{:02}", col + 1)
}

fn write_parquet(survey: &Survey, path: &PathBuf) -> anyhow::Result<()> {
    let mut fields = vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("site", DataType::Utf8, true),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            survey.ids.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(survey.sites.clone())),
    ];
    for (col, values) in survey.measurements.iter().enumerate() {
        fields.push(Field::new(measurement_name(col), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(values.clone())));
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(survey: &Survey, path: &PathBuf) -> anyhow::Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["id".to_string(), "site".to_string()];
    header.extend((0..survey.measurements.len()).map(measurement_name));
    writer.write_record(&header)?;

    for row in 0..survey.ids.len() {
        let mut record = vec![
            survey.ids[row].clone(),
            survey.sites[row].clone().unwrap_or_else(|| "NA".to_string()),
        ];
        record.extend(survey.measurements.iter().map(|values| match values[row] {
            Some(v) => format!("{v:.3}"),
            None => String::new(),
        }));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let survey = generate(&args, &mut rng);

    let parquet_path = args.out.with_extension("parquet");
    let csv_path = args.out.with_extension("csv");
    write_parquet(&survey, &parquet_path)?;
    write_csv(&survey, &csv_path)?;

    let missing: usize = survey
        .measurements
        .iter()
        .map(|values| values.iter().filter(|v| v.is_none()).count())
        .sum();
    println!(
        "Wrote {} rows x {} measurements ({missing} missing) to {} and {}",
        args.rows,
        args.measurements,
        parquet_path.display(),
        csv_path.display()
    );
    Ok(())
}
