use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

const N_STARS: usize = 5000;
const TEFF_SUN: f64 = 5777.0;
const NUMAX_SUN: f64 = 3090.0;
const LOGG_SUN: f64 = 4.438;

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

/// A synthetic red-giant catalogue, loosely following the seismic scaling
/// relations so cuts in one column visibly move the others.
struct Catalogue {
    id: Vec<i64>,
    survey: Vec<&'static str>,
    teff: Vec<f64>,
    logg: Vec<f64>,
    numax: Vec<f64>,
    mass: Vec<f64>,
    radius: Vec<f64>,
    feh: Vec<f64>,
}

impl Catalogue {
    fn generate(n: usize, rng: &mut SimpleRng) -> Self {
        let surveys = ["kepler", "k2", "tess"];
        let mut cat = Catalogue {
            id: Vec::with_capacity(n),
            survey: Vec::with_capacity(n),
            teff: Vec::with_capacity(n),
            logg: Vec::with_capacity(n),
            numax: Vec::with_capacity(n),
            mass: Vec::with_capacity(n),
            radius: Vec::with_capacity(n),
            feh: Vec::with_capacity(n),
        };

        for i in 0..n {
            let mass = rng.gauss(1.2, 0.3).max(0.7);
            let radius = rng.gauss(2.2, 0.35).exp().clamp(3.0, 40.0);
            let teff = rng.gauss(4800.0, 250.0);
            let logg = LOGG_SUN + mass.log10() - 2.0 * radius.log10() + rng.gauss(0.0, 0.02);
            let numax = NUMAX_SUN * mass / radius.powi(2) / (teff / TEFF_SUN).sqrt()
                * (1.0 + rng.gauss(0.0, 0.03));
            // About one star in ten has no spectroscopic metallicity.
            let feh = if rng.next_f64() < 0.1 {
                f64::NAN
            } else {
                rng.gauss(-0.1, 0.25)
            };

            cat.id.push(i as i64);
            cat.survey.push(surveys[(rng.next_u64() % surveys.len() as u64) as usize]);
            cat.teff.push(teff);
            cat.logg.push(logg);
            cat.numax.push(numax);
            cat.mass.push(mass);
            cat.radius.push(radius);
            cat.feh.push(feh);
        }
        cat
    }

    fn numeric_columns(&self) -> [(&'static str, &[f64]); 6] {
        [
            ("teff", self.teff.as_slice()),
            ("logg", self.logg.as_slice()),
            ("numax", self.numax.as_slice()),
            ("mass", self.mass.as_slice()),
            ("radius", self.radius.as_slice()),
            ("feh", self.feh.as_slice()),
        ]
    }

    fn record_batch(&self) -> Result<RecordBatch> {
        let mut fields = vec![
            Field::new("kic", DataType::Int64, false),
            Field::new("survey", DataType::Utf8, false),
        ];
        let mut arrays: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(self.id.clone())),
            Arc::new(StringArray::from(self.survey.clone())),
        ];
        for (name, values) in self.numeric_columns() {
            fields.push(Field::new(name, DataType::Float64, true));
            // NaN metallicities are stored as nulls, the way pandas writes them.
            let array: Float64Array = values
                .iter()
                .map(|v| if v.is_nan() { None } else { Some(*v) })
                .collect();
            arrays.push(Arc::new(array));
        }
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .context("building record batch")
    }
}

fn write_parquet(batch: &RecordBatch, path: &str) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Space-delimited copy with a blank-named index column, the same layout the
/// cut-table export uses.
fn write_text(cat: &Catalogue, path: &str) -> Result<()> {
    let columns = cat.numeric_columns();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .from_path(path)
        .with_context(|| format!("creating {path}"))?;

    let mut header = vec![String::new()];
    header.extend(columns.iter().map(|(name, _)| name.to_string()));
    writer.write_record(&header)?;

    for row in 0..cat.id.len() {
        let mut record = vec![row.to_string()];
        record.extend(columns.iter().map(|(_, values)| values[row].to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let catalogue = Catalogue::generate(N_STARS, &mut rng);
    let batch = catalogue.record_batch()?;

    log::info!(
        "Preview:\n{}",
        pretty_format_batches(&[batch.slice(0, 5)]).context("formatting preview")?
    );

    write_parquet(&batch, "sample_data.parquet")?;
    write_text(&catalogue, "sample_data.txt")?;

    println!("Wrote {N_STARS} stars to sample_data.parquet and sample_data.txt");
    Ok(())
}
