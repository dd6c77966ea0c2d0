use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

struct SampleRow {
    region: &'static str,
    country: &'static str,
    provider: &'static str,
    plan_type: &'static str,
    capacity_mb: f64,
    capacity_gb: f64,
    usd_price: f64,
    period: &'static str,
}

const COUNTRIES: [(&str, &str, f64); 10] = [
    ("Asia", "Japan", 1.3),
    ("Asia", "Singapore", 1.1),
    ("Asia", "Thailand", 0.8),
    ("Europe", "France", 1.0),
    ("Europe", "Germany", 1.05),
    ("Europe", "Spain", 0.95),
    ("Americas", "United States", 1.4),
    ("Americas", "Brazil", 0.9),
    ("Africa", "South Africa", 1.2),
    ("Oceania", "Australia", 1.25),
];

/// Provider name and its price level relative to the market.
const PROVIDERS: [(&str, f64); 4] = [
    ("AstroCell", 0.85),
    ("Airalo", 1.0),
    ("Nomad", 0.95),
    ("Holafly", 1.3),
];

/// Capacity in GB and validity period.
const PACKAGES: [(f64, &str); 6] = [
    (1.0, "7 days"),
    (3.0, "30 days"),
    (5.0, "30 days"),
    (10.0, "30 days"),
    (20.0, "30 days"),
    (50.0, "90 days"),
];

fn generate(rng: &mut SimpleRng) -> Vec<SampleRow> {
    let mut rows = Vec::new();
    for &(region, country, country_factor) in &COUNTRIES {
        for &(provider, provider_factor) in &PROVIDERS {
            // Not every provider covers every country.
            if rng.chance(0.2) {
                continue;
            }
            for &(gb, period) in &PACKAGES {
                if rng.chance(0.15) {
                    continue;
                }
                let per_gb = 4.5 / gb.powf(0.35);
                let noise = 0.85 + 0.3 * rng.next_f64();
                let price = gb * per_gb * country_factor * provider_factor * noise;
                rows.push(SampleRow {
                    region,
                    country,
                    provider,
                    plan_type: if rng.chance(0.25) { "Data + Voice" } else { "Data only" },
                    capacity_mb: gb * 1000.0,
                    capacity_gb: gb,
                    usd_price: (price * 100.0).round() / 100.0,
                    period,
                });
            }
            // Unlimited plans are published with a capacity of 0.
            if rng.chance(0.1) {
                rows.push(SampleRow {
                    region,
                    country,
                    provider,
                    plan_type: "Unlimited",
                    capacity_mb: 0.0,
                    capacity_gb: 0.0,
                    usd_price: (35.0 * country_factor * provider_factor).round(),
                    period: "30 days",
                });
            }
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    // The published export pads some headers with spaces.
    writer.write_record([
        "Region",
        "Country",
        "provider.name",
        "Plan_Type",
        "capacity_MB",
        "Capacity_in_GB",
        "usdPrice ",
        " period",
    ])?;
    for row in rows {
        writer.write_record([
            row.region.to_string(),
            row.country.to_string(),
            row.provider.to_string(),
            row.plan_type.to_string(),
            row.capacity_mb.to_string(),
            row.capacity_gb.to_string(),
            row.usd_price.to_string(),
            row.period.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[SampleRow]) -> Result<()> {
    let text = |f: fn(&SampleRow) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let number = |f: fn(&SampleRow) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("Region", DataType::Utf8, false),
        Field::new("Country", DataType::Utf8, false),
        Field::new("provider.name", DataType::Utf8, false),
        Field::new("Plan_Type", DataType::Utf8, false),
        Field::new("capacity_MB", DataType::Float64, false),
        Field::new("Capacity_in_GB", DataType::Float64, false),
        Field::new("usdPrice", DataType::Float64, false),
        Field::new("period", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|r| r.region),
            text(|r| r.country),
            text(|r| r.provider),
            text(|r| r.plan_type),
            number(|r| r.capacity_mb),
            number(|r| r.capacity_gb),
            number(|r| r.usd_price),
            text(|r| r.period),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv("sample_plans.csv", &rows)?;
    write_parquet("sample_plans.parquet", &rows)?;

    println!(
        "Wrote {} plans to sample_plans.csv and sample_plans.parquet",
        rows.len()
    );
    Ok(())
}
