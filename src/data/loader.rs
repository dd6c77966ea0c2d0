use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{DerivationError, LoadError};
use super::model::{derive_price_per_gb, Dataset, Plan};

/// Name of the derived column appended to every dataset.
pub const PRICE_PER_GB_COLUMN: &str = "price_per_GB";

/// What to do with rows whose capacity makes `price_per_GB` undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DerivationPolicy {
    /// Keep the row; leave it out of price-per-GB views only.
    #[default]
    Exclude,
    /// Fail the whole load.
    Reject,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a plan dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one plan per line (the published export)
/// * `.json`    – `[{ "Region": ..., "usdPrice": ..., ... }, ...]`
/// * `.parquet` – flat columns with the same names
pub fn load_file(path: &Path, policy: DerivationPolicy) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(open(path)?)?,
        "json" => read_json(open(path)?)?,
        "parquet" | "pq" => read_parquet(open(path)?)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    let dataset = build_dataset(table, policy)?;
    log::info!(
        "Loaded {} plans from {} with columns {:?}",
        dataset.len(),
        path.display(),
        dataset.column_names
    );
    if !dataset.underivable_rows.is_empty() {
        log::warn!(
            "{} plans have an invalid capacity_MB; excluded from price-per-GB views",
            dataset.underivable_rows.len()
        );
    }
    Ok(dataset)
}

/// Load CSV from any reader.
pub fn load_csv_reader<R: Read>(reader: R, policy: DerivationPolicy) -> Result<Dataset, LoadError> {
    build_dataset(read_csv(reader)?, policy)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Raw table – format-independent intermediate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Null,
}

struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows[row].get(col).unwrap_or(&Cell::Null)
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|value| Cell::Text(value.to_string()))
                .collect(),
        );
    }

    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, i.e. pandas' `df.to_json(orient='records')`.
fn read_json<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let root: JsonValue = serde_json::from_reader(reader)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".into()))?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| match obj.get(col) {
                    Some(JsonValue::String(s)) => Cell::Text(s.clone()),
                    Some(JsonValue::Number(n)) => {
                        n.as_f64().map(Cell::Number).unwrap_or(Cell::Null)
                    }
                    Some(JsonValue::Bool(b)) => Cell::Text(b.to_string()),
                    Some(JsonValue::Null) | None => Cell::Null,
                    Some(other) => Cell::Text(other.to_string()),
                })
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Flat Parquet file as written by `df.to_parquet()` or `df.write_parquet()`.
fn read_parquet(file: File) -> Result<RawTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<Cell, LoadError> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let mismatch = || LoadError::Malformed(format!("unexpected layout for {:?}", col.data_type()));
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::Text(col.as_string_opt::<i32>().ok_or_else(mismatch)?.value(row).to_string()),
        DataType::LargeUtf8 => {
            Cell::Text(col.as_string_opt::<i64>().ok_or_else(mismatch)?.value(row).to_string())
        }
        DataType::Int32 => {
            Cell::Number(col.as_primitive_opt::<Int32Type>().ok_or_else(mismatch)?.value(row) as f64)
        }
        DataType::Int64 => {
            Cell::Number(col.as_primitive_opt::<Int64Type>().ok_or_else(mismatch)?.value(row) as f64)
        }
        DataType::Float32 => {
            Cell::Number(col.as_primitive_opt::<Float32Type>().ok_or_else(mismatch)?.value(row) as f64)
        }
        DataType::Float64 => {
            Cell::Number(col.as_primitive_opt::<Float64Type>().ok_or_else(mismatch)?.value(row))
        }
        DataType::Boolean => {
            Cell::Text(col.as_boolean_opt().ok_or_else(mismatch)?.value(row).to_string())
        }
        other => return Err(LoadError::Malformed(format!("unsupported column type {other:?}"))),
    };
    Ok(cell)
}

// ---------------------------------------------------------------------------
// Normalisation and derivation
// ---------------------------------------------------------------------------

/// Strip header whitespace, check the schema, convert rows into plans and
/// derive `price_per_GB`.
fn build_dataset(table: RawTable, policy: DerivationPolicy) -> Result<Dataset, LoadError> {
    let mut columns: Vec<String> = Vec::with_capacity(table.columns.len() + 1);
    let mut seen = BTreeSet::new();
    for name in &table.columns {
        let trimmed = name.trim().to_string();
        if !seen.insert(trimmed.clone()) {
            return Err(LoadError::DuplicateColumn(trimmed));
        }
        columns.push(trimmed);
    }

    let index_of = |name: &'static str| {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let region = index_of("Region")?;
    let country = index_of("Country")?;
    let provider = index_of("provider.name")?;
    let plan_type = index_of("Plan_Type")?;
    let capacity_mb = index_of("capacity_MB")?;
    let capacity_gb = index_of("Capacity_in_GB")?;
    let usd_price = index_of("usdPrice")?;
    let period = index_of("period")?;

    let mut plans = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let mb = number(table.cell(row, capacity_mb), row, "capacity_MB")?;
        let gb = number(table.cell(row, capacity_gb), row, "Capacity_in_GB")?
            .or_else(|| mb.map(|mb| mb / 1000.0));
        let price_cell = table.cell(row, usd_price);
        let price = number(price_cell, row, "usdPrice")?.ok_or_else(|| LoadError::InvalidValue {
            row,
            column: "usdPrice",
            value: text(price_cell),
        })?;

        let price_per_gb = derive_price_per_gb(price, mb);
        if price_per_gb.is_none() && policy == DerivationPolicy::Reject {
            return Err(DerivationError {
                row,
                capacity_mb: mb,
            }
            .into());
        }

        plans.push(Plan {
            region: text(table.cell(row, region)),
            country: text(table.cell(row, country)),
            provider_name: text(table.cell(row, provider)),
            plan_type: text(table.cell(row, plan_type)),
            capacity_mb: mb,
            capacity_gb: gb,
            usd_price: price,
            period: text(table.cell(row, period)),
            price_per_gb,
        });
    }

    if !columns.iter().any(|c| c == PRICE_PER_GB_COLUMN) {
        columns.push(PRICE_PER_GB_COLUMN.to_string());
    }
    Ok(Dataset::from_plans(plans, columns))
}

fn text(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        Cell::Number(v) => v.to_string(),
        Cell::Null => String::new(),
    }
}

/// Parse a numeric cell. Empty and non-finite cells (`NaN`, `inf`) read as missing.
fn number(cell: &Cell, row: usize, column: &'static str) -> Result<Option<f64>, LoadError> {
    let value = match cell {
        Cell::Number(v) => *v,
        Cell::Null => return Ok(None),
        Cell::Text(s) if s.trim().is_empty() => return Ok(None),
        Cell::Text(s) => s.trim().parse::<f64>().map_err(|_| LoadError::InvalidValue {
            row,
            column,
            value: s.clone(),
        })?,
    };
    Ok(Some(value).filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    const CSV: &str = "\
 Region ,Country,provider.name,Plan_Type,capacity_MB,Capacity_in_GB, usdPrice,period
Asia,Japan,AstroCell,Data only,2000,2,10,30 days
Europe,France,Nomad,Data only,1000,1,4.5,7 days
Asia,Japan,Airalo,Data + Voice,0,,3,1 day
";

    #[test]
    fn test_csv_headers_trimmed_and_price_per_gb_derived() {
        let ds = load_csv_reader(CSV.as_bytes(), DerivationPolicy::Exclude).unwrap();

        assert_eq!(ds.len(), 3);
        assert!(ds.column_names.contains(&"Region".to_string()));
        assert!(ds.column_names.contains(&"usdPrice".to_string()));
        assert_eq!(ds.column_names.last().map(String::as_str), Some(PRICE_PER_GB_COLUMN));
        assert!(ds.column_names.iter().all(|c| c.trim() == c));

        let first = &ds.plans[0];
        assert!((first.price_per_gb.unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(first.capacity_gb, Some(2.0));
    }

    #[test]
    fn test_zero_capacity_flagged_under_exclude() {
        let ds = load_csv_reader(CSV.as_bytes(), DerivationPolicy::Exclude).unwrap();

        assert_eq!(ds.underivable_rows, vec![2]);
        assert_eq!(ds.plans[2].price_per_gb, None);
        // Empty Capacity_in_GB falls back to capacity_MB / 1000.
        assert_eq!(ds.plans[2].capacity_gb, Some(0.0));
    }

    #[test]
    fn test_zero_capacity_rejected_under_reject() {
        let err = load_csv_reader(CSV.as_bytes(), DerivationPolicy::Reject).unwrap_err();
        match err {
            LoadError::Derivation(e) => {
                assert_eq!(e.row, 2);
                assert_eq!(e.capacity_mb, Some(0.0));
            }
            other => panic!("expected derivation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_column() {
        let csv = "Region,Country,Plan_Type,capacity_MB,Capacity_in_GB,usdPrice,period\n";
        let err = load_csv_reader(csv.as_bytes(), DerivationPolicy::Exclude).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("provider.name")));
    }

    #[test]
    fn test_duplicate_column_after_trim() {
        let csv = "Region,Region ,Country,provider.name,Plan_Type,capacity_MB,Capacity_in_GB,usdPrice,period\n";
        let err = load_csv_reader(csv.as_bytes(), DerivationPolicy::Exclude).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateColumn(ref c) if c == "Region"));
    }

    #[test]
    fn test_non_numeric_price() {
        let csv = "Region,Country,provider.name,Plan_Type,capacity_MB,Capacity_in_GB,usdPrice,period\n\
                   Asia,Japan,AstroCell,Data only,1000,1,cheap,7 days\n";
        let err = load_csv_reader(csv.as_bytes(), DerivationPolicy::Exclude).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidValue { row: 0, column: "usdPrice", .. }
        ));
    }

    #[test]
    fn test_non_finite_price_rejected() {
        for price in ["NaN", "inf", "-inf"] {
            let csv = format!(
                "Region,Country,provider.name,Plan_Type,capacity_MB,Capacity_in_GB,usdPrice,period\n\
                 Asia,Japan,AstroCell,Data only,1000,1,{price},7 days\n"
            );
            let err = load_csv_reader(csv.as_bytes(), DerivationPolicy::Exclude).unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidValue { row: 0, column: "usdPrice", ref value } if value == price),
                "{price}: {err:?}"
            );
        }
    }

    #[test]
    fn test_non_finite_capacity_reads_as_missing() {
        let csv = "Region,Country,provider.name,Plan_Type,capacity_MB,Capacity_in_GB,usdPrice,period\n\
                   Asia,Japan,AstroCell,Data only,NaN,inf,4,7 days\n";
        let ds = load_csv_reader(csv.as_bytes(), DerivationPolicy::Exclude).unwrap();
        let plan = &ds.plans[0];
        assert_eq!(plan.capacity_mb, None);
        assert_eq!(plan.capacity_gb, None);
        assert_eq!(plan.usd_price, 4.0);
        assert_eq!(ds.underivable_rows, vec![0]);
    }

    #[test]
    fn test_load_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Region":"Asia","Country":"Japan","provider.name":"AstroCell",
                "Plan_Type":"Data only","capacity_MB":2000,"Capacity_in_GB":2,
                "usdPrice":10,"period":"30 days"}}]"#
        )
        .unwrap();

        let ds = load_file(file.path(), DerivationPolicy::Exclude).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.plans[0].country, "Japan");
        assert!((ds.plans[0].price_per_gb.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_file_parquet() {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let text = |name: &str| Field::new(name, DataType::Utf8, false);
        let float = |name: &str| Field::new(name, DataType::Float64, true);
        let schema = Arc::new(Schema::new(vec![
            text("Region"),
            text("Country"),
            text("provider.name"),
            text("Plan_Type"),
            float("capacity_MB"),
            float("Capacity_in_GB"),
            float("usdPrice"),
            text("period"),
        ]));
        let strings = |v: &str| Arc::new(StringArray::from(vec![v, v])) as Arc<dyn Array>;
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                strings("Asia"),
                strings("Japan"),
                strings("AstroCell"),
                strings("Data only"),
                Arc::new(Float64Array::from(vec![Some(1000.0), None])),
                Arc::new(Float64Array::from(vec![Some(1.0), None])),
                Arc::new(Float64Array::from(vec![Some(4.0), Some(6.0)])),
                strings("7 days"),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path(), DerivationPolicy::Exclude).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.plans[0].price_per_gb, Some(4.0));
        assert_eq!(ds.plans[1].capacity_gb, None);
        assert_eq!(ds.underivable_rows, vec![1]);
    }

    #[test]
    fn test_missing_file_and_unknown_extension() {
        let err = load_file(Path::new("/nonexistent/plans.csv"), DerivationPolicy::Exclude)
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));

        let err = load_file(Path::new("plans.xlsx"), DerivationPolicy::Exclude).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ref e) if e == "xlsx"));
    }
}
