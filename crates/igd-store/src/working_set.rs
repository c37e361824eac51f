//! The working set of a store-backed training session.

use std::collections::HashSet;
use std::sync::Arc;

use datafusion::arrow::array::{Array, ArrayRef, Float64Array};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::common::cast::as_float64_array;
use datafusion::datasource::MemTable;
use datafusion::logical_expr::ident;
use datafusion::prelude::SessionContext;
use igd_ml::error::{MlError, MlResult};
use igd_ml::row::Row;
use igd_ml::working_set::with_bias;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{StoreError, StoreResult};
use crate::session::quote_identifier;

/// The source table and columns a model is trained on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingTarget {
    pub table: String,
    pub label: String,
    pub features: Vec<String>,
}

impl TrainingTarget {
    pub fn new<I, S>(table: impl Into<String>, label: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            label: label.into(),
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self, bias_column: &str) -> StoreResult<()> {
        if self.table.is_empty() {
            return Err(StoreError::invalid("missing source table"));
        }
        if self.label.is_empty() {
            return Err(StoreError::invalid("missing label column"));
        }
        let mut seen = HashSet::new();
        for column in std::iter::once(&self.label)
            .chain(self.features.iter())
            .map(String::as_str)
            .chain(std::iter::once(bias_column))
        {
            if !seen.insert(column) {
                return Err(StoreError::invalid(format!("duplicate column: {column}")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WorkingSetOptions {
    /// The name of the constant bias column added to the working set.
    pub bias_column: String,
    /// Seeds the one-time shuffle of the row order.
    pub seed: u64,
}

/// A bias-augmented copy of the source rows in a fixed shuffled order,
/// registered as a table in the session context.
///
/// The columns of the table are the label, the bias column, and the raw
/// features, in that order. The table is deregistered when the working set
/// is dropped.
pub struct WorkingSet {
    ctx: SessionContext,
    name: String,
    columns: Vec<String>,
    rows: usize,
}

impl WorkingSet {
    pub async fn create(
        ctx: &SessionContext,
        name: impl Into<String>,
        target: &TrainingTarget,
        options: &WorkingSetOptions,
    ) -> StoreResult<Self> {
        let name = name.into();
        target.validate(&options.bias_column)?;

        let mut rows = read_rows(ctx, target).await?;
        let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
        rows.shuffle(&mut rng);

        let columns = std::iter::once(target.label.clone())
            .chain(std::iter::once(options.bias_column.clone()))
            .chain(target.features.iter().cloned())
            .collect::<Vec<_>>();
        let schema: SchemaRef = Arc::new(Schema::new(
            columns
                .iter()
                .map(|c| Field::new(c, DataType::Float64, false))
                .collect::<Vec<_>>(),
        ));
        let batch_size = ctx.copied_config().batch_size().max(1);
        let batches = rows
            .chunks(batch_size)
            .map(|chunk| to_record_batch(&schema, chunk))
            .collect::<StoreResult<Vec<_>>>()?;
        let table = MemTable::try_new(schema, vec![batches])?;
        ctx.register_table(name.as_str(), Arc::new(table))?;
        info!(
            "created working set {name} from {} with {} rows and {} columns",
            target.table,
            rows.len(),
            columns.len() - 1
        );

        Ok(Self {
            ctx: ctx.clone(),
            name,
            columns,
            rows: rows.len(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn ctx(&self) -> &SessionContext {
        &self.ctx
    }

    /// The number of rows `m`.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The feature dimension `n`, including the bias column.
    pub fn cols(&self) -> usize {
        self.columns.len() - 1
    }

    /// The label column followed by the feature columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The query that runs one pass through the given aggregate function.
    /// The function name must be a lowercase SQL identifier.
    pub fn aggregate_sql(&self, function: &str) -> String {
        let arguments = self
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "SELECT {function}({arguments}) FROM {};",
            quote_identifier(&self.name)
        )
    }
}

impl Drop for WorkingSet {
    fn drop(&mut self) {
        match self.ctx.deregister_table(self.name.as_str()) {
            Ok(_) => info!("dropped working set {}", self.name),
            Err(e) => warn!("failed to drop working set {}: {e}", self.name),
        }
    }
}

/// Casts a numeric column to `Float64`, rejecting other types and nulls.
pub(crate) fn numeric_array(name: &str, array: &ArrayRef) -> MlResult<ArrayRef> {
    let data_type = array.data_type();
    if !data_type.is_numeric() {
        return Err(MlError::input(format!(
            "non-numeric value found in {name}: {data_type}"
        )));
    }
    if array.null_count() > 0 {
        return Err(MlError::input(format!("null value found in {name}")));
    }
    cast(array, &DataType::Float64).map_err(|e| MlError::input(e.to_string()))
}

async fn read_rows(ctx: &SessionContext, target: &TrainingTarget) -> StoreResult<Vec<Row>> {
    let exprs = std::iter::once(&target.label)
        .chain(target.features.iter())
        .map(|c| ident(c.as_str()))
        .collect::<Vec<_>>();
    let batches = ctx
        .table(target.table.as_str())
        .await?
        .select(exprs)?
        .collect()
        .await?;

    let mut rows = vec![];
    for batch in batches {
        let arrays = batch
            .columns()
            .iter()
            .zip(std::iter::once(&target.label).chain(target.features.iter()))
            .map(|(array, name)| numeric_array(name, array))
            .collect::<MlResult<Vec<_>>>()?;
        let arrays = arrays
            .iter()
            .map(|a| as_float64_array(a))
            .collect::<datafusion::common::Result<Vec<_>>>()?;
        let [label, features @ ..] = arrays.as_slice() else {
            return Err(StoreError::internal("missing label column"));
        };
        for i in 0..batch.num_rows() {
            let raw = features.iter().map(|a| a.value(i)).collect::<Vec<_>>();
            let row = Row::new(label.value(i), with_bias(&raw));
            row.validate()?;
            rows.push(row);
        }
    }
    Ok(rows)
}

fn to_record_batch(schema: &SchemaRef, rows: &[Row]) -> StoreResult<RecordBatch> {
    let width = schema.fields().len() - 1;
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(width + 1);
    columns.push(Arc::new(Float64Array::from_iter_values(
        rows.iter().map(Row::label),
    )));
    for j in 0..width {
        columns.push(Arc::new(Float64Array::from_iter_values(
            rows.iter().map(|row| row.features()[j]),
        )));
    }
    Ok(RecordBatch::try_new(Arc::clone(schema), columns)?)
}
