/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines sample tables with missing values, georeferenced data, and CSV loading.
//
// Created on: 14 Oct 2026     Author: Daniel Owen
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    domain::{Domain, PointSet},
    error::{GeoStatsError, Result},
};
use csv::ReaderBuilder;
use faer::{Mat, MatRef};
use ferreus_geostats_utils::select_mat_rows;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Cell contents read as a missing value when loading CSV files.
const MISSING_TOKENS: [&str; 4] = ["", "NA", "NaN", "nan"];

/// Named columns of measurements, one row per domain element.
///
/// Missing measurements are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTable {
    columns: BTreeMap<String, Vec<Option<f64>>>,
    num_rows: usize,
}

impl SampleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column. The first column fixes the number of rows.
    ///
    /// Non-finite entries are stored as missing.
    pub fn with_column(mut self, name: &str, values: Vec<Option<f64>>) -> Result<Self> {
        if !self.columns.is_empty() && values.len() != self.num_rows {
            return Err(GeoStatsError::DimensionMismatch {
                expected: self.num_rows,
                found: values.len(),
            });
        }
        self.num_rows = values.len();
        let values = values
            .into_iter()
            .map(|v| v.filter(|v| v.is_finite()))
            .collect();
        self.columns.insert(name.to_string(), values);
        Ok(self)
    }

    /// Adds a column of present values. Non-finite entries are stored as missing.
    pub fn with_values(self, name: &str, values: &[f64]) -> Result<Self> {
        self.with_column(name, values.iter().map(|&v| Some(v)).collect())
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Result<&[Option<f64>]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| GeoStatsError::UnknownVariable(name.to_string()))
    }

    /// Row indices at which `column` holds a value.
    pub fn non_missing_indices(&self, column: &str) -> Result<Vec<usize>> {
        Ok(self
            .column(column)?
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect())
    }

    /// Value of `column` at row `index`, `None` when missing or out of range.
    pub fn value_at(&self, column: &str, index: usize) -> Option<f64> {
        self.columns.get(column)?.get(index).copied().flatten()
    }
}

/// The non-missing samples of one variable.
#[derive(Debug, Clone)]
pub struct SampleSet {
    /// Indices of the samples in the data domain.
    pub indices: Vec<usize>,

    /// Sample centroids, one row per sample.
    pub locations: Mat<f64>,

    /// Observed values, aligned with `locations`.
    pub values: Vec<f64>,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean of the observed values.
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len().max(1) as f64
    }
}

/// A sample table georeferenced on a domain.
pub struct SpatialData {
    domain: Box<dyn Domain>,
    table: SampleTable,
}

impl SpatialData {
    pub fn new(domain: impl Domain + 'static, table: SampleTable) -> Result<Self> {
        if domain.num_elements() != table.num_rows() {
            return Err(GeoStatsError::DimensionMismatch {
                expected: domain.num_elements(),
                found: table.num_rows(),
            });
        }
        Ok(Self {
            domain: Box::new(domain),
            table,
        })
    }

    pub fn domain(&self) -> &dyn Domain {
        self.domain.as_ref()
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    /// Selects the non-missing samples of `variable`.
    pub fn samples(&self, variable: &str) -> Result<SampleSet> {
        let indices = self.table.non_missing_indices(variable)?;
        if indices.is_empty() {
            return Err(GeoStatsError::InsufficientData {
                variable: variable.to_string(),
            });
        }

        let column = self.table.column(variable)?;
        let values = indices
            .iter()
            .filter_map(|&i| column[i])
            .collect::<Vec<_>>();
        let locations = select_mat_rows(&self.domain.centroids(), &indices);

        Ok(SampleSet {
            indices,
            locations,
            values,
        })
    }

    /// Loads point samples from a CSV file with a header row.
    ///
    /// `coordinate_columns` name the columns holding point coordinates, in axis
    /// order. Every other column becomes a variable. Empty cells and `NA`/`NaN`
    /// tokens in variable columns are read as missing values; coordinates must
    /// always be present.
    pub fn from_csv_path<P: AsRef<Path>>(path: P, coordinate_columns: &[&str]) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file, coordinate_columns)
    }

    /// Loads point samples from any CSV source. See [`SpatialData::from_csv_path`].
    pub fn from_csv_reader<R: Read>(reader: R, coordinate_columns: &[&str]) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();

        let mut coordinate_positions = Vec::with_capacity(coordinate_columns.len());
        for name in coordinate_columns {
            let position = headers
                .iter()
                .position(|h| h == *name)
                .ok_or_else(|| GeoStatsError::UnknownVariable(name.to_string()))?;
            coordinate_positions.push(position);
        }

        let variable_positions = (0..headers.len())
            .filter(|i| !coordinate_positions.contains(i))
            .collect::<Vec<_>>();

        let mut coords = Vec::new();
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); variable_positions.len()];
        let mut num_rows = 0usize;

        for result in reader.records() {
            let record = result?;

            for &p in coordinate_positions.iter() {
                let cell = record.get(p).unwrap_or("");
                let value = cell.parse::<f64>().map_err(|_| GeoStatsError::Parse {
                    column: headers[p].to_string(),
                    value: cell.to_string(),
                })?;
                coords.push(value);
            }

            for (column, &p) in columns.iter_mut().zip(variable_positions.iter()) {
                let cell = record.get(p).unwrap_or("");
                let value = match MISSING_TOKENS.contains(&cell) {
                    true => None,
                    false => Some(cell.parse::<f64>().map_err(|_| GeoStatsError::Parse {
                        column: headers[p].to_string(),
                        value: cell.to_string(),
                    })?),
                };
                column.push(value);
            }

            num_rows += 1;
        }

        let points = MatRef::from_row_major_slice(
            coords.as_slice(),
            num_rows,
            coordinate_positions.len(),
        )
        .to_owned();

        let mut table = SampleTable::new();
        for (column, &p) in columns.into_iter().zip(variable_positions.iter()) {
            table = table.with_column(&headers[p], column)?;
        }
        // A file with only coordinate columns still carries its row count.
        table.num_rows = num_rows;

        Self::new(PointSet::new(points), table)
    }
}
