//! Validated, immutable vector storage.

use crate::graph::NodeId;
use crate::{HswError, Result};
use hsw_vector::validate_vector;

/// An ordered set of equal-length vectors.
///
/// Row `i` becomes node `i` of the index. Rows are stored contiguously.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    data: Vec<f32>,
    dimensions: usize,
}

impl Dataset {
    /// Build a dataset from rows.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if there are no rows, rows have zero length, or
    ///   rows disagree on length
    /// - `Vector(InvalidVector)` if any component is NaN or infinite
    pub fn new(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dimensions = match rows.first() {
            Some(row) => row.len(),
            None => {
                return Err(HswError::InvalidParameter("dataset is empty".to_string()));
            }
        };
        Self::check_shape(rows.len(), dimensions)?;

        let mut data = Vec::with_capacity(rows.len() * dimensions);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dimensions {
                return Err(HswError::InvalidParameter(format!(
                    "row {} has {} dimensions, expected {}",
                    i,
                    row.len(),
                    dimensions
                )));
            }
            validate_vector(row, dimensions)?;
            data.extend_from_slice(row);
        }

        Ok(Self { data, dimensions })
    }

    /// Build a dataset from a row-major buffer.
    pub fn from_flat(data: Vec<f32>, dimensions: usize) -> Result<Self> {
        if dimensions == 0 || data.len() % dimensions != 0 {
            return Err(HswError::InvalidParameter(format!(
                "buffer of {} values cannot be split into rows of {}",
                data.len(),
                dimensions
            )));
        }
        Self::check_shape(data.len() / dimensions, dimensions)?;

        for row in data.chunks_exact(dimensions) {
            validate_vector(row, dimensions)?;
        }

        Ok(Self { data, dimensions })
    }

    fn check_shape(len: usize, dimensions: usize) -> Result<()> {
        if len == 0 {
            return Err(HswError::InvalidParameter("dataset is empty".to_string()));
        }
        if dimensions == 0 {
            return Err(HswError::InvalidParameter(
                "vectors must have at least one dimension".to_string(),
            ));
        }
        if len > NodeId::MAX as usize {
            return Err(HswError::InvalidParameter(format!(
                "dataset of {} vectors exceeds the node id range",
                len
            )));
        }
        Ok(())
    }

    /// Number of vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimensions
    }

    /// Always false; an empty dataset cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dimension shared by every row.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Row for node `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[inline]
    pub fn row(&self, id: NodeId) -> &[f32] {
        let start = id as usize * self.dimensions;
        &self.data[start..start + self.dimensions]
    }

    /// Row for node `id`, or `None` if out of range.
    pub fn get(&self, id: NodeId) -> Option<&[f32]> {
        if (id as usize) < self.len() {
            Some(self.row(id))
        } else {
            None
        }
    }

    /// Iterate rows in node order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.dimensions)
    }
}
