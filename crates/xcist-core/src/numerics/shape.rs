use crate::domain::{XcistError, XcistResult};

/// Row-major owned data with an explicit shape.
///
/// A zero-dimensional array has shape `[]` and holds one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedArray<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> ShapedArray<T> {
    pub fn from_shape_vec(shape: Vec<usize>, data: Vec<T>) -> XcistResult<Self> {
        let Some(expected) = element_count(&shape) else {
            return Err(overflow_error(shape));
        };
        if expected != data.len() {
            return Err(XcistError::InvalidShape {
                shape,
                reason: format!("expected {} elements, got {}", expected, data.len()),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<T>) {
        (self.shape, self.data)
    }

    pub fn get(&self, index: &[usize]) -> Option<&T> {
        if index.len() != self.shape.len() {
            return None;
        }

        let mut offset = 0;
        for (&position, &extent) in index.iter().zip(&self.shape) {
            if position >= extent {
                return None;
            }
            offset = offset * extent + position;
        }
        self.data.get(offset)
    }

    /// Iterates over contiguous runs along the last axis.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        let width = self.shape.last().copied().unwrap_or(1).max(1);
        self.data.chunks(width)
    }

    pub fn map<U>(&self, transform: impl FnMut(&T) -> U) -> ShapedArray<U> {
        ShapedArray {
            shape: self.shape.clone(),
            data: self.data.iter().map(transform).collect(),
        }
    }
}

impl<T: Clone> ShapedArray<T> {
    /// Replicates `row` `count` times into a `[count, row.len()]` array.
    pub fn broadcast_rows(row: &[T], count: usize) -> XcistResult<Self> {
        let shape = vec![count, row.len()];
        let Some(total) = element_count(&shape) else {
            return Err(overflow_error(shape));
        };

        let mut data = Vec::with_capacity(total);
        for _ in 0..count {
            data.extend_from_slice(row);
        }
        Ok(Self { shape, data })
    }
}

fn element_count(shape: &[usize]) -> Option<usize> {
    shape
        .iter()
        .try_fold(1_usize, |total, &extent| total.checked_mul(extent))
}

fn overflow_error(shape: Vec<usize>) -> XcistError {
    XcistError::InvalidShape {
        shape,
        reason: "element count overflows usize".to_string(),
    }
}
