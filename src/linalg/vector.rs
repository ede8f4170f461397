//! Private Module

use super::Matrix;
use crate::error::LinalgError;
use approx::AbsDiffEq;
use ndarray::prelude::*;
use ndarray::NdFloat; // includes LinalgScalar and ScalarOperand
use num_traits::Float;
use std::fmt;
use std::ops::Index;

/// Dense real vector of fixed dimension
///
/// The dimension is part of a vector's identity: every binary operation
/// checks it and fails with [`LinalgError::DimensionMismatch`] instead of
/// broadcasting. Operations never mutate their operands, they return
/// new vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<A = f64> {
    data: Array1<A>,
}

impl<A: NdFloat> Vector<A> {
    /// The zero vector of the given dimension
    pub fn zeros(dimension: usize) -> Self {
        Self {
            data: Array1::zeros(dimension),
        }
    }

    /// A vector with every coordinate equal to `value`
    pub fn filled(dimension: usize, value: A) -> Self {
        Self {
            data: Array1::from_elem(dimension, value),
        }
    }

    pub fn from_vec(points: Vec<A>) -> Self {
        Self {
            data: Array1::from(points),
        }
    }

    /// Unit vector $`e_i`$ of the given dimension
    pub fn unit(dimension: usize, index: usize) -> Result<Self, LinalgError> {
        Self::zeros(dimension).add_at(index, A::one())
    }

    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, index: usize) -> Option<A> {
        self.data.get(index).copied()
    }

    pub fn view(&self) -> ArrayView1<'_, A> {
        self.data.view()
    }

    pub fn into_array(self) -> Array1<A> {
        self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &A> + '_ {
        self.data.iter()
    }

    pub fn to_vec(&self) -> Vec<A> {
        self.data.to_vec()
    }

    fn check(&self, other: &Self) -> Result<(), LinalgError> {
        if self.dimension() == other.dimension() {
            Ok(())
        } else {
            Err(LinalgError::DimensionMismatch {
                expected: self.dimension(),
                found: other.dimension(),
            })
        }
    }

    fn check_index(&self, index: usize) -> Result<(), LinalgError> {
        if index < self.dimension() {
            Ok(())
        } else {
            Err(LinalgError::IndexOutOfBounds {
                index,
                dimension: self.dimension(),
            })
        }
    }

    pub fn add(&self, other: &Self) -> Result<Self, LinalgError> {
        self.check(other)?;
        Ok(Self::from(&self.data + &other.data))
    }

    pub fn sub(&self, other: &Self) -> Result<Self, LinalgError> {
        self.check(other)?;
        Ok(Self::from(&self.data - &other.data))
    }

    /// `self + alpha * direction`, the point reached by a step along a direction
    pub fn offset(&self, alpha: A, direction: &Self) -> Result<Self, LinalgError> {
        self.check(direction)?;
        let mut data = self.data.clone();
        data.scaled_add(alpha, &direction.data);
        Ok(Self::from(data))
    }

    /// Multiply every coordinate by `k`
    pub fn scale(&self, k: A) -> Self {
        Self::from(&self.data * k)
    }

    pub fn add_scalar(&self, k: A) -> Self {
        Self::from(&self.data + k)
    }

    pub fn sub_scalar(&self, k: A) -> Self {
        Self::from(&self.data - k)
    }

    /// Copy of `self` with `k` added to a single coordinate
    pub fn add_at(&self, index: usize, k: A) -> Result<Self, LinalgError> {
        self.check_index(index)?;
        let mut data = self.data.clone();
        data[index] += k;
        Ok(Self::from(data))
    }

    /// Copy of `self` with `k` subtracted from a single coordinate
    pub fn sub_at(&self, index: usize, k: A) -> Result<Self, LinalgError> {
        self.add_at(index, -k)
    }

    /// Inner product
    pub fn dot(&self, other: &Self) -> Result<A, LinalgError> {
        self.check(other)?;
        Ok(self.data.dot(&other.data))
    }

    /// Element-wise product
    pub fn hadamard(&self, other: &Self) -> Result<Self, LinalgError> {
        self.hadamard_from(other, 0)
    }

    /// Element-wise product of the coordinates from `start` on, the
    /// leading coordinates of the result are zero.
    pub fn hadamard_from(&self, other: &Self, start: usize) -> Result<Self, LinalgError> {
        self.check(other)?;
        let mut data = Array1::zeros(self.dimension());
        let start = start.min(self.dimension());
        data.slice_mut(s![start..])
            .assign(&(&self.data.slice(s![start..]) * &other.data.slice(s![start..])));
        Ok(Self::from(data))
    }

    pub fn sum(&self) -> A {
        self.data.sum()
    }

    /// Sum of the coordinates from `start` on
    pub fn sum_from(&self, start: usize) -> A {
        let start = start.min(self.dimension());
        self.data.slice(s![start..]).sum()
    }

    /// Euclidean length
    pub fn norm(&self) -> A {
        Float::sqrt(self.data.dot(&self.data))
    }

    /// Outer product $`u v^T`$, a column times a row
    pub fn outer(&self, other: &Self) -> Matrix<A> {
        let column = self.data.view().insert_axis(Axis(1));
        let row = other.data.view().insert_axis(Axis(0));
        Matrix::from(column.dot(&row))
    }

    pub fn neg(&self) -> Self {
        Self::from(self.data.mapv(|v| -v))
    }
}

impl<A> From<Array1<A>> for Vector<A> {
    fn from(data: Array1<A>) -> Self {
        Self { data }
    }
}

impl<A: NdFloat> From<Vec<A>> for Vector<A> {
    fn from(points: Vec<A>) -> Self {
        Self::from_vec(points)
    }
}

impl<A> Index<usize> for Vector<A> {
    type Output = A;

    fn index(&self, index: usize) -> &A {
        &self.data[index]
    }
}

impl<A: NdFloat> fmt::Display for Vector<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

impl<A> AbsDiffEq for Vector<A>
where
    A: NdFloat + AbsDiffEq<Epsilon = A>,
{
    type Epsilon = A;

    fn default_epsilon() -> A {
        A::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: A) -> bool {
        self.data.abs_diff_eq(&other.data, epsilon)
    }
}
