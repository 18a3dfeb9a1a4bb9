//! Python bindings for scalable-bloom using PyO3

use crate::hash::{HashFunction, HashFunctionFactory};
use crate::{BloomFilter, FilterError, ScalableBloomFilter};
use numpy::{IntoPyArray, PyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

impl From<FilterError> for PyErr {
    fn from(err: FilterError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn require_item(item: Option<&str>) -> Result<&str, FilterError> {
    item.ok_or_else(|| FilterError::InvalidInput("Item must not be None".to_string()))
}

fn require_items(items: Option<Vec<String>>) -> Result<Vec<String>, FilterError> {
    items.ok_or_else(|| FilterError::InvalidInput("Item collection must not be None".to_string()))
}

fn bit_array<'py>(py: Python<'py>, filter: &BloomFilter) -> &'py PyArray1<u8> {
    let bits: Vec<u8> = filter.bits().iter().map(u8::from).collect();
    bits.into_pyarray(py)
}

/// Python wrapper for a standard BloomFilter
#[pyclass(name = "BloomFilter")]
struct PyBloomFilter {
    inner: BloomFilter,
}

#[pymethods]
impl PyBloomFilter {
    #[new]
    fn new(num_bits: usize, num_hashes: usize) -> PyResult<Self> {
        Ok(PyBloomFilter {
            inner: BloomFilter::new(num_bits, num_hashes)?,
        })
    }

    #[staticmethod]
    fn with_accuracy(expected_items: usize, probability: f64) -> PyResult<Self> {
        Ok(PyBloomFilter {
            inner: BloomFilter::with_accuracy(expected_items, probability)?,
        })
    }

    #[staticmethod]
    fn with_probability(probability: f64, num_bits: usize) -> PyResult<Self> {
        Ok(PyBloomFilter {
            inner: BloomFilter::with_probability(probability, num_bits)?,
        })
    }

    fn add(&mut self, item: Option<&str>) -> PyResult<()> {
        self.inner.add(require_item(item)?);
        Ok(())
    }

    fn add_all(&mut self, items: Option<Vec<String>>) -> PyResult<()> {
        self.inner.add_all(require_items(items)?);
        Ok(())
    }

    fn query(&self, item: Option<&str>) -> PyResult<bool> {
        Ok(self.inner.query(require_item(item)?))
    }

    fn __contains__(&self, item: &str) -> bool {
        self.inner.query(item)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn array<'py>(&self, py: Python<'py>) -> &'py PyArray1<u8> {
        bit_array(py, &self.inner)
    }

    fn num_bits(&self) -> usize {
        self.inner.num_bits()
    }

    fn num_hashes(&self) -> usize {
        self.inner.num_hashes()
    }

    fn load_factor(&self) -> f64 {
        self.inner.load_factor()
    }

    fn estimated_fpr(&self) -> f64 {
        self.inner.estimated_fpr()
    }

    fn stats(&self) -> String {
        self.inner.stats().to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "BloomFilter(num_bits={}, num_hashes={}, len={})",
            self.inner.num_bits(),
            self.inner.num_hashes(),
            self.inner.len()
        )
    }
}

/// Python wrapper for a partitioned BloomFilter
#[pyclass(name = "PartitionedBloomFilter")]
struct PyPartitionedBloomFilter {
    inner: BloomFilter,
}

#[pymethods]
impl PyPartitionedBloomFilter {
    #[new]
    fn new(num_bits: usize, num_hashes: usize) -> PyResult<Self> {
        Ok(PyPartitionedBloomFilter {
            inner: BloomFilter::partitioned(num_bits, num_hashes)?,
        })
    }

    #[staticmethod]
    fn with_accuracy(expected_items: usize, probability: f64) -> PyResult<Self> {
        Ok(PyPartitionedBloomFilter {
            inner: BloomFilter::partitioned_with_accuracy(expected_items, probability)?,
        })
    }

    #[staticmethod]
    fn with_probability(probability: f64, num_bits: usize) -> PyResult<Self> {
        Ok(PyPartitionedBloomFilter {
            inner: BloomFilter::partitioned_with_probability(probability, num_bits)?,
        })
    }

    fn add(&mut self, item: Option<&str>) -> PyResult<()> {
        self.inner.add(require_item(item)?);
        Ok(())
    }

    fn add_all(&mut self, items: Option<Vec<String>>) -> PyResult<()> {
        self.inner.add_all(require_items(items)?);
        Ok(())
    }

    fn query(&self, item: Option<&str>) -> PyResult<bool> {
        Ok(self.inner.query(require_item(item)?))
    }

    fn __contains__(&self, item: &str) -> bool {
        self.inner.query(item)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn array<'py>(&self, py: Python<'py>) -> &'py PyArray1<u8> {
        bit_array(py, &self.inner)
    }

    fn partition_boundaries(&self) -> Vec<usize> {
        self.inner
            .partition_boundaries()
            .map(<[usize]>::to_vec)
            .unwrap_or_default()
    }

    fn stats(&self) -> String {
        self.inner.stats().to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "PartitionedBloomFilter(num_bits={}, num_hashes={}, len={})",
            self.inner.num_bits(),
            self.inner.num_hashes(),
            self.inner.len()
        )
    }
}

/// Python wrapper for ScalableBloomFilter
#[pyclass(name = "ScalableBloomFilter")]
struct PyScalableBloomFilter {
    inner: ScalableBloomFilter,
}

#[pymethods]
impl PyScalableBloomFilter {
    #[new]
    #[pyo3(signature = (fill_limit, probability, tightening_ratio = crate::DEFAULT_TIGHTENING_RATIO))]
    fn new(fill_limit: usize, probability: f64, tightening_ratio: f64) -> PyResult<Self> {
        Ok(PyScalableBloomFilter {
            inner: ScalableBloomFilter::with_tightening_ratio(
                fill_limit,
                probability,
                tightening_ratio,
            )?,
        })
    }

    fn add(&mut self, item: Option<&str>) -> PyResult<()> {
        Ok(self.inner.add(require_item(item)?)?)
    }

    fn add_all(&mut self, items: Option<Vec<String>>) -> PyResult<()> {
        Ok(self.inner.add_all(require_items(items)?)?)
    }

    fn query(&self, item: Option<&str>) -> PyResult<bool> {
        Ok(self.inner.query(require_item(item)?))
    }

    fn query_filter(&self, index: usize, item: Option<&str>) -> PyResult<Option<bool>> {
        Ok(self.inner.query_filter(index, require_item(item)?))
    }

    fn __contains__(&self, item: &str) -> bool {
        self.inner.query(item)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn num_filters(&self) -> usize {
        self.inner.num_filters()
    }

    fn probabilities<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        self.inner.probabilities().to_vec().into_pyarray(py)
    }

    fn compound_fpr_bound(&self) -> f64 {
        self.inner.compound_fpr_bound()
    }

    fn stats(&self) -> String {
        self.inner.stats().to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScalableBloomFilter(filters={}, len={})",
            self.inner.num_filters(),
            self.inner.len()
        )
    }
}

/// Hash raw bytes with a named function ("fnv1", "fnv1a" or "murmur")
#[pyfunction]
fn hash_bytes(function: &str, data: &[u8]) -> PyResult<u32> {
    Ok(HashFunctionFactory::from_name(function)?.hash(data))
}

/// Python module definition
#[pymodule]
fn scalable_bloom(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyBloomFilter>()?;
    m.add_class::<PyPartitionedBloomFilter>()?;
    m.add_class::<PyScalableBloomFilter>()?;

    m.add_function(wrap_pyfunction!(hash_bytes, m)?)?;

    m.add("DEFAULT_TIGHTENING_RATIO", crate::DEFAULT_TIGHTENING_RATIO)?;
    m.add("__version__", "0.1.0")?;

    Ok(())
}
