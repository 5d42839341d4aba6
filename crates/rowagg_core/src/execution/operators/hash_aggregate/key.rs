use std::hash::{Hash, Hasher};

use rowagg_error::Result;

use crate::arrays::row::Row;
use crate::arrays::scalar::ScalarValue;

/// Values identifying a group.
///
/// NULLs compare equal to each other. Floats compare by bit pattern after
/// folding -0.0 into 0.0 and every NaN into a single NaN.
#[derive(Debug, Clone)]
pub struct GroupKey(pub Vec<ScalarValue>);

impl GroupKey {
    pub fn into_values(self) -> Vec<ScalarValue> {
        self.0
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(a, b)| scalar_group_eq(a, b))
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.0.len());
        for value in &self.0 {
            hash_scalar(value, state);
        }
    }
}

fn normalize_f32(v: f32) -> u32 {
    if v.is_nan() {
        f32::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

fn normalize_f64(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

fn scalar_group_eq(a: &ScalarValue, b: &ScalarValue) -> bool {
    match (a, b) {
        (ScalarValue::Float32(a), ScalarValue::Float32(b)) => normalize_f32(*a) == normalize_f32(*b),
        (ScalarValue::Float64(a), ScalarValue::Float64(b)) => normalize_f64(*a) == normalize_f64(*b),
        (a, b) => a == b,
    }
}

fn hash_scalar<H: Hasher>(value: &ScalarValue, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        ScalarValue::Null => (),
        ScalarValue::Boolean(v) => v.hash(state),
        ScalarValue::Int8(v) => v.hash(state),
        ScalarValue::Int16(v) => v.hash(state),
        ScalarValue::Int32(v) => v.hash(state),
        ScalarValue::Int64(v) => v.hash(state),
        ScalarValue::UInt8(v) => v.hash(state),
        ScalarValue::UInt16(v) => v.hash(state),
        ScalarValue::UInt32(v) => v.hash(state),
        ScalarValue::UInt64(v) => v.hash(state),
        ScalarValue::Float32(v) => normalize_f32(*v).hash(state),
        ScalarValue::Float64(v) => normalize_f64(*v).hash(state),
        ScalarValue::Utf8(v) => v.hash(state),
        ScalarValue::Binary(v) => v.hash(state),
    }
}

/// Projects an input row onto the output key for one grouping set.
///
/// Output layout: [KEY_VALS, INDICATORS]. Key columns excluded from the set
/// are NULL. Indicators are only present when requested, one per key column,
/// true when that column is rolled up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySelector {
    /// All group columns in ascending order.
    group_columns: Vec<usize>,
    /// Whether each group column participates in this set.
    included: Vec<bool>,
    indicator: bool,
}

impl KeySelector {
    pub fn new(
        group_columns: Vec<usize>,
        grouping_set: impl IntoIterator<Item = usize>,
        indicator: bool,
    ) -> Self {
        let set: Vec<usize> = grouping_set.into_iter().collect();
        let included = group_columns.iter().map(|col| set.contains(col)).collect();
        KeySelector {
            group_columns,
            included,
            indicator,
        }
    }

    /// Number of values in keys produced by this selector.
    pub fn key_width(&self) -> usize {
        if self.indicator {
            self.group_columns.len() * 2
        } else {
            self.group_columns.len()
        }
    }

    /// Columns of the input that participate in this set.
    pub fn set_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.group_columns
            .iter()
            .zip(&self.included)
            .filter_map(|(col, included)| included.then_some(*col))
    }

    pub fn select(&self, row: &Row) -> Result<GroupKey> {
        let mut key = Vec::with_capacity(self.key_width());
        for (&col, &included) in self.group_columns.iter().zip(&self.included) {
            if included {
                key.push(row.try_column(col)?.clone());
            } else {
                key.push(ScalarValue::Null);
            }
        }

        if self.indicator {
            key.extend(self.included.iter().map(|&inc| ScalarValue::Boolean(!inc)));
        }

        Ok(GroupKey(key))
    }
}
