use rowagg_error::{DbError, Result};

use crate::arrays::scalar::ScalarValue;

/// Mutable view over the accumulator slots owned by a single aggregate call.
#[derive(Debug)]
pub struct StateSlotsMut<'a> {
    function: &'a str,
    slots: &'a mut [ScalarValue],
}

impl<'a> StateSlotsMut<'a> {
    pub fn new(function: &'a str, slots: &'a mut [ScalarValue]) -> Self {
        StateSlotsMut { function, slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, idx: usize) -> Result<&ScalarValue> {
        let len = self.slots.len();
        self.slots
            .get(idx)
            .ok_or_else(|| slot_out_of_range(self.function, idx, len))
    }

    pub fn get_mut(&mut self, idx: usize) -> Result<&mut ScalarValue> {
        let len = self.slots.len();
        let function = self.function;
        self.slots
            .get_mut(idx)
            .ok_or_else(|| slot_out_of_range(function, idx, len))
    }

    pub fn set(&mut self, idx: usize, value: ScalarValue) -> Result<()> {
        *self.get_mut(idx)? = value;
        Ok(())
    }

    pub fn as_slots(&self) -> StateSlots<'_> {
        StateSlots {
            function: self.function,
            slots: &*self.slots,
        }
    }
}

/// Read-only view over the accumulator slots owned by a single aggregate call.
#[derive(Debug, Clone, Copy)]
pub struct StateSlots<'a> {
    function: &'a str,
    slots: &'a [ScalarValue],
}

impl<'a> StateSlots<'a> {
    pub fn new(function: &'a str, slots: &'a [ScalarValue]) -> Self {
        StateSlots { function, slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, idx: usize) -> Result<&'a ScalarValue> {
        self.slots
            .get(idx)
            .ok_or_else(|| slot_out_of_range(self.function, idx, self.slots.len()))
    }
}

fn slot_out_of_range(function: &str, idx: usize, len: usize) -> DbError {
    DbError::state_layout_mismatch(format!(
        "Aggregate '{function}' accessed a state slot it did not declare"
    ))
    .with_field("slot", idx)
    .with_field("declared_slots", len)
}

#[cfg(test)]
mod tests {
    use rowagg_error::ErrorKind;

    use super::*;

    #[test]
    fn out_of_range_is_layout_mismatch() {
        let mut slots = vec![ScalarValue::Int64(0)];
        let mut view = StateSlotsMut::new("count", &mut slots);

        view.set(0, ScalarValue::Int64(4)).unwrap();
        let err = view.set(1, ScalarValue::Int64(4)).unwrap_err();
        assert_eq!(ErrorKind::StateLayoutMismatch, err.kind());

        let err = view.as_slots().get(2).unwrap_err();
        assert_eq!(ErrorKind::StateLayoutMismatch, err.kind());

        assert_eq!(vec![ScalarValue::Int64(4)], slots);
    }
}
