pub mod avg;
pub mod boolean;
pub mod count;
pub mod first;
pub mod minmax;
pub mod single_value;
pub mod sum;

use crate::functions::function_set::AggregateFunctionSet;

pub const BUILTIN_AGGREGATE_FUNCTION_SETS: &[AggregateFunctionSet] = &[
    count::FUNCTION_SET_COUNT,
    sum::FUNCTION_SET_SUM,
    sum::FUNCTION_SET_SUM0,
    avg::FUNCTION_SET_AVG,
    minmax::FUNCTION_SET_MIN,
    minmax::FUNCTION_SET_MAX,
    boolean::FUNCTION_SET_BOOL_AND,
    boolean::FUNCTION_SET_BOOL_OR,
    first::FUNCTION_SET_FIRST,
    single_value::FUNCTION_SET_SINGLE_VALUE,
];
