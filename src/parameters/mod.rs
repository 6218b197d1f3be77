pub mod parameters;

pub use parameters::{
    Error, Parameter, ParameterMap, ParameterTree, ParameterValue, parse_string,
};
