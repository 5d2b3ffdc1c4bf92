pub mod aggregate;
pub mod clean;
pub mod summary;
pub mod table;

pub use aggregate::{
    aggregate, AggregateError, AggregateOptions, AggregateStats, Aggregation, BlankCategory,
};
pub use clean::{clean_value, parse_number, NumberStyle};
pub use summary::{ErrorReport, Summary};
pub use table::Table;
