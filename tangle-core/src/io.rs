//! Readers and writers for network, attribute, and zone files.

mod attributes;
mod pajek;
mod zones;

pub use attributes::{
    read_binary_columns, read_categorical_columns, read_continuous_columns, read_set_columns,
};
pub use pajek::{read_pajek, write_pajek};
pub use zones::read_zones;
