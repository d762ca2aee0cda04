mod column;
mod constraint;
mod data;
pub mod features;
mod foreign_key;
mod index;
mod sequence;
mod types;

pub use column::{ColumnDefinition, ColumnModification};
pub use constraint::{ConstraintDefinition, ConstraintKind};
pub use data::DataRow;
pub use features::AdditionalFeatures;
pub use foreign_key::{ForeignKeyDefinition, ReferentialAction};
pub use index::{IndexColumn, IndexDefinition, IndexOrder};
pub use sequence::SequenceDefinition;
pub use types::DbType;
