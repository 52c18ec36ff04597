mod batch_results;
mod operation_group;
mod operation_kind;
mod operation_tag;

pub use batch_results::BatchResults;
pub use operation_group::{OperationCompletion, OperationGroup};
pub use operation_kind::{Operation, OperationKind};
pub use operation_tag::OperationTag;
