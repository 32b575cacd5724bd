//! Stage 2 value encoding: range bucketing and categorical codes.

pub mod bucketizer;
pub mod categorical;

pub use bucketizer::{BucketSpec, OUT_OF_RANGE_LABEL, bucketize, bucketize_column};
pub use categorical::{
    AuditEntry, AuditTable, CategoricalEncoder, ColumnMapping, MISSING_PLACEHOLDER,
    UNMAPPED_CODE, build_mapping, encode, sorted_distinct,
};
