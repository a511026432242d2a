//! modelc model
//!
//! Semantic graph of a conceptual data model, the two XML front ends that
//! build it, association resolution and initializer data.

pub mod association;
pub mod dialect;
pub mod graph;
pub mod init;
pub mod naming;
pub mod raw;
pub mod reader;
mod xml;

pub use association::{EndInfo, Multiplicity, Rejection, Resolution, Side};
pub use dialect::{dialect_for, ModelDialect, OomDialect, XmiDialect};
pub use graph::{
    Ancestry, ClassId, DataContract, DataMember, Domain, Graph, ModelClass, ModelProperty,
    ModelRoot, Namespace, NamespaceId, PropertyKind, Stereotype,
};
pub use init::{InitError, InitMap, InitValue, ItemInit, ListKind, TableInit};
pub use reader::{ModelReader, ModelSource, ReadError, ReaderOptions};
