mod graph;
mod model;
mod resolver;
mod sacctmgr;
mod store;

pub use graph::{AssociationGraph, AssociationQuery, Children, ResolveError};
pub use model::{
    AccountRecord, AdminLevel, AssociationDetail, AssociationEdge, QosRecord, UserRecord,
};
pub use resolver::{AccountTree, AccountUser, AssociationTree, Resolver, UserPartitions};
pub use sacctmgr::{Listing, SacctmgrQuery, SacctmgrStore};
pub use store::{AccountingStore, StoreError};
