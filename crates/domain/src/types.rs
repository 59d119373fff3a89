//! Wire models for the Skylift control-plane API.
//!
//! All types follow the server's camelCase JSON. Fields the server may omit
//! carry serde defaults so partial payloads still decode.

pub mod operation;
pub mod resources;
pub mod search;

pub use operation::{Operation, OperationPhase};
pub use resources::{
    ClientAccount, ClientUser, CreateProjectEnvRequest, CreateProjectRequest, ImportRequest,
    Project, Region, Service, ServicePort, ServiceStackInfo, User,
};
pub use search::{Items, SearchFilter, SearchRequest, SearchResult, SortCriteria};
