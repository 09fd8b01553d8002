pub mod config;
pub mod domain {
    pub mod context;
    pub mod country;
    pub mod rotation;
}
pub mod error;
pub mod repo {
    pub mod rotations_repo;
}
pub mod rotation {
    pub mod cache;
    pub mod filter;
    pub mod grouping;
    pub mod kind;
    pub mod memory_store;
    pub mod priority;
    pub mod store;
    pub mod weighted;
}
pub mod service {
    pub mod rotation_service;
}
