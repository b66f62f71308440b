use converge_domain::error::StoreError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] StoreError),

    #[error("store not found: {0}")]
    StoreNotFound(String),

    #[error("observer already registered: {name}")]
    ObserverAlreadyRegistered { name: String },

    #[error("observer not found: {0}")]
    ObserverNotFound(String),

    #[error("propagation already enabled")]
    AlreadyEnabled,

    #[error("propagation not enabled")]
    NotEnabled,
}
