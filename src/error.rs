pub type FxStudioResult<T> = Result<T, FxStudioError>;

#[derive(thiserror::Error, Debug)]
pub enum FxStudioError {
    #[error("xml error: {0}")]
    Xml(String),

    #[error("project error: {0}")]
    Project(String),

    #[error("renderer error: {0}")]
    Renderer(String),

    #[error("import error: {0}")]
    Import(String),

    #[error("config error: {0}")]
    Config(String),

    /// A caller handed over a node that does not belong to the tree it is querying.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxStudioError {
    pub fn xml(msg: impl Into<String>) -> Self {
        Self::Xml(msg.into())
    }

    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project(msg.into())
    }

    pub fn renderer(msg: impl Into<String>) -> Self {
        Self::Renderer(msg.into())
    }

    pub fn import(msg: impl Into<String>) -> Self {
        Self::Import(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}
