use thiserror::Error;

#[derive(Error, Debug)]
pub enum FollowscoutError {
    #[error("Sink error: {0}")]
    Sink(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
