use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("stock already in watchlist")]
    AlreadyInWatchlist,

    #[error("stock not in watchlist")]
    NotInWatchlist,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
