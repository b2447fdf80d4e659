use ccg_category::CategoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DerivationError {
    #[error(transparent)]
    Category(#[from] CategoryError),

    #[error("no rule combines `{left}` and `{right}` into `{target}`")]
    NoCombination {
        left: String,
        right: String,
        target: String,
    },

    #[error("cannot change `{child}` into `{target}`")]
    NoUnary { child: String, target: String },
}
