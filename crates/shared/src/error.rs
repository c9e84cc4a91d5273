#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validate(#[from] validator::ValidationErrors),

    #[error("invalid day index {0}, expected 0-6")]
    InvalidDay(u8),

    #[error("every day of the week is excluded, no day is available for placement")]
    AllDaysExcluded,

    #[error("no category quota set but {total_meals} meals were requested")]
    EmptyQuota { total_meals: u32 },

    #[error("recipe {0} is not part of the plan")]
    NotInPlan(String),

    #[error("recipe {0} not found")]
    RecipeNotFound(String),

    #[error("no other {0} recipe is available to swap in")]
    NoSwapCandidate(String),

    #[error("unknown shopping category {0}")]
    UnknownCategory(String),

    #[error("shopping item {0} not found")]
    ItemNotFound(String),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Server(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::Error::Server(format!($err)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Server(format!($fmt, $($arg)*)))
    };
}
