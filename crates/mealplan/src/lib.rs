mod days;
mod generate;
mod history;
mod mutation;

pub use days::*;
pub use generate::*;
pub use history::*;
pub use mutation::*;
