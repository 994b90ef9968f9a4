pub mod check;
pub mod show;

pub use check::CheckCommand;
pub use show::ShowCommand;
