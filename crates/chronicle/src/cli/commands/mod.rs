//! CLI commands

mod check;
mod completions;
mod init;
mod list;
mod render;
mod resolve;
mod show;

pub use check::CheckCommand;
pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use render::RenderCommand;
pub use resolve::ResolveCommand;
pub use show::ShowCommand;
