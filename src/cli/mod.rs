mod dispatch;
mod parse;

pub use cli::dispatch::dispatch;
pub use cli::parse::parse_from_safe;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    /// Print the resolved external IP; needs neither config nor credentials.
    MyIp,
    /// Clear the group's rules, upload fresh ones, attach the group.
    Open,
    /// Detach the group from the selected instances.
    Close,
}
