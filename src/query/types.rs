//! Query types

/// Direction for relation traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Follow outgoing relations (source -> target)
    #[default]
    Outgoing,
    /// Follow incoming relations (target <- source)
    Incoming,
}
