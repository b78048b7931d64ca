use crate::node::MenuNode;

/// External contributor of a menu forest fragment.
///
/// Each module of the host application registers one provider. Providers are
/// merged in ascending `order`, with declaration order breaking ties, so a
/// module's entries land in a predictable place in the final navigation.
pub trait MenuProvider: Send + Sync {
    /// Relative position among providers; lower contributes first.
    fn order(&self) -> i32;

    /// The top-level nodes this provider contributes.
    ///
    /// Called per build; the returned fragment is owned by the builder and
    /// the provider's own declaration is never mutated.
    fn menu(&self) -> Vec<MenuNode>;
}
