//! Parse context flags for context-sensitive parsing.

use bitflags::bitflags;

bitflags! {
    /// Flags threaded through expression parsing.
    ///
    /// `if x {` and `for x {` would otherwise read `x {` as the start of a
    /// struct literal.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ParseContext: u8 {
        /// `Name{...}` is not a struct literal here.
        const NO_STRUCT_LITERAL = 1 << 0;
    }
}
