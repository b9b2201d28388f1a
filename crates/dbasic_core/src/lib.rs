//! dbasic_core: Core types shared by the dbasic compiler front end.
//!
//! Provides the virtual machine's value type, source positions used by
//! diagnostics, and the small collections the scanner builds on.

pub mod collections;
pub mod text;

// Re-export commonly used types
pub use collections::OrderedSet;
pub use text::SourcePosition;

/// A value as stored by the target virtual machine (`VMVALUE`).
///
/// Numeric literals are reduced to this width; wider values wrap.
pub type VmValue = i32;
