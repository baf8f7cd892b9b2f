//! Faults raised while keying a thread.
//!
//! A dangling `parent` reference is not one of them: such records are
//! keyed as roots. Every variant here aborts the call; keys written before
//! the fault stay on their records.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadError {
    /// The parent passed the root-ness check but could not be resolved when
    /// the child was keyed. Indicates a logic fault, not bad input.
    MissingParent { id: String, parent: String },
    /// `set_key` was called but the record still reports no key.
    KeyNotStored { id: String },
    /// The record was reached again through its own ancestor chain.
    Cycle { id: String },
}

impl std::fmt::Display for ThreadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadError::MissingParent { id, parent } => write!(
                f,
                "internal consistency fault: parent '{parent}' of item '{id}' vanished during keying"
            ),
            ThreadError::KeyNotStored { id } => {
                write!(f, "item '{id}' did not retain its assigned key")
            }
            ThreadError::Cycle { id } => {
                write!(f, "item '{id}' is its own ancestor")
            }
        }
    }
}

impl std::error::Error for ThreadError {}
