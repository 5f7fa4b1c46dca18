use std::fmt::Display;

use error_stack::Context;

#[derive(Debug)]
pub enum KernelError {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Dependency,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Validation => write!(f, "Malformed input"),
            KernelError::NotFound => write!(f, "Referenced entity does not exist"),
            KernelError::Forbidden => {
                write!(f, "Principal is not permitted to perform this action")
            }
            KernelError::Conflict => {
                write!(f, "Resource state does not allow the requested transition")
            }
            KernelError::Dependency => write!(f, "External collaborator failed"),
        }
    }
}

impl Context for KernelError {}
