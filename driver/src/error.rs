use error_stack::Report;
use kernel::KernelError;

/// Folds collaborator failures into the kernel error kinds. Everything the
/// store reports is a `Dependency`, except constraint hits that carry
/// transition meaning (unique violations -> `Conflict`).
pub trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}

impl<T> ConvertError for Result<T, sqlx::Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let unique = matches!(
                &error,
                sqlx::Error::Database(db) if db.is_unique_violation()
            );
            if unique {
                Report::from(error).change_context(KernelError::Conflict)
            } else {
                Report::from(error).change_context(KernelError::Dependency)
            }
        })
    }
}

impl<T> ConvertError for Result<T, dotenvy::Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| Report::from(error).change_context(KernelError::Dependency))
    }
}

impl<T> ConvertError for Result<T, serde_json::Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| Report::from(error).change_context(KernelError::Dependency))
    }
}
