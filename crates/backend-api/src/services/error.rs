use expodesk_auth::AuthError;
use expodesk_database::DatabaseError;
use expodesk_mailer::MailerError;
use expodesk_vision::VisionError;

#[derive(Debug)]
pub enum ServiceError {
    NotFound,
    Forbidden,
    BadRequest(String),
    AlreadyClosed,
    Database(DatabaseError),
    Auth(AuthError),
    Mailer(MailerError),
    Vision(VisionError),
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<ServiceError> for crate::ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound => crate::ApiError::not_found("resource not found"),
            ServiceError::Forbidden => crate::ApiError::forbidden("access denied"),
            ServiceError::BadRequest(msg) => crate::ApiError::bad_request(msg),
            ServiceError::AlreadyClosed => {
                crate::ApiError::bad_request("applications already closed for this event")
            }
            ServiceError::Database(db_err) => {
                tracing::error!(error = %db_err, "database error");
                crate::ApiError::internal_server_error("database operation failed")
            }
            ServiceError::Auth(auth_err) => crate::ApiError::from(auth_err),
            ServiceError::Mailer(mail_err) => {
                tracing::error!(error = %mail_err, "email dispatch error");
                crate::ApiError::internal_server_error(format!("email dispatch failed: {mail_err}"))
            }
            ServiceError::Vision(vision_err) => {
                tracing::error!(error = %vision_err, "document verification error");
                crate::ApiError::internal_server_error(format!(
                    "document verification failed: {vision_err}"
                ))
            }
            ServiceError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                crate::ApiError::internal_server_error(msg)
            }
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        Self::Database(err)
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<MailerError> for ServiceError {
    fn from(err: MailerError) -> Self {
        Self::Mailer(err)
    }
}

impl From<VisionError> for ServiceError {
    fn from(err: VisionError) -> Self {
        Self::Vision(err)
    }
}

impl From<csv::Error> for ServiceError {
    fn from(err: csv::Error) -> Self {
        Self::Internal(format!("csv rendering failed: {err}"))
    }
}
