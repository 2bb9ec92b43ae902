//! Custom assertion macros and utilities
//!
//! Provides enhanced assertion macros for better test output and
//! more descriptive error messages.

/// Assert that a result is ok and return the value
///
/// This macro unwraps a Result, providing a better error message
/// if the result is an error.
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a server event is a presence change for `user`
#[macro_export]
macro_rules! assert_presence {
    ($event:expr, $user:expr, $status:expr) => {
        match $event {
            chatwire::shared::ServerEvent::UserStatus(status) => {
                assert_eq!(status.user_id, $user, "presence for wrong user");
                assert_eq!(status.status, $status, "unexpected presence status");
            }
            other => panic!("Expected user_status for {}, got {:?}", $user, other),
        }
    };
}
