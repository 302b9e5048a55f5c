use std::time::Duration;

use crate::ClientBuildError;

/// Errors raised while starting a [`TestClient`](super::TestClient).
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TestAppError {
    /// Binding the local listener failed.
    #[display("I/O error: {_0}")]
    IoError(std::io::Error),

    /// The client for the test server could not be built.
    #[display("client error: {_0}")]
    ClientError(ClientBuildError),

    /// The server never reported itself healthy.
    #[from(ignore)]
    #[display("Server failed to become healthy within {timeout:?}")]
    UnhealthyServer {
        /// The longest delay between two health checks.
        timeout: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unhealthy_server() {
        let error = TestAppError::UnhealthyServer {
            timeout: Duration::from_secs(5),
        };

        insta::assert_snapshot!(error, @"Server failed to become healthy within 5s");
    }

    #[test]
    fn should_convert_io_error() {
        let error = TestAppError::from(std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "address in use",
        ));

        assert!(matches!(error, TestAppError::IoError(_)));
        insta::assert_snapshot!(error, @"I/O error: address in use");
    }
}
