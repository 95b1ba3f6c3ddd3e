use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

/// Possible errors for the package.
#[derive(Error, Debug)]
pub enum RconError {
    /// Returned if the websocket did not reach the open state in time. Also
    /// covers a refused or unreachable socket during the connect phase.
    #[error("timed out connecting to host")]
    ConnectionTimeout,
    /// Returned if the server rejected the handshake, which for webrcon
    /// means the password in the connection url was wrong.
    #[error("authentication failed (check the password)")]
    AuthenticationFailure,
    /// Returned if the command was sent but no reply frame arrived in time.
    #[error("server did not respond in time")]
    ResponseTimeout,
    /// Returned if a frame arrived but was not the expected json shape, or
    /// its identifier did not match the request. The offending frame text is
    /// kept for diagnostics.
    #[error("invalid response from server: {reason}")]
    InvalidResponse { reason: String, payload: String },
    /// Internal error used if the connection was established, but there was
    /// a problem writing the command frame.
    #[error("cannot send command to host")]
    SendError(#[source] WsError),
    /// Internal error used if the connection was established, but there was
    /// a problem reading the reply frame.
    #[error("cannot receive response from host")]
    ReceiveError(#[source] WsError),
    /// Returned if the command frame could not be encoded to json.
    #[error("cannot encode command frame")]
    EncodeError(#[from] serde_json::Error),
    /// Internal error used by the test server if the listen socket cannot be
    /// bound.
    #[error("cannot bind listen socket")]
    BindError(#[source] std::io::Error),
    /// Anything else: dns failures, a malformed host, transport errors
    /// outside the cases above.
    #[error("unexpected transport error")]
    Unexpected(#[from] WsError),
}
