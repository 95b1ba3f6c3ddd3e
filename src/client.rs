use crate::{
    error::RconError,
    frame::{CommandRequest, CommandResponse},
};
use futures_util::{SinkExt, StreamExt};
use log::trace;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{http::StatusCode, protocol::Message, Error as WsError},
    MaybeTlsStream, WebSocketStream,
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Simple asynchronous webrcon client. Call `connect()` to establish a
/// connection; the password travels as the url path, so there is no separate
/// auth exchange. The client should be `mut` as it keeps a counter used for
/// frame identifiers.
///
/// ## Example
/// ```no_run
/// use webrcon::client::Client;
/// use std::error::Error;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn Error>> {
///     let timeout = Duration::from_secs(10);
///     // client must be mutable so we can increment frame identifiers
///     let mut client =
///         Client::connect("play.example.com", 28016, "<put rcon password here>", timeout).await?;
///     let response = client.command("serverinfo").await?;
///
///     println!("{}", response.message());
///     client.close().await;
///     Ok(())
/// }
/// ```
pub struct Client {
    next_identifier: i32,
    socket: Socket,
    timeout: Duration,
}

/// Container struct for a parsed reply plus the raw frame it came from.
#[derive(Debug)]
pub struct Response {
    frame: CommandResponse,
    raw: String,
}

impl Response {
    pub fn identifier(&self) -> i32 {
        self.frame.identifier()
    }

    pub fn message(&self) -> &str {
        self.frame.message()
    }

    pub fn message_type(&self) -> &str {
        self.frame.message_type()
    }

    pub fn stack(&self) -> Option<&str> {
        self.frame.stack()
    }

    /// The reply frame exactly as the server sent it.
    pub fn raw(&self) -> &str {
        self.raw.as_ref()
    }
}

impl Client {
    /// Connect, run a single command, and close the connection again. The
    /// socket is closed on every path, including failures.
    pub async fn execute(
        host: &str,
        port: u16,
        password: &str,
        command: &str,
        timeout: Duration,
    ) -> Result<Response, RconError> {
        let mut client = Client::connect(host, port, password, timeout).await?;
        let result = client.command(command).await;
        client.close().await;
        result
    }

    pub async fn connect(
        host: &str,
        port: u16,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, RconError> {
        let url = format!("ws://{host}:{port}/{password}");

        trace!("opening websocket to {}:{}", host, port);

        let (socket, _) = time::timeout(timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| RconError::ConnectionTimeout)?
            .map_err(classify_connect_error)?;

        trace!("websocket open, implicit auth accepted");

        Ok(Client {
            next_identifier: 0,
            socket,
            timeout,
        })
    }

    /// Run a rcon command asynchronously and wait for the matching reply.
    /// Replies are correlated by identifier; a frame carrying a different
    /// identifier is rejected rather than returned as the answer.
    pub async fn command(&mut self, command: &str) -> Result<Response, RconError> {
        let request = self.create_request(command);
        let frame = request.to_frame()?;

        trace!("sending command frame with identifier {}", request.identifier());
        self.socket
            .send(Message::Text(frame))
            .await
            .map_err(RconError::SendError)?;

        let raw = time::timeout(self.timeout, Self::read_text_frame(&mut self.socket))
            .await
            .map_err(|_| RconError::ResponseTimeout)??;

        trace!("received frame: {}", raw);

        let response: CommandResponse =
            serde_json::from_str(&raw).map_err(|e| RconError::InvalidResponse {
                reason: e.to_string(),
                payload: raw.clone(),
            })?;

        if response.identifier() != request.identifier() {
            return Err(RconError::InvalidResponse {
                reason: format!(
                    "reply identifier {} does not match request identifier {}",
                    response.identifier(),
                    request.identifier()
                ),
                payload: raw,
            });
        }

        Ok(Response {
            frame: response,
            raw,
        })
    }

    /// Close the connection. Failures are ignored as the peer may already be
    /// gone.
    pub async fn close(mut self) {
        trace!("closing connection");
        if let Err(e) = self.socket.close(None).await {
            trace!("connection already gone: {}", e);
        }
    }

    fn create_request(&mut self, command: &str) -> CommandRequest {
        self.next_identifier += 1;

        CommandRequest::new(self.next_identifier, command)
    }

    async fn read_text_frame(socket: &mut Socket) -> Result<String, RconError> {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Close(_))) | None => {
                    return Err(RconError::ReceiveError(WsError::ConnectionClosed))
                }
                // ping/pong and other control frames are not the reply
                Some(Ok(other)) => trace!("skipping non-text frame: {:?}", other),
                Some(Err(e)) => return Err(RconError::ReceiveError(e)),
            }
        }
    }
}

fn classify_connect_error(error: WsError) -> RconError {
    use std::io::ErrorKind;

    match error {
        WsError::Http(response)
            if response.status() == StatusCode::UNAUTHORIZED
                || response.status() == StatusCode::FORBIDDEN =>
        {
            RconError::AuthenticationFailure
        }
        // the real server drops the socket mid-handshake on a bad password
        WsError::Protocol(_) => RconError::AuthenticationFailure,
        WsError::Io(e) if e.kind() == ErrorKind::UnexpectedEof => {
            RconError::AuthenticationFailure
        }
        WsError::Io(e)
            if matches!(
                e.kind(),
                ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::TimedOut
                    | ErrorKind::HostUnreachable
                    | ErrorKind::NetworkUnreachable
            ) =>
        {
            RconError::ConnectionTimeout
        }
        other => RconError::Unexpected(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::http::Response as HttpResponse;

    #[test]
    fn rejected_handshake_is_an_auth_failure() {
        let rejection = HttpResponse::builder()
            .status(StatusCode::UNAUTHORIZED)
            .body(None)
            .unwrap();

        assert!(matches!(
            classify_connect_error(WsError::Http(rejection)),
            RconError::AuthenticationFailure
        ));
    }

    #[test]
    fn refused_socket_counts_as_connection_timeout() {
        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);

        assert!(matches!(
            classify_connect_error(WsError::Io(refused)),
            RconError::ConnectionTimeout
        ));
    }

    #[test]
    fn other_io_errors_stay_unexpected() {
        let odd = std::io::Error::from(std::io::ErrorKind::PermissionDenied);

        assert!(matches!(
            classify_connect_error(WsError::Io(odd)),
            RconError::Unexpected(_)
        ));
    }
}
