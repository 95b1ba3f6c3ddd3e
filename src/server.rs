//! One-shot webrcon server used to exercise the client against scripted
//! replies without a real game server.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use log::{error, info, trace};
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::{
        handshake::server::{ErrorResponse, Request, Response as HandshakeResponse},
        http::StatusCode,
        protocol::Message,
    },
};

use crate::{
    error::RconError,
    frame::{CommandRequest, CommandResponse},
};

/// Scripted reply for a served connection.
pub enum Behavior {
    /// Answer the command frame with this message text, echoing the request
    /// identifier.
    Reply {
        message: String,
        message_type: String,
    },
    /// Send this exact text frame without looking at the request.
    Raw(String),
    /// Read the command frame and never answer.
    Silent,
}

/// Connection lifecycle notifications passed to the [Server::start] handler.
#[derive(Debug)]
pub enum Event {
    /// The websocket handshake completed.
    Opened,
    /// A command frame was received and parsed.
    Command(CommandRequest),
    /// The client went away, via a close frame or a dropped connection.
    Closed,
}

pub struct Server {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Server {
    /// Bind an ephemeral local port and serve a single webrcon connection.
    /// Connections whose url path does not carry `password` are rejected
    /// with http 401, the same way the real server refuses a bad password.
    pub async fn start<F>(password: &str, behavior: Behavior, handler: F) -> Result<Server, RconError>
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(RconError::BindError)?;
        let addr = listener.local_addr().map_err(RconError::BindError)?;
        let expected_path = format!("/{password}");

        let handle: JoinHandle<()> = tokio::spawn(async move {
            info!("server listening on {}", addr);
            match listener.accept().await {
                Ok((stream, peer)) => {
                    info!("accept from {:?}", peer);
                    if let Err(e) = Server::process(stream, &expected_path, &behavior, &handler).await
                    {
                        error!("{:?}", e);
                    }
                }
                Err(e) => error!("{:?}", e),
            }
        });

        Ok(Server { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the served connection to finish.
    pub async fn wait(self) {
        let _ = self.handle.await;
    }

    async fn process<F>(
        stream: TcpStream,
        expected_path: &str,
        behavior: &Behavior,
        handler: &F,
    ) -> Result<(), RconError>
    where
        F: Fn(Event),
    {
        let check_password = |request: &Request, response: HandshakeResponse| {
            if request.uri().path() == expected_path {
                Ok(response)
            } else {
                let mut rejection = ErrorResponse::new(None);
                *rejection.status_mut() = StatusCode::UNAUTHORIZED;
                Err(rejection)
            }
        };

        let mut socket = match accept_hdr_async(stream, check_password).await {
            Ok(socket) => socket,
            Err(e) => {
                trace!("handshake rejected: {}", e);
                return Ok(());
            }
        };

        handler(Event::Opened);

        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => {
                    trace!("receive frame: {}", text);
                    let request: CommandRequest = match serde_json::from_str(&text) {
                        Ok(request) => request,
                        Err(e) => {
                            trace!("discarding unparseable frame: {}", e);
                            continue;
                        }
                    };

                    let identifier = request.identifier();
                    handler(Event::Command(request));

                    match behavior {
                        Behavior::Reply {
                            message,
                            message_type,
                        } => {
                            let reply = CommandResponse::new(
                                identifier,
                                message.clone(),
                                message_type.clone(),
                            );
                            socket
                                .send(Message::Text(reply.to_frame()?))
                                .await
                                .map_err(RconError::SendError)?;
                        }
                        Behavior::Raw(frame) => {
                            socket
                                .send(Message::Text(frame.clone()))
                                .await
                                .map_err(RconError::SendError)?;
                        }
                        Behavior::Silent => trace!("staying silent"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    handler(Event::Closed);
                    return Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    trace!("connection dropped: {}", e);
                    handler(Event::Closed);
                    return Ok(());
                }
            }
        }
    }
}
