use futures::{SinkExt, Stream, StreamExt};
use log::{debug, info};
use shared::{ChatError, Command, QUIT_COMMAND};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

/// How long to keep printing server output after sending `/quit`
const QUIT_LINGER: Duration = Duration::from_millis(500);

/// Terminal chat client
///
/// Server output is printed exactly as received. Nothing in it is ever
/// interpreted.
pub struct Client {
    lines: FramedRead<OwnedReadHalf, LinesCodec>,
    writer: FramedWrite<OwnedWriteHalf, LinesCodec>,
    server_addr: SocketAddr,
}

impl Client {
    /// Connects to `server_addr`, giving up after `connect_timeout`
    pub async fn connect(server_addr: &str, connect_timeout: Duration) -> Result<Self, ChatError> {
        let connect_error = |source| ChatError::Connect {
            addr: server_addr.to_string(),
            source,
        };

        let stream = match timeout(connect_timeout, TcpStream::connect(server_addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(connect_error(e)),
            Err(_) => {
                return Err(connect_error(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "connection timed out",
                )))
            }
        };

        let server_addr = stream.peer_addr()?;
        info!("Connected to {}", server_addr);

        let (reader, writer) = stream.into_split();
        Ok(Client {
            lines: FramedRead::new(reader, LinesCodec::new()),
            writer: FramedWrite::new(writer, LinesCodec::new()),
            server_addr,
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Sends one line to the server
    pub async fn send(&mut self, line: &str) -> Result<(), ChatError> {
        self.writer.send(line).await?;
        Ok(())
    }

    /// Forwards `input` lines to the server and copies server lines to
    /// `output` until the connection closes.
    ///
    /// Once a `/quit` has been sent (or `input` runs dry, which sends one),
    /// input is no longer read and the client returns as soon as the server
    /// hangs up, or after a short grace period.
    pub async fn run<I, O>(mut self, mut input: I, mut output: O) -> Result<(), ChatError>
    where
        I: Stream<Item = Result<String, LinesCodecError>> + Unpin,
        O: AsyncWrite + Unpin,
    {
        let mut quitting = false;

        loop {
            tokio::select! {
                line = self.lines.next() => match line {
                    Some(Ok(line)) => {
                        output.write_all(line.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                        output.flush().await?;
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        info!("Connection closed by the server");
                        return Ok(());
                    }
                },

                line = input.next(), if !quitting => match line {
                    Some(Ok(line)) => {
                        quitting = Command::parse(&line).is_quit();
                        self.send(&line).await?;
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        debug!("Input closed, leaving the chat");
                        quitting = true;
                        self.send(QUIT_COMMAND).await?;
                    }
                },

                _ = sleep(QUIT_LINGER), if quitting => {
                    debug!("Server did not close the connection after quit");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tokio::net::TcpListener;

    const WAIT: Duration = Duration::from_secs(2);

    fn input(lines: &[&str]) -> impl Stream<Item = Result<String, LinesCodecError>> + Unpin {
        stream::iter(
            lines
                .iter()
                .map(|line| Ok(line.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_connect_failure() {
        // Grab a free port and release it so nothing is listening there
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = Client::connect(&addr, WAIT).await;
        match result {
            Err(ChatError::Connect { addr: failed, .. }) => assert_eq!(failed, addr),
            Err(e) => panic!("Unexpected error: {}", e),
            Ok(_) => panic!("Connected to a closed port"),
        }
    }

    #[tokio::test]
    async fn test_connect_and_exchange_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, writer) = stream.into_split();
            let mut lines = FramedRead::new(reader, LinesCodec::new());
            let mut writer = FramedWrite::new(writer, LinesCodec::new());

            writer.send("At now -- welcome").await.unwrap();
            let first = lines.next().await.unwrap().unwrap();
            let second = lines.next().await.unwrap().unwrap();
            (first, second)
        });

        let client = Client::connect(&addr.to_string(), WAIT).await.unwrap();
        assert_eq!(client.server_addr(), addr);

        let mut output = Vec::new();
        timeout(WAIT, client.run(input(&["hi", "/quit bye"]), &mut output))
            .await
            .unwrap()
            .unwrap();

        let (first, second) = server.await.unwrap();
        assert_eq!(first, "hi");
        assert_eq!(second, "/quit bye");
        assert!(String::from_utf8(output)
            .unwrap()
            .contains("At now -- welcome\n"));
    }

    #[tokio::test]
    async fn test_end_of_input_sends_quit() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut lines = FramedRead::new(stream, LinesCodec::new());
            lines.next().await.unwrap().unwrap()
        });

        let client = Client::connect(&addr.to_string(), WAIT).await.unwrap();
        let mut output = Vec::new();
        timeout(WAIT, client.run(input(&[]), &mut output))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(server.await.unwrap(), "/quit");
    }

    #[tokio::test]
    async fn test_server_text_is_printed_verbatim() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream
                .write_all(b"At now -- Message from eve:\n\t/execute rm -rf /\n")
                .await
                .unwrap();
        });

        let client = Client::connect(&addr.to_string(), WAIT).await.unwrap();
        let mut output = Vec::new();
        timeout(WAIT, client.run(stream::pending(), &mut output))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "At now -- Message from eve:\n\t/execute rm -rf /\n"
        );
    }
}
