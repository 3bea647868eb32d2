// src/rpc/server.rs

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use super::dispatcher::Dispatcher;
use super::message::{Response, RpcError};

/// Read requests line by line from `input`, write one response line per
/// request to `output`. Returns at end of input.
pub async fn serve<R, W>(dispatcher: &Dispatcher, mut input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("serving requests on stdin");
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = input.read_until(b'\n', &mut buf).await.context("reading request line")?;
        if n == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => dispatcher.handle_line(line).await,
            Err(e) => Some(Response::failure(
                serde_json::Value::Null,
                RpcError::parse_error(e.to_string()),
            )),
        };

        if let Some(response) = response {
            write_response(&mut output, &response).await?;
        }
    }

    debug!("input closed; server loop finished");
    Ok(())
}

async fn write_response<W>(output: &mut W, response: &Response) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut bytes = serde_json::to_vec(response).context("encoding response")?;
    bytes.push(b'\n');
    output.write_all(&bytes).await.context("writing response")?;
    output.flush().await.context("flushing response")?;
    Ok(())
}
