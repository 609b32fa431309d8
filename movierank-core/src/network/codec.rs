use super::*;

/// Write one event as a newline-terminated JSON line and flush it.
pub async fn write_event<W>(writer: &mut W, event: &RatingEvent) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = event.to_line()?;
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Splits a byte stream into lines without their `\n` / `\r\n` terminator.
///
/// Partially read bytes stay buffered across calls, so a `next_line` future
/// may be dropped inside `select!` without losing data.
pub struct LineReader<R> {
    segments: Split<R>,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            segments: reader.split(b'\n'),
        }
    }

    /// Next line, or `None` at end of stream. A final line with no
    /// terminator is still returned.
    pub async fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        let Some(mut line) = self.segments.next_segment().await? else {
            return Ok(None);
        };
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
#[path = "tests/codec_tests.rs"]
mod tests;
