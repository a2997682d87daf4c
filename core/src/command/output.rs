use std::io::{self, BufRead, BufReader, PipeReader, Read};

/// The combined output of a started process.
///
/// stdout and stderr of the child share one pipe, so lines come back in the
/// order the child wrote them. Detached from the child handle so it can be
/// drained elsewhere while the owner keeps the ability to kill the process.
#[derive(Debug)]
pub struct OutputReader {
    pipe: PipeReader,
}

impl OutputReader {
    pub(crate) fn new(pipe: PipeReader) -> Self {
        Self { pipe }
    }

    /// Reads the stream to EOF on the blocking pool.
    ///
    /// EOF arrives once every holder of the write end is gone, which for a
    /// killed process is immediate.
    pub async fn read_lines(self) -> io::Result<Vec<String>> {
        tokio::task::spawn_blocking(move || read_all_lines(self.pipe))
            .await
            .map_err(io::Error::other)?
    }
}

fn read_all_lines(source: impl Read) -> io::Result<Vec<String>> {
    BufReader::new(source)
        .split(b'\n')
        .map(|segment| segment.map(|bytes| decode_line(&bytes)))
        .collect()
}

fn decode_line(bytes: &[u8]) -> String {
    let line = String::from_utf8_lossy(bytes);
    line.strip_suffix('\r').unwrap_or(&line).to_string()
}
