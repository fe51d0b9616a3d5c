use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use tokio::sync::mpsc;

use super::IngestError;
use crate::manifest::FileCodec;

const LINE_BUFFER: usize = 1_024;

type NumberedLine = (usize, String);

/// Opens a newline-delimited record file, gunzipping `.gz` files.
pub fn open_lines(path: &Path) -> Result<Box<dyn BufRead + Send>, IngestError> {
    match FileCodec::for_path(path) {
        FileCodec::Plain => Ok(Box::new(BufReader::new(File::open(path)?))),
        FileCodec::Gzip => Ok(Box::new(BufReader::new(GzDecoder::new(File::open(path)?)))),
        FileCodec::Unsupported(codec) => Err(IngestError::UnimplementedCodec(codec)),
    }
}

/// Non-blank lines of a record file, read and decompressed on the blocking pool.
///
/// Dropping the stream stops the reader at its next line.
pub struct LineStream {
    rx: mpsc::Receiver<Result<NumberedLine, IngestError>>,
}

impl LineStream {
    pub fn spawn(path: &Path) -> Result<Self, IngestError> {
        if let FileCodec::Unsupported(codec) = FileCodec::for_path(path) {
            return Err(IngestError::UnimplementedCodec(codec));
        }
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            if let Err(err) = pump(&path, &tx) {
                let _ = tx.blocking_send(Err(err));
            }
        });
        Ok(Self { rx })
    }

    /// The next line and its 1-based line number, or `None` at end of file.
    pub async fn next(&mut self) -> Result<Option<NumberedLine>, IngestError> {
        self.rx.recv().await.transpose()
    }
}

fn pump(path: &Path, tx: &mpsc::Sender<Result<NumberedLine, IngestError>>) -> Result<(), IngestError> {
    let mut reader = open_lines(path)?;
    let mut line_no = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        if tx.blocking_send(Ok((line_no, line))).is_err() {
            // consumer stopped early
            return Ok(());
        }
    }
}
