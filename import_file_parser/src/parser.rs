//! Delimited row parser.
//!
//! The first non-blank line is the header. Every following line is split on
//! the separator and zipped with the header names by position. This is a
//! plain split: there is no quoting, so a separator inside a value always
//! starts a new field.
use std::io;

use async_stream::stream;
use bytes::{Bytes, BytesMut};
use futures::{pin_mut, Stream, StreamExt};
use tokio_util::codec::{Decoder, LinesCodec};

use crate::error::ParseError;
use crate::models::ParsedRow;

pub const FIELD_SEPARATOR: char = ';';

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parses a stream of body chunks into rows. The returned stream is lazy: a
/// chunk is only pulled when no complete line is buffered. It ends after the
/// last row or after the first error.
pub fn parse_rows<S>(
    chunks: S,
    separator: char,
) -> impl Stream<Item = Result<ParsedRow, ParseError>>
where
    S: Stream<Item = io::Result<Bytes>>,
{
    stream! {
        pin_mut!(chunks);
        let mut codec = LinesCodec::new();
        let mut buf = BytesMut::new();
        let mut exhausted = false;
        let mut header: Option<Vec<String>> = None;
        let mut line_number = 0;

        loop {
            let decoded = if exhausted {
                codec.decode_eof(&mut buf)
            } else {
                codec.decode(&mut buf)
            };
            let line = match decoded {
                Ok(Some(line)) => line,
                Ok(None) if exhausted => break,
                Ok(None) => {
                    match chunks.next().await {
                        Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
                        Some(Err(e)) => {
                            yield Err(ParseError::Read(e));
                            break;
                        }
                        None => exhausted = true,
                    }
                    continue;
                }
                Err(source) => {
                    yield Err(ParseError::Decode { line: line_number + 1, source });
                    break;
                }
            };
            line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            if header.is_none() {
                header = Some(split_header(&line, separator));
                continue;
            }
            let columns = header.as_deref().unwrap_or_default();

            match zip_row(columns, &line, separator) {
                Some(row) => yield Ok(row),
                None => {
                    yield Err(ParseError::ColumnMismatch {
                        line: line_number,
                        expected: columns.len(),
                        found: line.split(separator).count(),
                    });
                    break;
                }
            }
        }
    }
}

fn split_header(line: &str, separator: char) -> Vec<String> {
    line.trim_start_matches(BYTE_ORDER_MARK)
        .split(separator)
        .map(|name| name.to_string())
        .collect()
}

/// Returns None when the line's field count differs from the header's.
fn zip_row(columns: &[String], line: &str, separator: char) -> Option<ParsedRow> {
    let values = line.split(separator).collect::<Vec<_>>();
    if values.len() != columns.len() {
        return None;
    }
    Some(
        columns
            .iter()
            .cloned()
            .zip(values.into_iter().map(|v| v.to_string()))
            .collect(),
    )
}
