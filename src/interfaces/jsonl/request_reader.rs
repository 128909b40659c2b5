use crate::error::{PaymentError, Result};
use crate::interfaces::rpc::service::RpcRequest;
use std::io::{BufRead, BufReader, Read};

/// Reads RPC requests from a newline-delimited JSON source.
///
/// Blank lines are skipped. A line that fails to decode yields an
/// `InvalidInput` error for that line only; the following lines are still
/// read. A failure of the source itself yields one `IoError` and ends the
/// stream.
pub struct RequestReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Returns an iterator that lazily reads and decodes requests.
    ///
    /// This allows for processing large inputs in a streaming fashion without
    /// loading everything into memory.
    pub fn requests(self) -> impl Iterator<Item = Result<RpcRequest>> {
        let mut source_failed = false;
        self.reader
            .lines()
            .enumerate()
            .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
            .map_while(move |(index, line)| {
                if source_failed {
                    return None;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        source_failed = true;
                        return Some(Err(PaymentError::IoError(e)));
                    }
                };
                Some(serde_json::from_str(&line).map_err(|e| {
                    PaymentError::InvalidInput(format!(
                        "Malformed request on line {}: {}",
                        index + 1,
                        e
                    ))
                }))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = concat!(
            r#"{"method":"ProcessPayment","orderId":1,"userId":2,"amount":"10.50","currency":"USD","paymentMethod":"PayPal"}"#,
            "\n\n",
            r#"{"method":"GetPayment","paymentId":1}"#,
            "\n"
        );
        let reader = RequestReader::new(data.as_bytes());
        let results: Vec<Result<RpcRequest>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        match results[0].as_ref().unwrap() {
            RpcRequest::ProcessPayment(r) => assert_eq!(r.amount, dec!(10.50)),
            other => panic!("unexpected request {other:?}"),
        }
        assert!(matches!(
            results[1].as_ref().unwrap(),
            RpcRequest::GetPayment(r) if r.payment_id == 1
        ));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "not json\n{\"method\":\"Health\"}\n";
        let reader = RequestReader::new(data.as_bytes());
        let results: Vec<Result<RpcRequest>> = reader.requests().collect();

        assert_eq!(results.len(), 2);
        match &results[0] {
            Err(PaymentError::InvalidInput(message)) => assert!(message.contains("line 1")),
            other => panic!("unexpected result {other:?}"),
        }
        assert!(matches!(results[1], Ok(RpcRequest::Health)));
    }

    struct BrokenSource;

    impl Read for BrokenSource {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device gone"))
        }
    }

    #[test]
    fn test_reader_stops_after_source_error() {
        let reader = RequestReader::new(BrokenSource);
        let results: Vec<Result<RpcRequest>> = reader.requests().take(10).collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(PaymentError::IoError(_))));
    }
}
