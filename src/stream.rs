//! HTTP stream source for the camera's MJPEG endpoint

use std::io::{BufReader, Read};

use crate::errors::RecorderError;

/// An open MJPEG byte stream from a network camera.
///
/// Owns the HTTP response body for its lifetime; dropping the stream closes
/// the connection. The body is read through a `BufReader` so the detector's
/// byte-at-a-time scanning does not translate into one syscall per byte.
pub struct CameraStream {
    reader: BufReader<Box<dyn Read + Send + Sync>>,
}

impl CameraStream {
    /// Open the camera's `videostream.cgi` endpoint with URL-encoded
    /// credentials. A single attempt; no reconnection is made on failure.
    pub fn open(host: &str, user: &str, password: &str) -> Result<Self, RecorderError> {
        let url = stream_url(host, user, password);
        log::info!("Connecting to camera at http://{}", host);

        let response = ureq::get(&url)
            .call()
            .map_err(|e| RecorderError::Connection(format!("Failed to open stream: {}", e)))?;

        Ok(Self {
            reader: BufReader::new(response.into_reader()),
        })
    }
}

impl Read for CameraStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

fn stream_url(host: &str, user: &str, password: &str) -> String {
    format!(
        "http://{}/videostream.cgi?user={}&pwd={}",
        host,
        urlencoding::encode(user),
        urlencoding::encode(password)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_embeds_credentials() {
        let url = stream_url("192.168.1.10:8080", "admin", "secret");
        assert_eq!(
            url,
            "http://192.168.1.10:8080/videostream.cgi?user=admin&pwd=secret"
        );
    }

    #[test]
    fn url_escapes_reserved_characters() {
        let url = stream_url("cam.local", "a user", "p&ss=word");
        assert!(url.contains("user=a%20user"));
        assert!(url.contains("pwd=p%26ss%3Dword"));
    }

    #[test]
    fn open_fails_when_connection_is_refused() {
        let result = CameraStream::open("127.0.0.1:1", "u", "p");
        assert!(matches!(result, Err(RecorderError::Connection(_))));
    }
}
