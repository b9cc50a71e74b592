//! Connection handle.

/// One readable+writable byte-stream endpoint and its address label.
///
/// A connection is created on accept/connect, exclusively owned by one
/// Worker or Relay Session for the life of a logical session, and released
/// exactly once.
pub struct Connection<S> {
    stream: S,
    peer_label: String,
}

impl<S> Connection<S> {
    pub fn new(stream: S, peer_label: impl Into<String>) -> Self {
        Self {
            stream,
            peer_label: peer_label.into(),
        }
    }

    /// Address label of the remote endpoint
    pub fn peer_label(&self) -> &str {
        &self.peer_label
    }

    pub fn into_parts(self) -> (S, String) {
        (self.stream, self.peer_label)
    }
}
