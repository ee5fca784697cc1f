// storefront_client/src/feed/sse.rs

//! Incremental `text/event-stream` parser. Bytes go in as they arrive; complete
//! events come out. Chunk boundaries may fall anywhere, including inside a
//! CRLF pair or a multi-byte character.

use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
  /// The `event:` field, if the server sent one.
  pub event: Option<String>,
  /// `data:` lines joined with `\n`.
  pub data: String,
  pub id: Option<String>,
}

/// Longest line kept while waiting for its terminator.
pub const MAX_LINE_BYTES: usize = 1 << 20;

#[derive(Debug, Default)]
pub struct SseParser {
  buffer: Vec<u8>,
  event: Option<String>,
  data: Vec<String>,
  last_id: Option<String>,
  // The previous chunk ended in CR; a leading LF belongs to that terminator.
  after_cr: bool,
  // The current line overflowed and is dropped up to its terminator.
  discarding: bool,
}

impl SseParser {
  pub fn new() -> Self {
    Self::default()
  }

  /// Lines end in CRLF, LF or a lone CR.
  pub fn push(&mut self, mut chunk: &[u8]) -> Vec<SseEvent> {
    if self.after_cr && !chunk.is_empty() {
      if chunk[0] == b'\n' {
        chunk = &chunk[1..];
      }
      self.after_cr = false;
    }
    self.buffer.extend_from_slice(chunk);

    let mut events = Vec::new();
    let mut start = 0;
    while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n' || *b == b'\r') {
      let end = start + offset;
      let mut next = end + 1;
      if self.buffer[end] == b'\r' {
        match self.buffer.get(next) {
          Some(b'\n') => next += 1,
          Some(_) => {}
          None => self.after_cr = true,
        }
      }
      if self.discarding {
        self.discarding = false;
      } else {
        let line = String::from_utf8_lossy(&self.buffer[start..end]).into_owned();
        if let Some(event) = self.process_line(&line) {
          events.push(event);
        }
      }
      start = next;
    }
    self.buffer.drain(..start);

    if self.buffer.len() > MAX_LINE_BYTES {
      warn!(bytes = self.buffer.len(), "Dropping an over-long event stream line.");
      self.buffer.clear();
      self.discarding = true;
    }
    events
  }

  pub fn last_event_id(&self) -> Option<&str> {
    self.last_id.as_deref()
  }

  fn process_line(&mut self, line: &str) -> Option<SseEvent> {
    if line.is_empty() {
      return self.dispatch();
    }
    if line.starts_with(':') {
      return None;
    }
    let (field, value) = match line.split_once(':') {
      Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
      None => (line, ""),
    };
    match field {
      "event" => self.event = Some(value.to_string()),
      "data" => self.data.push(value.to_string()),
      "id" => self.last_id = Some(value.to_string()),
      _ => {}
    }
    None
  }

  fn dispatch(&mut self) -> Option<SseEvent> {
    if self.data.is_empty() {
      self.event = None;
      return None;
    }
    let event = SseEvent {
      event: self.event.take(),
      data: self.data.join("\n"),
      id: self.last_id.clone(),
    };
    self.data.clear();
    Some(event)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_a_named_event() {
    let mut parser = SseParser::new();
    let events = parser.push(b"event: newOrder\ndata: {\"a\":1}\n\n");
    assert_eq!(
      events,
      vec![SseEvent {
        event: Some("newOrder".to_string()),
        data: "{\"a\":1}".to_string(),
        id: None,
      }]
    );
  }

  #[test]
  fn joins_multiline_data_and_skips_comments() {
    let mut parser = SseParser::new();
    let events = parser.push(b": keep-alive\ndata: first\ndata: second\n\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "first\nsecond");
    assert_eq!(events[0].event, None);
  }

  #[test]
  fn handles_crlf_split_across_chunks() {
    let mut parser = SseParser::new();
    assert!(parser.push(b"id: 7\r").is_empty());
    assert!(parser.push(b"\ndata: hel").is_empty());
    assert!(parser.push(b"lo\r\n").is_empty());
    let events = parser.push(b"\r\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "hello");
    assert_eq!(events[0].id.as_deref(), Some("7"));
    assert_eq!(parser.last_event_id(), Some("7"));
  }

  #[test]
  fn utf8_split_inside_a_character_survives() {
    let mut parser = SseParser::new();
    let bytes = "data: ₹280\n\n".as_bytes();
    let (head, tail) = bytes.split_at(8);
    assert!(parser.push(head).is_empty());
    let events = parser.push(tail);
    assert_eq!(events[0].data, "₹280");
  }

  #[test]
  fn lone_cr_terminates_lines() {
    let mut parser = SseParser::new();
    let events = parser.push(b"event: orderUpdated\rdata: x\r\r");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some("orderUpdated"));
    assert_eq!(events[0].data, "x");
  }

  #[test]
  fn over_long_line_is_dropped_and_parsing_resumes() {
    let mut parser = SseParser::new();
    let mut huge = b"data: ".to_vec();
    huge.resize(MAX_LINE_BYTES + 10, b'a');
    assert!(parser.push(&huge).is_empty());
    assert!(parser.push(b"still the same line\n\n").is_empty());
    let events = parser.push(b"data: ok\n\n");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data, "ok");
  }

  #[test]
  fn blank_lines_without_data_do_not_dispatch() {
    let mut parser = SseParser::new();
    assert!(parser.push(b"event: ping\n\n\n").is_empty());
    let events = parser.push(b"data: x\n\n");
    assert_eq!(events[0].event, None);
  }
}
