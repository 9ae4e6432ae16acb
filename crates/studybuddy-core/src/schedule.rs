/// Identifies one scheduled firing of a
/// [`Debouncer`]. Only the newest ticket
/// is honoured.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct Ticket(u64);

/// Cancel-and-reschedule bookkeeping
/// for debounced input. The timer
/// itself belongs to the caller; this
/// decides whether a firing timer still
/// carries the latest value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
  delay_ms:   u32,
  generation: u64,
  pending:    Option<T>
}

impl<T> Debouncer<T> {
  pub fn new(delay_ms: u32) -> Self {
    Self {
      delay_ms,
      generation: 0,
      pending: None
    }
  }

  pub fn delay_ms(&self) -> u32 {
    self.delay_ms
  }

  /// Supersedes whatever was pending.
  pub fn schedule(
    &mut self,
    value: T
  ) -> Ticket {
    self.generation =
      self.generation.wrapping_add(1);
    self.pending = Some(value);
    Ticket(self.generation)
  }

  pub fn fire(
    &mut self,
    ticket: Ticket
  ) -> Option<T> {
    if ticket.0 != self.generation {
      tracing::trace!(
        stale = ticket.0,
        current = self.generation,
        "ignoring superseded debounce"
      );
      return None;
    }
    self.pending.take()
  }

  pub fn cancel(&mut self) {
    self.generation =
      self.generation.wrapping_add(1);
    self.pending = None;
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }
}
