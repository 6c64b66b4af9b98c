//! Cursor arithmetic over the cyclic sequence counter
//!
//! Sequence numbers run from `0` to `period - 1` and then wrap to `0`. The
//! broadcast buffer only ever holds a short window of them, so the window is
//! either contiguous (`oldest <= newest`) or split once at the wrap point
//! (`newest < oldest`). Given a reader's cursor, this module works out how
//! many entries at the front of that window the reader has already seen.

/// Sequence number assigned to a buffered message.
pub type Seq = u32;

/// Returns how many buffered messages, counted from the oldest, the reader
/// whose cursor is `last_read` has already consumed.
///
/// Slicing the buffer at the returned offset yields only unseen messages.
/// When the cursor cannot be placed inside the current window the result is
/// `0`, so the reader gets the whole window again rather than missing any.
///
/// Callers must handle `last_read == newest` ("nothing new") before calling.
pub fn positions_already_seen(oldest: Seq, last_read: Seq, newest: Seq, period: Seq) -> usize {
    let seen = if newest >= oldest {
        if last_read >= oldest && last_read < newest {
            last_read - oldest + 1
        } else {
            0
        }
    } else if last_read >= oldest {
        // Cursor sits in the pre-wrap segment
        last_read - oldest + 1
    } else if last_read < newest {
        // Whole pre-wrap segment plus 0..=last_read of the post-wrap segment,
        // so the slice starts right after the cursor
        period - oldest + last_read + 1
    } else {
        // Dead zone between newest and oldest
        0
    };

    seen as usize
}
