//! The one value shared between gesture inference and the render loop.
//!
//! There is exactly one [`SignalWriter`] per channel; readers are cheap
//! clones. The cell is a single atomic byte, so inference may run on its
//! own thread without locks.

use crate::state::TreeState;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Create a signal initialised to [`TreeState::Formed`].
pub fn channel() -> (SignalWriter, SignalReader) {
    let cell = Arc::new(AtomicU8::new(TreeState::Formed.to_bits()));
    (
        SignalWriter {
            cell: Arc::clone(&cell),
        },
        SignalReader { cell },
    )
}

/// Sole writer of the transition signal. Not `Clone`.
#[derive(Debug)]
pub struct SignalWriter {
    cell: Arc<AtomicU8>,
}

impl SignalWriter {
    /// Store `state`; returns `true` if the stored value changed.
    pub fn publish(&self, state: TreeState) -> bool {
        let prev = self.cell.swap(state.to_bits(), Ordering::AcqRel);
        prev != state.to_bits()
    }

    pub fn current(&self) -> TreeState {
        TreeState::from_bits(self.cell.load(Ordering::Acquire))
    }

    pub fn reader(&self) -> SignalReader {
        SignalReader {
            cell: Arc::clone(&self.cell),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SignalReader {
    cell: Arc<AtomicU8>,
}

impl SignalReader {
    /// Read the value for this frame.
    #[inline]
    pub fn snapshot(&self) -> TreeState {
        TreeState::from_bits(self.cell.load(Ordering::Acquire))
    }
}
