//! Async/await support for channel completion.
//!
//! Provides per-channel wakers, an interrupt handler that dispatches and
//! wakes, and awaitable completion on [`SharedDma`].
//!
//! Dispatch clears a channel's DONE flag, so the handler also records each
//! dispatched channel in a completion mask that [`SharedDma::wait_done`]
//! consumes. The wakers and the mask are global: one controller per
//! program.

use core::future::poll_fn;
use core::task::Poll;

use super::primitives::{AtomicWaker, CriticalSectionCell};
use super::shared::SharedDma;
use crate::driver::error::{Error, IoError, Result};
use crate::driver::status::ChannelState;
use crate::hal::clock::ClockGate;
use crate::hal::mmio::DmaHardware;
use crate::internal::constants::MAX_CHANNELS;

/// Per-channel completion wakers.
pub static CHANNEL_WAKERS: [AtomicWaker; MAX_CHANNELS] =
    [const { AtomicWaker::new() }; MAX_CHANNELS];

/// Channels dispatched by the interrupt handler and not yet awaited
static COMPLETED: CriticalSectionCell<u32> = CriticalSectionCell::new(0);

/// Async-aware interrupt handler.
///
/// Dispatches every pending completion (running callbacks), records the
/// dispatched channels for [`SharedDma::wait_done`] and wakes their
/// tasks. Returns the bitmask of dispatched channels.
///
/// # Example
///
/// ```ignore
/// #[interrupt]
/// fn DMA0() {
///     ph_edma::sync::asynch::async_interrupt_handler(&DMA);
/// }
/// ```
#[inline]
pub fn async_interrupt_handler<H: DmaHardware, G: ClockGate, const CHANNELS: usize>(
    dma: &SharedDma<H, G, CHANNELS>,
) -> u32 {
    let dispatched = dma.on_interrupt();
    wake_channels(dispatched);
    dispatched
}

/// Record completion for every channel in `mask` and wake its task
pub fn wake_channels(mask: u32) {
    if mask == 0 {
        return;
    }
    COMPLETED.with(|completed| *completed |= mask);
    for_each_channel(mask, AtomicWaker::wake);
}

/// Forget recorded completions for the channels in `mask` and wake their
/// tasks so they observe the new state.
///
/// Call after resetting or reconfiguring channels outside the async API.
pub fn reset_channels(mask: u32) {
    COMPLETED.with(|completed| *completed &= !mask);
    for_each_channel(mask, AtomicWaker::wake);
}

/// Reset all async state (call when reinitializing the engine).
pub fn reset_async_state() {
    reset_channels(u32::MAX);
}

/// Consume a recorded completion for `channel`
fn take_completion(channel: usize) -> bool {
    COMPLETED.with(|completed| {
        let bit = 1u32 << channel;
        let set = *completed & bit != 0;
        *completed &= !bit;
        set
    })
}

fn for_each_channel(mask: u32, f: impl Fn(&AtomicWaker)) {
    let mut remaining = mask;
    while remaining != 0 {
        let channel = remaining.trailing_zeros() as usize;
        remaining &= remaining - 1;
        f(&CHANNEL_WAKERS[channel]);
    }
}

impl<H: DmaHardware, G: ClockGate, const CHANNELS: usize> SharedDma<H, G, CHANNELS> {
    /// Wait for a channel's major loop to complete.
    ///
    /// Resolves when the interrupt handler has dispatched the channel, or
    /// when its DONE flag is observed set (DONE is then left set). Without
    /// an enabled completion interrupt the future only makes progress when
    /// polled again by the executor.
    ///
    /// # Errors
    /// - `InvalidChannel` / `NotInitialized` - as for every channel operation
    /// - `InvalidState` - the channel is neither armed, active nor done, so
    ///   no completion can arrive
    pub async fn wait_done(&self, channel: usize) -> Result<()> {
        poll_fn(|cx| {
            self.with(|dma| {
                let state = match dma.channel_state(channel) {
                    Ok(state) => state,
                    Err(e) => return Poll::Ready(Err(e)),
                };
                if take_completion(channel) || state == ChannelState::Done {
                    return Poll::Ready(Ok(()));
                }
                match state {
                    ChannelState::Armed | ChannelState::Active => {
                        // Registered inside the critical section, so the
                        // interrupt cannot slip in between check and register
                        CHANNEL_WAKERS[channel].register(cx.waker());
                        Poll::Pending
                    }
                    _ => Poll::Ready(Err(IoError::InvalidState.into())),
                }
            })
        })
        .await
    }

    /// Copy `size` bytes from `source` to `destination`, awaiting completion.
    ///
    /// Same validation as [`DmaEngine::mem_copy`](crate::DmaEngine::mem_copy),
    /// but the channel raises its completion interrupt and the task sleeps
    /// until [`async_interrupt_handler`] wakes it. DONE is cleared on
    /// completion.
    ///
    /// # Safety
    ///
    /// `source` and `destination` must be bus addresses of `size` bytes of
    /// readable and writable memory respectively, must not overlap, and
    /// must stay valid until the transfer completes or the channel is
    /// stopped. Dropping the future does not stop the channel.
    pub async unsafe fn mem_copy_async(
        &self,
        channel: usize,
        source: u32,
        destination: u32,
        size: usize,
    ) -> Result<()> {
        self.with(|dma| {
            // SAFETY: forwarded from the caller
            unsafe { dma.start_copy(channel, source, destination, size, true)? };
            take_completion(channel);
            Ok::<(), Error>(())
        })?;

        self.wait_done(channel).await?;
        self.with(|dma| dma.clear_done(channel))
    }
}
