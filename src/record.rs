// ABOUTME: Captures the next key press as a shortcut so a binding can be recorded instead of typed
// ABOUTME: Holds a global subscription only until one recognizable key arrives or time runs out

use crate::keys::{Normalizer, Shortcut};
use crate::platform::{KeyHandler, KeySource};
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

const WAIT_STEP: Duration = Duration::from_millis(250);

/// Subscribes to global key presses and returns the first one as a canonical shortcut.
///
/// `wait` blocks for at most the given duration for a shortcut to show up on the
/// channel. It is where a caller services an event loop the key source depends on.
pub fn record_shortcut<W>(
    source: &mut dyn KeySource,
    normalizer: Normalizer,
    timeout: Duration,
    mut wait: W,
) -> Result<Shortcut>
where
    W: FnMut(&Receiver<Shortcut>, Duration) -> Option<Shortcut>,
{
    let (sender, receiver) = mpsc::channel();
    let handler: KeyHandler = Arc::new(move |event| {
        if !normalizer.recognizes(&event) {
            tracing::debug!(key_code = event.key_code, "Ignoring key without a label");
            return;
        }
        let _ = sender.send(normalizer.normalize(&event));
    });
    let subscription = source
        .subscribe_global(handler)
        .context("Failed to listen for key presses")?;

    let deadline = Instant::now() + timeout;
    let recorded = loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break None;
        }
        if let Some(shortcut) = wait(&receiver, remaining.min(WAIT_STEP)) {
            break Some(shortcut);
        }
    };
    subscription.cancel();

    match recorded {
        Some(shortcut) => {
            tracing::debug!("Recorded {}", shortcut);
            Ok(shortcut)
        }
        None => bail!("No key was pressed within {} seconds", timeout.as_secs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Keymap, Modifiers, RawKeyEvent};
    use crate::monitor::tests::FakeKeySource;
    use std::sync::atomic::Ordering;

    fn mac() -> Normalizer {
        Normalizer::new(&Keymap::MACOS)
    }

    #[test]
    fn test_records_first_recognized_key() {
        let source = FakeKeySource::default();
        let firing = source.clone();
        let mut fired = false;

        let shortcut = record_shortcut(&mut source.clone(), mac(), Duration::from_secs(5), |receiver, step| {
            if !fired {
                fired = true;
                firing.fire("global", RawKeyEvent::new(Modifiers::COMMAND, 0x0C, Some("")));
                firing.fire("global", RawKeyEvent::new(Modifiers::COMMAND | Modifiers::SHIFT, 0x12, Some("!")));
                firing.fire("global", RawKeyEvent::new(Modifiers::COMMAND, 0x13, Some("2")));
            }
            receiver.recv_timeout(step).ok()
        })
        .unwrap();

        assert_eq!(shortcut.as_str(), "Cmd+Shift+1");
        assert_eq!(shortcut, Shortcut::parse("shift+cmd+1").unwrap());
    }

    #[test]
    fn test_subscription_is_released() {
        let source = FakeKeySource::default();
        let firing = source.clone();

        record_shortcut(&mut source.clone(), mac(), Duration::from_secs(5), |receiver, step| {
            firing.fire("global", RawKeyEvent::new(Modifiers::CONTROL, 0x7A, None));
            receiver.recv_timeout(step).ok()
        })
        .unwrap();

        assert!(source.handlers.lock().is_empty());
        assert_eq!(source.detached.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_times_out_without_a_key() {
        let source = FakeKeySource::default();
        let err = record_shortcut(&mut source.clone(), mac(), Duration::from_millis(20), |receiver, step| {
            receiver.recv_timeout(step).ok()
        })
        .unwrap_err();

        assert!(err.to_string().contains("No key was pressed"));
        assert!(source.handlers.lock().is_empty());
    }

    #[test]
    fn test_subscription_failure_is_reported() {
        let source = FakeKeySource::default();
        source.fail_global.store(true, Ordering::SeqCst);

        let result = record_shortcut(&mut source.clone(), mac(), Duration::from_secs(1), |_, _| None);
        assert!(result.is_err());
    }
}
