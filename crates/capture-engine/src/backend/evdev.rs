//! evdev key backend (Linux).
//!
//! Reads key events from the first keyboard-capable device under
//! `/dev/input` on a dedicated delivery thread and fans them out to the
//! registered subscriptions. Requires read access to the device node
//! (typically membership in the `input` group).

use std::os::fd::AsRawFd;
use std::os::unix::fs::MetadataExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use evdev::{Device, InputEventKind, Key};
use playtrace_common::error::{PlaytraceError, PlaytraceResult};
use playtrace_dataset_model::{KeySet, KeyState};

use super::{KeyEventSender, KeySource, RawTransition};

pub struct EvdevKeySource {
    device: Option<Device>,
    subscriptions: Vec<(KeySet, KeyEventSender)>,
    stop_flag: Arc<AtomicBool>,
    delivery: Option<JoinHandle<()>>,
}

impl EvdevKeySource {
    pub fn new() -> PlaytraceResult<Self> {
        let device = find_keyboard_device().ok_or_else(|| {
            PlaytraceError::capture("No readable keyboard device found under /dev/input")
        })?;
        set_nonblocking(&device)?;

        Ok(Self {
            device: Some(device),
            subscriptions: Vec::new(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            delivery: None,
        })
    }

    pub fn is_supported() -> bool {
        find_keyboard_device().is_some()
    }
}

impl KeySource for EvdevKeySource {
    fn subscribe(&mut self, keys: &KeySet, tx: KeyEventSender) -> PlaytraceResult<()> {
        if self.delivery.is_some() {
            return Err(PlaytraceError::capture(
                "Cannot subscribe after the key backend has started",
            ));
        }
        self.subscriptions.push((keys.clone(), tx));
        Ok(())
    }

    fn start(&mut self) -> PlaytraceResult<()> {
        let mut device = self
            .device
            .take()
            .ok_or_else(|| PlaytraceError::capture("Key backend already started"))?;
        let subscriptions = std::mem::take(&mut self.subscriptions);
        let stop = self.stop_flag.clone();

        self.delivery = Some(std::thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                match device.fetch_events() {
                    Ok(events) => {
                        for event in events {
                            let InputEventKind::Key(key) = event.kind() else {
                                continue;
                            };
                            let state = match event.value() {
                                1 => KeyState::Down,
                                0 => KeyState::Up,
                                // 2 = autorepeat, not a transition
                                _ => continue,
                            };
                            let Some(name) = key_name(key) else {
                                continue;
                            };
                            for (keys, tx) in &subscriptions {
                                if keys.contains(name) {
                                    let _ = tx.send(RawTransition {
                                        key: name.to_string(),
                                        state,
                                    });
                                }
                            }
                        }
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                        std::thread::sleep(Duration::from_millis(1));
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Keyboard device read failed; hook thread exiting");
                        break;
                    }
                }
            }
            // Dropping the senders here tells the capture task the hook
            // is gone.
        }));
        Ok(())
    }

    fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.delivery.take() {
            let _ = handle.join();
        }
    }

    fn name(&self) -> &str {
        "evdev"
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl Drop for EvdevKeySource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn find_keyboard_device() -> Option<Device> {
    evdev::enumerate().map(|(_, device)| device).find(|device| {
        device
            .supported_keys()
            .is_some_and(|keys| keys.contains(Key::KEY_A) && keys.contains(Key::KEY_SPACE))
    })
}

fn set_nonblocking(device: &Device) -> PlaytraceResult<()> {
    let fd = device.as_raw_fd();
    let result = unsafe { libc::fcntl(fd, libc::F_SETFL, libc::O_NONBLOCK) };
    if result < 0 {
        return Err(PlaytraceError::capture(format!(
            "Failed to set keyboard device non-blocking: {}",
            std::io::Error::last_os_error()
        )));
    }
    Ok(())
}

/// Diagnostic string for the common "not in the input group" failure.
pub fn keyboard_device_diagnostic() -> String {
    let path = "/dev/input";
    let uid = unsafe { libc::geteuid() };
    let gid = unsafe { libc::getegid() };

    match std::fs::metadata(path) {
        Ok(meta) => {
            let mode = meta.mode() & 0o777;
            format!(
                "dir={path} mode={mode:o} process_uid={uid} process_gid={gid}; likely missing 'input' group membership. Fix: sudo usermod -aG input $USER && log out/in"
            )
        }
        Err(err) => format!(
            "dir={path} unavailable ({err}); ensure kernel input devices exist and permissions allow read access"
        ),
    }
}

/// Map an evdev key to the configuration-facing key name.
fn key_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::KEY_A => "a",
        Key::KEY_B => "b",
        Key::KEY_C => "c",
        Key::KEY_D => "d",
        Key::KEY_E => "e",
        Key::KEY_F => "f",
        Key::KEY_G => "g",
        Key::KEY_H => "h",
        Key::KEY_I => "i",
        Key::KEY_J => "j",
        Key::KEY_K => "k",
        Key::KEY_L => "l",
        Key::KEY_M => "m",
        Key::KEY_N => "n",
        Key::KEY_O => "o",
        Key::KEY_P => "p",
        Key::KEY_Q => "q",
        Key::KEY_R => "r",
        Key::KEY_S => "s",
        Key::KEY_T => "t",
        Key::KEY_U => "u",
        Key::KEY_V => "v",
        Key::KEY_W => "w",
        Key::KEY_X => "x",
        Key::KEY_Y => "y",
        Key::KEY_Z => "z",
        Key::KEY_0 => "0",
        Key::KEY_1 => "1",
        Key::KEY_2 => "2",
        Key::KEY_3 => "3",
        Key::KEY_4 => "4",
        Key::KEY_5 => "5",
        Key::KEY_6 => "6",
        Key::KEY_7 => "7",
        Key::KEY_8 => "8",
        Key::KEY_9 => "9",
        Key::KEY_SPACE => "space",
        Key::KEY_ENTER => "enter",
        Key::KEY_ESC => "esc",
        Key::KEY_TAB => "tab",
        Key::KEY_UP => "up",
        Key::KEY_DOWN => "down",
        Key::KEY_LEFT => "left",
        Key::KEY_RIGHT => "right",
        Key::KEY_LEFTSHIFT => "shift",
        Key::KEY_RIGHTSHIFT => "shift_r",
        Key::KEY_LEFTCTRL => "ctrl",
        Key::KEY_RIGHTCTRL => "ctrl_r",
        Key::KEY_LEFTALT => "alt",
        Key::KEY_RIGHTALT => "alt_r",
        _ => return None,
    };
    Some(name)
}
