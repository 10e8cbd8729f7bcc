use super::BinaryOutput;
use crate::error::SignalError;
use log::debug;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LEDS_DIR: &str = "/sys/class/leds";

/// In-process indicator that records every state change.
///
/// Clones share state, so a test can keep one handle while the worker
/// thread owns the other.
#[derive(Clone)]
pub struct MemoryOutput {
    inner: Arc<Mutex<MemoryInner>>,
}

struct MemoryInner {
    state: bool,
    available: bool,
    transitions: Vec<bool>,
}

impl MemoryOutput {
    pub fn new(initial: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                state: initial,
                available: true,
                transitions: Vec::new(),
            })),
        }
    }

    /// Output that fails every read and write
    pub fn unavailable() -> Self {
        let out = Self::new(false);
        out.set_available(false);
        out
    }

    pub fn set_available(&self, available: bool) {
        self.inner.lock().available = available;
    }

    pub fn state(&self) -> bool {
        self.inner.lock().state
    }

    /// Every actual change of state, in order (true = switched on)
    pub fn transitions(&self) -> Vec<bool> {
        self.inner.lock().transitions.clone()
    }

    pub fn count_on(&self) -> usize {
        self.inner.lock().transitions.iter().filter(|on| **on).count()
    }

    pub fn count_off(&self) -> usize {
        self.inner.lock().transitions.iter().filter(|on| !**on).count()
    }
}

impl BinaryOutput for MemoryOutput {
    fn get_state(&self) -> Result<bool, SignalError> {
        let inner = self.inner.lock();
        if !inner.available {
            return Err(SignalError::DeviceUnavailable(
                "memory output disabled".to_string(),
            ));
        }
        Ok(inner.state)
    }

    fn set_state(&mut self, on: bool) -> Result<(), SignalError> {
        let mut inner = self.inner.lock();
        if !inner.available {
            return Err(SignalError::DeviceUnavailable(
                "memory output disabled".to_string(),
            ));
        }
        if inner.state != on {
            inner.state = on;
            inner.transitions.push(on);
        }
        Ok(())
    }
}

/// Linux LED class device, e.g. `/sys/class/leds/input3::capslock`.
///
/// Writing `brightness` needs write access to sysfs (usually root).
pub struct SysfsLed {
    dir: PathBuf,
    max_brightness: u32,
}

impl SysfsLed {
    /// Open the LED at `dir` (the device directory, not the brightness file)
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SignalError> {
        let dir = dir.into();
        let max_brightness = read_u32(&dir.join("max_brightness")).unwrap_or(1).max(1);
        let led = Self { dir, max_brightness };
        // Probe readability up front
        led.get_state()?;
        Ok(led)
    }

    /// First Caps Lock LED found under `/sys/class/leds`
    pub fn discover() -> Result<Self, SignalError> {
        Self::discover_in(Path::new(LEDS_DIR))
    }

    pub fn discover_in(leds_dir: &Path) -> Result<Self, SignalError> {
        let entries = fs::read_dir(leds_dir).map_err(|e| {
            SignalError::DeviceUnavailable(format!("{}: {}", leds_dir.display(), e))
        })?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("::capslock"))
            })
            .collect();
        candidates.sort();

        let dir = candidates.into_iter().next().ok_or_else(|| {
            SignalError::DeviceUnavailable(format!(
                "no capslock LED under {}",
                leds_dir.display()
            ))
        })?;
        debug!("Using LED device {}", dir.display());
        Self::open(dir)
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn brightness_path(&self) -> PathBuf {
        self.dir.join("brightness")
    }
}

impl BinaryOutput for SysfsLed {
    fn get_state(&self) -> Result<bool, SignalError> {
        read_u32(&self.brightness_path()).map(|b| b > 0)
    }

    fn set_state(&mut self, on: bool) -> Result<(), SignalError> {
        let path = self.brightness_path();
        let value = if on { self.max_brightness } else { 0 };
        fs::write(&path, value.to_string())
            .map_err(|e| SignalError::DeviceUnavailable(format!("{}: {}", path.display(), e)))
    }
}

fn read_u32(path: &Path) -> Result<u32, SignalError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| SignalError::DeviceUnavailable(format!("{}: {}", path.display(), e)))?;
    contents.trim().parse::<u32>().map_err(|e| {
        SignalError::DeviceUnavailable(format!("{}: unexpected contents ({})", path.display(), e))
    })
}
