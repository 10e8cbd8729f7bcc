use super::{ControllerConfig, KeyEvent, KeyEventKind, KeyHook, KeyOrigin};
use crate::utils::keycode::{code_to_key_name, key_name_to_code, numpad_digit_codes};
use anyhow::{anyhow, Context, Result};
use global_hotkey::{
    hotkey::{Code, HotKey},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::thread;

const DIGIT_CODES: [Code; 10] = [
    Code::Digit0,
    Code::Digit1,
    Code::Digit2,
    Code::Digit3,
    Code::Digit4,
    Code::Digit5,
    Code::Digit6,
    Code::Digit7,
    Code::Digit8,
    Code::Digit9,
];

/// Global key source built on OS hotkeys.
///
/// The trigger key is registered for the whole run. Digits and the submit,
/// cancel and backspace keys are registered only while a session is armed,
/// so they are not intercepted the rest of the time.
pub struct HotkeySource {
    manager: GlobalHotKeyManager,
    trigger: HotKey,
    armed_keys: Vec<HotKey>,
    armed: bool,
}

impl HotkeySource {
    pub fn new(config: &ControllerConfig, sender: Sender<KeyEvent>) -> Result<Self> {
        let manager =
            GlobalHotKeyManager::new().context("Failed to create global hotkey manager")?;

        let mut names: HashMap<u32, String> = HashMap::new();

        let trigger = HotKey::new(None, code_for(&config.trigger_key)?);
        names.insert(trigger.id(), config.trigger_key.clone());

        let mut armed_keys = Vec::new();
        for code in DIGIT_CODES.into_iter().chain(numpad_digit_codes()) {
            let hotkey = HotKey::new(None, code);
            if let Some(name) = code_to_key_name(code) {
                names.insert(hotkey.id(), name.to_string());
            }
            armed_keys.push(hotkey);
        }
        for key in [&config.submit_key, &config.cancel_key, &config.backspace_key] {
            let hotkey = HotKey::new(None, code_for(key)?);
            names.insert(hotkey.id(), key.clone());
            armed_keys.push(hotkey);
        }

        manager
            .register(trigger)
            .context("Failed to register trigger hotkey")?;
        info!("Trigger hotkey registered: {}", config.trigger_key);

        spawn_forwarder(names, sender)?;

        Ok(Self {
            manager,
            trigger,
            armed_keys,
            armed: false,
        })
    }

    /// Unregister all hotkeys
    pub fn unregister_all(&mut self) -> Result<()> {
        self.set_armed(false)?;
        self.manager.unregister(self.trigger)?;
        Ok(())
    }
}

impl KeyHook for HotkeySource {
    fn set_armed(&mut self, armed: bool) -> Result<()> {
        if armed == self.armed {
            return Ok(());
        }
        if armed {
            self.manager
                .register_all(&self.armed_keys)
                .context("Failed to register input hotkeys")?;
            debug!("Input hotkeys registered");
        } else {
            self.manager
                .unregister_all(&self.armed_keys)
                .context("Failed to unregister input hotkeys")?;
            debug!("Input hotkeys unregistered");
        }
        self.armed = armed;
        Ok(())
    }
}

impl Drop for HotkeySource {
    fn drop(&mut self) {
        if let Err(e) = self.unregister_all() {
            warn!("Failed to unregister hotkeys: {}", e);
        }
    }
}

fn code_for(key: &str) -> Result<Code> {
    key_name_to_code(key).ok_or_else(|| anyhow!("Key '{}' cannot be used as a global hotkey", key))
}

/// Background thread translating hotkey ids into named key events
fn spawn_forwarder(names: HashMap<u32, String>, sender: Sender<KeyEvent>) -> Result<()> {
    thread::Builder::new()
        .name("hotkey-listener".to_string())
        .spawn(move || {
            let receiver = GlobalHotKeyEvent::receiver();
            while let Ok(event) = receiver.recv() {
                let Some(name) = names.get(&event.id).cloned() else {
                    continue;
                };
                let kind = match event.state {
                    HotKeyState::Pressed => KeyEventKind::Down,
                    HotKeyState::Released => KeyEventKind::Up,
                };
                let event = KeyEvent {
                    name,
                    kind,
                    origin: KeyOrigin::Device,
                };
                if sender.send(event).is_err() {
                    break;
                }
            }
            debug!("Hotkey listener stopped");
        })
        .context("Failed to spawn hotkey listener thread")?;
    Ok(())
}
