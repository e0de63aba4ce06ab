//! Scripted fakes standing in for real hardware in unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use crate::input::capability::DeviceAxis;
use crate::input::source::{
    Capabilities, DiscoveredDevice, RawDevice, RawState, SourceDriver, SourceError,
};
use crate::input::value::InputRange;

/// Make `RUST_LOG=debug cargo test` show engine logs for the failing test.
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fake axes report this raw range unless a test overrides calibration.
pub(crate) const FAKE_RANGE: InputRange = InputRange {
    minimum: 0,
    maximum: 1000,
};

/// State shared between a test and the handles it hands to a device, so
/// the test can script the next sample after the device was initialized.
#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub state: RawState,
    pub fail_poll: bool,
    pub fail_acquire: bool,
}

/// A scriptable [RawDevice]. Clones share the scripted state, which is
/// what a driver re-enumerating the same hardware would observe.
#[derive(Clone)]
pub(crate) struct FakeRaw {
    shared: Rc<RefCell<FakeState>>,
    axes: Vec<DeviceAxis>,
    buttons: usize,
    hats: usize,
}

impl FakeRaw {
    pub fn new(axes: &[DeviceAxis], buttons: usize, hats: usize) -> Self {
        let mut shared = FakeState::default();
        shared.state.buttons = vec![false; buttons];
        shared.state.hats = vec![None; hats];
        Self {
            shared: Rc::new(RefCell::new(shared)),
            axes: axes.to_vec(),
            buttons,
            hats,
        }
    }

    pub fn set_axis(&self, axis: DeviceAxis, raw: i32) {
        self.shared.borrow_mut().state.axes[axis.index()] = raw;
    }

    pub fn set_button(&self, index: usize, pressed: bool) {
        self.shared.borrow_mut().state.buttons[index] = pressed;
    }

    pub fn set_hat(&self, index: usize, angle: Option<u16>) {
        self.shared.borrow_mut().state.hats[index] = angle;
    }

    pub fn fail_polls(&self) {
        self.shared.borrow_mut().fail_poll = true;
    }
}

impl RawDevice for FakeRaw {
    fn acquire(&mut self) -> Result<(), SourceError> {
        if self.shared.borrow().fail_acquire {
            return Err(SourceError::Acquire("scripted failure".to_string()));
        }
        Ok(())
    }

    fn unacquire(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            buttons: self.buttons,
            hats: self.hats,
        }
    }

    fn axis_range(&self, axis: DeviceAxis) -> Option<InputRange> {
        self.axes.contains(&axis).then_some(FAKE_RANGE)
    }

    fn poll(&mut self) -> Result<RawState, SourceError> {
        let shared = self.shared.borrow();
        if shared.fail_poll {
            return Err(SourceError::Sample("scripted failure".to_string()));
        }
        Ok(shared.state.clone())
    }
}

pub(crate) fn discovered(name: &str, uuid: Uuid, raw: FakeRaw) -> DiscoveredDevice {
    DiscoveredDevice {
        name: name.to_string(),
        uuid,
        handle: Box::new(raw),
    }
}

/// Enumerates the same scripted devices every call.
pub(crate) struct FakeDriver {
    pub attached: Vec<(String, Uuid, FakeRaw)>,
}

impl SourceDriver for FakeDriver {
    fn devices(&mut self) -> Result<Vec<DiscoveredDevice>, SourceError> {
        Ok(self
            .attached
            .iter()
            .map(|(name, uuid, raw)| DiscoveredDevice {
                name: name.clone(),
                uuid: *uuid,
                handle: Box::new(raw.clone()),
            })
            .collect())
    }
}
