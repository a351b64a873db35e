use std::cell::RefCell;
use std::rc::Rc;

use super::{LoadTicket, PlaybackDevice};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(LoadTicket, String),
    Resume,
    Pause,
    Stop,
    Volume(f32),
}

/// Device that records every command. Clones share the same log, so a test
/// can keep one handle after boxing another into the engine.
#[derive(Debug, Clone, Default)]
pub struct FakeDevice {
    calls: Rc<RefCell<Vec<Call>>>,
}

impl FakeDevice {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn loads(&self) -> Vec<(LoadTicket, String)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Load(t, s) => Some((*t, s.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn last_load(&self) -> Option<(LoadTicket, String)> {
        self.loads().pop()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl PlaybackDevice for FakeDevice {
    fn load(&mut self, ticket: LoadTicket, source: &str) {
        self.calls
            .borrow_mut()
            .push(Call::Load(ticket, source.to_string()));
    }

    fn resume(&mut self) {
        self.calls.borrow_mut().push(Call::Resume);
    }

    fn pause(&mut self) {
        self.calls.borrow_mut().push(Call::Pause);
    }

    fn stop(&mut self) {
        self.calls.borrow_mut().push(Call::Stop);
    }

    fn set_volume(&mut self, volume: f32) {
        self.calls.borrow_mut().push(Call::Volume(volume));
    }
}
