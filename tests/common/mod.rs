//! Recording fakes shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

use lpbeacon::bootstrap::Platform;
use lpbeacon::config::TxConfig;
use lpbeacon::cycle::TaskSleep;
use lpbeacon::error::StartupError;
use lpbeacon::event::{EventBits, EventSignal};
use lpbeacon::indicator::{Indicator, Pattern};
use lpbeacon::radio::RadioLink;
use lpbeacon::reset::{Edge, SystemReset};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Step(&'static str),
    SetChannel(u32),
    ConfigureTx(TxConfig),
    Send(Vec<u8>),
    RadioSleep,
    Pattern(Pattern),
    Hold(u32),
    Button(Edge),
    Reset,
}

pub type Log = Rc<RefCell<Vec<Call>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn count(log: &Log, call: &Call) -> usize {
    log.borrow().iter().filter(|c| *c == call).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeError;

/// Radio that records every call and can answer `send` synchronously, as an IRQ would.
pub struct FakeRadio<'a> {
    log: Log,
    events: Option<&'a EventSignal>,
    replies: VecDeque<EventBits>,
    fallback: Option<EventBits>,
    sends_left: Option<usize>,
    fail_sleep: bool,
    fail_config: bool,
}

impl<'a> FakeRadio<'a> {
    /// Never posts anything: the controller stays blocked.
    pub fn silent(log: Log) -> Self {
        FakeRadio {
            log,
            events: None,
            replies: VecDeque::new(),
            fallback: None,
            sends_left: None,
            fail_sleep: false,
            fail_config: false,
        }
    }

    /// Posts `replies` in order, one per send.
    pub fn replying<const N: usize>(log: Log, events: &'a EventSignal, replies: [EventBits; N]) -> Self {
        FakeRadio {
            events: Some(events),
            replies: replies.into_iter().collect(),
            ..Self::silent(log)
        }
    }

    /// Posts `bits` on every send.
    pub fn always(log: Log, events: &'a EventSignal, bits: EventBits) -> Self {
        FakeRadio {
            events: Some(events),
            fallback: Some(bits),
            ..Self::silent(log)
        }
    }

    pub fn failing_send_after(mut self, sends: usize) -> Self {
        self.sends_left = Some(sends);
        self
    }

    pub fn failing_sleep(mut self) -> Self {
        self.fail_sleep = true;
        self
    }

    pub fn failing_config(mut self) -> Self {
        self.fail_config = true;
        self
    }
}

impl RadioLink for FakeRadio<'_> {
    type Error = FakeError;

    fn set_channel(&mut self, freq_hz: u32) -> Result<(), FakeError> {
        if self.fail_config {
            return Err(FakeError);
        }
        self.log.borrow_mut().push(Call::SetChannel(freq_hz));
        Ok(())
    }

    fn configure_tx(&mut self, config: TxConfig) -> Result<(), FakeError> {
        if self.fail_config {
            return Err(FakeError);
        }
        self.log.borrow_mut().push(Call::ConfigureTx(config));
        Ok(())
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), FakeError> {
        if let Some(left) = self.sends_left.as_mut() {
            if *left == 0 {
                return Err(FakeError);
            }
            *left -= 1;
        }

        self.log.borrow_mut().push(Call::Send(payload.to_vec()));

        let reply = self.replies.pop_front().or(self.fallback);
        if let (Some(events), Some(bits)) = (self.events, reply) {
            events.post(bits);
        }
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), FakeError> {
        if self.fail_sleep {
            return Err(FakeError);
        }
        self.log.borrow_mut().push(Call::RadioSleep);
        Ok(())
    }
}

pub struct FakeLeds {
    log: Log,
}

impl FakeLeds {
    pub fn new(log: Log) -> Self {
        FakeLeds { log }
    }
}

impl Indicator for FakeLeds {
    fn set_pattern(&mut self, pattern: Pattern) {
        self.log.borrow_mut().push(Call::Pattern(pattern));
    }
}

/// Records holds and returns at once. Can post a stray event on the first
/// hold, and can park forever after a number of holds.
pub struct FakeSleep<'a> {
    log: Log,
    holds: usize,
    park_after: Option<usize>,
    inject: Option<(&'a EventSignal, EventBits)>,
}

impl<'a> FakeSleep<'a> {
    pub fn new(log: Log) -> Self {
        FakeSleep {
            log,
            holds: 0,
            park_after: None,
            inject: None,
        }
    }

    pub fn parking_after(mut self, holds: usize) -> Self {
        self.park_after = Some(holds);
        self
    }

    pub fn posting_on_first_hold(mut self, events: &'a EventSignal, bits: EventBits) -> Self {
        self.inject = Some((events, bits));
        self
    }
}

impl TaskSleep for FakeSleep<'_> {
    async fn sleep_ticks(&mut self, ticks: u32) {
        if self.park_after == Some(self.holds) {
            std::future::pending::<()>().await;
        }

        self.holds += 1;
        self.log.borrow_mut().push(Call::Hold(ticks));

        if let Some((events, bits)) = self.inject.take() {
            events.post(bits);
        }
    }
}

pub struct FakeButton;

pub struct FakeReset {
    log: Log,
}

impl FakeReset {
    pub fn new(log: Log) -> Self {
        FakeReset { log }
    }
}

impl SystemReset for FakeReset {
    fn system_reset(&self) -> ! {
        self.log.borrow_mut().push(Call::Reset);
        panic!("system reset requested");
    }
}

/// Board whose steps land in the log; one step can be made to fail.
pub struct FakePlatform {
    pub log: Log,
    pub fail_at: Option<&'static str>,
    pub radio_config_fails: bool,
}

impl FakePlatform {
    pub fn new(log: Log) -> Self {
        FakePlatform {
            log,
            fail_at: None,
            radio_config_fails: false,
        }
    }

    fn step(&self, name: &'static str, err: StartupError) -> Result<(), StartupError> {
        if self.fail_at == Some(name) {
            return Err(err);
        }
        self.log.borrow_mut().push(Call::Step(name));
        Ok(())
    }
}

impl Platform for FakePlatform {
    type Leds = FakeLeds;
    type Button = FakeButton;
    type Radio = FakeRadio<'static>;
    type Reset = FakeReset;

    fn init_general(&mut self) -> Result<(), StartupError> {
        self.step("init_general", StartupError::Board)
    }

    fn init_spi(&mut self) -> Result<(), StartupError> {
        self.step("init_spi", StartupError::Spi)
    }

    fn init_radio_stack(&mut self) -> Result<FakeRadio<'static>, StartupError> {
        self.step("init_radio_stack", StartupError::RadioStack)?;

        let radio = FakeRadio::silent(self.log.clone());
        Ok(if self.radio_config_fails {
            radio.failing_config()
        } else {
            radio
        })
    }

    fn open_leds(&mut self) -> Result<FakeLeds, StartupError> {
        self.step("open_leds", StartupError::LedPins)?;
        Ok(FakeLeds::new(self.log.clone()))
    }

    fn open_button(&mut self, edge: Edge) -> Result<FakeButton, StartupError> {
        self.step("open_button", StartupError::ButtonPin)?;
        self.log.borrow_mut().push(Call::Button(edge));
        Ok(FakeButton)
    }

    fn reset_controller(&mut self) -> FakeReset {
        FakeReset::new(self.log.clone())
    }
}

/// Waker that counts how often it was woken.
#[derive(Default)]
pub struct WakeCounter(AtomicUsize);

impl WakeCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl Wake for WakeCounter {
    fn wake(self: Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn poll_with<F: Future>(fut: Pin<&mut F>, waker: &Waker) -> Poll<F::Output> {
    let mut cx = Context::from_waker(waker);
    fut.poll(&mut cx)
}
