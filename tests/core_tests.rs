use anyhow::Result;
use parking_lot::Mutex;
use quizblink::answers::{AnswerSource, QuizAnswerMap};
use quizblink::input::stdin::spawn_reader;
use quizblink::input::{ControllerConfig, EndReason, KeyEvent, KeyHook, Outcome};
use quizblink::signal::MemoryOutput;
use quizblink::text::TextSink;
use quizblink::QuizBlinkCore;
use std::io::Cursor;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Answer source the test can edit between sessions
#[derive(Clone, Default)]
struct SharedSource(Arc<Mutex<QuizAnswerMap>>);

impl AnswerSource for SharedSource {
    fn load(&self) -> Result<QuizAnswerMap> {
        Ok(self.0.lock().clone())
    }

    fn describe(&self) -> String {
        "shared test source".to_string()
    }
}

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<(u32, String)>>>);

impl TextSink for RecordingSink {
    fn send_text(&mut self, question: u32, text: &str) -> Result<()> {
        self.0.lock().push((question, text.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingHook {
    calls: Vec<bool>,
}

impl KeyHook for RecordingHook {
    fn set_armed(&mut self, armed: bool) -> Result<()> {
        self.calls.push(armed);
        Ok(())
    }
}

struct Fixture {
    core: QuizBlinkCore,
    led: MemoryOutput,
    source: SharedSource,
    sink: RecordingSink,
    hook: RecordingHook,
    now: Instant,
}

impl Fixture {
    fn new(config: ControllerConfig) -> Self {
        let source = SharedSource::default();
        {
            let mut map = source.0.lock();
            map.insert(12, "C");
            map.insert(19, "Krebs cycle");
        }
        let led = MemoryOutput::new(false);
        let sink = RecordingSink::default();
        let core = QuizBlinkCore::new(
            config,
            Box::new(source.clone()),
            led.clone(),
            Box::new(sink.clone()),
        )
        .unwrap();

        Self {
            core,
            led,
            source,
            sink,
            hook: RecordingHook::default(),
            now: Instant::now(),
        }
    }

    fn press(&mut self, key: &str) -> Outcome {
        self.now += Duration::from_millis(300);
        self.core
            .handle_event(&KeyEvent::down(key), self.now, &mut self.hook)
    }
}

fn fast_config() -> ControllerConfig {
    ControllerConfig {
        blink_duration: Duration::from_millis(2),
        text_questions: Some(18..=20),
        ..ControllerConfig::default()
    }
}

#[test]
fn test_full_session_blinks_answer() {
    let mut f = Fixture::new(fast_config());

    assert!(matches!(f.press("f9"), Outcome::Activated { .. }));
    f.press("1");
    f.press("2");
    assert_eq!(f.press("enter").signal().map(|r| r.count), Some(3));
    assert_eq!(f.core.wait_for_signal(), Some(Ok(())));

    // One acknowledgment blink plus three for C
    assert_eq!(f.led.count_on(), 4);
    assert_eq!(f.led.count_off(), 4);
    assert!(!f.led.state());
    assert_eq!(f.hook.calls, vec![true, false]);
}

#[test]
fn test_not_found_emits_no_answer_blink() {
    let mut f = Fixture::new(fast_config());

    f.press("f9");
    assert_eq!(f.core.wait_for_signal(), Some(Ok(())));
    f.press("9");
    f.press("enter");

    assert_eq!(f.core.wait_for_signal(), None);
    assert_eq!(f.led.count_on(), 1);
    assert_eq!(f.hook.calls, vec![true, false]);
}

#[test]
fn test_out_of_range_keeps_hook_armed() {
    let mut f = Fixture::new(fast_config());

    f.press("f9");
    f.press("2");
    f.press("5");
    assert!(matches!(f.press("enter"), Outcome::Rejected(_)));
    assert!(f.core.controller().is_armed());
    assert_eq!(f.hook.calls, vec![true]);
}

#[test]
fn test_text_answer_goes_to_sink() {
    let mut f = Fixture::new(fast_config());

    f.press("f9");
    f.press("1");
    f.press("9");
    f.press("enter");
    f.core.wait_for_signal();

    assert_eq!(
        f.sink.0.lock().clone(),
        vec![(19, "Krebs cycle".to_string())]
    );
    // Only the acknowledgment blink
    assert_eq!(f.led.count_on(), 1);
}

#[test]
fn test_answers_reloaded_on_activation() {
    let mut f = Fixture::new(fast_config());

    f.source.0.lock().insert(5, "E");
    f.press("f9");
    f.press("5");
    assert_eq!(f.press("enter").signal().map(|r| r.count), Some(5));
}

#[test]
fn test_toggle_off_acks_and_disarms() {
    let mut f = Fixture::new(fast_config());

    f.press("f9");
    f.press("1");
    let outcome = f.press("f9");
    assert!(matches!(
        outcome,
        Outcome::Deactivated {
            reason: EndReason::Toggled,
            ..
        }
    ));
    assert_eq!(f.core.wait_for_signal(), Some(Ok(())));
    assert_eq!(f.led.count_on(), 2);
    assert_eq!(f.hook.calls, vec![true, false]);
}

#[test]
fn test_tick_expires_session() {
    let mut f = Fixture::new(fast_config());

    f.press("f9");
    let deadline = f.core.controller().deadline().unwrap();
    assert!(f.core.tick(deadline - Duration::from_millis(1), &mut f.hook).is_none());

    let outcome = f.core.tick(deadline, &mut f.hook);
    assert!(matches!(
        outcome,
        Some(Outcome::Deactivated {
            reason: EndReason::TimedOut,
            ..
        })
    ));
    assert_eq!(f.hook.calls, vec![true, false]);
}

#[test]
fn test_run_processes_channel_until_closed() {
    let mut f = Fixture::new(fast_config());
    let (tx, rx) = mpsc::channel();
    for key in ["f9", "1", "2", "enter"] {
        tx.send(KeyEvent::down(key)).unwrap();
    }
    drop(tx);

    f.core.run(rx, &mut f.hook).unwrap();
    assert_eq!(f.core.wait_for_signal(), Some(Ok(())));

    assert_eq!(f.led.count_on(), 4);
    assert_eq!(f.hook.calls, vec![true, false]);
}

#[test]
fn test_run_times_out_without_keys() {
    let config = ControllerConfig {
        timeout: Duration::from_millis(50),
        ..fast_config()
    };
    let mut f = Fixture::new(config);
    let (tx, rx) = mpsc::channel();
    tx.send(KeyEvent::down("f9")).unwrap();

    let sender = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        drop(tx);
    });

    f.core.run(rx, &mut f.hook).unwrap();
    sender.join().unwrap();

    assert!(!f.core.controller().is_armed());
    assert_eq!(f.hook.calls, vec![true, false]);
}

#[test]
fn test_run_disarms_when_input_closes() {
    let mut f = Fixture::new(fast_config());
    let (tx, rx) = mpsc::channel();
    tx.send(KeyEvent::down("f9")).unwrap();
    tx.send(KeyEvent::down("1")).unwrap();
    drop(tx);

    f.core.run(rx, &mut f.hook).unwrap();
    assert!(!f.core.controller().is_armed());
    assert_eq!(f.hook.calls, vec![true, false]);
}

#[test]
fn test_stdin_repeated_digit_is_not_debounced() {
    let mut f = Fixture::new(fast_config());
    {
        let mut map = f.source.0.lock();
        map.insert(1, "A");
        map.insert(11, "D");
    }

    let (tx, rx) = mpsc::channel();
    let reader = spawn_reader(Cursor::new("f9 1 1 enter\n"), tx).unwrap();
    f.core.run(rx, &mut f.hook).unwrap();
    reader.join().unwrap();
    assert_eq!(f.core.wait_for_signal(), Some(Ok(())));

    // Acknowledgment plus four blinks for question 11
    assert_eq!(f.led.count_on(), 5);
    assert_eq!(f.hook.calls, vec![true, false]);
}
